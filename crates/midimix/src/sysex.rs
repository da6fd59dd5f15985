//! MMC transport commands over system exclusive
//!
//! The surface sends MIDI Machine Control messages addressed to all devices
//! (`F0 7F 7F 06 <cmd> F7`). Hosts hand these over as lower-case hex strings.
//! Anything else on the bus is let through untouched.

use crate::types::TransportCommand;

/// Known MMC payloads, as lower-case hex
const MMC_COMMANDS: &[(&str, TransportCommand)] = &[
    ("f07f7f0605f7", TransportCommand::Rewind),
    ("f07f7f0604f7", TransportCommand::FastForward),
    ("f07f7f0601f7", TransportCommand::Stop),
    ("f07f7f0602f7", TransportCommand::Play),
    ("f07f7f0606f7", TransportCommand::Record),
];

/// Exact-match lookup from sysex payload to transport command
#[derive(Debug, Clone, Copy, Default)]
pub struct SysexCommandMatcher;

impl SysexCommandMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Match a hex payload as delivered by the host
    ///
    /// Returns None for any payload not in the table.
    pub fn match_hex(&self, payload: &str) -> Option<TransportCommand> {
        MMC_COMMANDS
            .iter()
            .find(|(known, _)| *known == payload)
            .map(|(_, command)| *command)
    }

    /// Match a raw sysex message (including the F0/F7 framing)
    pub fn match_bytes(&self, payload: &[u8]) -> Option<TransportCommand> {
        self.match_hex(&hex::encode(payload))
    }
}
