//! Semantic types shared by the address map, router and facades
//!
//! These are the values the router hands to the host: which strip, which
//! parameter, which transport command. They carry no MIDI wire details.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 7-bit MIDI controller or note number (0-127)
pub type ControllerAddress = u8;

/// Strip targeted by a control
///
/// Physical strips are numbered 0-7 left to right. The master fader has its
/// own target so it can never collide with a strip index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackTarget {
    /// Physical channel strip (0-based)
    Slot(usize),
    /// Master fader
    Master,
}

impl TrackTarget {
    /// Get the strip index, if this is not the master
    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::Slot(slot) => Some(*slot),
            Self::Master => None,
        }
    }

    /// Check if this targets the master fader
    pub fn is_master(&self) -> bool {
        matches!(self, Self::Master)
    }
}

impl fmt::Display for TrackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => write!(f, "track {}", slot),
            Self::Master => write!(f, "master"),
        }
    }
}

/// Parameter driven by a control within a strip
///
/// Each strip on the surface has three send knobs stacked above a fader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Top knob
    SendA,
    /// Middle knob
    SendB,
    /// Bottom knob
    SendC,
    /// Fader
    Volume,
}

impl ParameterKind {
    /// All kinds, in physical top-to-bottom order
    pub const ALL: [ParameterKind; 4] = [
        ParameterKind::SendA,
        ParameterKind::SendB,
        ParameterKind::SendC,
        ParameterKind::Volume,
    ];

    /// Get the send index for send knobs (None for volume)
    pub fn send_index(&self) -> Option<usize> {
        match self {
            Self::SendA => Some(0),
            Self::SendB => Some(1),
            Self::SendC => Some(2),
            Self::Volume => None,
        }
    }
}

/// MMC transport command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportCommand {
    Rewind,
    FastForward,
    Stop,
    Play,
    Record,
}
