//! MIDI input handling
//!
//! Receives raw MIDI bytes from the midir callback, classifies them with
//! midly, and forwards the events to the thread that owns the router via a
//! flume channel. No routing happens on the driver thread.

use crate::connection::{MidiConnection, MidiConnectionError};
use flume::Sender;
use midir::MidiInputConnection;
use midly::live::LiveEvent;
use midly::MidiMessage;

/// Status byte that opens a system exclusive message
const SYSEX_START: u8 = 0xF0;

/// Classified MIDI input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiEvent {
    /// Control Change message
    ControlChange { channel: u8, cc: u8, value: u8 },
    /// Note On message
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    /// Note Off message
    NoteOff {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    /// System exclusive message, lower-case hex including F0/F7
    SysEx(String),
    /// Any other well-formed message (pitch bend, clock, ...)
    Other { status: u8 },
}

impl MidiEvent {
    /// Parse raw MIDI bytes into an event
    ///
    /// MIDI message format:
    /// - Note Off: 0x8n nn vv (n=channel, nn=note, vv=velocity)
    /// - Note On: 0x9n nn vv
    /// - Control Change: 0xBn cc vv (cc=controller, vv=value)
    /// - SysEx: 0xF0 ... 0xF7
    ///
    /// Returns None for bytes that are not a valid MIDI message.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;

        if status == SYSEX_START {
            return Some(Self::SysEx(hex::encode(data)));
        }

        let event = match LiveEvent::parse(data) {
            Ok(event) => event,
            Err(e) => {
                log::trace!("MIDI: Unparseable message {:02X?}: {}", data, e);
                return None;
            }
        };

        let LiveEvent::Midi { channel, message } = event else {
            return Some(Self::Other { status });
        };
        let channel = channel.as_int();

        Some(match message {
            MidiMessage::Controller { controller, value } => Self::ControlChange {
                channel,
                cc: controller.as_int(),
                value: value.as_int(),
            },
            // Note On with velocity 0 is treated as Note Off
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: 0,
            },
            MidiMessage::NoteOn { key, vel } => Self::NoteOn {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOff { key, vel } => Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            },
            _ => Self::Other { status },
        })
    }

    /// Wrap a hex sysex payload as delivered by a host (not normalized)
    pub fn sysex_hex(payload: &str) -> Self {
        Self::SysEx(payload.to_string())
    }
}

/// Callback data passed to midir
struct CallbackData {
    event_tx: Sender<MidiEvent>,
}

/// MIDI input handler
///
/// Owns the midir connection and forwards parsed events.
pub struct MidiInputHandler {
    /// The midir connection (kept alive for the duration)
    _connection: MidiInputConnection<CallbackData>,
    port_name: String,
}

impl MidiInputHandler {
    /// Connect to the first input port matching `port_match`
    pub fn connect(
        port_match: &str,
        event_tx: Sender<MidiEvent>,
    ) -> Result<Self, MidiConnectionError> {
        let (midi_in, port, port_name) = MidiConnection::find_input_port(port_match)?;

        let connection = midi_in
            .connect(
                &port,
                "midimix-input",
                Self::midi_callback,
                CallbackData { event_tx },
            )
            .map_err(|e| MidiConnectionError::ConnectionError(e.to_string()))?;

        log::info!("MIDI: Input handler connected to '{}'", port_name);

        Ok(Self {
            _connection: connection,
            port_name,
        })
    }

    /// The midir callback function
    ///
    /// Called from the MIDI driver thread whenever a message is received.
    /// Must be fast and non-blocking.
    fn midi_callback(_timestamp: u64, data: &[u8], callback_data: &mut CallbackData) {
        let Some(event) = MidiEvent::parse(data) else {
            return;
        };

        if callback_data.event_tx.try_send(event).is_err() {
            log::warn!("MIDI: Event channel full, dropping message");
        }
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}
