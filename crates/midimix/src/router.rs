//! Event router
//!
//! Turns classified MIDI events into calls on the host facades.
//!
//! ```text
//! ControlChange ──► AddressMap ──► normalize ──► MixerFacade
//! NoteOn        ──► PendingGestureStack.push
//! NoteOff       ──► PendingGestureStack.pop ──► gesture complete / bank paging
//! SysEx         ──► SysexCommandMatcher ──► TransportFacade
//! ```
//!
//! The router is not thread-safe and must be driven from a single thread,
//! one event at a time. Press/release ordering depends on it.

use crate::address_map::{AddressMap, LayoutError};
use crate::bank::BankWindow;
use crate::config::{BankConfig, DriverConfig, OverlapPolicy, PagingConfig, SendRouting};
use crate::facade::{MixerFacade, TransportFacade};
use crate::gesture::PendingGestureStack;
use crate::input::MidiEvent;
use crate::normalize::normalize_cc_value;
use crate::sysex::SysexCommandMatcher;
use crate::types::{ControllerAddress, TrackTarget, TransportCommand};

/// Error type for events the router could not apply
///
/// None of these are fatal; the router stays usable after any of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("Controller 0x{0:02X} is not mapped")]
    UnknownAddress(ControllerAddress),

    #[error("Release without a pending press")]
    StackUnderflow,

    #[error("Released 0x{completed:02X} while {pending:02X?} still pending")]
    OverlappingGesture {
        /// Press that was completed by this release
        completed: ControllerAddress,
        /// Presses still pending at the time of the release, oldest first
        pending: Vec<ControllerAddress>,
        /// New bank offset if the completed press was a paging button
        bank_moved: Option<usize>,
    },
}

/// Router state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// No press pending
    Idle,
    /// At least one press waiting for its release
    AwaitingRelease,
}

/// Mixer call made for a control change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixerAction {
    TrackVolume { position: usize, value: f64 },
    TrackSend { position: usize, send: usize, value: f64 },
    MasterVolume(f64),
}

/// What the router did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// A mixer facade method was invoked
    Mixer(MixerAction),
    /// A transport facade method was invoked
    Transport(TransportCommand),
    /// A press was parked awaiting release
    Pressed(ControllerAddress),
    /// A press/release pair completed
    GestureComplete(ControllerAddress),
    /// A paging button completed and the bank moved
    BankMoved { offset: usize },
    /// The event was not for us
    Ignored,
}

/// Dispatcher from MIDI events to host facades
pub struct MidiEventRouter<M, T> {
    map: AddressMap,
    pending: PendingGestureStack,
    matcher: SysexCommandMatcher,
    bank: BankWindow,
    overlap_policy: OverlapPolicy,
    send_routing: SendRouting,
    paging: Option<PagingConfig>,
    mixer: M,
    transport: T,
}

impl<M: MixerFacade, T: TransportFacade> MidiEventRouter<M, T> {
    /// Create a router with default policies
    pub fn new(map: AddressMap, mixer: M, transport: T) -> Self {
        let bank = BankWindow::new(map.track_count(), &BankConfig::default());
        Self {
            map,
            pending: PendingGestureStack::new(),
            matcher: SysexCommandMatcher::new(),
            bank,
            overlap_policy: OverlapPolicy::default(),
            send_routing: SendRouting::default(),
            paging: None,
            mixer,
            transport,
        }
    }

    /// Create a router from driver configuration
    pub fn from_config(config: &DriverConfig, mixer: M, transport: T) -> Result<Self, LayoutError> {
        let map = AddressMap::from_layout(&config.layout)?;

        if map.track_count() > config.bank.max_tracks {
            return Err(LayoutError::BankTooSmall {
                tracks: map.track_count(),
                capacity: config.bank.max_tracks,
            });
        }

        let bank = BankWindow::new(map.track_count(), &config.bank);
        Ok(Self {
            bank,
            overlap_policy: config.overlap_policy,
            send_routing: config.send_routing,
            paging: config.paging,
            ..Self::new(map, mixer, transport)
        })
    }

    /// Route one event
    ///
    /// Errors are logged here as well as returned.
    pub fn handle(&mut self, event: &MidiEvent) -> Result<RouteOutcome, RouterError> {
        let result = match event {
            MidiEvent::ControlChange { cc, value, .. } => self.handle_control_change(*cc, *value),
            MidiEvent::NoteOn { note, .. } => Ok(self.handle_note_on(*note)),
            MidiEvent::NoteOff { .. } => self.handle_note_off(),
            MidiEvent::SysEx(payload) => Ok(self.handle_sysex(payload)),
            MidiEvent::Other { status } => {
                log::trace!("MIDI: Ignoring message with status 0x{:02X}", status);
                Ok(RouteOutcome::Ignored)
            }
        };

        if let Err(e) = &result {
            log::warn!("MIDI: {}", e);
        }
        result
    }

    /// Parse and route raw bytes
    pub fn handle_raw(&mut self, data: &[u8]) -> Result<RouteOutcome, RouterError> {
        match MidiEvent::parse(data) {
            Some(event) => self.handle(&event),
            None => Ok(RouteOutcome::Ignored),
        }
    }

    /// Apply a knob or fader movement
    pub fn handle_control_change(
        &mut self,
        address: ControllerAddress,
        value: u8,
    ) -> Result<RouteOutcome, RouterError> {
        let (track, kind) = self.map.lookup(address)?;
        let normalized = normalize_cc_value(value);

        log::debug!("MIDI: Track: {}  Type: {:?}  Value: {}", track, kind, value);

        let action = match track {
            TrackTarget::Master => {
                self.mixer.set_master_volume(normalized);
                MixerAction::MasterVolume(normalized)
            }
            TrackTarget::Slot(slot) => {
                let position = self.bank.position(slot);
                match (self.send_routing, kind.send_index()) {
                    (SendRouting::Send, Some(send)) => {
                        self.mixer.set_track_send(position, send, normalized);
                        MixerAction::TrackSend {
                            position,
                            send,
                            value: normalized,
                        }
                    }
                    _ => {
                        self.mixer.set_track_volume(position, normalized);
                        MixerAction::TrackVolume {
                            position,
                            value: normalized,
                        }
                    }
                }
            }
        };

        Ok(RouteOutcome::Mixer(action))
    }

    /// Park a button press
    pub fn handle_note_on(&mut self, address: ControllerAddress) -> RouteOutcome {
        self.pending.push(address);
        log::trace!("MIDI: Press 0x{:02X} ({} pending)", address, self.pending.len());
        RouteOutcome::Pressed(address)
    }

    /// Pair a button release with the most recent press
    ///
    /// The release carries no address of its own; it always completes the
    /// most recent press. If other presses remain pending afterwards, the
    /// completion still happens and `OverlappingGesture` is returned; the
    /// remaining presses are then dropped or kept per the overlap policy.
    pub fn handle_note_off(&mut self) -> Result<RouteOutcome, RouterError> {
        let completed = self.pending.pop()?;
        let outcome = self.complete_gesture(completed);

        if self.pending.is_empty() {
            return Ok(outcome);
        }

        let pending = match self.overlap_policy {
            OverlapPolicy::Reset => self.pending.drain(),
            OverlapPolicy::Accumulate => self.pending.as_slice().to_vec(),
        };
        let bank_moved = match outcome {
            RouteOutcome::BankMoved { offset } => Some(offset),
            _ => None,
        };
        Err(RouterError::OverlappingGesture {
            completed,
            pending,
            bank_moved,
        })
    }

    fn complete_gesture(&mut self, address: ControllerAddress) -> RouteOutcome {
        if let Some(paging) = self.paging {
            if address == paging.bank_left {
                let offset = self.bank.page_left();
                log::info!("MIDI: Bank offset {}", offset);
                return RouteOutcome::BankMoved { offset };
            }
            if address == paging.bank_right {
                let offset = self.bank.page_right();
                log::info!("MIDI: Bank offset {}", offset);
                return RouteOutcome::BankMoved { offset };
            }
        }

        log::debug!("MIDI: Gesture complete on 0x{:02X}", address);
        RouteOutcome::GestureComplete(address)
    }

    /// Apply a sysex message given as hex
    ///
    /// Unknown payloads are ignored without error.
    pub fn handle_sysex(&mut self, payload: &str) -> RouteOutcome {
        match self.matcher.match_hex(payload) {
            Some(command) => {
                log::debug!("MIDI: Transport {:?}", command);
                command.apply(&mut self.transport);
                RouteOutcome::Transport(command)
            }
            None => {
                log::trace!("MIDI: Ignoring sysex {}", payload);
                RouteOutcome::Ignored
            }
        }
    }

    /// Current state
    pub fn state(&self) -> RouterState {
        if self.pending.is_empty() {
            RouterState::Idle
        } else {
            RouterState::AwaitingRelease
        }
    }

    /// Presses awaiting release
    pub fn pending(&self) -> &PendingGestureStack {
        &self.pending
    }

    pub fn address_map(&self) -> &AddressMap {
        &self.map
    }

    /// Host position of strip 0
    pub fn bank_offset(&self) -> usize {
        self.bank.offset()
    }

    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
