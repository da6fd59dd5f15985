//! Event-translation core for the Akai MIDI Mix control surface
//!
//! This crate provides:
//! - Controller number → (strip, parameter) address map
//! - Press/release pairing for buttons
//! - MMC sysex transport commands
//! - Routing of decoded events to host mixer and transport facades
//! - MIDI device connection via midir, message parsing via midly
//!
//! # Architecture
//!
//! ```text
//! MIDI Device → midir callback → flume channel → MidiMixDriver → MidiEventRouter → facades
//! ```
//!
//! The midir callback runs on the driver thread and only parses and forwards.
//! All routing happens on the thread that owns the `MidiMixDriver`, one event
//! at a time.

mod address_map;
mod bank;
mod config;
mod connection;
mod facade;
mod gesture;
mod input;
mod normalize;
mod router;
mod sysex;
mod types;

pub use address_map::{AddressMap, LayoutError};
pub use bank::BankWindow;
pub use config::{
    default_driver_config_path, load_driver_config, save_driver_config, BankConfig, DriverConfig,
    LayoutConfig, OverlapPolicy, PagingConfig, ParameterOffsets, SendRouting,
    DEFAULT_MASTER_ADDRESS, DEFAULT_TRACK_BASES,
};
pub use connection::{MidiConnection, MidiConnectionError};
pub use facade::{LoggingMixer, LoggingTransport, MixerFacade, TransportFacade};
pub use gesture::PendingGestureStack;
pub use input::{MidiEvent, MidiInputHandler};
pub use normalize::normalize_cc_value;
pub use router::{MidiEventRouter, MixerAction, RouteOutcome, RouterError, RouterState};
pub use sysex::SysexCommandMatcher;
pub use types::{ControllerAddress, ParameterKind, TrackTarget, TransportCommand};

use flume::{Receiver, Sender};
use std::path::Path;

/// Error type for driver setup
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Invalid surface layout: {0}")]
    LayoutError(#[from] LayoutError),

    #[error("MIDI connection error: {0}")]
    ConnectionError(#[from] MidiConnectionError),
}

/// Main driver
///
/// Owns the router and the MIDI input connection.
pub struct MidiMixDriver<M, T> {
    /// Loaded configuration
    config: DriverConfig,
    /// Event router (only touched from the owning thread)
    router: MidiEventRouter<M, T>,
    /// Sender cloned into the input callback and handed to hosts with their own
    /// MIDI feed. Released when `run` starts so the channel can close.
    event_tx: Option<Sender<MidiEvent>>,
    /// Receiver for parsed MIDI events
    event_rx: Receiver<MidiEvent>,
    /// Input handler (owns midir connection)
    input_handler: Option<MidiInputHandler>,
}

impl<M: MixerFacade, T: TransportFacade> MidiMixDriver<M, T> {
    /// Create a driver from a config file and connect to the surface
    ///
    /// Returns Ok even if no device is found (graceful degradation).
    pub fn new(config_path: Option<&Path>, mixer: M, transport: T) -> Result<Self, DriverError> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(default_driver_config_path);

        let config = load_driver_config(&config_path);
        let mut driver = Self::with_config(config, mixer, transport)?;
        driver.try_connect();
        Ok(driver)
    }

    /// Create a driver without connecting to any device
    pub fn with_config(config: DriverConfig, mixer: M, transport: T) -> Result<Self, DriverError> {
        let router = MidiEventRouter::from_config(&config, mixer, transport)?;
        let (event_tx, event_rx) = flume::bounded(config.channel_capacity.max(1));

        Ok(Self {
            config,
            router,
            event_tx: Some(event_tx),
            event_rx,
            input_handler: None,
        })
    }

    /// Try to connect to a device matching the config
    fn try_connect(&mut self) {
        let Some(event_tx) = self.event_tx.clone() else {
            return;
        };
        match MidiInputHandler::connect(&self.config.port_match, event_tx) {
            Ok(input_handler) => {
                log::info!(
                    "MIDI: Connected to device matching '{}'",
                    self.config.port_match
                );
                self.input_handler = Some(input_handler);
            }
            Err(e) => {
                log::info!(
                    "MIDI: No device found matching '{}' ({}), running without MIDI input",
                    self.config.port_match,
                    e
                );
            }
        }
    }

    /// Check if a MIDI device is connected
    pub fn is_connected(&self) -> bool {
        self.input_handler.is_some()
    }

    /// Name of the connected port
    pub fn port_name(&self) -> Option<&str> {
        self.input_handler.as_ref().map(|h| h.port_name())
    }

    /// Get a sender for feeding events from another source
    ///
    /// Returns `None` once `run` has been called.
    pub fn event_sender(&self) -> Option<Sender<MidiEvent>> {
        self.event_tx.clone()
    }

    /// Route all pending events (non-blocking)
    ///
    /// Returns the number of events routed. Router errors are logged and
    /// do not stop processing.
    pub fn process_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            let _ = self.router.handle(&event);
            count += 1;
        }
        count
    }

    /// Route events as they arrive
    ///
    /// Drops the driver's own sender first, then blocks until the input
    /// connection and every sender from `event_sender` are gone and the
    /// queue is drained.
    pub fn run(&mut self) {
        self.event_tx = None;
        while let Ok(event) = self.event_rx.recv() {
            let _ = self.router.handle(&event);
        }
    }

    /// Route one event directly, bypassing the channel
    pub fn handle(&mut self, event: &MidiEvent) -> Result<RouteOutcome, RouterError> {
        self.router.handle(event)
    }

    /// Get the router
    pub fn router(&self) -> &MidiEventRouter<M, T> {
        &self.router
    }

    /// Get the loaded config
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Levels {
        tracks: Vec<(usize, f64)>,
        master: Option<f64>,
    }

    impl MixerFacade for Levels {
        fn set_track_volume(&mut self, position: usize, normalized: f64) {
            self.tracks.push((position, normalized));
        }
        fn set_master_volume(&mut self, normalized: f64) {
            self.master = Some(normalized);
        }
        fn set_track_send(&mut self, _position: usize, _send: usize, _normalized: f64) {}
    }

    #[test]
    fn test_driver_routes_queued_events() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut driver =
            MidiMixDriver::with_config(DriverConfig::default(), Levels::default(), LoggingTransport)
                .unwrap();
        assert!(!driver.is_connected());
        assert_eq!(driver.port_name(), None);

        let tx = driver.event_sender().unwrap();
        for bytes in [
            &[0xB0, 0x13, 0x7F][..],
            &[0xB0, 0x20, 0x10][..], // unmapped, logged and skipped
            &[0x90, 0x01, 0x7F][..],
            &[0xB0, 0x3E, 0x00][..],
        ] {
            tx.send(MidiEvent::parse(bytes).unwrap()).unwrap();
        }

        assert_eq!(driver.process_pending(), 4);
        assert_eq!(driver.router().mixer().tracks, vec![(0, 1.0)]);
        assert_eq!(driver.router().mixer().master, Some(0.0));
        assert_eq!(driver.router().state(), RouterState::AwaitingRelease);

        assert_eq!(
            driver.handle(&MidiEvent::NoteOff {
                channel: 0,
                note: 0x01,
                velocity: 0
            }),
            Ok(RouteOutcome::GestureComplete(0x01))
        );
        assert_eq!(driver.process_pending(), 0);
    }

    #[test]
    fn test_run_returns_when_feed_closes() {
        let mut driver =
            MidiMixDriver::with_config(DriverConfig::default(), Levels::default(), LoggingTransport)
                .unwrap();
        let tx = driver.event_sender().unwrap();
        tx.send(MidiEvent::parse(&[0xB0, 0x13, 0x7F]).unwrap())
            .unwrap();
        drop(tx);

        // Returns only because the driver released its own sender
        driver.run();

        assert_eq!(driver.router().mixer().tracks, vec![(0, 1.0)]);
        assert!(driver.event_sender().is_none());
    }

    #[test]
    fn test_driver_rejects_bad_layout() {
        let mut config = DriverConfig::default();
        config.layout.track_bases = vec![0x10, 0x10];
        let result = MidiMixDriver::with_config(config, Levels::default(), LoggingTransport);
        assert!(matches!(
            result,
            Err(DriverError::LayoutError(LayoutError::DuplicateAddress(0x10)))
        ));
    }
}
