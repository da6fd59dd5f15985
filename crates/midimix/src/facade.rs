//! Host-side collaborators
//!
//! The router never touches host objects directly. It resolves each event
//! to a call on one of these traits, which the host implements against its
//! own mixer and transport.

use crate::types::TransportCommand;

/// Host mixer
///
/// Track positions are host bank positions (already paged), levels are 0.0-1.0.
pub trait MixerFacade {
    fn set_track_volume(&mut self, position: usize, normalized: f64);

    fn set_master_volume(&mut self, normalized: f64);

    fn set_track_send(&mut self, position: usize, send: usize, normalized: f64);
}

/// Host transport
///
/// Every command is fire-and-forget.
pub trait TransportFacade {
    fn rewind(&mut self);
    fn fast_forward(&mut self);
    fn stop(&mut self);
    fn play(&mut self);
    fn record(&mut self);
}

impl TransportCommand {
    /// Invoke the matching transport method
    pub fn apply<T: TransportFacade + ?Sized>(self, transport: &mut T) {
        match self {
            Self::Rewind => transport.rewind(),
            Self::FastForward => transport.fast_forward(),
            Self::Stop => transport.stop(),
            Self::Play => transport.play(),
            Self::Record => transport.record(),
        }
    }
}

/// Mixer that only logs what it would do
///
/// Used by the monitor binary to watch a surface without a host.
#[derive(Debug, Default)]
pub struct LoggingMixer;

impl MixerFacade for LoggingMixer {
    fn set_track_volume(&mut self, position: usize, normalized: f64) {
        log::info!("Mixer: track {} volume {:.3}", position, normalized);
    }

    fn set_master_volume(&mut self, normalized: f64) {
        log::info!("Mixer: master volume {:.3}", normalized);
    }

    fn set_track_send(&mut self, position: usize, send: usize, normalized: f64) {
        log::info!("Mixer: track {} send {} level {:.3}", position, send, normalized);
    }
}

/// Transport that only logs what it would do
#[derive(Debug, Default)]
pub struct LoggingTransport;

impl TransportFacade for LoggingTransport {
    fn rewind(&mut self) {
        log::info!("Transport: rewind");
    }

    fn fast_forward(&mut self) {
        log::info!("Transport: fast forward");
    }

    fn stop(&mut self) {
        log::info!("Transport: stop");
    }

    fn play(&mut self) {
        log::info!("Transport: play");
    }

    fn record(&mut self) {
        log::info!("Transport: record");
    }
}
