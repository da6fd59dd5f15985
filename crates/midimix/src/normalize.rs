//! Value normalization for MIDI controls
//!
//! Knobs and faders send 7-bit values (0-127). The host expects levels in
//! the unit range, with 127 landing exactly on 1.0.

const MIDI_MAX: f64 = 127.0;

/// Normalize a MIDI CC value (0-127) to 0.0-1.0
///
/// Values above 127 are clamped to full scale.
pub fn normalize_cc_value(midi_value: u8) -> f64 {
    (midi_value as f64 / MIDI_MAX).min(1.0)
}
