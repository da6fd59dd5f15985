//! Controller number → (strip, parameter) lookup
//!
//! The MIDI Mix lays out each strip as four consecutive CC numbers starting
//! at a per-strip base:
//!
//! ```text
//!  strip:   1     2     3     4     5     6     7     8    master
//!  SendA  0x10  0x14  0x18  0x1C  0x2E  0x32  0x36  0x3A
//!  SendB  0x11  0x15  0x19  0x1D  0x2F  0x33  0x37  0x3B
//!  SendC  0x12  0x16  0x1A  0x1E  0x30  0x34  0x38  0x3C
//!  Volume 0x13  0x17  0x1B  0x1F  0x31  0x35  0x39  0x3D  0x3E
//! ```
//!
//! The map is built once and never mutated afterwards.

use crate::config::LayoutConfig;
use crate::types::{ControllerAddress, ParameterKind, TrackTarget};
use crate::RouterError;
use std::collections::HashMap;

/// Error type for layouts that cannot be turned into an address map
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Controller 0x{0:02X} is assigned more than once")]
    DuplicateAddress(ControllerAddress),

    #[error("Controller {0} is outside the 7-bit MIDI range")]
    AddressOutOfRange(u16),

    #[error("Layout has {tracks} tracks but the bank only holds {capacity}")]
    BankTooSmall { tracks: usize, capacity: usize },
}

/// Immutable controller number lookup
#[derive(Debug, Clone)]
pub struct AddressMap {
    tracks: HashMap<ControllerAddress, TrackTarget>,
    kinds: HashMap<ControllerAddress, ParameterKind>,
    track_count: usize,
}

impl AddressMap {
    /// Build the map for the stock MIDI Mix layout
    pub fn build() -> Self {
        let layout = LayoutConfig::default();
        let mut map = Self::empty(layout.track_bases.len());
        for (slot, base) in layout.track_bases.iter().enumerate() {
            for kind in ParameterKind::ALL {
                let address = base + layout.offsets.offset(kind);
                map.tracks.insert(address, TrackTarget::Slot(slot));
                map.kinds.insert(address, kind);
            }
        }
        map.tracks.insert(layout.master_address, TrackTarget::Master);
        map.kinds.insert(layout.master_address, ParameterKind::Volume);
        map
    }

    /// Build the map for a configured layout
    ///
    /// Rejects layouts where two controls share a number or a control falls
    /// outside 0-127.
    pub fn from_layout(layout: &LayoutConfig) -> Result<Self, LayoutError> {
        let mut map = Self::empty(layout.track_bases.len());

        for (slot, base) in layout.track_bases.iter().enumerate() {
            for kind in ParameterKind::ALL {
                let address = checked_address(*base, layout.offsets.offset(kind))?;
                map.insert(address, TrackTarget::Slot(slot), kind)?;
            }
        }
        let master = checked_address(layout.master_address, 0)?;
        map.insert(master, TrackTarget::Master, ParameterKind::Volume)?;

        log::debug!(
            "MIDI: Address map built ({} controls, {} tracks)",
            map.len(),
            map.track_count
        );
        Ok(map)
    }

    fn empty(track_count: usize) -> Self {
        Self {
            tracks: HashMap::new(),
            kinds: HashMap::new(),
            track_count,
        }
    }

    fn insert(
        &mut self,
        address: ControllerAddress,
        track: TrackTarget,
        kind: ParameterKind,
    ) -> Result<(), LayoutError> {
        if self.tracks.insert(address, track).is_some() {
            return Err(LayoutError::DuplicateAddress(address));
        }
        self.kinds.insert(address, kind);
        Ok(())
    }

    /// Get the strip a controller belongs to
    pub fn lookup_track(&self, address: ControllerAddress) -> Result<TrackTarget, RouterError> {
        self.tracks
            .get(&address)
            .copied()
            .ok_or(RouterError::UnknownAddress(address))
    }

    /// Get the parameter a controller drives
    pub fn lookup_kind(&self, address: ControllerAddress) -> Result<ParameterKind, RouterError> {
        self.kinds
            .get(&address)
            .copied()
            .ok_or(RouterError::UnknownAddress(address))
    }

    /// Get both strip and parameter for a controller
    pub fn lookup(
        &self,
        address: ControllerAddress,
    ) -> Result<(TrackTarget, ParameterKind), RouterError> {
        Ok((self.lookup_track(address)?, self.lookup_kind(address)?))
    }

    /// Check if a controller is registered
    pub fn contains(&self, address: ControllerAddress) -> bool {
        self.tracks.contains_key(&address)
    }

    /// Number of registered controllers
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the map has no controllers
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of physical strips (excluding master)
    pub fn track_count(&self) -> usize {
        self.track_count
    }

    /// All registered controller numbers, ascending
    pub fn addresses(&self) -> Vec<ControllerAddress> {
        let mut addresses: Vec<_> = self.tracks.keys().copied().collect();
        addresses.sort_unstable();
        addresses
    }
}

impl Default for AddressMap {
    fn default() -> Self {
        Self::build()
    }
}

fn checked_address(base: ControllerAddress, offset: u8) -> Result<ControllerAddress, LayoutError> {
    let address = base as u16 + offset as u16;
    if address > 0x7F {
        return Err(LayoutError::AddressOutOfRange(address));
    }
    Ok(address as ControllerAddress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParameterOffsets, DEFAULT_TRACK_BASES};

    #[test]
    fn test_all_strip_controls() {
        let map = AddressMap::build();
        for (slot, base) in DEFAULT_TRACK_BASES.iter().enumerate() {
            for (offset, kind) in ParameterKind::ALL.iter().enumerate() {
                let address = base + offset as u8;
                assert_eq!(map.lookup_track(address), Ok(TrackTarget::Slot(slot)));
                assert_eq!(map.lookup_kind(address), Ok(*kind));
            }
        }
    }

    #[test]
    fn test_master() {
        let map = AddressMap::build();
        assert_eq!(map.lookup(0x3E), Ok((TrackTarget::Master, ParameterKind::Volume)));
    }

    #[test]
    fn test_volume_column() {
        let map = AddressMap::build();
        assert_eq!(map.lookup(0x13), Ok((TrackTarget::Slot(0), ParameterKind::Volume)));
        assert_eq!(map.lookup(0x31), Ok((TrackTarget::Slot(4), ParameterKind::Volume)));
        assert_eq!(map.lookup(0x3D), Ok((TrackTarget::Slot(7), ParameterKind::Volume)));
        assert_eq!(map.lookup(0x33), Ok((TrackTarget::Slot(5), ParameterKind::SendB)));
        assert_eq!(map.lookup(0x12), Ok((TrackTarget::Slot(0), ParameterKind::SendC)));
    }

    #[test]
    fn test_unknown_addresses() {
        let map = AddressMap::build();
        assert_eq!(map.len(), 33);

        let known = map.addresses();
        for address in 0..=0x7F_u8 {
            if known.contains(&address) {
                continue;
            }
            assert_eq!(map.lookup_track(address), Err(RouterError::UnknownAddress(address)));
            assert_eq!(map.lookup_kind(address), Err(RouterError::UnknownAddress(address)));
        }
        // Gap between strips 4 and 5
        assert!(!map.contains(0x20));
        assert!(!map.contains(0x2D));
        assert!(!map.contains(0x3F));
    }

    #[test]
    fn test_from_default_layout_matches_build() {
        let built = AddressMap::build();
        let configured = AddressMap::from_layout(&LayoutConfig::default()).unwrap();
        assert_eq!(built.addresses(), configured.addresses());
        for address in built.addresses() {
            assert_eq!(built.lookup(address), configured.lookup(address));
        }
        assert_eq!(configured.track_count(), 8);
    }

    #[test]
    fn test_duplicate_layout_rejected() {
        let layout = LayoutConfig {
            track_bases: vec![0x10, 0x12],
            ..LayoutConfig::default()
        };
        assert_eq!(
            AddressMap::from_layout(&layout).unwrap_err(),
            LayoutError::DuplicateAddress(0x12)
        );

        let layout = LayoutConfig {
            master_address: 0x13,
            ..LayoutConfig::default()
        };
        assert_eq!(
            AddressMap::from_layout(&layout).unwrap_err(),
            LayoutError::DuplicateAddress(0x13)
        );
    }

    #[test]
    fn test_out_of_range_layout_rejected() {
        let layout = LayoutConfig {
            track_bases: vec![0x7E],
            offsets: ParameterOffsets::default(),
            master_address: 0x00,
        };
        assert_eq!(
            AddressMap::from_layout(&layout).unwrap_err(),
            LayoutError::AddressOutOfRange(0x80)
        );
    }
}
