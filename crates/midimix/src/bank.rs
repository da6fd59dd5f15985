//! Bank paging
//!
//! The surface has eight strips but the host bank can hold more tracks.
//! Strips address the host through a window:
//!
//! ```text
//! host tracks:  0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
//! offset 0:     [ strips 0..7  ]
//! offset 8:                     [ strips 0..7       ]
//! ```

use crate::config::BankConfig;

/// Paging window over the host bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankWindow {
    /// Host position of strip 0
    offset: usize,
    /// Physical strips on the surface
    strips: usize,
    /// Tracks held by the host bank
    capacity: usize,
}

impl BankWindow {
    /// Create a window at offset 0
    ///
    /// A bank smaller than the surface is widened to the surface.
    pub fn new(strips: usize, bank: &BankConfig) -> Self {
        Self {
            offset: 0,
            strips,
            capacity: bank.max_tracks.max(strips),
        }
    }

    /// Host bank position for a physical strip
    pub fn position(&self, slot: usize) -> usize {
        self.offset + slot
    }

    /// Current host position of strip 0
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Largest valid offset
    pub fn max_offset(&self) -> usize {
        self.capacity - self.strips
    }

    /// Move one page right, returns the new offset
    pub fn page_right(&mut self) -> usize {
        self.offset = (self.offset + self.strips).min(self.max_offset());
        self.offset
    }

    /// Move one page left, returns the new offset
    pub fn page_left(&mut self) -> usize {
        self.offset = self.offset.saturating_sub(self.strips);
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(max_tracks: usize) -> BankConfig {
        BankConfig {
            max_tracks,
            ..BankConfig::default()
        }
    }

    #[test]
    fn test_positions() {
        let mut window = BankWindow::new(8, &BankConfig::default());
        assert_eq!(window.position(4), 4);
        window.page_right();
        assert_eq!(window.position(0), 8);
        assert_eq!(window.position(7), 15);
    }

    #[test]
    fn test_paging_clamps() {
        let mut window = BankWindow::new(8, &bank(12));
        assert_eq!(window.max_offset(), 4);
        assert_eq!(window.page_right(), 4);
        assert_eq!(window.page_right(), 4);
        assert_eq!(window.page_left(), 0);
        assert_eq!(window.page_left(), 0);
    }

    #[test]
    fn test_small_bank() {
        let mut window = BankWindow::new(8, &bank(4));
        assert_eq!(window.max_offset(), 0);
        assert_eq!(window.page_right(), 0);
        assert_eq!(window.position(7), 7);
    }
}
