//! Pending button presses
//!
//! Buttons send a note-on when pressed and a note-off when released. Each
//! press is parked here until its release arrives, most recent first.

use crate::types::ControllerAddress;
use crate::RouterError;

/// LIFO buffer of presses awaiting release
#[derive(Debug, Clone, Default)]
pub struct PendingGestureStack {
    pending: Vec<ControllerAddress>,
}

impl PendingGestureStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a press
    pub fn push(&mut self, address: ControllerAddress) {
        self.pending.push(address);
    }

    /// Take the most recent press
    pub fn pop(&mut self) -> Result<ControllerAddress, RouterError> {
        self.pending.pop().ok_or(RouterError::StackUnderflow)
    }

    /// Most recent press without removing it
    pub fn peek(&self) -> Option<ControllerAddress> {
        self.pending.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Remove every pending press, oldest first
    pub fn drain(&mut self) -> Vec<ControllerAddress> {
        std::mem::take(&mut self.pending)
    }

    /// Pending presses, oldest first
    pub fn as_slice(&self) -> &[ControllerAddress] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = PendingGestureStack::new();
        stack.push(0x10);
        stack.push(0x2E);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(), Some(0x2E));

        assert_eq!(stack.pop(), Ok(0x2E));
        assert_eq!(stack.pop(), Ok(0x10));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_balanced_sequence_ends_empty() {
        let mut stack = PendingGestureStack::new();
        let presses = [0x01, 0x04, 0x07, 0x0A, 0x19];
        for address in presses {
            stack.push(address);
        }
        let released: Vec<_> = (0..presses.len()).map(|_| stack.pop().unwrap()).collect();
        let mut expected = presses.to_vec();
        expected.reverse();
        assert_eq!(released, expected);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_underflow() {
        let mut stack = PendingGestureStack::new();
        assert_eq!(stack.pop(), Err(RouterError::StackUnderflow));

        stack.push(0x18);
        assert_eq!(stack.pop(), Ok(0x18));
        assert_eq!(stack.pop(), Err(RouterError::StackUnderflow));
    }

    #[test]
    fn test_drain() {
        let mut stack = PendingGestureStack::new();
        stack.push(0x01);
        stack.push(0x02);
        assert_eq!(stack.as_slice(), &[0x01, 0x02]);
        assert_eq!(stack.drain(), vec![0x01, 0x02]);
        assert!(stack.is_empty());
        assert!(stack.drain().is_empty());
    }
}
