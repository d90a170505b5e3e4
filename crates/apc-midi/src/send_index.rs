//! Send window cycling
//!
//! A strip has fewer physical send controls than the song may have sends.
//! Cycling moves a window over the sends: at offset `n` the first physical
//! control drives send `n`, the second send `n + 1`, and so on.
//!
//! ```text
//! offset 0:  [c0  c1  c2 ]           -> sends 0, 1, 2
//! offset 2:  [--  --  c0  c1  c2 ]   -> sends 2, 3, 4
//! ```
//!
//! Offsets are kept per named range so independently cycling strip groups
//! don't move each other's windows.

use std::collections::HashMap;

/// Number of send positions cycled through by default
pub const DEFAULT_CYCLE_SIZE: usize = 6;

/// Range used by the target-track strip
pub const TARGET_STRIP_RANGE: &str = "CH Strip";

/// Send offset per named range
#[derive(Debug, Clone)]
pub struct SendIndexManager {
    cycle_size: usize,
    indices: HashMap<String, usize>,
}

impl Default for SendIndexManager {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_SIZE)
    }
}

impl SendIndexManager {
    /// Create a manager; a zero cycle size is treated as 1
    pub fn new(cycle_size: usize) -> Self {
        Self {
            cycle_size: cycle_size.max(1),
            indices: HashMap::new(),
        }
    }

    pub fn cycle_size(&self) -> usize {
        self.cycle_size
    }

    /// Current offset of a range (0 until first cycled)
    pub fn send_index(&self, range_name: &str) -> usize {
        self.indices.get(range_name).copied().unwrap_or(0)
    }

    /// Advance a range's offset, wrapping at the cycle size
    ///
    /// Returns the new offset.
    pub fn cycle_send_index(&mut self, range_name: &str) -> usize {
        let index = self.indices.entry(range_name.to_string()).or_insert(0);
        *index = (*index + 1) % self.cycle_size;
        log::debug!("send index '{}' -> {}", range_name, *index);
        *index
    }

    pub fn reset(&mut self, range_name: &str) {
        self.indices.remove(range_name);
    }
}

/// Visible send slots for a control list at a given offset
///
/// `offset` empty slots followed by every control, in order.
pub fn send_window<C: Clone>(controls: &[C], offset: usize) -> Vec<Option<C>> {
    std::iter::repeat_with(|| None)
        .take(offset)
        .chain(controls.iter().cloned().map(Some))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle_returns_to_start() {
        let mut manager = SendIndexManager::new(6);
        let start = manager.send_index(TARGET_STRIP_RANGE);

        let seen: Vec<usize> = (0..6)
            .map(|_| manager.cycle_send_index(TARGET_STRIP_RANGE))
            .collect();

        assert_eq!(seen, vec![1, 2, 3, 4, 5, 0]);
        assert_eq!(manager.send_index(TARGET_STRIP_RANGE), start);
    }

    #[test]
    fn test_ranges_are_independent() {
        let mut manager = SendIndexManager::default();
        manager.cycle_send_index("A");
        manager.cycle_send_index("A");
        manager.cycle_send_index("B");

        assert_eq!(manager.send_index("A"), 2);
        assert_eq!(manager.send_index("B"), 1);
        assert_eq!(manager.send_index("C"), 0);

        manager.reset("A");
        assert_eq!(manager.send_index("A"), 0);
        assert_eq!(manager.send_index("B"), 1);
    }

    #[test]
    fn test_offset_stays_in_range() {
        let mut manager = SendIndexManager::new(3);
        for _ in 0..20 {
            assert!(manager.cycle_send_index("x") < 3);
        }
        assert_eq!(SendIndexManager::new(0).cycle_size(), 1);
    }

    #[test]
    fn test_send_window() {
        let controls = ["k1", "k2", "k3"];
        assert_eq!(
            send_window(&controls, 0),
            vec![Some("k1"), Some("k2"), Some("k3")]
        );
        assert_eq!(
            send_window(&controls, 2),
            vec![None, None, Some("k1"), Some("k2"), Some("k3")]
        );
        assert_eq!(send_window::<&str>(&[], 1), vec![None]);
    }
}
