// src/carrier/cell.rs

use std::cell::RefCell;

/// Marker a cell holds until some task writes to it.
pub const UNSET_MARKER: &str = "NOT SET";

/// The ambient "transaction marker" slot of one carrier.
///
/// Only code running on the owning carrier touches it, so there is no
/// locking. The cell is never reset between tasks: whatever the last task
/// wrote is what the next task on this carrier sees.
#[derive(Debug)]
pub struct ContextCell {
    marker: RefCell<String>,
}

impl ContextCell {
    pub fn new() -> Self {
        Self {
            marker: RefCell::new(UNSET_MARKER.to_string()),
        }
    }

    pub fn get(&self) -> String {
        self.marker.borrow().clone()
    }

    pub fn set(&self, marker: impl Into<String>) {
        *self.marker.borrow_mut() = marker.into();
    }
}

impl Default for ContextCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_and_keeps_last_write() {
        let cell = ContextCell::new();
        assert_eq!(cell.get(), UNSET_MARKER);

        cell.set("work-1");
        cell.set("work-2");
        assert_eq!(cell.get(), "work-2");
    }
}
