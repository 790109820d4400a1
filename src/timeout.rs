use serde::Serialize;

pub const TICK_MS: i32 = 100;

/// `remaining_ms` is only meaningful while `active` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeoutEntry {
    pub remaining_ms: i32,
    pub active: bool,
}

pub fn quantize(duration_ms: i32) -> i32 {
    (duration_ms / TICK_MS) * TICK_MS
}

#[derive(Debug, Clone)]
pub struct TimeoutRegistry {
    entries: Vec<TimeoutEntry>,
}

impl TimeoutRegistry {
    pub fn new(slots: usize) -> Self {
        Self {
            entries: vec![TimeoutEntry::default(); slots],
        }
    }

    pub fn get(&self, index: usize) -> Option<TimeoutEntry> {
        self.entries.get(index).copied()
    }

    pub fn arm(&mut self, index: usize, duration_ms: i32) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.remaining_ms = quantize(duration_ms);
            entry.active = true;
        }
    }

    pub fn deactivate(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.active = false;
        }
    }

    /// Runs one tick of countdown on `index` and reports whether it reached
    /// zero on this tick. An expired entry stays active until the caller's
    /// expiry action clears it.
    pub fn advance(&mut self, index: usize) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        if entry.active && entry.remaining_ms > 0 {
            entry.remaining_ms -= TICK_MS;
            return entry.remaining_ms == 0;
        }
        false
    }
}
