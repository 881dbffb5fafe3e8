use std::collections::VecDeque;

pub const DEFAULT_TRIGGER_CAPACITY: usize = 8;

/// Bounded history of fired events, newest first.
#[derive(Debug, Clone)]
pub struct TriggerLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl TriggerLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Records `entry` as the newest line, evicting the oldest beyond capacity.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push_front(entry.into());
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TriggerLog {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_CAPACITY)
    }
}
