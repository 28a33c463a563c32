//! Per-source message buffers with a fixed capacity.

use crate::source::SourceId;
use std::collections::{HashMap, VecDeque};

/// The most recent messages of one source, oldest first.
///
/// Storage is allocated once for `capacity` entries; at capacity, each push
/// evicts the oldest line.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ChannelBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest one first when full.
    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One [`ChannelBuffer`] per known source, iterated in the order the sources
/// were given.
#[derive(Debug, Clone)]
pub struct BufferStore {
    order: Vec<SourceId>,
    buffers: HashMap<SourceId, ChannelBuffer>,
}

impl BufferStore {
    /// Create an empty buffer for every source. Duplicates collapse into the
    /// first occurrence.
    pub fn new<'a>(sources: impl IntoIterator<Item = &'a SourceId>, capacity: usize) -> Self {
        let mut order = Vec::new();
        let mut buffers = HashMap::new();
        for source in sources {
            if !buffers.contains_key(source) {
                buffers.insert(source.clone(), ChannelBuffer::new(capacity));
                order.push(source.clone());
            }
        }
        Self { order, buffers }
    }

    /// Append `text` to `source`'s buffer.
    ///
    /// Returns `false`, touching nothing, if `source` is unknown.
    pub fn append(&mut self, source: &SourceId, text: impl Into<String>) -> bool {
        match self.buffers.get_mut(source) {
            Some(buffer) => {
                buffer.push(text.into());
                true
            }
            None => false,
        }
    }

    /// Current contents of `source`'s buffer, most recent last. Empty for
    /// unknown sources.
    pub fn snapshot(&self, source: &SourceId) -> Vec<String> {
        self.get(source)
            .map(|buffer| buffer.iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, source: &SourceId) -> Option<&ChannelBuffer> {
        self.buffers.get(source)
    }

    /// All buffers in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &ChannelBuffer)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.buffers.get(id).map(|buffer| (id, buffer)))
    }

    /// Total buffered lines across all sources.
    pub fn total_len(&self) -> usize {
        self.buffers.values().map(ChannelBuffer::len).sum()
    }
}
