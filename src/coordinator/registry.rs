use crate::stream::Stream;

use std::sync::Arc;

/// Opaque, stable handle to a registered stream.
///
/// Handles are slot-based rather than address-based: the registry never
/// relocates surviving entries, and a slot's generation is bumped on removal
/// so a stale handle can never resurrect onto a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId {
    index: u32,
    generation: u32,
}

impl StreamId {
    /// Handle of the default ("null") stream, which lives outside the
    /// registry and cannot be destroyed.
    pub const NULL: Self = Self {
        index: u32::MAX,
        generation: 0,
    };

    /// Checks whether this handle names the default stream.
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

struct Slot {
    generation: u32,
    stream: Option<Arc<Stream>>,
}

/// Slot arena holding the live user streams, with free-list reuse.
///
/// Mutated only by the worker thread while executing control commands;
/// iterated only during a barrier drain. The two never overlap in time.
pub(crate) struct StreamRegistry {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl StreamRegistry {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, stream: Arc<Stream>) -> StreamId {
        let index = if let Some(index) = self.free.pop() {
            self.slots[index].stream = Some(stream);
            index
        } else {
            self.slots.push(Slot {
                generation: 0,
                stream: Some(stream),
            });
            self.slots.len() - 1
        };

        StreamId {
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    pub(crate) fn get(&self, id: StreamId) -> Option<Arc<Stream>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }

        slot.stream.clone()
    }

    pub(crate) fn remove(&mut self, id: StreamId) -> Option<Arc<Stream>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }

        let stream = slot.stream.take()?;
        slot.generation += 1;
        self.free.push(id.index as usize);

        Some(stream)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Stream>> {
        self.slots.iter().filter_map(|slot| slot.stream.as_ref())
    }
}
