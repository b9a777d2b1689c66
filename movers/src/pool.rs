//! A slot pool with generation-checked handles and an intrusive, index-linked
//! ordering of the live slots.
//!
//! This takes the place of Doom's zone-allocated `thinkercap` list. Items
//! never move once inserted, removal is O(1) via the stored `prev`/`next`
//! indices, and a `Handle` to a removed item can never reach whatever later
//! reuses the slot because the slot generation is bumped on every removal.

use std::fmt;

/// A stable reference to an item in a `Pool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub const fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
    prev: Option<u32>,
    next: Option<u32>,
}

pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    /// Vacant slot indexes, reused LIFO
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert at the end of the run order. A vacant slot is reused if there
    /// is one.
    pub fn push(&mut self, value: T) -> Handle {
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                slot.prev = self.tail;
                slot.next = None;
                index
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                    prev: self.tail,
                    next: None,
                });
                index
            }
        };

        match self.tail {
            Some(tail) => self.slots[tail as usize].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        Handle {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn live_slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == handle.generation && s.value.is_some())
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.live_slot(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.live_slot(handle).and_then(|s| s.value.as_ref())
    }

    /// Unlink and return the item. Neighbours are joined directly, so a walk
    /// that already holds the next handle is unaffected. Stale handles return
    /// `None`.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .filter(|s| s.generation == handle.generation)?;
        let value = slot.value.take()?;
        let (prev, next) = (slot.prev.take(), slot.next.take());
        slot.generation = slot.generation.wrapping_add(1);

        match prev {
            Some(p) => self.slots[p as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n as usize].prev = prev,
            None => self.tail = prev,
        }

        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    fn handle_at(&self, index: u32) -> Handle {
        Handle {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// First item in run order
    pub fn first(&self) -> Option<Handle> {
        self.head.map(|i| self.handle_at(i))
    }

    /// The item after `handle` in run order, `None` at the end or if the
    /// handle is stale.
    pub fn next(&self, handle: Handle) -> Option<Handle> {
        self.live_slot(handle)?.next.map(|i| self.handle_at(i))
    }

    /// Walk the live items in run order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pool: self,
            current: self.head,
        }
    }

    /// Remove everything. Every outstanding handle becomes stale.
    pub fn clear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                slot.prev = None;
                slot.next = None;
                self.free.push(i as u32);
            }
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}

pub struct Iter<'a, T> {
    pool: &'a Pool<T>,
    current: Option<u32>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        let slot = &self.pool.slots[index as usize];
        self.current = slot.next;
        slot.value.as_ref().map(|v| {
            (
                Handle {
                    index,
                    generation: slot.generation,
                },
                v,
            )
        })
    }
}
