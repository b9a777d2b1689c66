//! The per-tic run list.
//!
//! A `Thinker` binds an object living in one of the level's registries to the
//! function that advances it. Thinkers are run once per tic, in the order they
//! were pushed. A thinker may unlink itself while it runs; the walk already
//! holds the handle of the next thinker so siblings are unaffected.

use std::fmt;

use log::debug;

use crate::{
    env::ceiling::CeilingId,
    level::Level,
    pool::{Handle, Pool},
};

/// Returns `false` if the thinker should be unlinked from the run list.
pub type ThinkFn = fn(CeilingId, &mut Level) -> bool;

/// Every object that is run by the `ThinkerAlloc` implements this.
pub trait Think {
    /// `this` is the object's key in the registry that owns it.
    fn think(this: CeilingId, level: &mut Level) -> bool;

    /// Creating a thinker should be the last step in new objects
    fn create_thinker(object: CeilingId) -> Thinker {
        Thinker {
            object,
            func: Self::think,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Thinker {
    object: CeilingId,
    func: ThinkFn,
}

impl Thinker {
    pub fn object(&self) -> CeilingId {
        self.object
    }

    /// Run the object's `think()`. If `think()` returns false then it should be
    /// unlinked.
    pub fn think(&self, level: &mut Level) -> bool {
        (self.func)(self.object, level)
    }
}

impl fmt::Debug for Thinker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thinker")
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ThinkerAlloc {
    list: Pool<Thinker>,
}

impl ThinkerAlloc {
    pub fn new(capacity: usize) -> Self {
        Self {
            list: Pool::with_capacity(capacity),
        }
    }

    pub const fn len(&self) -> usize {
        self.list.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Push a thinker to the end of the run list and return its handle
    pub fn push(&mut self, thinker: Thinker) -> Handle {
        let handle = self.list.push(thinker);
        debug!("Adding thinker {handle} for object {:?}", thinker.object);
        handle
    }

    /// Unlink a thinker. Returns `false` if it was already gone.
    pub fn remove(&mut self, handle: Handle) -> bool {
        if let Some(thinker) = self.list.remove(handle) {
            debug!("Removing thinker {handle} for object {:?}", thinker.object);
            return true;
        }
        false
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.list.contains(handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&Thinker> {
        self.list.get(handle)
    }

    pub fn first(&self) -> Option<Handle> {
        self.list.first()
    }

    pub fn next(&self, handle: Handle) -> Option<Handle> {
        self.list.next(handle)
    }

    /// Iterates through the list of thinkers until either the closure returns true
    /// or the end is reached.
    pub fn find_thinker<F>(&self, finder: F) -> Option<Handle>
    where
        F: Fn(&Thinker) -> bool,
    {
        self.list.iter().find(|(_, t)| finder(t)).map(|(h, _)| h)
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Think, ThinkerAlloc};
    use crate::{
        env::ceiling::CeilingId,
        level::{Level, map_data::MapData},
    };
    use std::sync::mpsc::channel;

    struct TestObject;

    impl Think for TestObject {
        fn think(_this: CeilingId, level: &mut Level) -> bool {
            level.level_time += 1;
            true
        }
    }

    struct OneShot;

    impl Think for OneShot {
        fn think(_this: CeilingId, _level: &mut Level) -> bool {
            false
        }
    }


    #[test]
    fn push_and_remove() {
        let mut links = ThinkerAlloc::new(64);
        assert!(links.is_empty());

        let h = links.push(TestObject::create_thinker(CeilingId::default()));
        assert_eq!(links.len(), 1);
        assert!(links.contains(h));
        assert_eq!(links.first(), Some(h));

        assert!(links.remove(h));
        assert!(!links.remove(h));
        assert!(links.is_empty());
    }

    #[test]
    fn run_and_drop_one_shots() {
        let (tx, _rx) = channel();
        let mut level = Level::new(MapData::default(), tx);

        level.thinkers.push(TestObject::create_thinker(CeilingId::default()));
        let once = level.thinkers.push(OneShot::create_thinker(CeilingId::default()));
        level.thinkers.push(TestObject::create_thinker(CeilingId::default()));

        level.run_thinkers();
        // Both TestObjects ran
        assert_eq!(level.level_time, 2);
        assert_eq!(level.thinkers.len(), 2);
        assert!(!level.thinkers.contains(once));
    }
}
