//! The object heap
//!
//! An arena of slots, each holding at most one [`Object`], together
//! with the master list of every allocated object. Slots are reused
//! after their object is freed; each reuse bumps the slot generation
//! so that stale [`ObjectRef`]s cannot resolve to the new occupant.

use std::fmt::Debug;

use super::{
    array::{AllocError, Stack},
    object::{Object, ObjectRef, Payload},
};

/// Heap statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    /// Objects currently in the master list
    pub objects: usize,
    /// Slots ever created in the arena
    pub slots: usize,
    /// Slots available for reuse
    pub free_slots: usize,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    object: Option<Object>,
}

/// Arena of objects plus the master object list
pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Every allocated and not yet swept object
    objects: Stack<ObjectRef>,
    /// Occupied slots
    live: usize,
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new(8)
    }
}

impl Debug for Heap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for r in self.objects.iter() {
            match self.get(*r) {
                Some(obj) => writeln!(
                    f,
                    "({}) {} {:?}",
                    if obj.is_marked() { "Mk" } else { "  " },
                    r,
                    obj.payload()
                )?,
                None => writeln!(f, "(XX) {} <dangling>", r)?,
            }
        }
        Ok(())
    }
}

impl Heap {
    /// New empty heap whose master list starts with a logical
    /// capacity of `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Heap {
            slots: Vec::new(),
            free: vec![],
            objects: Stack::with_capacity(capacity),
            live: 0,
        }
    }

    /// Allocate an object and register it in the master list
    ///
    /// On failure nothing is registered and the slot (if any) is
    /// returned to the free list.
    pub fn alloc(&mut self, payload: Payload) -> Result<ObjectRef, AllocError> {
        let index = self.claim_slot()?;
        let slot = &mut self.slots[index as usize];
        let r = ObjectRef::new(index, slot.generation);

        if let Err(e) = self.objects.push(r) {
            self.free.push(index);
            return Err(e);
        }

        self.slots[index as usize].object = Some(Object::new(payload));
        self.live += 1;
        Ok(r)
    }

    fn claim_slot(&mut self) -> Result<u32, AllocError> {
        if let Some(index) = self.free.pop() {
            return Ok(index);
        }

        let index = u32::try_from(self.slots.len()).map_err(|_| AllocError::BadRequest)?;
        self.slots.try_reserve(1).map_err(|_| AllocError::OOM)?;
        self.slots.push(Slot::default());
        Ok(index)
    }

    /// Resolve a handle
    pub fn get(&self, r: ObjectRef) -> Option<&Object> {
        self.slots
            .get(r.index())
            .filter(|slot| slot.generation == r.generation())
            .and_then(|slot| slot.object.as_ref())
    }

    /// Resolve a handle for mutation
    pub fn get_mut(&mut self, r: ObjectRef) -> Option<&mut Object> {
        self.slots
            .get_mut(r.index())
            .filter(|slot| slot.generation == r.generation())
            .and_then(|slot| slot.object.as_mut())
    }

    /// Whether the handle designates an object that has not been freed
    pub fn is_live(&self, r: ObjectRef) -> bool {
        self.get(r).is_some()
    }

    /// Release an object and its payload
    ///
    /// Does not touch the master list; the caller (sweep) is
    /// responsible for removing the entry.
    pub(crate) fn free(&mut self, r: ObjectRef) -> Option<Object> {
        let slot = self
            .slots
            .get_mut(r.index())
            .filter(|slot| slot.generation == r.generation())?;
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        // a slot we cannot record for reuse simply stays empty
        if self.free.try_reserve(1).is_ok() {
            self.free.push(r.index() as u32);
        }
        Some(object)
    }

    /// The master object list
    pub fn objects(&self) -> &Stack<ObjectRef> {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut Stack<ObjectRef> {
        &mut self.objects
    }

    /// Number of objects in the master list
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Statistics
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            objects: self.len(),
            slots: self.slots.len(),
            free_slots: self.free.len(),
        }
    }
}
