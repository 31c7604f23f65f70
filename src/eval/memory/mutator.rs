//! Support mutator access to the heap
//!
//! The mutator is whatever drives the runtime between collections:
//! it allocates objects, reads them and writes references into
//! vectors and arrays. It never frees.

use std::ffi::CString;

use crate::eval::error::RuntimeError;

use super::{
    array::AllocError,
    heap::Heap,
    object::{Object, ObjectKind, ObjectRef, Payload, Vector3},
};

/// A view onto the heap for code that needs mutator access (as
/// opposed to collector access)
///
/// Provides the only means of constructing objects and of writing
/// references into them.
pub struct MutatorHeapView<'guard> {
    heap: &'guard mut Heap,
}

impl<'guard> MutatorHeapView<'guard> {
    pub fn new(heap: &'guard mut Heap) -> Self {
        MutatorHeapView { heap }
    }

    /// Read only access to the same heap
    pub fn reader(&self) -> HeapReader<'_> {
        HeapReader::new(&*self.heap)
    }

    pub fn integer(&mut self, value: i32) -> Result<ObjectRef, RuntimeError> {
        Ok(self.heap.alloc(Payload::Integer(value))?)
    }

    pub fn float(&mut self, value: f32) -> Result<ObjectRef, RuntimeError> {
        Ok(self.heap.alloc(Payload::Float(value))?)
    }

    /// Allocate a string holding a private copy of `value`
    pub fn string(&mut self, value: &str) -> Result<ObjectRef, RuntimeError> {
        let owned = CString::new(value).map_err(|_| RuntimeError::InvalidString)?;
        Ok(self.heap.alloc(Payload::String(owned))?)
    }

    /// Allocate a vector; every component must be live
    pub fn vector3(
        &mut self,
        x: ObjectRef,
        y: ObjectRef,
        z: ObjectRef,
    ) -> Result<ObjectRef, RuntimeError> {
        if [x, y, z].iter().any(|c| !self.heap.is_live(*c)) {
            return Err(RuntimeError::DeadReference);
        }
        Ok(self.heap.alloc(Payload::Vector3(Vector3 { x, y, z }))?)
    }

    /// Allocate an array of `size` unset slots
    pub fn array(&mut self, size: usize) -> Result<ObjectRef, RuntimeError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(size)
            .map_err(|_| AllocError::OOM)?;
        slots.resize(size, None);
        Ok(self.heap.alloc(Payload::Array(slots.into_boxed_slice()))?)
    }

    /// Allocate an array holding the given slots
    pub fn array_from(&mut self, slots: Vec<Option<ObjectRef>>) -> Result<ObjectRef, RuntimeError> {
        Ok(self.heap.alloc(Payload::Array(slots.into_boxed_slice()))?)
    }

    /// Write a reference into a slot
    pub fn array_set(
        &mut self,
        array: ObjectRef,
        index: usize,
        value: ObjectRef,
    ) -> Result<(), RuntimeError> {
        if !self.heap.is_live(value) {
            return Err(RuntimeError::DeadReference);
        }

        let size = self.reader().array_size(array)?;
        if index >= size {
            return Err(RuntimeError::IndexOutOfRange { index, size });
        }

        if let Some(Payload::Array(slots)) = self.heap.get_mut(array).map(Object::payload_mut) {
            slots[index] = Some(value);
        }
        Ok(())
    }
}

/// A read only view of the heap
///
/// Checked accessors over object payloads. Every accessor resolves
/// its handle first so a stale handle reports `DeadReference`.
pub struct HeapReader<'guard> {
    heap: &'guard Heap,
}

impl<'guard> HeapReader<'guard> {
    pub fn new(heap: &'guard Heap) -> Self {
        HeapReader { heap }
    }

    /// Resolve a handle or fail with `DeadReference`
    fn resolve(&self, obj: ObjectRef) -> Result<&'guard Object, RuntimeError> {
        self.heap.get(obj).ok_or(RuntimeError::DeadReference)
    }

    fn array_slots(&self, array: ObjectRef) -> Result<&'guard [Option<ObjectRef>], RuntimeError> {
        match self.resolve(array)?.payload() {
            Payload::Array(slots) => Ok(&slots[..]),
            other => Err(RuntimeError::WrongKind {
                expected: ObjectKind::Array,
                actual: other.kind(),
            }),
        }
    }

    /// Read a slot; `None` for unset slots, bad indices, non-arrays
    /// and dead handles
    pub fn array_get(&self, array: ObjectRef, index: usize) -> Option<ObjectRef> {
        self.array_slots(array)
            .ok()
            .and_then(|slots| slots.get(index).copied().flatten())
    }

    pub fn array_size(&self, array: ObjectRef) -> Result<usize, RuntimeError> {
        self.array_slots(array).map(<[_]>::len)
    }

    pub fn integer_value(&self, obj: ObjectRef) -> Result<i32, RuntimeError> {
        match self.resolve(obj)?.payload() {
            Payload::Integer(i) => Ok(*i),
            other => Err(wrong_kind(ObjectKind::Integer, other)),
        }
    }

    pub fn float_value(&self, obj: ObjectRef) -> Result<f32, RuntimeError> {
        match self.resolve(obj)?.payload() {
            Payload::Float(f) => Ok(*f),
            other => Err(wrong_kind(ObjectKind::Float, other)),
        }
    }

    pub fn string_value(&self, obj: ObjectRef) -> Result<&'guard str, RuntimeError> {
        match self.resolve(obj)?.payload() {
            Payload::String(s) => s.to_str().map_err(|_| RuntimeError::InvalidString),
            other => Err(wrong_kind(ObjectKind::String, other)),
        }
    }

    pub fn vector3_components(&self, obj: ObjectRef) -> Result<Vector3, RuntimeError> {
        match self.resolve(obj)?.payload() {
            Payload::Vector3(v) => Ok(*v),
            other => Err(wrong_kind(ObjectKind::Vector3, other)),
        }
    }
}

fn wrong_kind(expected: ObjectKind, actual: &Payload) -> RuntimeError {
    RuntimeError::WrongKind {
        expected,
        actual: actual.kind(),
    }
}
