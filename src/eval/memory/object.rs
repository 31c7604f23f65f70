//! Heap objects
//!
//! Objects are owned by the heap and addressed through [`ObjectRef`]
//! handles. References held inside objects (vector components, array
//! slots) are handles too, so an object never owns another object.

use std::{ffi::CString, fmt};

use super::header::ObjectHeader;

/// Handle to an object in a heap
///
/// A handle carries the generation of the slot it was issued for.
/// Once the object is swept the slot's generation moves on and the
/// handle no longer resolves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

impl ObjectRef {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        ObjectRef { index, generation }
    }

    /// Slot index in the heap
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the slot at the time the handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// The kinds of object the runtime can allocate
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Integer,
    Float,
    String,
    Vector3,
    Array,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Integer => "integer",
            ObjectKind::Float => "float",
            ObjectKind::String => "string",
            ObjectKind::Vector3 => "vector3",
            ObjectKind::Array => "array",
        };
        f.write_str(name)
    }
}

/// Three non-owning references, always populated
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vector3 {
    pub x: ObjectRef,
    pub y: ObjectRef,
    pub z: ObjectRef,
}

impl Vector3 {
    pub fn components(&self) -> [ObjectRef; 3] {
        [self.x, self.y, self.z]
    }
}

/// Kind-specific object data
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Integer(i32),
    Float(f32),
    /// Owned, NUL terminated copy of the source text
    String(CString),
    Vector3(Vector3),
    /// Fixed size buffer of optional references
    Array(Box<[Option<ObjectRef>]>),
}

impl Payload {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Payload::Integer(_) => ObjectKind::Integer,
            Payload::Float(_) => ObjectKind::Float,
            Payload::String(_) => ObjectKind::String,
            Payload::Vector3(_) => ObjectKind::Vector3,
            Payload::Array(_) => ObjectKind::Array,
        }
    }
}

/// A heap object: header plus payload
#[derive(Debug, Clone)]
pub struct Object {
    header: ObjectHeader,
    payload: Payload,
}

impl Object {
    pub fn new(payload: Payload) -> Self {
        Object {
            header: ObjectHeader::default(),
            payload,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    pub fn is_marked(&self) -> bool {
        self.header.is_marked()
    }

    pub fn mark(&mut self) {
        self.header.mark()
    }

    pub fn unmark(&mut self) {
        self.header.unmark()
    }

    /// Outgoing references, unset array slots skipped
    pub fn children(&self) -> Children<'_> {
        match &self.payload {
            Payload::Integer(_) | Payload::Float(_) | Payload::String(_) => Children::None,
            Payload::Vector3(v) => Children::Vector3(v.components().into_iter()),
            Payload::Array(slots) => Children::Array(slots.iter()),
        }
    }
}

/// Iterator over the references an object holds
pub enum Children<'a> {
    None,
    Vector3(std::array::IntoIter<ObjectRef, 3>),
    Array(std::slice::Iter<'a, Option<ObjectRef>>),
}

impl Iterator for Children<'_> {
    type Item = ObjectRef;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Children::None => None,
            Children::Vector3(it) => it.next(),
            Children::Array(it) => it.find_map(|slot| *slot),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    fn r(index: u32) -> ObjectRef {
        ObjectRef::new(index, 0)
    }

    #[test]
    pub fn test_scalars_have_no_children() {
        assert_eq!(Object::new(Payload::Integer(1)).children().count(), 0);
        assert_eq!(Object::new(Payload::Float(1.5)).children().count(), 0);
        let s = CString::new("hello").unwrap();
        assert_eq!(Object::new(Payload::String(s)).children().count(), 0);
    }

    #[test]
    pub fn test_vector_children_may_alias() {
        let v = Object::new(Payload::Vector3(Vector3 {
            x: r(1),
            y: r(1),
            z: r(2),
        }));
        assert_eq!(v.children().collect::<Vec<_>>(), vec![r(1), r(1), r(2)]);
    }

    #[test]
    pub fn test_array_children_skip_unset_slots() {
        let slots = vec![None, Some(r(3)), None, Some(r(4))].into_boxed_slice();
        let a = Object::new(Payload::Array(slots));
        assert_eq!(a.children().collect::<Vec<_>>(), vec![r(3), r(4)]);
        assert_eq!(a.kind(), ObjectKind::Array);
    }

    #[test]
    pub fn test_display() {
        assert_eq!(ObjectKind::Vector3.to_string(), "vector3");
        assert_eq!(ObjectRef::new(4, 2).to_string(), "#4.2");
    }
}
