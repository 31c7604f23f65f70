//! Generic operations over objects
//!
//! `add` always allocates a fresh object for its result; neither
//! operand is modified.

use crate::eval::{
    error::RuntimeError,
    machine::runtime::Runtime,
    memory::object::{ObjectRef, Payload, Vector3},
};

/// Operand values copied out of the heap so that the result can be
/// allocated without holding a borrow
enum Sum {
    Integer(i32),
    Float(f32),
    String(String),
    Vector3(Vector3, Vector3),
    Array(Vec<Option<ObjectRef>>),
}

impl Runtime {
    fn payload(&self, obj: ObjectRef) -> Result<&Payload, RuntimeError> {
        self.get(obj)
            .map(|o| o.payload())
            .ok_or(RuntimeError::DeadReference)
    }

    /// Number of elements: 1 for numbers, bytes for strings, slots
    /// for vectors and arrays
    pub fn length(&self, obj: ObjectRef) -> Result<usize, RuntimeError> {
        Ok(match self.payload(obj)? {
            Payload::Integer(_) | Payload::Float(_) => 1,
            Payload::String(s) => s.as_bytes().len(),
            Payload::Vector3(_) => 3,
            Payload::Array(slots) => slots.len(),
        })
    }

    /// Add two objects, allocating the result
    ///
    /// Integers wrap; mixing an integer and a float gives a float.
    /// Strings and arrays concatenate, vectors add component-wise.
    pub fn add(&mut self, a: ObjectRef, b: ObjectRef) -> Result<ObjectRef, RuntimeError> {
        let sum = {
            let left = self.payload(a)?;
            let right = self.payload(b)?;
            match (left, right) {
                (Payload::Integer(x), Payload::Integer(y)) => Sum::Integer(x.wrapping_add(*y)),
                (Payload::Integer(x), Payload::Float(y)) => Sum::Float(*x as f32 + y),
                (Payload::Float(x), Payload::Integer(y)) => Sum::Float(x + *y as f32),
                (Payload::Float(x), Payload::Float(y)) => Sum::Float(x + y),
                (Payload::String(x), Payload::String(y)) => {
                    let mut joined = x.to_str().map_err(|_| RuntimeError::InvalidString)?.to_string();
                    joined.push_str(y.to_str().map_err(|_| RuntimeError::InvalidString)?);
                    Sum::String(joined)
                }
                (Payload::Vector3(x), Payload::Vector3(y)) => Sum::Vector3(*x, *y),
                (Payload::Array(x), Payload::Array(y)) => {
                    Sum::Array(x.iter().chain(y.iter()).copied().collect())
                }
                (l, r) => {
                    return Err(RuntimeError::Unsupported {
                        op: "add",
                        left: l.kind(),
                        right: r.kind(),
                    })
                }
            }
        };

        match sum {
            Sum::Integer(i) => self.new_integer(i),
            Sum::Float(f) => self.new_float(f),
            Sum::String(s) => self.new_string(&s),
            Sum::Vector3(l, r) => {
                let x = self.add(l.x, r.x)?;
                let y = self.add(l.y, r.y)?;
                let z = self.add(l.z, r.z)?;
                self.new_vector3(x, y, z)
            }
            Sum::Array(slots) => self.new_array_from(slots),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use crate::eval::memory::object::ObjectKind;

    use super::*;

    #[test]
    pub fn test_length() {
        let mut rt = Runtime::new();
        let i = rt.new_integer(3).unwrap();
        let f = rt.new_float(3.5).unwrap();
        let s = rt.new_string("hello").unwrap();
        let v = rt.new_vector3(i, f, s).unwrap();
        let a = rt.new_array(4).unwrap();

        assert_eq!(rt.length(i), Ok(1));
        assert_eq!(rt.length(f), Ok(1));
        assert_eq!(rt.length(s), Ok(5));
        assert_eq!(rt.length(v), Ok(3));
        assert_eq!(rt.length(a), Ok(4));
    }

    #[test]
    pub fn test_add_numbers() {
        let mut rt = Runtime::new();
        let one = rt.new_integer(1).unwrap();
        let max = rt.new_integer(i32::MAX).unwrap();
        let half = rt.new_float(0.5).unwrap();

        let wrapped = rt.add(max, one).unwrap();
        assert_eq!(rt.integer_value(wrapped), Ok(i32::MIN));

        let mixed = rt.add(one, half).unwrap();
        assert_eq!(rt.float_value(mixed), Ok(1.5));
        let mixed = rt.add(half, one).unwrap();
        assert_eq!(rt.float_value(mixed), Ok(1.5));
        let floats = rt.add(half, half).unwrap();
        assert_eq!(rt.float_value(floats), Ok(1.0));
    }

    #[test]
    pub fn test_add_strings() {
        let mut rt = Runtime::new();
        let a = rt.new_string("Hello, ").unwrap();
        let b = rt.new_string("World!").unwrap();
        let c = rt.add(a, b).unwrap();
        assert_eq!(rt.string_value(c), Ok("Hello, World!"));
        assert_eq!(rt.string_value(a), Ok("Hello, "));
    }

    #[test]
    pub fn test_add_vectors() {
        let mut rt = Runtime::new();
        let one = rt.new_integer(1).unwrap();
        let two = rt.new_float(2.0).unwrap();
        let hi = rt.new_string("hi").unwrap();
        let v = rt.new_vector3(one, two, hi).unwrap();

        let sum = rt.add(v, v).unwrap();
        let c = rt.vector3_components(sum).unwrap();
        assert_eq!(rt.integer_value(c.x), Ok(2));
        assert_eq!(rt.float_value(c.y), Ok(4.0));
        assert_eq!(rt.string_value(c.z), Ok("hihi"));
    }

    #[test]
    pub fn test_add_arrays() {
        let mut rt = Runtime::new();
        let one = rt.new_integer(1).unwrap();
        let a = rt.new_array(1).unwrap();
        let b = rt.new_array(2).unwrap();
        rt.array_set(a, 0, one).unwrap();
        rt.array_set(b, 1, one).unwrap();

        let c = rt.add(a, b).unwrap();
        assert_eq!(rt.array_size(c), Ok(3));
        assert_eq!(rt.array_get(c, 0), Some(one));
        assert_eq!(rt.array_get(c, 1), None);
        assert_eq!(rt.array_get(c, 2), Some(one));
    }

    #[test]
    pub fn test_add_unsupported() {
        let mut rt = Runtime::new();
        let s = rt.new_string("x").unwrap();
        let i = rt.new_integer(1).unwrap();
        let before = rt.object_count();
        assert_eq!(
            rt.add(s, i),
            Err(RuntimeError::Unsupported {
                op: "add",
                left: ObjectKind::String,
                right: ObjectKind::Integer
            })
        );
        assert_eq!(rt.object_count(), before);
    }
}
