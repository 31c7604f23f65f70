//! Activation frames
//!
//! A frame records the objects directly reachable from one scope.
//! Frames live only on the runtime's frame stack and are never
//! collectable objects themselves.

use super::{
    array::{AllocError, Stack},
    object::ObjectRef,
};

/// Handle to a frame on the frame stack
///
/// Combines the frame's depth with a serial number so that a handle
/// to a popped frame does not resolve to a later frame pushed at the
/// same depth.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameId {
    depth: usize,
    serial: u64,
}

impl FrameId {
    /// Position in the frame stack (0 is outermost)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// An activation record holding roots
#[derive(Debug)]
pub struct Frame {
    serial: u64,
    references: Stack<ObjectRef>,
}

impl Frame {
    pub fn new(serial: u64, capacity: usize) -> Self {
        Frame {
            serial,
            references: Stack::with_capacity(capacity),
        }
    }

    /// Record an object as directly live in this frame
    pub fn reference(&mut self, object: ObjectRef) -> Result<(), AllocError> {
        self.references.push(object)
    }

    /// The frame's roots, in the order they were added
    pub fn references(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.references.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// LIFO stack of frames
#[derive(Debug)]
pub struct FrameStack {
    frames: Stack<Frame>,
    next_serial: u64,
    reference_capacity: usize,
}

impl FrameStack {
    pub fn new(capacity: usize) -> Self {
        FrameStack {
            frames: Stack::with_capacity(capacity),
            next_serial: 0,
            reference_capacity: capacity,
        }
    }

    /// Push a new empty frame and return its handle
    pub fn push(&mut self) -> Result<FrameId, AllocError> {
        let serial = self.next_serial;
        let depth = self.frames.len();
        self.frames
            .push(Frame::new(serial, self.reference_capacity))?;
        self.next_serial += 1;
        Ok(FrameId { depth, serial })
    }

    /// Remove the innermost frame, releasing its reference list
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Resolve a handle if the frame is still on the stack
    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames
            .get(id.depth)
            .filter(|frame| frame.serial == id.serial)
    }

    pub fn get_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.frames
            .get_mut(id.depth)
            .filter(|frame| frame.serial == id.serial)
    }

    /// Handle for the innermost frame
    pub fn top(&self) -> Option<FrameId> {
        self.frames.top().map(|frame| FrameId {
            depth: self.frames.len() - 1,
            serial: frame.serial,
        })
    }

    /// All frames, outermost first
    pub fn iter(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    pub fn test_push_pop() {
        let mut stack = FrameStack::new(8);
        let f1 = stack.push().unwrap();
        let f2 = stack.push().unwrap();
        assert_eq!(f1.depth(), 0);
        assert_eq!(f2.depth(), 1);
        assert_eq!(stack.top(), Some(f2));
        assert!(stack.pop().is_some());
        assert_eq!(stack.top(), Some(f1));
        assert!(stack.pop().is_some());
        assert!(stack.pop().is_none());
    }

    #[test]
    pub fn test_popped_handle_does_not_resolve_to_replacement() {
        let mut stack = FrameStack::new(8);
        let f1 = stack.push().unwrap();
        stack.pop();
        let f2 = stack.push().unwrap();
        assert_eq!(f1.depth(), f2.depth());
        assert!(stack.get(f1).is_none());
        assert!(stack.get(f2).is_some());
    }

    #[test]
    pub fn test_references_keep_order() {
        let mut frame = Frame::new(0, 1);
        let a = ObjectRef::new(0, 0);
        let b = ObjectRef::new(1, 0);
        frame.reference(a).unwrap();
        frame.reference(b).unwrap();
        assert_eq!(frame.references().collect::<Vec<_>>(), vec![a, b]);
    }
}
