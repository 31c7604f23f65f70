//! The runtime: allocation authority and collection entry point
//!
//! GC roots (outside heap, pointing in) are the references held by
//! frames on the frame stack. Nothing else keeps an object alive.

use std::time::Duration;

use tracing::debug;

use crate::eval::{
    error::RuntimeError,
    memory::{
        collect::{self, CollectionReport, CollectorHeapView},
        frame::{FrameId, FrameStack},
        heap::{Heap, HeapStats},
        mutator::{HeapReader, MutatorHeapView},
        object::{Object, ObjectKind, ObjectRef, Vector3},
    },
};

use super::{
    metrics::{Clock, Metrics, ThreadOccupation},
    GcSettings,
};

/// Outcome of shutting down a runtime
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Frames still on the stack at shutdown
    pub frames_popped: usize,
    /// The final collection run with an empty frame stack
    pub collection: CollectionReport,
}

/// A frame stack and a heap of tagged objects
///
/// Single threaded and stop-the-world: every operation, including
/// collection, takes the runtime by reference so a host sharing a
/// runtime between threads must hold it behind one lock.
pub struct Runtime {
    /// Arena of objects plus master object list
    heap: Heap,
    /// Live frames, outermost first
    frames: FrameStack,
    /// Capacities and diagnostics
    settings: GcSettings,
    /// Metrics
    metrics: Metrics,
    /// Clock
    clock: Clock,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// An empty runtime with default settings
    pub fn new() -> Self {
        Self::with_settings(GcSettings::default())
    }

    pub fn with_settings(settings: GcSettings) -> Self {
        let capacity = settings.initial_capacity.max(1);
        let mut clock = Clock::default();
        clock.switch(ThreadOccupation::Mutator);
        Runtime {
            heap: Heap::new(capacity),
            frames: FrameStack::new(capacity),
            settings,
            metrics: Metrics::default(),
            clock,
        }
    }

    pub fn settings(&self) -> &GcSettings {
        &self.settings
    }

    /// Access the metrics (allocs, collections, etc.)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Return clock for access to GC timings
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Get heap statistics
    pub fn stats(&self) -> HeapStats {
        self.heap.stats()
    }

    /// Number of objects in the master list
    pub fn object_count(&self) -> usize {
        self.heap.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// True if the handle refers to an object that has not been swept
    pub fn is_live(&self, obj: ObjectRef) -> bool {
        self.heap.is_live(obj)
    }

    pub fn is_marked(&self, obj: ObjectRef) -> bool {
        self.heap.get(obj).map_or(false, Object::is_marked)
    }

    pub fn kind(&self, obj: ObjectRef) -> Option<ObjectKind> {
        self.heap.get(obj).map(Object::kind)
    }

    pub fn get(&self, obj: ObjectRef) -> Option<&Object> {
        self.heap.get(obj)
    }

    /// The objects in the master list, in allocation order
    pub fn objects(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.heap.objects().iter().copied()
    }

    fn view(&mut self) -> MutatorHeapView<'_> {
        MutatorHeapView::new(&mut self.heap)
    }

    fn reader(&self) -> HeapReader<'_> {
        HeapReader::new(&self.heap)
    }

    /// Record an allocation made through the mutator view
    fn allocated(&mut self, result: Result<ObjectRef, RuntimeError>) -> Result<ObjectRef, RuntimeError> {
        let obj = result?;
        self.metrics.alloc(1);
        self.metrics.objects(self.heap.len());
        Ok(obj)
    }

    // ---- frames ----

    /// Push an empty frame and return its handle
    pub fn push_frame(&mut self) -> Result<FrameId, RuntimeError> {
        let id = self.frames.push()?;
        self.metrics.frames(self.frames.len());
        Ok(id)
    }

    /// Pop the innermost frame, releasing its roots but not the
    /// objects they refer to
    ///
    /// Returns false if there was no frame to pop.
    pub fn pop_frame(&mut self) -> bool {
        self.frames.pop().is_some()
    }

    /// Handle to the innermost frame
    pub fn top_frame(&self) -> Option<FrameId> {
        self.frames.top()
    }

    /// Root `obj` in `frame`
    ///
    /// A frame that has been popped or an object that is not live
    /// makes this a no-op, reported as `Ok(false)`.
    pub fn reference(&mut self, frame: FrameId, obj: ObjectRef) -> Result<bool, RuntimeError> {
        if !self.heap.is_live(obj) {
            return Ok(false);
        }
        match self.frames.get_mut(frame) {
            Some(f) => {
                f.reference(obj)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The roots recorded in a frame, if it is still on the stack
    pub fn frame_roots(&self, frame: FrameId) -> Option<Vec<ObjectRef>> {
        self.frames.get(frame).map(|f| f.references().collect())
    }

    // ---- construction ----

    pub fn new_integer(&mut self, value: i32) -> Result<ObjectRef, RuntimeError> {
        let result = self.view().integer(value);
        self.allocated(result)
    }

    pub fn new_float(&mut self, value: f32) -> Result<ObjectRef, RuntimeError> {
        let result = self.view().float(value);
        self.allocated(result)
    }

    /// Allocate a string holding a copy of `value`
    pub fn new_string(&mut self, value: &str) -> Result<ObjectRef, RuntimeError> {
        let result = self.view().string(value);
        self.allocated(result)
    }

    /// Allocate a vector of three live objects
    pub fn new_vector3(
        &mut self,
        x: ObjectRef,
        y: ObjectRef,
        z: ObjectRef,
    ) -> Result<ObjectRef, RuntimeError> {
        let result = self.view().vector3(x, y, z);
        self.allocated(result)
    }

    /// Allocate an array of `size` unset slots
    pub fn new_array(&mut self, size: usize) -> Result<ObjectRef, RuntimeError> {
        let result = self.view().array(size);
        self.allocated(result)
    }

    pub(crate) fn new_array_from(
        &mut self,
        slots: Vec<Option<ObjectRef>>,
    ) -> Result<ObjectRef, RuntimeError> {
        let result = self.view().array_from(slots);
        self.allocated(result)
    }

    // ---- access ----

    /// Read an array slot; `None` for unset slots and invalid access
    pub fn array_get(&self, array: ObjectRef, index: usize) -> Option<ObjectRef> {
        self.reader().array_get(array, index)
    }

    /// Store a reference in an array slot
    pub fn array_set(
        &mut self,
        array: ObjectRef,
        index: usize,
        value: ObjectRef,
    ) -> Result<(), RuntimeError> {
        self.view().array_set(array, index, value)
    }

    pub fn array_size(&self, array: ObjectRef) -> Result<usize, RuntimeError> {
        self.reader().array_size(array)
    }

    pub fn integer_value(&self, obj: ObjectRef) -> Result<i32, RuntimeError> {
        self.reader().integer_value(obj)
    }

    pub fn float_value(&self, obj: ObjectRef) -> Result<f32, RuntimeError> {
        self.reader().float_value(obj)
    }

    pub fn string_value(&self, obj: ObjectRef) -> Result<&str, RuntimeError> {
        self.reader().string_value(obj)
    }

    pub fn vector3_components(&self, obj: ObjectRef) -> Result<Vector3, RuntimeError> {
        self.reader().vector3_components(obj)
    }

    // ---- collection ----

    /// Mark the direct roots of every live frame
    ///
    /// Marks set here only matter to a following `trace` / `sweep`;
    /// `collect` starts from a clean slate.
    pub fn mark(&mut self) -> usize {
        CollectorHeapView::new(&mut self.heap).mark_roots(&self.frames)
    }

    /// Extend marks to everything reachable from a marked object
    ///
    /// On failure every mark is cleared.
    pub fn trace(&mut self) -> Result<usize, RuntimeError> {
        let capacity = self.settings.collect_options().gray_capacity;
        let mut view = CollectorHeapView::new(&mut self.heap);
        view.trace(capacity).map_err(|e| {
            view.reset();
            RuntimeError::from(e)
        })
    }

    /// Free every unmarked object and unmark the rest
    ///
    /// Returns (freed, survivors).
    pub fn sweep(&mut self) -> (usize, usize) {
        CollectorHeapView::new(&mut self.heap).sweep()
    }

    /// Run a full mark / trace / sweep cycle
    pub fn collect(&mut self) -> Result<CollectionReport, RuntimeError> {
        let report = collect::collect(
            &self.frames,
            &mut self.heap,
            &mut self.clock,
            self.settings.collect_options(),
        )?;
        self.metrics.collection(&report);
        Ok(report)
    }

    /// Pop every frame and collect, reclaiming every remaining object
    pub fn shutdown(mut self) -> Result<ShutdownReport, RuntimeError> {
        let mut frames_popped = 0;
        while self.pop_frame() {
            frames_popped += 1;
        }

        let collection = self.collect()?;
        self.clock.stop();

        debug!(
            frames = frames_popped,
            freed = collection.freed,
            "runtime shut down"
        );

        Ok(ShutdownReport {
            frames_popped,
            collection,
        })
    }

    /// Total time spent in each collector phase so far
    pub fn gc_time(&self) -> Duration {
        [
            ThreadOccupation::CollectorMark,
            ThreadOccupation::CollectorTrace,
            ThreadOccupation::CollectorSweep,
        ]
        .into_iter()
        .map(|o| self.clock.total(o))
        .sum()
    }
}
