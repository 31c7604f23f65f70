//! Collector support
//!
//! Collection is a stop-the-world mark / trace / sweep over the
//! master object list:
//!
//! - mark sets the mark bit of every object a live frame references
//!   directly,
//! - trace blackens marked objects using a gray worklist, marking
//!   each child before it is queued so that every object is visited
//!   at most once (cycles included),
//! - sweep frees every unmarked object and clears the mark bit of
//!   every survivor.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::eval::machine::metrics::{Clock, ThreadOccupation};

use super::{
    array::{AllocError, Stack},
    frame::FrameStack,
    heap::Heap,
    object::ObjectRef,
};

/// Outcome of a single collection
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionReport {
    /// Frame references visited during mark
    pub roots: usize,
    /// Objects blackened during trace
    pub traced: usize,
    /// Objects freed during sweep
    pub freed: usize,
    /// Objects remaining in the master list
    pub survivors: usize,
    /// Wall clock duration of the whole collection
    pub elapsed: Duration,
}

/// View of the heap available to the collector
pub struct CollectorHeapView<'guard> {
    heap: &'guard mut Heap,
}

impl<'guard> CollectorHeapView<'guard> {
    pub fn new(heap: &'guard mut Heap) -> Self {
        CollectorHeapView { heap }
    }

    /// Mark object if live and not already marked and return whether marked
    pub fn mark(&mut self, obj: ObjectRef) -> bool {
        match self.heap.get_mut(obj) {
            Some(o) if !o.is_marked() => {
                o.mark();
                true
            }
            _ => false,
        }
    }

    pub fn is_marked(&self, obj: ObjectRef) -> bool {
        self.heap.get(obj).map_or(false, |o| o.is_marked())
    }

    /// Clear every mark bit, abandoning a partial collection
    pub fn reset(&mut self) {
        for i in 0..self.heap.objects().len() {
            if let Some(r) = self.heap.objects().at(i) {
                if let Some(o) = self.heap.get_mut(r) {
                    o.unmark();
                }
            }
        }
    }

    /// Mark every object referenced directly by a live frame
    ///
    /// Returns the number of frame references visited.
    pub fn mark_roots(&mut self, frames: &FrameStack) -> usize {
        let mut roots = 0;
        for frame in frames.iter() {
            for obj in frame.references() {
                if let Some(o) = self.heap.get_mut(obj) {
                    o.mark();
                }
                roots += 1;
            }
        }
        roots
    }

    /// Compute the transitive closure of the marked set
    ///
    /// Returns the number of objects blackened.
    pub fn trace(&mut self, gray_capacity: usize) -> Result<usize, AllocError> {
        let mut gray: Stack<ObjectRef> = Stack::with_capacity(gray_capacity);

        for r in self.heap.objects().iter() {
            if self.is_marked(*r) {
                gray.push(*r)?;
            }
        }

        let mut children = Vec::new();
        let mut blackened = 0;
        while let Some(obj) = gray.pop() {
            self.blacken(obj, &mut gray, &mut children)?;
            blackened += 1;
        }

        Ok(blackened)
    }

    /// Mark and queue the unmarked children of a gray object
    fn blacken(
        &mut self,
        obj: ObjectRef,
        gray: &mut Stack<ObjectRef>,
        children: &mut Vec<ObjectRef>,
    ) -> Result<(), AllocError> {
        children.clear();
        if let Some(o) = self.heap.get(obj) {
            children.extend(o.children());
        }

        for child in children.drain(..) {
            if self.mark(child) {
                gray.push(child)?;
            }
        }
        Ok(())
    }

    /// Free unmarked objects, unmark survivors, compact the master list
    ///
    /// Returns (freed, survivors).
    pub fn sweep(&mut self) -> (usize, usize) {
        let mut freed = 0;
        let mut survivors = 0;

        for i in 0..self.heap.objects().len() {
            let Some(r) = self.heap.objects().at(i) else {
                continue;
            };

            if self.is_marked(r) {
                if let Some(o) = self.heap.get_mut(r) {
                    o.unmark();
                }
                survivors += 1;
            } else {
                if let Some(o) = self.heap.free(r) {
                    tracing::trace!(object = %r, kind = %o.kind(), "freed");
                }
                self.heap.objects_mut().take(i);
                freed += 1;
            }
        }

        self.heap.objects_mut().remove_nulls();
        (freed, survivors)
    }
}

/// Tuning and diagnostics for a collection
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Initial capacity of the gray worklist
    pub gray_capacity: usize,
    /// Log the heap after mark / trace and after sweep
    pub dump_heap: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        CollectOptions {
            gray_capacity: 8,
            dump_heap: false,
        }
    }
}

/// Run a full mark / trace / sweep cycle
///
/// Marks left over from an earlier standalone phase are cleared
/// before roots are marked. If the gray worklist cannot grow, every mark bit is cleared and
/// the error is returned before anything is swept.
pub fn collect(
    frames: &FrameStack,
    heap: &mut Heap,
    clock: &mut Clock,
    options: CollectOptions,
) -> Result<CollectionReport, AllocError> {
    let start = Instant::now();
    let mut heap_view = CollectorHeapView::new(heap);

    clock.switch(ThreadOccupation::CollectorMark);
    heap_view.reset();
    let roots = heap_view.mark_roots(frames);

    clock.switch(ThreadOccupation::CollectorTrace);
    let traced = match heap_view.trace(options.gray_capacity) {
        Ok(traced) => traced,
        Err(e) => {
            heap_view.reset();
            clock.switch(ThreadOccupation::Mutator);
            return Err(e);
        }
    };

    if options.dump_heap {
        debug!("heap after trace:\n\n{:?}", &heap_view.heap);
    }

    clock.switch(ThreadOccupation::CollectorSweep);
    let (freed, survivors) = heap_view.sweep();

    if options.dump_heap {
        debug!("heap after sweep:\n\n{:?}", &heap_view.heap);
    }

    clock.switch(ThreadOccupation::Mutator);

    let report = CollectionReport {
        roots,
        traced,
        freed,
        survivors,
        elapsed: start.elapsed(),
    };
    debug!(
        roots = report.roots,
        traced = report.traced,
        freed = report.freed,
        survivors = report.survivors,
        "collection complete"
    );
    Ok(report)
}
