//! The runtime: frames, heap and collector entry point

use structopt::StructOpt;

use super::memory::collect::CollectOptions;

pub mod metrics;
pub mod runtime;

/// Settings for the runtime and its collector
#[derive(StructOpt, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcSettings {
    /// Initial capacity of frame, object and worklist stacks
    #[structopt(long = "initial-capacity", default_value = "8")]
    pub initial_capacity: usize,
    /// Log the heap contents during each collection
    #[structopt(long = "dump-heap")]
    pub dump_heap: bool,
}

impl Default for GcSettings {
    fn default() -> Self {
        GcSettings {
            initial_capacity: 8,
            dump_heap: false,
        }
    }
}

impl GcSettings {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity.max(1);
        self
    }

    pub fn with_dump_heap(mut self, dump_heap: bool) -> Self {
        self.dump_heap = dump_heap;
        self
    }

    pub(crate) fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            gray_capacity: self.initial_capacity.max(1),
            dump_heap: self.dump_heap,
        }
    }
}
