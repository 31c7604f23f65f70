//! Runtime metrics

use std::{
    cmp::max,
    fmt,
    time::{Duration, Instant},
};

use crate::eval::memory::collect::CollectionReport;

/// Record some metrics as the runtime is driven
#[derive(Default, Debug, Clone)]
pub struct Metrics {
    allocs: u64,
    collections: u64,
    freed: u64,
    max_frames: usize,
    max_objects: usize,
}

impl Metrics {
    pub fn alloc(&mut self, count: usize) {
        self.allocs += count as u64;
    }

    pub fn allocs(&self) -> u64 {
        self.allocs
    }

    pub fn frames(&mut self, depth: usize) {
        self.max_frames = max(self.max_frames, depth);
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub fn objects(&mut self, count: usize) {
        self.max_objects = max(self.max_objects, count);
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    pub fn collection(&mut self, report: &CollectionReport) {
        self.collections += 1;
        self.freed += report.freed as u64;
    }

    pub fn collections(&self) -> u64 {
        self.collections
    }

    pub fn freed(&self) -> u64 {
        self.freed
    }
}

/// What the runtime is currently spending its time on
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThreadOccupation {
    Mutator,
    CollectorMark,
    CollectorTrace,
    CollectorSweep,
}

impl ThreadOccupation {
    const ALL: [ThreadOccupation; 4] = [
        ThreadOccupation::Mutator,
        ThreadOccupation::CollectorMark,
        ThreadOccupation::CollectorTrace,
        ThreadOccupation::CollectorSweep,
    ];

    fn slot(self) -> usize {
        match self {
            ThreadOccupation::Mutator => 0,
            ThreadOccupation::CollectorMark => 1,
            ThreadOccupation::CollectorTrace => 2,
            ThreadOccupation::CollectorSweep => 3,
        }
    }
}

impl fmt::Display for ThreadOccupation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThreadOccupation::Mutator => "mutator",
            ThreadOccupation::CollectorMark => "gc-mark",
            ThreadOccupation::CollectorTrace => "gc-trace",
            ThreadOccupation::CollectorSweep => "gc-sweep",
        };
        f.write_str(name)
    }
}

/// Accumulates wall clock time per occupation
#[derive(Default, Debug, Clone)]
pub struct Clock {
    current: Option<(ThreadOccupation, Instant)>,
    totals: [Duration; 4],
}

impl Clock {
    /// Stop timing the current occupation and start timing another
    pub fn switch(&mut self, occupation: ThreadOccupation) {
        self.stop();
        self.current = Some((occupation, Instant::now()));
    }

    /// Stop timing altogether
    pub fn stop(&mut self) {
        if let Some((occupation, since)) = self.current.take() {
            self.totals[occupation.slot()] += since.elapsed();
        }
    }

    /// What is currently being timed
    pub fn occupation(&self) -> Option<ThreadOccupation> {
        self.current.map(|(o, _)| o)
    }

    /// Accumulated time for an occupation (excluding any running interval)
    pub fn total(&self, occupation: ThreadOccupation) -> Duration {
        self.totals[occupation.slot()]
    }

    /// Accumulated time per occupation
    pub fn report(&self) -> impl Iterator<Item = (ThreadOccupation, Duration)> + '_ {
        ThreadOccupation::ALL
            .into_iter()
            .map(move |o| (o, self.total(o)))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    pub fn test_clock_switching_accumulates() {
        let mut clock = Clock::default();
        assert_eq!(clock.occupation(), None);
        clock.switch(ThreadOccupation::Mutator);
        assert_eq!(clock.occupation(), Some(ThreadOccupation::Mutator));
        clock.switch(ThreadOccupation::CollectorMark);
        clock.stop();
        assert_eq!(clock.occupation(), None);
        assert_eq!(clock.report().count(), 4);
        assert_eq!(clock.total(ThreadOccupation::CollectorSweep), Duration::ZERO);
    }

    #[test]
    pub fn test_metrics_high_water_marks() {
        let mut metrics = Metrics::default();
        metrics.frames(3);
        metrics.frames(1);
        metrics.objects(10);
        metrics.objects(4);
        metrics.alloc(2);
        metrics.alloc(5);
        assert_eq!(metrics.max_frames(), 3);
        assert_eq!(metrics.max_objects(), 10);
        assert_eq!(metrics.allocs(), 7);
    }
}
