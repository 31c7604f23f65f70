//! Capture and report statistics for tuning

use std::{fmt::Display, time::Duration};

use indexmap::IndexMap;

use crate::eval::machine::{metrics::Metrics, runtime::Runtime};

#[derive(Default, Debug)]
pub struct Timings {
    timings: IndexMap<String, Duration>,
}

impl Timings {
    pub fn record<T: AsRef<str>>(&mut self, name: T, elapsed: Duration) {
        self.timings.insert(name.as_ref().to_string(), elapsed);
    }

    pub fn get<T: AsRef<str>>(&self, name: T) -> Option<Duration> {
        self.timings.get(name.as_ref()).copied()
    }
}

impl Display for Timings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.timings.keys().map(|k| k.len()).max().unwrap_or(0) + 1;

        for (k, v) in &self.timings {
            writeln!(f, "{:width$}: {:14.9}s", k, v.as_secs_f64(), width = width)?;
        }
        Ok(())
    }
}

/// The statistics captured during a run
#[derive(Default, Debug)]
pub struct Statistics {
    allocs: u64,
    collections: u64,
    freed: u64,
    max_frames: usize,
    max_objects: usize,
    timings: Timings,
}

impl Statistics {
    /// Capture counters and per-phase clock totals from a runtime
    pub fn capture(&mut self, runtime: &Runtime) {
        self.set_metrics(runtime.metrics());
        for (occupation, elapsed) in runtime.clock().report() {
            self.timings.record(occupation.to_string(), elapsed);
        }
    }

    pub fn set_metrics(&mut self, metrics: &Metrics) {
        self.allocs = metrics.allocs();
        self.collections = metrics.collections();
        self.freed = metrics.freed();
        self.max_frames = metrics.max_frames();
        self.max_objects = metrics.max_objects();
    }

    pub fn allocs(&self) -> u64 {
        self.allocs
    }

    pub fn freed(&self) -> u64 {
        self.freed
    }

    pub fn collections(&self) -> u64 {
        self.collections
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn timings_mut(&mut self) -> &mut Timings {
        &mut self.timings
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Allocations    : {:10}", self.allocs)?;
        writeln!(f, "Collections    : {:10}", self.collections)?;
        writeln!(f, "Objects Freed  : {:10}", self.freed)?;
        writeln!(f, "Max Frames     : {:10}", self.max_frames)?;
        writeln!(f, "Max Objects    : {:10}", self.max_objects)?;
        writeln!(f)?;
        writeln!(f, "{}", self.timings)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    pub fn test_empty_timings_render() {
        assert_eq!(Timings::default().to_string(), "");
    }

    #[test]
    pub fn test_capture_from_runtime() {
        let mut rt = Runtime::new();
        let f = rt.push_frame().unwrap();
        let i = rt.new_integer(1).unwrap();
        rt.new_integer(2).unwrap();
        rt.reference(f, i).unwrap();
        rt.collect().unwrap();

        let mut stats = Statistics::default();
        stats.capture(&rt);
        assert_eq!(stats.allocs(), 2);
        assert_eq!(stats.freed(), 1);
        assert_eq!(stats.collections(), 1);
        assert!(stats.timings().get("gc-sweep").is_some());

        let text = stats.to_string();
        assert!(text.contains("Allocations"));
        assert!(text.contains("mutator"));
    }
}
