//! Canned workloads
//!
//! Each workload drives a runtime through allocation, rooting and
//! collection and checks the object count it expects to survive.

use tracing::{debug, info};

use crate::eval::{
    error::RuntimeError,
    machine::runtime::Runtime,
    memory::object::ObjectRef,
};

use super::{
    error::DriverError,
    options::{MarkSweepOptions, Scenario},
    statistics::Statistics,
};

/// Sizes for a workload
#[derive(Debug, Clone, Copy)]
pub struct Workload {
    pub scenario: Scenario,
    pub objects: usize,
    pub frames: usize,
}

impl From<&MarkSweepOptions> for Workload {
    fn from(opt: &MarkSweepOptions) -> Self {
        Workload {
            scenario: opt.scenario(),
            objects: opt.objects,
            frames: opt.frames,
        }
    }
}

fn expect_live(runtime: &Runtime, expected: usize) -> Result<(), DriverError> {
    let actual = runtime.object_count();
    if actual == expected {
        Ok(())
    } else {
        Err(DriverError::Unexpected { expected, actual })
    }
}

/// Run the selected workload and shut the runtime down
///
/// `stats` receives whatever was gathered before any failure.
pub fn run(opt: &MarkSweepOptions, stats: &mut Statistics) -> Result<(), DriverError> {
    let runtime = Runtime::with_settings(opt.gc_settings());
    Workload::from(opt).run_to_shutdown(runtime, stats)
}

impl Workload {
    fn run_to_shutdown(
        &self,
        mut runtime: Runtime,
        stats: &mut Statistics,
    ) -> Result<(), DriverError> {
        info!(scenario = %self.scenario, objects = self.objects, frames = self.frames, "starting");
        let outcome = self.drive(&mut runtime);
        stats.capture(&runtime);
        outcome?;

        let report = runtime.shutdown()?;
        stats.timings_mut().record("shutdown", report.collection.elapsed);

        if report.collection.survivors != 0 {
            return Err(DriverError::Leak {
                remaining: report.collection.survivors,
            });
        }

        info!(
            freed = stats.freed() + report.collection.freed as u64,
            "finished"
        );
        Ok(())
    }

    pub fn drive(&self, runtime: &mut Runtime) -> Result<(), DriverError> {
        match self.scenario {
            Scenario::Frames => self.frames(runtime),
            Scenario::Nested => self.nested(runtime),
            Scenario::Cycles => self.cycles(runtime),
            Scenario::Churn => self.churn(runtime),
        }
    }

    /// Each frame roots its own objects; unwinding one frame at a
    /// time frees exactly that frame's share
    fn frames(&self, runtime: &mut Runtime) -> Result<(), DriverError> {
        let per_frame = self.objects.max(1);
        for depth in 0..self.frames {
            let frame = runtime.push_frame()?;
            for n in 0..per_frame {
                let obj = if n % 2 == 0 {
                    runtime.new_integer(n as i32)?
                } else {
                    runtime.new_string(&format!("frame {} object {}", depth, n))?
                };
                runtime.reference(frame, obj)?;
            }
        }

        for remaining in (0..self.frames).rev() {
            runtime.pop_frame();
            let report = runtime.collect()?;
            debug!(depth = remaining, freed = report.freed, "unwound");
            expect_live(runtime, remaining * per_frame)?;
        }
        Ok(())
    }

    /// A single root holding arrays of vectors; everything below the
    /// root is reached only by tracing
    fn nested(&self, runtime: &mut Runtime) -> Result<(), DriverError> {
        let frame = runtime.push_frame()?;
        let rows = self.frames.max(1);
        let root = runtime.new_array(rows)?;
        runtime.reference(frame, root)?;

        let columns = (self.objects / 4).max(1);
        for row in 0..rows {
            let array = runtime.new_array(columns)?;
            runtime.array_set(root, row, array)?;
            for column in 0..columns {
                let v = self.vector(runtime, (row * columns + column) as i32)?;
                runtime.array_set(array, column, v)?;
            }
        }

        let live = 1 + rows * (1 + columns * 4);
        runtime.collect()?;
        expect_live(runtime, live)?;

        runtime.pop_frame();
        runtime.collect()?;
        expect_live(runtime, 0)
    }

    fn vector(&self, runtime: &mut Runtime, seed: i32) -> Result<ObjectRef, RuntimeError> {
        let x = runtime.new_integer(seed)?;
        let y = runtime.new_float(seed as f32 / 2.0)?;
        let z = runtime.new_integer(-seed)?;
        runtime.new_vector3(x, y, z)
    }

    /// Rings of arrays; even rings are rooted, odd rings are garbage
    fn cycles(&self, runtime: &mut Runtime) -> Result<(), DriverError> {
        let frame = runtime.push_frame()?;
        let ring = (self.objects / self.frames.max(1)).max(1);
        let mut rooted = 0;

        for n in 0..self.frames {
            let members = (0..ring)
                .map(|_| runtime.new_array(1))
                .collect::<Result<Vec<_>, _>>()?;
            for (i, member) in members.iter().enumerate() {
                runtime.array_set(*member, 0, members[(i + 1) % ring])?;
            }
            if n % 2 == 0 {
                runtime.reference(frame, members[0])?;
                rooted += ring;
            }
        }

        let report = runtime.collect()?;
        debug!(freed = report.freed, "isolated rings reclaimed");
        expect_live(runtime, rooted)?;

        runtime.pop_frame();
        runtime.collect()?;
        expect_live(runtime, 0)
    }

    /// Accumulate a running sum through many short-lived
    /// intermediates, collecting after each round
    fn churn(&self, runtime: &mut Runtime) -> Result<(), DriverError> {
        let mut total: Option<ObjectRef> = None;
        for round in 0..self.frames {
            let frame = runtime.push_frame()?;
            if let Some(t) = total {
                runtime.reference(frame, t)?;
            }

            let mut acc = match total {
                Some(t) => t,
                None => runtime.new_integer(0)?,
            };
            for n in 0..self.objects {
                let step = runtime.new_integer(n as i32)?;
                acc = runtime.add(acc, step)?;
            }
            let label = runtime.new_string(&format!("round {}", round))?;
            let words = runtime.new_string(" done")?;
            runtime.add(label, words)?;

            runtime.pop_frame();
            let keep = runtime.push_frame()?;
            runtime.reference(keep, acc)?;
            let report = runtime.collect()?;
            debug!(round, freed = report.freed, "churned");
            expect_live(runtime, 1)?;
            runtime.pop_frame();

            total = Some(acc);
        }
        Ok(())
    }
}
