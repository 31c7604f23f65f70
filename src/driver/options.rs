//! Command line argument handling

use std::{fmt, str::FromStr};

use structopt::StructOpt;

use crate::{driver::error::DriverError, eval::machine::GcSettings};

/// Canned workloads for exercising the runtime
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    /// Roots spread across a deep frame stack, popped one at a time
    Frames,
    /// Arrays of vectors of numbers rooted through a single array
    Nested,
    /// Self and mutually referential arrays, half of them unrooted
    Cycles,
    /// Repeated arithmetic producing short-lived intermediates
    Churn,
}

impl Scenario {
    pub const NAMES: [&'static str; 4] = ["frames", "nested", "cycles", "churn"];
}

impl FromStr for Scenario {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frames" => Ok(Scenario::Frames),
            "nested" => Ok(Scenario::Nested),
            "cycles" => Ok(Scenario::Cycles),
            "churn" => Ok(Scenario::Churn),
            _ => Err(DriverError::UnknownScenario(s.to_string())),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frames => write!(f, "frames"),
            Self::Nested => write!(f, "nested"),
            Self::Cycles => write!(f, "cycles"),
            Self::Churn => write!(f, "churn"),
        }
    }
}

/// ms - drive a mark / trace / sweep runtime with canned workloads
#[derive(StructOpt, Debug, Clone)]
#[structopt(name = "ms")]
pub struct MarkSweepOptions {
    /// Turn on debug logging (heap dumps need --dump-heap as well)
    #[structopt(short = "d", long = "debug")]
    pub debug: bool,

    /// Print metrics to stderr before exiting
    #[structopt(short = "S", long = "statistics")]
    pub statistics: bool,

    /// Objects allocated per unit of work
    #[structopt(long = "objects", default_value = "1000")]
    pub objects: usize,

    /// Frames (or rounds) in the workload
    #[structopt(long = "frames", default_value = "16")]
    pub frames: usize,

    #[structopt(flatten)]
    pub gc: GcSettings,

    /// Workload to run
    #[structopt(possible_values = &Scenario::NAMES)]
    pub scenario: Scenario,
}

impl MarkSweepOptions {
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn statistics(&self) -> bool {
        self.statistics
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn gc_settings(&self) -> GcSettings {
        self.gc
    }

    /// Log filter implied by the flags, if any
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.debug {
            Some("marksweep=debug")
        } else {
            None
        }
    }
}
