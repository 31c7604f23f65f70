//! Command line driver for exercising the runtime
pub mod error;
pub mod logging;
pub mod options;
pub mod statistics;
pub mod workload;
