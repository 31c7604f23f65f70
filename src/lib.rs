extern crate bitmaps;
extern crate indexmap;
extern crate structopt;
extern crate thiserror;
extern crate tracing;

pub mod driver;
pub mod eval;
