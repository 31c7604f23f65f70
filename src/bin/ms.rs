extern crate marksweep;

use std::process;

use structopt::StructOpt;

use marksweep::driver::logging::init_logging;
use marksweep::driver::options::MarkSweepOptions;
use marksweep::driver::{statistics::Statistics, workload};

pub fn main() {
    let opt = MarkSweepOptions::from_args();
    init_logging(opt.log_directive());

    let mut statistics = Statistics::default();
    match workload::run(&opt, &mut statistics) {
        Ok(()) => exit(&opt, 0, &statistics),
        Err(e) => {
            eprintln!("{e}");
            exit(&opt, 1, &statistics)
        }
    }
}

/// Optionally dump stats to stderr then exit
pub fn exit(opts: &MarkSweepOptions, code: i32, stats: &Statistics) {
    if opts.statistics() {
        eprintln!();
        eprintln!("~~~~~~~~~~");
        eprintln!("STATISTICS");
        eprintln!("~~~~~~~~~~");
        eprintln!();
        eprintln!("{stats}");
    }
    process::exit(code)
}
