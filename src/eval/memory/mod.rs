//! Allocation and memory management for the runtime
pub mod array;
pub mod collect;
pub mod frame;
pub mod header;
pub mod heap;
pub mod mutator;
pub mod object;
