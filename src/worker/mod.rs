// Coordinator core — strategy dispatch, install/activate lifecycle, counters.

pub mod coordinator;
pub mod lifecycle;
pub mod stats;
