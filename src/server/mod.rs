// Boundary server — intercepts portal requests and serves them through the coordinator.

pub mod handler;
