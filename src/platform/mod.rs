// Hosting-environment primitives — pluggable cache storage and network backends.

pub mod http_network;
pub mod memory_store;
pub mod traits;
