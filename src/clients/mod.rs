pub mod beacon;
pub mod common;
pub mod execution;
pub mod macros;
pub mod rate_limiter;
