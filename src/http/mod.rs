//! HTTP request execution and the bounded worker pool.
mod client;
mod execution;
mod request;
mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::build_client;
pub use execution::{execute, parse_target};
pub use request::RequestParams;
pub use worker::{WorkerPool, WorkerStats};
