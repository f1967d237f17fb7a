//! Core library for the `volley` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration parsing, the run-wide cancellation context, the HTTP
//! request executor with its bounded worker pool, and the statistics
//! aggregator. The primary user-facing interface is the `volley`
//! command-line application; library APIs may evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod shutdown;
