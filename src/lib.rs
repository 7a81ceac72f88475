//! Core library for the `rinha-load` CLI.
//!
//! A small async load generator: virtual users repeatedly call the
//! payments-summary endpoint (or post payments) on a target host, pausing
//! briefly between calls, while a collector aggregates per-endpoint latency
//! statistics. The binary wires these pieces together; library APIs exist
//! mainly so the pieces can be tested in isolation.
pub mod app;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod swarm;
pub mod user;
