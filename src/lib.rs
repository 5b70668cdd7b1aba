//! Latency, jitter and throughput probes against a single HTTPS endpoint.
//!
//! [`probes::Aggregator`] runs the four probes in sequence over a
//! [`http::Transport`] and returns a [`results::CombinedResult`], which
//! [`output`] renders as text, JSON or CSV.

pub mod config;
pub mod errors;
pub mod http;
pub mod measurements;
pub mod output;
pub mod probes;
pub mod results;
pub mod stats;
