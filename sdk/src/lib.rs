mod backend;
mod client;
mod client_utils;
mod errors;
mod ext;
pub mod lingo_sdk_test;
mod otel;
mod types;
mod usage;

pub use backend::GenerationBackend;
pub use client::{HttpBackend, HttpBackendOptions};
pub use errors::*;
pub use types::*;
pub use usage::{
    aggregate_usage, AggregatedUsage, AggregationPolicy, UsageTotals, DICTIONARY_LOOKUP,
};
