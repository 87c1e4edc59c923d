mod client;

pub use client::{FetchClient, FetchError, FETCH_TIMEOUT, PARTIAL_SUFFIX};
