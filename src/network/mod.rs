//! HTTP networking module
//!
//! Provides the HTTP client used to reach the oracle service.

mod client;

pub use client::{HttpClient, HttpResponse};
