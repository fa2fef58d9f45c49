//! HTTP networking module
//!
//! Provides HTTP client functionality for providers that talk to web APIs.

mod client;

pub use client::{HttpClient, HttpResponse};
