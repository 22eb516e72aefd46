// ABOUTME: Client module - HTTP pass-throughs for config fetch and deploy.
// ABOUTME: Defines the AppSource trait the coordinator refreshes from.

mod http;

pub use http::*;

#[cfg(test)]
mod http_test;
