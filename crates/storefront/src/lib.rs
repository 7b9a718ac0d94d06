//! Alyssa Loops storefront API library.
//!
//! Contact relay, hosted checkout and payment webhooks for the static
//! storefront, exposed as a library so the router can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
