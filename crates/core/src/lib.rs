//! Alyssa Loops Core - Client-side state and shared wire types.
//!
//! This crate holds everything the storefront client and server agree on:
//! - `cart` - The persisted shopping cart and its drawer view
//! - `carousel` - The product turntable state machine
//! - `contact` - Contact form validation and status messages
//! - `catalog` - Registry of "add to cart" products
//! - `api` - JSON request/response bodies of the HTTP API
//!
//! # Architecture
//!
//! The core crate contains only types, state machines and traits - no network
//! access and no filesystem access. Persistence is injected through
//! [`cart::CartStorage`], and time is passed in as [`std::time::Instant`]
//! values, so every state transition can be driven from tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for prices and email addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod carousel;
pub mod cart;
pub mod catalog;
pub mod contact;
pub mod types;

pub use types::*;
