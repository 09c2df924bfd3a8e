//! # Ackbridge Client Library
//!
//! Batched acknowledgement engine for queue backends with per-message
//! visibility timeouts. Acknowledge decisions are grouped into backend-sized
//! batches with unique entry ids; negative acknowledgements get a redelivery
//! delay computed from the configured retry mode.
//!
//! ## Modules
//!
//! - [`acknowledge`] - Batch dispatch, retry modes and the two acknowledgers
//! - [`backend`] - Batch RPC trait and wire types implemented by transports
//! - [`connection`] - Connection factory and connections
//! - [`settings`] - File and environment based settings
//! - [`common`] - Error types

pub mod acknowledge;
pub mod backend;
pub mod common;
pub mod connection;
pub mod settings;
