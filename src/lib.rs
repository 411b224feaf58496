//! Local HTTP file server for debugging partial-content delivery.
//!
//! Serves files from one root directory by base name, honors single
//! `Range: bytes=<start>-<end?>` requests and answers every handled failure
//! with a JSON error envelope.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
