//! # Translate Relay - serverless translation relay
//!
//! Accepts text from three kinds of Lambda trigger, translates it with a
//! managed translation service and records each request/response pair as
//! two correlated JSON blobs in object storage.
//!
//! ## Architecture
//!
//! Every invocation runs the same pipeline:
//! ```text
//!   raw event ──► triggers ──► translation ──► recorder ──► response
//!   (direct |     (classify,    (Translator)    (BlobStore:   (envelope or
//!    S3 event |    adapt)                        request then  null for
//!    gateway)                                    response)     S3 events)
//! ```
//! The translation and storage clients sit behind traits so the handler can
//! be driven with in-memory fakes.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod handler;
pub mod recorder;
pub mod response;
pub mod storage;
pub mod translation;
pub mod triggers;
pub mod types;
pub mod validation;

// Internal utilities
pub mod observability;

pub use handler::TranslationHandler;
pub use types::{Config, Error, Result};
