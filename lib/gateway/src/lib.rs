//! Authenticated request gateway for the punchcard console.
//!
//! This crate provides:
//! - The [`Gateway`] choke point every server call passes through
//! - The closed [`GatewayError`] taxonomy and its total classification
//! - The [`Transport`] seam (reqwest in production, fakes in tests)
//! - [`AccessEvent`]s for observers that own notification and navigation
//!   policy
//!
//! Two upstream hosts are supported per call: the primary API and the
//! plugin-store API. Success requires both transport-level success and
//! application code 200 in the response envelope.

pub mod client;
pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod event;
pub mod transport;

// Re-export main types at crate root
pub use client::{Gateway, GatewayConfig, LoginSession};
pub use descriptor::{RequestBody, RequestDescriptor, TargetHost, Verb};
pub use envelope::{Envelope, SUCCESS_CODE};
pub use error::GatewayError;
pub use event::{AccessEvent, AccessObserver, LogObserver};
pub use transport::{HttpTransport, Transport, TransportError, WireRequest, WireResponse};
