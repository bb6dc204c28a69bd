//! HTTP delegation for functions hosted in another process.
//!
//! [`HttpForwarder`] implements
//! [`RemoteForwarder`](toolflow_registry::remote::RemoteForwarder) by POSTing
//! each [`RemoteCall`](toolflow_registry::remote::RemoteCall) as JSON to a
//! single collaborator endpoint and returning the decoded response body.
//! Environment overrides for the endpoint are read by `toolflow-config`.

#![warn(missing_docs, clippy::pedantic)]

mod forwarder;
mod http_client;

pub use forwarder::{ForwarderConfig, HttpForwarder};
