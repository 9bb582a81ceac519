//! DaVinci Resolve backend for the splice engine.
//!
//! Implements the host trait surface over Resolve's Python scripting
//! API through an in-process interpreter. Every wrapper holds a
//! `Py<PyAny>` scripting handle; calls take the GIL, invoke the
//! corresponding scripting method, and map Python failures into
//! [`autosplice_core::host::HostError`] so the engine's retry policy
//! can tell the host's transient null-object window apart from real
//! errors.

mod connect;
mod handles;

pub use connect::{connect, ConnectError};
pub use handles::{
    ResolveApp, ResolveClipItem, ResolveMedia, ResolveMediaPool, ResolveProject, ResolveTimeline,
};
