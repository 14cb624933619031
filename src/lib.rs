//! Relationship-based authorization and workflow engine for a property
//! management platform. Access decisions come from a declarative
//! default-deny policy table evaluated against server-resolved relationship
//! facts; every status change runs through an explicit state machine and is
//! persisted as a compare-and-swap.

pub mod auth;
pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod notify;
pub mod router;
pub mod storage;
pub mod telemetry;
pub mod workflows;

pub use engine::Engine;
pub use error::EngineError;
