//! Workflow state machines. Transitions are the only sanctioned way to change
//! a workflow resource's status; each module validates the edge for the
//! current state, applies the action's stamps, and leaves persistence and
//! notification to the engine.

pub mod dispute;
pub mod maintenance;
pub mod payment;
pub mod support;
pub mod tenancy;

pub use dispute::DisputeAction;
pub use maintenance::MaintenanceAction;
pub use payment::PaymentAction;
pub use support::SupportAction;
pub use tenancy::TenancyAction;
