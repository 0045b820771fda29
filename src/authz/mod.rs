//! Role & access model.
//!
//! Two parts:
//! - role normalization: every raw role claim from the session boundary maps
//!   to exactly one canonical [`Role`], unknown values downgrade to `NonUser`;
//! - the access gate: a static route-policy table consulted by the global
//!   request middleware and by per-handler guards, so both enforcement points
//!   share one source of truth.

mod gate;
mod policy;
mod role;

pub use gate::{
    access_gate, require_page_role, require_role, Decision, DenyReason, PolicyEvaluator,
    TableGate, Verdict,
};
pub use policy::{PolicyRule, PolicyTable, Surface};
pub use role::Role;
