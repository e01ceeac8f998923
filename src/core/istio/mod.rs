//! Maistra operators installed through OLM, and the control plane they manage.

pub mod control_plane;
pub mod manifests;
pub mod operator;

pub use control_plane::{ControlPlane, ControlPlaneFiles};
pub use operator::Operator;
