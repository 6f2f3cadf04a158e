//! Domain types for armgrab
//!
//! This module contains the core domain types:
//! - LaunchSpec: the fully-resolved, immutable description of the instance to launch
//! - AttemptResult: classified outcome of one create-instance call
//! - LaunchedInstance: what a successful launch hands back

pub mod attempt;
pub mod spec;

pub use attempt::{AttemptResult, LaunchedInstance};
pub use spec::{LaunchSpec, ShapeProfile};
