//! Multi-step registration wizard
//!
//! - `steps` - the six step editors and their list operations
//! - `controller` - navigation, per-step gating and final submission

mod controller;
mod steps;

pub use controller::*;
pub use steps::*;
