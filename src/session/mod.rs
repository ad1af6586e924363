//! Session module for the pomodoro timer.
//!
//! This module contains the session controller and its collaborators:
//! - `controller`: State machine, countdown lifecycle and shutdown
//! - `registry`: State-change observer registry
//! - `error`: Construction and shutdown errors

pub mod controller;
pub mod error;
pub mod registry;

pub use controller::SessionController;
pub use error::SessionError;
pub use registry::{StateCallback, Subscription, SubscriptionId};
