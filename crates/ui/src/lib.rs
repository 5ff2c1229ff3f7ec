//! Secretly UI - Frontend-facing layer
//!
//! This crate provides the command/update bridge, the single
//! synchronization loop and the pure render function. A frontend sends
//! [`SyncCommand`]s and draws the [`UiUpdate`]s it gets back.

pub mod bridge;
pub mod notification;
pub mod render;
pub mod sync_loop;

pub use bridge::{SyncCommand, UiUpdate};
pub use notification::{Notification, NotificationLevel};
pub use render::{EnvironmentView, RevealSet, VariableView, View, render, render_environment};
pub use sync_loop::SyncLoop;
