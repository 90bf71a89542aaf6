//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing
//! - Input events
//! - Notification banner
//! - Storage (LocalStorage on web)

pub mod input;
pub mod notify;
pub mod storage;
pub mod time;

pub use input::InputState;
pub use notify::Notifications;
pub use time::FrameClock;
