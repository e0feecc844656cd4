//! Notification chains and observer seams

pub mod chain;
pub mod observer;

pub use chain::NotificationChain;
pub use observer::{BatchObserver, ChangeRecorder, Observer};
