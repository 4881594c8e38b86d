//! Keytouch
//!
//! Turns keyboard, mouse and game controller input into synthetic multi-touch
//! gestures laid out by a keymap.

/// Touch-producing actions: buttons, joysticks, swipes, camera, fake mouse
pub mod action;

/// Build-time information (git SHA, branch, timestamp, etc.)
pub mod build_info;

/// Engine configuration profiles
pub mod config;

/// Key to action routing across priority tiers
pub mod dispatch;

/// Health checks for startup validation and CI
pub mod health;

/// Logical keys and raw host input
pub mod input;

/// Keymap records and persistence
pub mod keymap;

/// Control modes and input adapters
pub mod mode;

/// Serial work queue and session wiring
pub mod runtime;

/// Touch identifiers and the touch sink
pub mod touch;
