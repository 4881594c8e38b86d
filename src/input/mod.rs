//! Input identifiers and the raw input source bridge
//!
//! # Architecture
//!
//! ```text
//! Raw Input (winit) → InputCollector → RawInput
//!                                          ↓
//!                                    InputRouter
//!                               (mode-selected adapters)
//!                                          ↓
//!                                  ActionDispatcher
//!                                  (LogicalKey routing)
//! ```

mod collector;
mod events;
mod key;

// Re-export public API
pub use collector::InputCollector;
pub use events::{InputCategory, RawInput};
pub use key::{ControllerElement, Direction, Directions, KeyCode, LogicalKey, MouseKey, UnknownKey};
