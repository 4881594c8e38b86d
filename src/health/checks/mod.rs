//! Built-in health checks

pub mod build_info;
pub mod config;
pub mod keymap;
pub mod system_info;
pub mod work_queue;

pub use build_info::BuildInfoCheck;
pub use config::ConfigCheck;
pub use keymap::KeymapCheck;
pub use system_info::SystemInfoCheck;
pub use work_queue::WorkQueueCheck;
