//! macOS `softwareupdate` 的类型化封装：列出可用更新、安装更新并获取安装进度

pub mod config;
pub mod error;
pub mod report;
pub mod software_update;
pub mod version;

pub use error::UpdateError;
pub use software_update::{CommandRunner, SoftwareUpdate, SystemRunner, Update};
pub use version::Version;
