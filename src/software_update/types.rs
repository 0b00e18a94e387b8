//! softwareupdate 相关数据类型定义

use crate::version::Version;
use serde::Serialize;

/// `softwareupdate -l` 列出的一条可用更新
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    /// 安装时使用的引用名，保留末尾空格（softwareupdate 把它当作名称的一部分）
    pub reference_name: String,
    pub application_name: String,
    pub version: Option<Version>,
    /// 以 MB 计；`None` 表示大小未知
    pub size_megabytes: Option<u64>,
    pub restart_needed: bool,
}

impl Update {
    pub fn has_update_size(&self) -> bool {
        self.size_megabytes.is_some_and(|mb| mb > 0)
    }
}
