use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::software_update::DEFAULT_EXECUTABLE_PATH;

/// 覆盖 softwareupdate 路径的环境变量
pub const EXECUTABLE_ENV: &str = "SWUPDATE_EXECUTABLE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executable_path: PathBuf,
    /// 以 JSON 格式输出更新列表
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::from(DEFAULT_EXECUTABLE_PATH),
            json: false,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let config_path = PathBuf::from(home).join(".config/swupdate/config.toml");

        let mut config = Self::load_from(&config_path)?;

        // 环境变量优先于配置文件
        if let Some(path) = std::env::var_os(EXECUTABLE_ENV) {
            config.executable_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// 从指定文件读取配置，文件不存在时返回默认值
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            log::debug!("已加载配置: {}", path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}
