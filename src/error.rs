//! softwareupdate 调用过程中的错误类型

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    /// 可执行文件无法启动（不存在、无权限等）
    #[error("无法启动 '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// 进程正常运行但以非零状态退出，附带收集到的输出用于诊断
    #[error("执行 '{command}' 失败 - {status}{}", format_output(.output))]
    ExitStatus {
        command: String,
        status: ExitStatus,
        output: Vec<String>,
    },

    /// 读取进程输出管道失败
    #[error("读取 '{command}' 的输出失败: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    /// softwareupdate 报告请求的更新不存在
    #[error("指定的更新不存在: '{name}'")]
    NoSuchUpdate { name: String },
}

impl UpdateError {
    pub fn is_no_such_update(&self) -> bool {
        matches!(self, UpdateError::NoSuchUpdate { .. })
    }
}

fn format_output(output: &[String]) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(". Output: {}", output.join(" "))
    }
}
