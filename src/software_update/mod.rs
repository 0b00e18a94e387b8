//! softwareupdate 模块 — 对 macOS `softwareupdate` 命令行工具的封装

pub mod parser;
pub mod streaming;
pub mod types;

// 重新导出常用类型和函数
pub use streaming::{CommandRunner, LineDeduper, SystemRunner, DEFAULT_EXECUTABLE_PATH};
pub use types::Update;

use crate::error::UpdateError;
use parser::{is_no_such_update, parse_install_progress, UpdateClassifier};
use std::path::PathBuf;
use tokio::sync::mpsc;

const LIST_UPDATES_ARG: &str = "-l";
const INSTALL_UPDATE_ARG: &str = "-i";
const VERBOSE_ARG: &str = "--verbose";

#[derive(Debug, Clone, Default)]
pub struct SoftwareUpdate<R = SystemRunner> {
    runner: R,
}

impl SoftwareUpdate<SystemRunner> {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self::with_runner(SystemRunner::new(executable))
    }
}

impl<R: CommandRunner> SoftwareUpdate<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// 列出所有可用更新（softwareupdate -l）
    ///
    /// 进程失败时丢弃已经解析出的记录，只返回错误。
    pub fn list_updates(&self) -> Result<Vec<Update>, UpdateError> {
        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();

        let consumer = std::thread::spawn(move || {
            let mut classifier = UpdateClassifier::new();
            let mut updates = Vec::new();
            while let Some(line) = line_rx.blocking_recv() {
                updates.extend(classifier.push(line));
            }
            updates.extend(classifier.finish());
            updates
        });

        let result = self.runner.run_to_channel(&[LIST_UPDATES_ARG], line_tx);
        let updates = consumer.join().unwrap_or_default();
        result?;

        log::debug!("找到 {} 个可用更新", updates.len());
        Ok(updates)
    }

    /// 安装指定更新
    pub fn install_update(&self, update_name: &str) -> Result<(), UpdateError> {
        self.install_update_verbose(update_name, None)
    }

    /// 安装指定更新，并把安装进度百分比发送到 `progress`
    ///
    /// softwareupdate 对不存在的更新名仍以 0 退出，这里从输出中识别并转换为
    /// `UpdateError::NoSuchUpdate`。进度值不保证单调或完整。
    pub fn install_update_verbose(
        &self,
        update_name: &str,
        progress: Option<mpsc::UnboundedSender<u8>>,
    ) -> Result<(), UpdateError> {
        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
        let target = update_name.to_string();

        let consumer = std::thread::spawn(move || {
            let mut not_found = false;
            while let Some(line) = line_rx.blocking_recv() {
                if is_no_such_update(&target, &line) {
                    log::warn!("softwareupdate 报告更新不存在: {}", line);
                    not_found = true;
                }

                if let (Some(tx), Some(percent)) = (&progress, parse_install_progress(&line)) {
                    let _ = tx.send(percent);
                }
            }
            not_found
        });

        let result = self.runner.run_to_channel(
            &[VERBOSE_ARG, INSTALL_UPDATE_ARG, update_name],
            line_tx,
        );
        let not_found = consumer.join().unwrap_or(false);
        result?;

        if not_found {
            return Err(UpdateError::NoSuchUpdate {
                name: update_name.to_string(),
            });
        }

        log::info!("已完成安装: {}", update_name);
        Ok(())
    }
}
