//! 流式命令执行（list / install）
//!
//! stdout 与 stderr 在操作系统层面合并到同一管道，按到达顺序逐行读取，
//! 连续重复的行只发送一次，再通过无界 channel 交给消费方，读取管道永远不会
//! 因为消费方处理慢而阻塞。

use crate::error::UpdateError;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// softwareupdate 的默认路径
pub const DEFAULT_EXECUTABLE_PATH: &str = "/usr/sbin/softwareupdate";

/// 非零退出时错误信息里附带的最近输出行数
const OUTPUT_TAIL_LINES: usize = 50;

/// 执行外部命令的能力，由调用方注入（测试中可替换为假实现）
pub trait CommandRunner: Send + Sync {
    /// 执行命令，把合并后的输出逐行发送到 `lines`，直到进程退出。
    ///
    /// 返回时 `lines` 已被丢弃，消费方据此得知输出结束。
    fn run_to_channel(
        &self,
        args: &[&str],
        lines: mpsc::UnboundedSender<String>,
    ) -> Result<(), UpdateError>;

    /// 执行命令并收集全部输出行；失败时不返回任何部分输出
    fn run_to_lines(&self, args: &[&str]) -> Result<Vec<String>, UpdateError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.run_to_channel(args, tx)?;

        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        Ok(lines)
    }
}

/// 折叠连续重复的行（只比较紧邻的上一条已发送的行）
#[derive(Debug, Default)]
pub struct LineDeduper {
    last: Option<String>,
}

impl LineDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// 该行应当发送时返回 true
    pub fn accept(&mut self, line: &str) -> bool {
        if self.last.as_deref() == Some(line) {
            return false;
        }
        self.last = Some(line.to_string());
        true
    }
}

/// 通过 duct 启动真实进程的默认实现
#[derive(Debug, Clone)]
pub struct SystemRunner {
    executable: PathBuf,
}

impl SystemRunner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut parts = vec![self.executable.display().to_string()];
        parts.extend(args.iter().map(|a| a.to_string()));
        parts.join(" ")
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE_PATH)
    }
}

impl CommandRunner for SystemRunner {
    fn run_to_channel(
        &self,
        args: &[&str],
        lines: mpsc::UnboundedSender<String>,
    ) -> Result<(), UpdateError> {
        let command = self.describe(args);
        log::debug!("执行命令: {}", command);

        // 退出码由下面自行检查；handle 在读到 EOF 前被丢弃时 duct 会杀掉并回收子进程
        let handle = duct::cmd(self.executable.as_path(), args.iter().copied())
            .stderr_to_stdout()
            .unchecked()
            .reader()
            .map_err(|source| UpdateError::Launch {
                command: command.clone(),
                source,
            })?;

        let mut reader = BufReader::new(&handle);
        let mut buffer = Vec::new();
        let mut deduper = LineDeduper::new();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(OUTPUT_TAIL_LINES);

        loop {
            buffer.clear();
            let n = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|source| UpdateError::Io {
                    command: command.clone(),
                    source,
                })?;
            if n == 0 {
                break;
            }

            let line = decode_line(&buffer);
            if !deduper.accept(&line) {
                log::debug!("忽略重复行: {}", line);
                continue;
            }

            if tail.len() == OUTPUT_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line.clone());

            // 消费方已退出时不影响继续排空管道
            let _ = lines.send(line);
        }
        drop(reader);

        // 读到 EOF 时 duct 已经等待子进程退出
        let status = match handle.try_wait() {
            Ok(Some(output)) => output.status,
            Ok(None) => {
                let _ = handle.kill();
                return Err(UpdateError::Io {
                    command,
                    source: io::Error::other("输出已结束但进程仍在运行"),
                });
            }
            Err(source) => return Err(UpdateError::Io { command, source }),
        };

        if !status.success() {
            log::warn!("{} 以 {} 退出", command, status);
            return Err(UpdateError::ExitStatus {
                command,
                status,
                output: tail.into(),
            });
        }

        Ok(())
    }
}

/// 去掉行尾的 `\n` 与 `\r`，其余空白（包括末尾空格）原样保留
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
