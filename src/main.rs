use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use swupdate::config::Config;
use swupdate::report::{render_json, render_report};
use swupdate::SoftwareUpdate;

#[derive(Debug, Parser)]
#[command(name = "swupdate", version, about = "列出并安装 macOS 软件更新")]
struct Cli {
    /// softwareupdate 可执行文件路径（覆盖配置文件与环境变量）
    #[arg(long, global = true)]
    executable: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 列出可用更新
    List {
        /// 以 JSON 格式输出
        #[arg(long)]
        json: bool,
    },
    /// 按引用名安装更新
    Install {
        /// `list` 输出中的 Name（注意保留末尾空格）
        name: String,
        /// 显示安装进度百分比
        #[arg(long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // 命令行参数 > 环境变量 > 配置文件
    let config = Config::load_or_default()?;
    let executable = cli.executable.unwrap_or(config.executable_path);
    let sw = SoftwareUpdate::new(executable);

    match cli.command {
        Command::List { json } => {
            let updates = tokio::task::spawn_blocking(move || sw.list_updates())
                .await?
                .context("获取可用更新失败")?;

            if json || config.json {
                println!("{}", render_json(&updates)?);
            } else {
                print!("{}", render_report(&updates));
            }
        }
        Command::Install { name, verbose } => {
            let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel::<u8>();
            let progress = verbose.then_some(progress_tx);

            let target = name.clone();
            let install =
                tokio::task::spawn_blocking(move || sw.install_update_verbose(&target, progress));

            while let Some(percent) = progress_rx.recv().await {
                println!("{}%", percent);
            }

            install
                .await?
                .with_context(|| format!("安装 '{}' 失败", name))?;
            println!("Finished installing {}", name);
        }
    }

    Ok(())
}
