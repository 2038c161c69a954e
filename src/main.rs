//! # 图片落盘工具 — 命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与配置合并。
//! 业务逻辑位于 `image_store` 模块，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use image_store::{settings, AppError, ExtensionPolicy, ImageSource, ImageStore, StoreConfig};
use tokio::io::AsyncReadExt;

/// 将图片保存到扁平图片目录
#[derive(Parser, Debug)]
#[command(name = "image-store", version, about = "Save images from URLs, data URIs or raw bytes")]
struct Cli {
    /// JSON 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖配置中的图片目录
    #[arg(long, global = true)]
    images_dir: Option<PathBuf>,

    /// 扩展名策略：force_png / detect
    #[arg(long, global = true)]
    policy: Option<ExtensionPolicy>,

    /// 下载总超时（秒），0 表示不限制
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 保存一张图片并输出逻辑资源路径（INPUT 为 `-` 时从标准输入读取字节）
    Save { input: String, name: String },
    /// 删除图片目录中的全部文件
    Clear,
    /// 输出图片目录的文件数与占用大小
    Info,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            log::error!("image-store 执行失败 [{}]: {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let config = resolve_config(&cli)?;
    log::debug!(
        "配置：images_dir={} policy={} timeout={}s",
        config.images_dir.display(),
        config.extension_policy.as_str(),
        config.download_timeout
    );

    let store = ImageStore::new(config)?;

    match cli.command {
        Command::Save { input, name } => {
            let source = if input == "-" {
                read_stdin_source().await?
            } else {
                ImageSource::classify(&input)
            };

            let stored = store.save(source, &name).await?;
            println!("{}", stored.resource_path);
        }
        Command::Clear => {
            let removed = store.delete_images().await?;
            println!("{}", removed);
        }
        Command::Info => {
            let info = store.dir_info().await?;
            println!("{}\t{} files\t{} bytes", info.path, info.file_count, info.total_size);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// 配置优先级：命令行参数 > 配置文件 > 默认值。
fn resolve_config(cli: &Cli) -> Result<StoreConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => settings::load_config(path)?,
        None => StoreConfig::default(),
    };

    if let Some(dir) = &cli.images_dir {
        config.images_dir = dir.clone();
    }
    if let Some(policy) = cli.policy {
        config.extension_policy = policy;
    }
    if let Some(timeout) = cli.timeout {
        config.download_timeout = timeout;
    }

    Ok(config)
}

async fn read_stdin_source() -> Result<ImageSource, AppError> {
    let mut buf = Vec::new();
    tokio::io::stdin().read_to_end(&mut buf).await?;
    Ok(classify_stdin_bytes(buf))
}

/// 标准输入为 URL / data URI 文本时按前缀分类，否则视为原始字节。
fn classify_stdin_bytes(buf: Vec<u8>) -> ImageSource {
    let classified = std::str::from_utf8(&buf)
        .ok()
        .map(|text| ImageSource::classify(text.trim()));

    match classified {
        Some(ImageSource::Binary(_)) | None => ImageSource::Binary(buf),
        Some(source) => source,
    }
}
