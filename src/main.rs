//! # 媒体选择器：命令行入口
//!
//! 把命令行给出的路径当作选择器返回的条目，走完整条流水线后以 JSON 输出结果。
//! 日志写到 stderr，结果写到 stdout。

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::sync::oneshot;

use media_picker::error::AppError;
use media_picker::picker::{
    ContentHandle, FsContentResolver, MediaPicker, PickOptions, PickRequest, PickResult,
    PickerConfig, PickerPlatform, PickerSurface,
};

#[derive(Debug, Parser)]
#[command(name = "media-picker", version, about = "把选中的媒体落地到私有存储并输出描述")]
struct Cli {
    /// 最多接收的条目数（默认取配置中的 default_max_items）
    #[arg(long = "max")]
    max: Option<i64>,

    /// 单个条目大小上限（MB）
    #[arg(long)]
    max_size: Option<f64>,

    /// 视频大小上限（MB）
    #[arg(long)]
    max_video_size: Option<f64>,

    #[arg(long)]
    allow_video: bool,

    /// 使用文件选择器（不限制类型，仅保留前 N 个）
    #[arg(long)]
    file_picker: bool,

    /// 私有存储根目录
    #[arg(long)]
    storage: Option<PathBuf>,

    /// 存储根目录下的一级子目录
    #[arg(long)]
    subdir: Option<String>,

    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 模拟用户在选择器中取消
    #[arg(long)]
    cancel: bool,

    /// 被“选中”的文件路径或 file:// URI，按顺序处理
    paths: Vec<String>,
}

/// 结果在启动时就已确定的选择器。
struct PreselectedSurface {
    result: Mutex<Option<PickResult>>,
}

impl PickerSurface for PreselectedSurface {
    fn present(&self, _request: &PickRequest) -> oneshot::Receiver<PickResult> {
        let (sender, receiver) = oneshot::channel();
        if let Ok(mut pending) = self.result.lock() {
            if let Some(result) = pending.take() {
                let _ = sender.send(result);
            }
        }
        receiver
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ [{}] {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = match &cli.config {
        Some(path) => PickerConfig::from_json_file(path)?,
        None => PickerConfig::default(),
    };
    if let Some(storage) = &cli.storage {
        config.storage_root = storage.clone();
    }

    let selection = if cli.cancel {
        PickResult::cancelled()
    } else {
        PickResult::Selected(cli.paths.iter().map(|p| ContentHandle::new(p.as_str())).collect())
    };

    let surface = PreselectedSurface {
        result: Mutex::new(Some(selection)),
    };
    let platform = PickerPlatform::new(Arc::new(surface), Arc::new(FsContentResolver));
    let picker = MediaPicker::new(config, platform)?;

    let options = PickOptions {
        maximum_images_count: cli.max,
        max_file_size: cli.max_size,
        max_video_size: cli.max_video_size,
        use_file_picker: cli.file_picker,
        allow_video: cli.allow_video,
        subdirectory: cli.subdir,
    };

    let outcome = picker.pick_media(options).await?;
    let json = serde_json::to_string_pretty(&outcome).map_err(|e| AppError::Output(e.to_string()))?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
