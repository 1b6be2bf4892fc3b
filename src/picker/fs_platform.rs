//! # 本机文件系统平台实现
//!
//! 桌面环境下的默认平台能力：句柄就是本地路径或 `file://` URI，
//! 权限始终视为已授予，界面调用直接在当前线程执行。

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use tokio::sync::oneshot;

use super::notice::Advisory;
use super::platform::{ContentResolver, NoticeSink, PermissionPlatform, ProgressOverlay, UiDispatcher};
use super::source::{ContentHandle, ContentMetadata};

/// 以本地文件系统作为内容来源。
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentResolver;

impl FsContentResolver {
    /// 将句柄解析为本地路径（支持 `file://` URI）。
    pub fn resolve_path(handle: &ContentHandle) -> io::Result<PathBuf> {
        let raw = handle.as_str();
        if raw.starts_with("file://") {
            let parsed = url::Url::parse(raw).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("URI 格式错误：{}", e))
            })?;
            return parsed.to_file_path().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("不是本地文件 URI：{}", raw))
            });
        }
        Ok(PathBuf::from(raw))
    }
}

impl ContentResolver for FsContentResolver {
    fn query_metadata(&self, handle: &ContentHandle) -> io::Result<Option<ContentMetadata>> {
        let path = Self::resolve_path(handle)?;
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("不是普通文件：{}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Some(ContentMetadata::new(name, metadata.len())))
    }

    fn open_stream(&self, handle: &ContentHandle) -> io::Result<Box<dyn Read + Send>> {
        let path = Self::resolve_path(handle)?;
        Ok(Box::new(File::open(path)?))
    }
}

/// 桌面端无需运行时授权。
#[derive(Debug, Default, Clone, Copy)]
pub struct GrantedPermissions;

impl PermissionPlatform for GrantedPermissions {
    fn is_granted(&self) -> bool {
        true
    }

    fn prompt(&self) -> oneshot::Receiver<bool> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(true);
        rx
    }
}

/// 直接在调用线程执行（无独立 UI 线程的环境）。
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl UiDispatcher for InlineDispatcher {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

/// 没有遮罩层的环境。
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOverlay;

impl ProgressOverlay for NoopOverlay {
    fn show_overlay(&self) {
        log::debug!("⏳ 显示加载遮罩");
    }

    fn hide_overlay(&self) {
        log::debug!("✅ 隐藏加载遮罩");
    }
}

/// 把提示写进日志。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNoticeSink;

impl NoticeSink for LogNoticeSink {
    fn notify(&self, advisory: &Advisory) {
        log::warn!("⚠️ {}", advisory);
    }
}
