//! # 平台能力接口
//!
//! ## 设计思路
//!
//! 选择器界面、权限系统、内容读取、遮罩层与提示展示都属于平台，
//! 核心只通过这里的 trait 调用它们，不关心具体实现。
//!
//! ## 实现思路
//!
//! - 异步往返（权限弹窗、选择器界面）统一建模为一次性的 `oneshot::Receiver`：
//!   平台发送一次结果即完成；发送端被丢弃视为“无结果”。
//! - 内容读取是阻塞接口，只在事务专属的后台线程上调用。
//! - 界面相关调用经 `UiDispatcher` 转回交互线程。

use std::io::{self, Read};

use tokio::sync::oneshot;

use super::notice::Advisory;
use super::source::{ContentHandle, ContentMetadata, PickResult};
use super::PickRequest;

/// 平台权限系统。
pub trait PermissionPlatform: Send + Sync {
    /// 当前授权状态是否已足够（不弹窗）。
    fn is_granted(&self) -> bool;

    /// 发起授权弹窗；结果只发送一次。
    fn prompt(&self) -> oneshot::Receiver<bool>;
}

/// 平台选择器界面。
pub trait PickerSurface: Send + Sync {
    /// 展示选择器；用户完成后发送一次结果。
    fn present(&self, request: &PickRequest) -> oneshot::Receiver<PickResult>;

    /// 平台允许一次选择的最大数量（如有）。
    fn selection_limit(&self) -> Option<u32> {
        None
    }

    /// 请求关闭正在展示的选择器。
    fn dismiss(&self) {}
}

/// 平台内容读取（阻塞接口）。
pub trait ContentResolver: Send + Sync {
    /// 查询展示名与大小；`Ok(None)` 表示查询无记录。
    fn query_metadata(&self, handle: &ContentHandle) -> io::Result<Option<ContentMetadata>>;

    /// 打开读取流。
    fn open_stream(&self, handle: &ContentHandle) -> io::Result<Box<dyn Read + Send>>;
}

/// 阻塞式遮罩层（加载中）。
pub trait ProgressOverlay: Send + Sync {
    fn show_overlay(&self);
    fn hide_overlay(&self);
}

/// 将任务投递到交互线程执行。
pub trait UiDispatcher: Send + Sync {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>);
}

/// 提示展示（toast 等），不得阻塞调用方。
pub trait NoticeSink: Send + Sync {
    fn notify(&self, advisory: &Advisory);
}
