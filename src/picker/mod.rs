//! # 媒体选择模块（picker）
//!
//! ## 设计思路
//!
//! 该模块将“权限检查 → 打开选择器 → 接收结果 → 限制过滤 → 落地拷贝 → 分类 → 汇总结果”
//! 按职责拆分为多个子模块。平台界面、权限系统与内容读取都通过 `platform` 中的 trait 注入，
//! 核心逻辑不依赖任何具体平台。
//!
//! - `config`：运行时配置与单次请求校验
//! - `error/source/notice`：错误、数据模型、提示
//! - `platform`：平台能力接口；`fs_platform`：本机文件系统默认实现
//! - `permission`：权限门
//! - `classifier`：图片 / 视频分类、尺寸读取、占位缩略图
//! - `materializer`：内容落地到私有存储
//! - `progress`：遮罩显示 / 隐藏（RAII）
//! - `handler`：编排整个选择事务（状态机 + 后台线程）
//! - `commands` / `dialog`：Tauri 命令层与对话框选择器（`tauri` feature）
//!
//! ## 新同事快速上手
//!
//! ```text
//! 调用方 / 前端 invoke
//!    ↓
//! commands.rs（参数适配，可选）
//!    ↓
//! handler.rs  MediaPicker::pick_media
//!    ├─ permission.rs（权限检查 / 请求）
//!    ├─ PickerSurface::present（平台选择器，oneshot 返回）
//!    └─ 后台线程 PipelineState::run
//!         ├─ materializer.rs（查大小 + 流式拷贝）
//!         ├─ classifier.rs（分类 + 尺寸 + 缩略图）
//!         └─ progress.rs（遮罩守卫）
//!    ↓
//! PickOutcome / PickerError（恰好一次）
//! ```
//!
//! ## 分层职责建议
//!
//! - 请求参数变更优先改 `config.rs`
//! - 事务流程或状态迁移变更优先改 `handler.rs`
//! - 接入新平台时实现 `platform.rs` 中的 trait，不要改核心

mod classifier;
mod config;
mod error;
mod fs_platform;
mod handler;
mod materializer;
mod notice;
mod permission;
mod platform;
mod progress;
mod source;

#[cfg(feature = "tauri")]
pub mod commands;
#[cfg(feature = "tauri")]
pub mod dialog;

pub use classifier::{classify, classify_local, make_video_thumbnail, probe_dimensions};
pub use config::{PickOptions, PickRequest, PickerConfig, ScanPolicy, DEFAULT_MAX_ITEMS};
pub use error::PickerError;
pub use fs_platform::{FsContentResolver, GrantedPermissions, InlineDispatcher, LogNoticeSink, NoopOverlay};
pub use handler::{Completion, MediaPicker, PickerPlatform, PickerState};
pub use materializer::FileMaterializer;
pub use notice::Advisory;
pub use permission::PermissionGate;
pub use platform::{
    ContentResolver, NoticeSink, PermissionPlatform, PickerSurface, ProgressOverlay, UiDispatcher,
};
pub use progress::{ProgressGuard, ProgressNotifier};
pub use source::{
    ContentHandle, ContentMetadata, Dimensions, MediaDescriptor, MediaKind, PickOutcome, PickResult,
};
