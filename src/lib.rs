//! # 媒体选择器：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │           调用方（Tauri 前端 / CLI / 宿主应用）          │
//! │   has_read_permission · request_read_permission          │
//! │   get_pictures(PickOptions) · close_picker               │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<PickOutcome, PickerError>（恰好一次）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                            │
//! │                                                          │
//! │  ┌─ error ────── AppError（CLI 统一错误）                 │
//! │  │                                                       │
//! │  └─ picker ───── 选择事务编排                             │
//! │      ├─ permission     权限门                             │
//! │      ├─ materializer   内容落地到私有存储                 │
//! │      ├─ classifier     图片/视频分类 · 尺寸 · 占位缩略图  │
//! │      ├─ progress       遮罩 RAII 守卫                     │
//! │      └─ handler        状态机 + 事务专属后台线程          │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ platform trait（选择器界面 · 权限 · 内容读取 · 遮罩 · 提示）
//! ┌───────┴──────────────────────────────────────────────────┐
//! │   平台实现：本机文件系统 / Tauri 对话框 / 宿主自定义      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 应用级错误 `AppError`，命令行入口的返回类型 |
//! | [`picker`] | 选择、过滤、落地、分类并汇总为唯一结果 |

pub mod error;
pub mod picker;
