//! # Tauri 命令层
//!
//! ## 设计思路
//!
//! 命令层只做 IPC 参数接收与结果返回，不承载业务逻辑。
//! `MediaPicker` 作为 Tauri `State` 注入；遮罩与提示以事件形式发给前端。

use serde::Serialize;
use tauri::{AppHandle, Emitter, State, Wry};

use super::{Advisory, MediaPicker, NoticeSink, PickOptions, PickOutcome, PickerError, ProgressOverlay, UiDispatcher};

pub const OVERLAY_EVENT: &str = "media-picker://overlay";
pub const NOTICE_EVENT: &str = "media-picker://notice";
pub const CLOSE_EVENT: &str = "media-picker://close";

#[derive(Debug, Clone, Serialize)]
pub struct PickerCommandError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<PickerError> for PickerCommandError {
    fn from(error: PickerError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct OverlayPayload {
    visible: bool,
}

/// 通过事件让前端显示 / 隐藏遮罩。
pub struct WebviewOverlay {
    app: AppHandle<Wry>,
}

impl WebviewOverlay {
    pub fn new(app: AppHandle<Wry>) -> Self {
        Self { app }
    }

    fn emit(&self, visible: bool) {
        if let Err(err) = self.app.emit(OVERLAY_EVENT, OverlayPayload { visible }) {
            log::warn!("⚠️ 发送遮罩事件失败：{}", err);
        }
    }
}

impl ProgressOverlay for WebviewOverlay {
    fn show_overlay(&self) {
        self.emit(true);
    }

    fn hide_overlay(&self) {
        self.emit(false);
    }
}

/// 提示以事件形式交给前端展示（toast）。
pub struct WebviewNotices {
    app: AppHandle<Wry>,
}

impl WebviewNotices {
    pub fn new(app: AppHandle<Wry>) -> Self {
        Self { app }
    }
}

#[derive(Debug, Clone, Serialize)]
struct NoticePayload<'a> {
    #[serde(flatten)]
    advisory: &'a Advisory,
    message: String,
}

impl NoticeSink for WebviewNotices {
    fn notify(&self, advisory: &Advisory) {
        let payload = NoticePayload {
            advisory,
            message: advisory.to_string(),
        };
        if let Err(err) = self.app.emit(NOTICE_EVENT, payload) {
            log::warn!("⚠️ 发送提示事件失败：{}", err);
        }
    }
}

/// 把界面操作投递到 Tauri 主线程。
pub struct MainThreadDispatcher {
    app: AppHandle<Wry>,
}

impl MainThreadDispatcher {
    pub fn new(app: AppHandle<Wry>) -> Self {
        Self { app }
    }
}

impl UiDispatcher for MainThreadDispatcher {
    fn dispatch(&self, task: Box<dyn FnOnce() + Send>) {
        if let Err(err) = self.app.run_on_main_thread(task) {
            log::warn!("⚠️ 投递主线程任务失败：{}", err);
        }
    }
}

#[tauri::command]
pub fn has_read_permission(state: State<'_, MediaPicker>) -> bool {
    state.check_permission()
}

#[tauri::command]
pub async fn request_read_permission(state: State<'_, MediaPicker>) -> Result<bool, PickerCommandError> {
    Ok(state.request_permission().await)
}

/// 打开选择器并返回落地后的媒体列表。
#[tauri::command]
pub async fn get_pictures(
    state: State<'_, MediaPicker>,
    options: PickOptions,
) -> Result<PickOutcome, PickerCommandError> {
    state
        .pick_media(options)
        .await
        .map_err(PickerCommandError::from)
}

#[tauri::command]
pub fn close_picker(state: State<'_, MediaPicker>) {
    state.close_picker();
}
