//! # 对话框选择器
//!
//! 以 `tauri-plugin-dialog` 的文件对话框作为平台选择器界面。
//! 媒体选择器只显示图片（可选视频）过滤器；文件选择器额外允许所有文件，
//! 此时数量无法在界面上限制，由流水线截断。

use std::sync::Arc;

use tauri::{AppHandle, Emitter, Wry};
use tauri_plugin_dialog::{DialogExt, FilePath};
use tokio::sync::oneshot;

use super::classifier::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use super::{
    ContentHandle, FsContentResolver, MediaPicker, PickRequest, PickResult, PickerConfig,
    PickerError, PickerPlatform, PickerSurface,
};
use super::commands::{CLOSE_EVENT, MainThreadDispatcher, WebviewNotices, WebviewOverlay};

/// 原生文件对话框无法由程序关闭；`dismiss` 只向前端发送 `media-picker://close` 事件，
/// 对话框仍由用户关闭，关闭后按取消处理。
pub struct DialogPickerSurface {
    app: AppHandle<Wry>,
}

impl DialogPickerSurface {
    pub fn new(app: AppHandle<Wry>) -> Self {
        Self { app }
    }
}

impl PickerSurface for DialogPickerSurface {
    fn present(&self, request: &PickRequest) -> oneshot::Receiver<PickResult> {
        let (sender, receiver) = oneshot::channel();

        let mut media: Vec<&str> = IMAGE_EXTENSIONS.to_vec();
        if request.allow_video() {
            media.extend_from_slice(VIDEO_EXTENSIONS);
        }

        let mut builder = self.app.dialog().file().add_filter("媒体", &media);
        if request.use_broad_picker() {
            builder = builder.add_filter("所有文件", &["*"]);
        }

        builder.pick_files(move |paths: Option<Vec<FilePath>>| {
            let result = match paths {
                Some(paths) => PickResult::Selected(
                    paths
                        .into_iter()
                        .map(|path| ContentHandle::new(path.to_string()))
                        .collect(),
                ),
                None => PickResult::cancelled(),
            };
            let _ = sender.send(result);
        });

        receiver
    }

    fn dismiss(&self) {
        if let Err(err) = self.app.emit(CLOSE_EVENT, ()) {
            log::warn!("⚠️ 发送关闭选择器事件失败：{}", err);
        }
    }
}

/// 用桌面默认能力组装一个可注入 Tauri 的选择器。
pub fn desktop_picker(app: &AppHandle<Wry>, config: PickerConfig) -> Result<MediaPicker, PickerError> {
    let platform = PickerPlatform::new(
        Arc::new(DialogPickerSurface::new(app.clone())),
        Arc::new(FsContentResolver),
    )
    .with_overlay(Arc::new(WebviewOverlay::new(app.clone())))
    .with_dispatcher(Arc::new(MainThreadDispatcher::new(app.clone())))
    .with_notices(Arc::new(WebviewNotices::new(app.clone())));

    MediaPicker::new(config, platform)
}
