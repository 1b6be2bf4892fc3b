#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use tokio::sync::oneshot;

use media_picker::picker::{
    Advisory, ContentHandle, ContentMetadata, ContentResolver, MediaPicker, NoticeSink,
    PermissionPlatform, PickRequest, PickResult, PickerConfig, PickerPlatform, PickerSurface,
    ProgressOverlay,
};

pub const MB: u64 = 1024 * 1024;

/// 按脚本返回结果的选择器；`None` 表示发送端被丢弃。
pub struct ScriptedSurface {
    result: Mutex<Option<PickResult>>,
    limit: Option<u32>,
    pub presented: Mutex<Vec<PickRequest>>,
    pub dismissed: AtomicBool,
}

impl ScriptedSurface {
    pub fn new(result: Option<PickResult>) -> Self {
        Self {
            result: Mutex::new(result),
            limit: None,
            presented: Mutex::new(Vec::new()),
            dismissed: AtomicBool::new(false),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn selecting(handles: &[&str]) -> Self {
        Self::new(Some(PickResult::Selected(
            handles.iter().map(|h| ContentHandle::new(*h)).collect(),
        )))
    }

    pub fn presented_count(&self) -> usize {
        self.presented.lock().expect("lock poisoned").len()
    }
}

impl PickerSurface for ScriptedSurface {
    fn present(&self, request: &PickRequest) -> oneshot::Receiver<PickResult> {
        self.presented
            .lock()
            .expect("lock poisoned")
            .push(request.clone());

        let (sender, receiver) = oneshot::channel();
        if let Some(result) = self.result.lock().expect("lock poisoned").take() {
            sender.send(result).expect("receiver dropped");
        }
        receiver
    }

    fn selection_limit(&self) -> Option<u32> {
        self.limit
    }

    fn dismiss(&self) {
        self.dismissed.store(true, Ordering::SeqCst);
    }
}

struct Entry {
    metadata: Option<ContentMetadata>,
    bytes: Vec<u8>,
}

/// 内存中的内容源。
#[derive(Default)]
pub struct MemoryResolver {
    entries: Mutex<HashMap<String, Entry>>,
    unreadable: Mutex<HashSet<String>>,
    failing_queries: Mutex<HashSet<String>>,
    pub opened: Mutex<Vec<String>>,
}

impl MemoryResolver {
    pub fn insert(&self, handle: &str, name: &str, bytes: Vec<u8>) {
        self.insert_with(handle, Some(ContentMetadata::new(name, bytes.len() as u64)), bytes);
    }

    /// 声明的大小与实际字节数可以不同，便于测试大小限制。
    pub fn insert_sized(&self, handle: &str, name: &str, declared_size: u64, mime: Option<&str>) {
        let mut metadata = ContentMetadata::new(name, declared_size);
        if let Some(mime) = mime {
            metadata = metadata.with_mime(mime);
        }
        self.insert_with(handle, Some(metadata), b"payload".to_vec());
    }

    pub fn insert_with(&self, handle: &str, metadata: Option<ContentMetadata>, bytes: Vec<u8>) {
        self.entries
            .lock()
            .expect("lock poisoned")
            .insert(handle.to_string(), Entry { metadata, bytes });
    }

    pub fn fail_open(&self, handle: &str) {
        self.unreadable
            .lock()
            .expect("lock poisoned")
            .insert(handle.to_string());
    }

    /// 元数据查询返回 I/O 错误（而不是无记录）。
    pub fn fail_query(&self, handle: &str) {
        self.failing_queries
            .lock()
            .expect("lock poisoned")
            .insert(handle.to_string());
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("lock poisoned").clone()
    }
}

impl ContentResolver for MemoryResolver {
    fn query_metadata(&self, handle: &ContentHandle) -> io::Result<Option<ContentMetadata>> {
        if self
            .failing_queries
            .lock()
            .expect("lock poisoned")
            .contains(handle.as_str())
        {
            return Err(io::Error::other("provider crashed"));
        }

        Ok(self
            .entries
            .lock()
            .expect("lock poisoned")
            .get(handle.as_str())
            .and_then(|entry| entry.metadata.clone()))
    }

    fn open_stream(&self, handle: &ContentHandle) -> io::Result<Box<dyn Read + Send>> {
        self.opened
            .lock()
            .expect("lock poisoned")
            .push(handle.as_str().to_string());

        if self.unreadable.lock().expect("lock poisoned").contains(handle.as_str()) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "revoked"));
        }

        let entries = self.entries.lock().expect("lock poisoned");
        let entry = entries
            .get(handle.as_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such content"))?;
        Ok(Box::new(Cursor::new(entry.bytes.clone())))
    }
}

#[derive(Default)]
pub struct RecordingOverlay {
    pub calls: Mutex<Vec<&'static str>>,
}

impl RecordingOverlay {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

impl ProgressOverlay for RecordingOverlay {
    fn show_overlay(&self) {
        self.calls.lock().expect("lock poisoned").push("show");
    }

    fn hide_overlay(&self) {
        self.calls.lock().expect("lock poisoned").push("hide");
    }
}

#[derive(Default)]
pub struct RecordingNotices {
    pub received: Mutex<Vec<Advisory>>,
}

impl RecordingNotices {
    pub fn received(&self) -> Vec<Advisory> {
        self.received.lock().expect("lock poisoned").clone()
    }
}

impl NoticeSink for RecordingNotices {
    fn notify(&self, advisory: &Advisory) {
        self.received
            .lock()
            .expect("lock poisoned")
            .push(advisory.clone());
    }
}

/// 可控的权限平台：`answer` 为 `None` 时弹窗不返回结果。
pub struct MockPermissions {
    granted: AtomicBool,
    answer: Option<bool>,
    pub prompts: Mutex<usize>,
}

impl MockPermissions {
    pub fn new(granted: bool, answer: Option<bool>) -> Self {
        Self {
            granted: AtomicBool::new(granted),
            answer,
            prompts: Mutex::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        *self.prompts.lock().expect("lock poisoned")
    }
}

impl PermissionPlatform for MockPermissions {
    fn is_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn prompt(&self) -> oneshot::Receiver<bool> {
        *self.prompts.lock().expect("lock poisoned") += 1;
        let (sender, receiver) = oneshot::channel();
        if let Some(answer) = self.answer {
            self.granted.store(answer, Ordering::SeqCst);
            sender.send(answer).expect("receiver dropped");
        }
        receiver
    }
}

/// 一次测试所需的全部替身。
pub struct Harness {
    pub surface: Arc<ScriptedSurface>,
    pub resolver: Arc<MemoryResolver>,
    pub overlay: Arc<RecordingOverlay>,
    pub notices: Arc<RecordingNotices>,
    pub permissions: Arc<MockPermissions>,
}

impl Harness {
    pub fn new(surface: ScriptedSurface) -> Self {
        Self {
            surface: Arc::new(surface),
            resolver: Arc::new(MemoryResolver::default()),
            overlay: Arc::new(RecordingOverlay::default()),
            notices: Arc::new(RecordingNotices::default()),
            permissions: Arc::new(MockPermissions::new(true, Some(true))),
        }
    }

    pub fn with_permissions(mut self, permissions: MockPermissions) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    pub fn platform(&self) -> PickerPlatform {
        PickerPlatform::new(self.surface.clone(), self.resolver.clone())
            .with_permissions(self.permissions.clone())
            .with_overlay(self.overlay.clone())
            .with_notices(self.notices.clone())
    }

    pub fn picker(&self, config: PickerConfig) -> MediaPicker {
        MediaPicker::new(config, self.platform()).expect("config should be valid")
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 255) as u8, (y % 255) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("failed to encode test image");
    bytes
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
