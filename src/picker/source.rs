//! # 数据模型
//!
//! ## 设计思路
//!
//! 区分“平台拥有的输入”和“流水线产出”：
//! - `ContentHandle` / `ContentMetadata` / `PickResult` 来自平台，核心不拥有其资源
//! - `MediaDescriptor` / `PickOutcome` 由流水线产出，返回后归调用方所有

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 平台媒体条目的不透明引用（类似 URI）。
///
/// 仅在本次选择事务内有效。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// 元数据查询结果。
#[derive(Debug, Clone, PartialEq)]
pub struct ContentMetadata {
    /// 展示名（通常带扩展名）。
    pub display_name: String,
    /// 字节数。
    pub size_bytes: u64,
    /// 平台给出的 MIME 类型（可能缺失）。
    pub mime_type: Option<String>,
}

impl ContentMetadata {
    pub fn new(display_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            display_name: display_name.into(),
            size_bytes,
            mime_type: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    /// 按二进制 MB（1024×1024）换算。
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }
}

pub(crate) fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// 选择器界面的返回结果。
///
/// “无结果”不在枚举里：平台丢弃发送端即表示无结果。
#[derive(Debug, Clone, PartialEq)]
pub enum PickResult {
    /// 正常返回，按选择顺序排列（可为空）。
    Selected(Vec<ContentHandle>),
    /// 取消；带消息表示平台报错，不带消息表示用户主动取消。
    Cancelled { message: Option<String> },
}

impl PickResult {
    pub fn cancelled() -> Self {
        Self::Cancelled { message: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }
}

/// 图片头信息中的宽高；无法读取时为 0×0。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// 单个已落地媒体的描述。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDescriptor {
    #[serde(rename = "path")]
    pub local_path: PathBuf,
    #[serde(rename = "isVideo")]
    pub is_video: bool,
    pub width: u32,
    pub height: u32,
    /// 仅视频有；生成失败时为空。
    #[serde(rename = "thumbnail", skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
}

/// 一次选择事务的唯一结果。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PickOutcome {
    /// 按选择顺序排列，长度不超过 `max_item_count`。
    pub media: Vec<MediaDescriptor>,
    /// 用户主动取消（空结果仍视为成功）。
    pub cancelled: bool,
    /// 是否有条目因超出大小限制被跳过。
    #[serde(rename = "sizeLimitExceeded")]
    pub size_limit_exceeded: bool,
}

impl PickOutcome {
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}
