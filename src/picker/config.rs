//! # 配置模块
//!
//! ## 设计思路
//!
//! 两类配置分开管理：
//! - `PickerConfig`：运行时策略（存储根目录、拷贝分块、扫描策略、缩略图参数），
//!   可从 JSON 设置文件加载，运行中可整体替换。
//! - `PickOptions` → `PickRequest`：单次选择请求。调用方传入的松散 JSON 在边界处
//!   一次性校验并补默认值，之后流水线只接触不可变的 `PickRequest`。
//!
//! ## 实现思路
//!
//! - `Default` 给出可直接使用的配置。
//! - `validate` 拒绝越界参数，返回 `PickerError::InvalidConfig`。
//! - `PickRequest::clamp_to` 处理平台硬上限，并产出对应的提示。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::notice::Advisory;
use super::source::MediaKind;
use super::PickerError;

pub const DEFAULT_MAX_ITEMS: u32 = 20;
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 64 * 1024;
const MIN_COPY_CHUNK_SIZE: usize = 1024;
const MAX_COPY_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// 数量上限的截断方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// 只扫描前 `max_item_count` 个位置，被大小限制跳过的条目也占位。
    #[default]
    Positional,
    /// 一直扫描到接收数量达到上限。
    Accepted,
}

/// 选择流水线运行时配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// 进程私有存储根目录。
    pub storage_root: PathBuf,
    /// 流式拷贝的分块大小（字节）。
    pub copy_chunk_size: usize,
    pub scan_policy: ScanPolicy,
    /// 同一事务内同名文件是否自动改名（`a.jpg` → `a-1.jpg`）。
    pub unique_names: bool,
    /// 视频占位缩略图边长（像素）。
    pub thumbnail_size: u32,
    /// 占位缩略图填充色（RGB）。
    pub thumbnail_color: [u8; 3],
    /// 占位缩略图 JPEG 质量（1~100）。
    pub thumbnail_quality: u8,
    /// 请求未指定数量时的默认上限。
    pub default_max_items: u32,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            storage_root: std::env::temp_dir().join("media-picker"),
            copy_chunk_size: DEFAULT_COPY_CHUNK_SIZE,
            scan_policy: ScanPolicy::Positional,
            unique_names: true,
            thumbnail_size: 500,
            thumbnail_color: [68, 68, 68],
            thumbnail_quality: 80,
            default_max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl PickerConfig {
    /// 以指定存储根目录创建默认配置。
    pub fn with_storage_root(root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: root.into(),
            ..Self::default()
        }
    }

    /// 从 JSON 设置文件加载；缺失字段取默认值。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use media_picker::picker::PickerConfig;
    ///
    /// let config = PickerConfig::from_json_file("picker.json".as_ref())?;
    /// # Ok::<(), media_picker::picker::PickerError>(())
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self, PickerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PickerError::InvalidConfig(format!("读取配置文件 '{}' 失败：{}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PickerError::InvalidConfig(format!("解析配置文件失败：{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PickerError> {
        if self.storage_root.as_os_str().is_empty() {
            return Err(PickerError::InvalidConfig("storage_root 不能为空".to_string()));
        }
        if !(MIN_COPY_CHUNK_SIZE..=MAX_COPY_CHUNK_SIZE).contains(&self.copy_chunk_size) {
            return Err(PickerError::InvalidConfig(format!(
                "copy_chunk_size 必须在 {}~{} 字节之间",
                MIN_COPY_CHUNK_SIZE, MAX_COPY_CHUNK_SIZE
            )));
        }
        if !(16..=4096).contains(&self.thumbnail_size) {
            return Err(PickerError::InvalidConfig(
                "thumbnail_size 必须在 16~4096 像素之间".to_string(),
            ));
        }
        if !(1..=100).contains(&self.thumbnail_quality) {
            return Err(PickerError::InvalidConfig(
                "thumbnail_quality 必须在 1~100 之间".to_string(),
            ));
        }
        if self.default_max_items < 1 {
            return Err(PickerError::InvalidConfig("default_max_items 不能小于 1".to_string()));
        }
        Ok(())
    }
}

/// 调用方传入的原始选择参数（JSON 键与前端约定一致）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickOptions {
    #[serde(rename = "maximumImagesCount")]
    pub maximum_images_count: Option<i64>,
    /// 单个条目大小上限（MB）。
    #[serde(rename = "maxFileSize")]
    pub max_file_size: Option<f64>,
    /// 视频单独的大小上限（MB）；未设置时视频沿用 `maxFileSize`。
    #[serde(rename = "maxVideoSize")]
    pub max_video_size: Option<f64>,
    #[serde(rename = "useFilePicker")]
    pub use_file_picker: bool,
    #[serde(rename = "allow_video")]
    pub allow_video: bool,
    /// 存储根目录下的一级子目录。
    pub subdirectory: Option<String>,
}

impl PickOptions {
    /// 校验并转换为不可变请求。
    pub fn into_request(self, config: &PickerConfig) -> Result<PickRequest, PickerError> {
        let max_item_count = match self.maximum_images_count {
            None => config.default_max_items,
            Some(count) if count < 1 => {
                return Err(PickerError::InvalidConfig(format!(
                    "maximumImagesCount 必须大于等于 1（当前：{}）",
                    count
                )));
            }
            Some(count) => u32::try_from(count).unwrap_or(u32::MAX),
        };

        let max_item_size_mb = validate_size_limit("maxFileSize", self.max_file_size)?;
        let max_video_size_mb = validate_size_limit("maxVideoSize", self.max_video_size)?;
        let subdirectory = validate_subdirectory(self.subdirectory)?;

        Ok(PickRequest {
            max_item_count,
            max_item_size_mb,
            max_video_size_mb,
            allow_video: self.allow_video,
            use_broad_picker: self.use_file_picker,
            subdirectory,
        })
    }
}

fn validate_size_limit(name: &str, value: Option<f64>) -> Result<Option<f64>, PickerError> {
    match value {
        None => Ok(None),
        Some(mb) if !mb.is_finite() || mb < 0.0 => Err(PickerError::InvalidConfig(format!(
            "{} 必须是非负数（当前：{}）",
            name, mb
        ))),
        Some(mb) => Ok(Some(mb)),
    }
}

fn validate_subdirectory(value: Option<String>) -> Result<Option<String>, PickerError> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // 只允许一级目录
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(PickerError::InvalidConfig(format!(
            "subdirectory 只能是单级目录名（当前：{}）",
            trimmed
        )));
    }

    Ok(Some(trimmed.to_string()))
}

/// 已校验的单次选择请求；派发后不再修改。
#[derive(Debug, Clone, PartialEq)]
pub struct PickRequest {
    max_item_count: u32,
    max_item_size_mb: Option<f64>,
    max_video_size_mb: Option<f64>,
    allow_video: bool,
    use_broad_picker: bool,
    subdirectory: Option<String>,
}

impl PickRequest {
    pub fn max_item_count(&self) -> u32 {
        self.max_item_count
    }

    pub fn max_item_size_mb(&self) -> Option<f64> {
        self.max_item_size_mb
    }

    pub fn max_video_size_mb(&self) -> Option<f64> {
        self.max_video_size_mb
    }

    pub fn allow_video(&self) -> bool {
        self.allow_video
    }

    pub fn use_broad_picker(&self) -> bool {
        self.use_broad_picker
    }

    pub fn subdirectory(&self) -> Option<&str> {
        self.subdirectory.as_deref()
    }

    /// 是否需要在拷贝前查询大小。
    pub fn has_size_limit(&self) -> bool {
        self.max_item_size_mb.is_some() || self.max_video_size_mb.is_some()
    }

    /// 按条目类型取生效的大小上限。
    pub fn size_limit_for(&self, kind: MediaKind) -> Option<f64> {
        match kind {
            MediaKind::Video => self.max_video_size_mb.or(self.max_item_size_mb),
            MediaKind::Image => self.max_item_size_mb,
        }
    }

    /// 按平台硬上限截断数量；发生截断时返回提示。
    pub fn clamp_to(mut self, platform_limit: Option<u32>) -> (Self, Option<Advisory>) {
        match platform_limit {
            Some(limit) if limit >= 1 && self.max_item_count > limit => {
                let advisory = Advisory::CountClamped {
                    requested: self.max_item_count,
                    limit,
                };
                self.max_item_count = limit;
                (self, Some(advisory))
            }
            _ => (self, None),
        }
    }
}
