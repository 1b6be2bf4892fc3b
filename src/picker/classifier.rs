//! # 媒体分类
//!
//! ## 设计思路
//!
//! 判断条目是图片还是视频，并读取图片宽高，全程不做完整解码。
//! 分类失败一律按图片处理（fail-open），不阻断流水线。
//!
//! ## 实现思路
//!
//! 1. MIME 前缀（`video/` / `image/`）
//! 2. 扩展名映射
//! 3. 扩展名未知时，读取已落地文件的 magic bytes（`infer`）
//! 4. 宽高只读图片头（`ImageReader::into_dimensions`），内存与像素面积无关
//! 5. 视频缩略图用纯色占位图，写入失败返回 `None`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, Rgb, RgbImage};

use super::source::{Dimensions, MediaKind};
use super::PickerConfig;

pub(crate) const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "heic", "heif", "tif", "tiff", "avif", "ico",
];

pub(crate) const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "3gp", "3g2", "webm", "mkv", "avi", "wmv", "flv", "mpeg", "mpg", "ts",
    "ogv",
];

/// 只根据名称与 MIME 判断；无法判断时返回 `None`。
fn classify_hint(name: &str, mime_type: Option<&str>) -> Option<MediaKind> {
    if let Some(mime) = mime_type {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("video/") {
            return Some(MediaKind::Video);
        }
        if mime.starts_with("image/") {
            return Some(MediaKind::Image);
        }
    }

    let extension = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())?;

    if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Video)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Image)
    } else {
        None
    }
}

/// 按名称 / MIME 分类，未知一律视为图片。
///
/// # 示例
/// ```rust
/// use media_picker::picker::{classify, MediaKind};
///
/// assert_eq!(classify("clip.MOV", None), MediaKind::Video);
/// assert_eq!(classify("notes.xyz", None), MediaKind::Image);
/// ```
pub fn classify(name: &str, mime_type: Option<&str>) -> MediaKind {
    classify_hint(name, mime_type).unwrap_or(MediaKind::Image)
}

/// 对已落地的文件分类；名称无法判断时读取文件头。
pub fn classify_local(path: &Path, display_name: &str, mime_type: Option<&str>) -> MediaKind {
    if let Some(kind) = classify_hint(display_name, mime_type) {
        return kind;
    }

    match infer::get_from_path(path) {
        Ok(Some(kind)) if kind.matcher_type() == infer::MatcherType::Video => {
            log::debug!("🔎 文件签名识别为视频：{} ({})", path.display(), kind.mime_type());
            MediaKind::Video
        }
        Ok(_) => MediaKind::Image,
        Err(err) => {
            log::debug!("🔎 读取文件签名失败，按图片处理：{}", err);
            MediaKind::Image
        }
    }
}

/// 只读取图片头中的宽高；无法识别时返回 0×0。
pub fn probe_dimensions(path: &Path) -> Dimensions {
    let reader = match ImageReader::open(path).and_then(|reader| reader.with_guessed_format()) {
        Ok(reader) => reader,
        Err(err) => {
            log::debug!("📐 无法打开图片头：{} - {}", path.display(), err);
            return Dimensions::default();
        }
    };

    match reader.into_dimensions() {
        Ok((width, height)) => Dimensions { width, height },
        Err(err) => {
            log::debug!("📐 无法读取图片尺寸：{} - {}", path.display(), err);
            Dimensions::default()
        }
    }
}

/// 为视频生成占位缩略图（固定尺寸纯色 JPEG），文件名唯一。
///
/// 任何 I/O 失败都返回 `None`，不影响整批结果。
pub fn make_video_thumbnail(video_path: &Path, config: &PickerConfig) -> Option<PathBuf> {
    match write_placeholder_thumbnail(config) {
        Ok(path) => {
            log::debug!(
                "🖼️ 已生成视频占位缩略图：{} -> {}",
                video_path.display(),
                path.display()
            );
            Some(path)
        }
        Err(err) => {
            log::warn!("⚠️ 视频缩略图生成失败（{}）：{}", video_path.display(), err);
            None
        }
    }
}

fn write_placeholder_thumbnail(config: &PickerConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.storage_root)?;

    let timestamp = Local::now().format("%Y%m%d%H%M%S%f");
    let file_name = format!("video_thumb_{}_{}.jpg", timestamp, uuid::Uuid::new_v4().simple());
    let path = config.storage_root.join(file_name);

    let size = config.thumbnail_size;
    let placeholder = RgbImage::from_pixel(size, size, Rgb(config.thumbnail_color));

    let write_result = (|| -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = BufWriter::new(File::create(&path)?);
        placeholder.write_with_encoder(JpegEncoder::new_with_quality(
            &mut writer,
            config.thumbnail_quality,
        ))?;
        writer.flush()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = std::fs::remove_file(&path);
        return Err(err);
    }

    Ok(path)
}
