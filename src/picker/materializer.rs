//! # 文件落地模块
//!
//! ## 设计思路
//!
//! 把平台拥有的内容句柄拷贝到进程私有存储，返回稳定的本地路径。
//! 任何失败（元数据查询、打开流、读写中断）都返回 `PickerError::FileAccess`，
//! 由编排层决定整批作废。
//!
//! ## 实现思路
//!
//! - 先查元数据拿展示名，查询失败立即返回，不打开任何流。
//! - 目标路径 = 存储根 + 可选一级子目录 + 展示名（只取文件名部分）。
//! - 固定大小分块流式拷贝；读写流都由作用域持有，任何退出路径都会关闭。
//! - 拷贝中途失败时删除残留的半截文件。

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::platform::ContentResolver;
use super::source::{ContentHandle, ContentMetadata};
use super::PickerError;

/// 一次成功的落地结果。
#[derive(Debug, Clone)]
pub(crate) struct MaterializedFile {
    pub(crate) path: PathBuf,
    pub(crate) metadata: ContentMetadata,
    /// 目标文件是否由本次拷贝新建；覆盖已有文件时为 `false`。
    pub(crate) created: bool,
}

/// 单个事务内的文件名登记，用于避免同名覆盖。
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    enabled: bool,
    used: HashSet<PathBuf>,
}

impl NameRegistry {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            used: HashSet::new(),
        }
    }

    /// 预留目标路径；启用时与本事务已用名称或磁盘上已有文件同名的，追加 `-1`、`-2` 后缀。
    pub(crate) fn reserve(&mut self, dir: &Path, file_name: &str) -> PathBuf {
        let first = dir.join(file_name);
        if !self.enabled {
            return first;
        }

        let mut candidate = first;
        let mut counter = 1u32;
        while self.used.contains(&candidate) || candidate.exists() {
            candidate = dir.join(suffixed_name(file_name, counter));
            counter = counter.saturating_add(1);
        }

        self.used.insert(candidate.clone());
        candidate
    }
}

fn suffixed_name(file_name: &str, counter: u32) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());

    match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, counter, ext.to_string_lossy()),
        None => format!("{}-{}", stem, counter),
    }
}

/// 展示名只保留最后一段，防止写出存储根目录。
fn sanitize_display_name(display_name: &str) -> String {
    let normalized = display_name.replace('\\', "/");
    let candidate = normalized
        .rsplit('/')
        .next()
        .map(str::trim)
        .unwrap_or_default();

    if candidate.is_empty() || candidate == "." || candidate == ".." {
        format!("media_{}", uuid::Uuid::new_v4().simple())
    } else {
        candidate.to_string()
    }
}

/// 内容落地器。
pub struct FileMaterializer {
    resolver: Arc<dyn ContentResolver>,
    storage_root: PathBuf,
    chunk_size: usize,
}

impl FileMaterializer {
    pub fn new(resolver: Arc<dyn ContentResolver>, storage_root: impl Into<PathBuf>, chunk_size: usize) -> Self {
        Self {
            resolver,
            storage_root: storage_root.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// 查询元数据；`Ok(None)` 表示无记录。
    pub fn query_metadata(&self, handle: &ContentHandle) -> Result<Option<ContentMetadata>, PickerError> {
        self.resolver
            .query_metadata(handle)
            .map_err(|e| PickerError::file_access(&format!("查询元数据失败（{}）", handle), e))
    }

    /// 查询大小（二进制 MB）；无记录时返回 0。
    pub fn query_size_mb(&self, handle: &ContentHandle) -> Result<f64, PickerError> {
        Ok(self
            .query_metadata(handle)?
            .map(|meta| meta.size_mb())
            .unwrap_or(0.0))
    }

    /// 拷贝到私有存储，返回本地路径。同名文件直接覆盖。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use media_picker::picker::{ContentHandle, FileMaterializer, FsContentResolver};
    ///
    /// let materializer = FileMaterializer::new(Arc::new(FsContentResolver), "/tmp/media", 64 * 1024);
    /// let local = materializer.copy_to_local_storage(&ContentHandle::new("/home/me/a.jpg"), None)?;
    /// # Ok::<(), media_picker::picker::PickerError>(())
    /// ```
    pub fn copy_to_local_storage(
        &self,
        handle: &ContentHandle,
        subdir: Option<&str>,
    ) -> Result<PathBuf, PickerError> {
        let mut names = NameRegistry::new(false);
        self.copy_into(handle, subdir, &mut names).map(|file| file.path)
    }

    pub(crate) fn copy_into(
        &self,
        handle: &ContentHandle,
        subdir: Option<&str>,
        names: &mut NameRegistry,
    ) -> Result<MaterializedFile, PickerError> {
        let metadata = self.query_metadata(handle)?.ok_or_else(|| {
            PickerError::FileAccess(format!("元数据查询无记录：{}", handle))
        })?;

        let dir = match subdir.filter(|s| !s.is_empty()) {
            Some(sub) => self.storage_root.join(sub),
            None => self.storage_root.clone(),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| PickerError::file_access(&format!("创建目录 '{}' 失败", dir.display()), e))?;

        let file_name = sanitize_display_name(&metadata.display_name);
        let destination = names.reserve(&dir, &file_name);
        let created = !destination.exists();

        let mut input = self
            .resolver
            .open_stream(handle)
            .map_err(|e| PickerError::file_access(&format!("打开读取流失败（{}）", handle), e))?;

        let copied = match self.stream_to_file(&mut input, &destination) {
            Ok(copied) => copied,
            Err(err) => {
                let _ = std::fs::remove_file(&destination);
                return Err(PickerError::file_access(
                    &format!("拷贝 '{}' 失败", destination.display()),
                    err,
                ));
            }
        };

        log::debug!(
            "📄 已落地 {} -> {}（{} bytes）",
            handle,
            destination.display(),
            copied
        );

        Ok(MaterializedFile {
            path: destination,
            metadata,
            created,
        })
    }

    fn stream_to_file(&self, input: &mut dyn Read, destination: &Path) -> io::Result<u64> {
        let mut output = BufWriter::new(File::create(destination)?);
        let mut buffer = vec![0u8; self.chunk_size];
        let mut total: u64 = 0;

        loop {
            let read = match input.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            output.write_all(&buffer[..read])?;
            total = total.saturating_add(read as u64);
        }

        output.flush()?;
        Ok(total)
    }
}
