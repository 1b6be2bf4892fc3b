//! # 选择编排模块
//!
//! ## 设计思路
//!
//! `MediaPicker` 驱动一次完整的选择事务：
//! 1. 检查 / 请求权限
//! 2. 按平台上限截断数量，打开选择器
//! 3. 收到结果后在事务专属后台线程上逐条：查大小 → 落地 → 分类 → 读尺寸 → 视频缩略图
//! 4. 汇总为唯一的结果（成功 / 取消 / 错误）
//!
//! 状态机：`Idle → AwaitingPermission → AwaitingSelection → Processing → Completed(..)`，
//! 终止状态只出不进；每次选择都从新的 `Idle` 开始。
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<PickerConfig>>` 支持运行时替换，单次事务只用同一份快照。
//! - 处理阶段在独立命名线程上阻塞执行，结果经 `oneshot` 送回；线程 panic 时发送端被丢弃，
//!   调用方收到 `PickerError::Worker`，保证结果恰好一次。
//! - 任一条目拷贝失败即终止事务，并尽力删除本事务新建的文件；之前事务交给调用方的文件不会被删除。
//! - 记录 `query/copy/classify/total` 阶段耗时。

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use super::classifier::{classify, classify_local, make_video_thumbnail, probe_dimensions};
use super::fs_platform::{GrantedPermissions, InlineDispatcher, LogNoticeSink, NoopOverlay};
use super::materializer::{FileMaterializer, MaterializedFile, NameRegistry};
use super::notice::{self, Advisory};
use super::permission::PermissionGate;
use super::platform::{
    ContentResolver, NoticeSink, PermissionPlatform, PickerSurface, ProgressOverlay, UiDispatcher,
};
use super::progress::ProgressNotifier;
use super::source::{ContentHandle, ContentMetadata, MediaDescriptor, MediaKind, PickOutcome, PickResult};
use super::{PickOptions, PickRequest, PickerConfig, PickerError, ScanPolicy};

/// 事务终止方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    Cancelled,
    Error,
}

/// 选择事务状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Idle,
    AwaitingPermission,
    AwaitingSelection,
    Processing,
    Completed(Completion),
}

impl PickerState {
    /// 状态迁移是否合法。
    pub fn can_transition_to(self, next: PickerState) -> bool {
        use PickerState::*;

        matches!(
            (self, next),
            (Idle, AwaitingPermission)
                | (Idle, AwaitingSelection)
                | (AwaitingPermission, AwaitingSelection)
                | (AwaitingPermission, Completed(Completion::Error))
                | (AwaitingSelection, Processing)
                | (AwaitingSelection, Completed(_))
                | (Processing, Completed(_))
        )
    }
}

struct Transaction {
    id: u64,
    state: PickerState,
}

impl Transaction {
    fn new(id: u64) -> Self {
        Self {
            id,
            state: PickerState::Idle,
        }
    }

    fn advance(&mut self, next: PickerState) {
        if !self.state.can_transition_to(next) {
            log::error!("❌ 事务 #{} 非法状态迁移：{:?} → {:?}", self.id, self.state, next);
            debug_assert!(false, "illegal picker state transition");
        }
        log::debug!("🔁 事务 #{}：{:?} → {:?}", self.id, self.state, next);
        self.state = next;
    }
}

/// 平台能力集合。
///
/// 只有选择器界面与内容读取是必需的，其余能力默认使用桌面实现。
#[derive(Clone)]
pub struct PickerPlatform {
    permissions: Arc<dyn PermissionPlatform>,
    surface: Arc<dyn PickerSurface>,
    resolver: Arc<dyn ContentResolver>,
    overlay: Arc<dyn ProgressOverlay>,
    dispatcher: Arc<dyn UiDispatcher>,
    notices: Arc<dyn NoticeSink>,
}

impl PickerPlatform {
    pub fn new(surface: Arc<dyn PickerSurface>, resolver: Arc<dyn ContentResolver>) -> Self {
        Self {
            permissions: Arc::new(GrantedPermissions),
            surface,
            resolver,
            overlay: Arc::new(NoopOverlay),
            dispatcher: Arc::new(InlineDispatcher),
            notices: Arc::new(LogNoticeSink),
        }
    }

    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionPlatform>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_overlay(mut self, overlay: Arc<dyn ProgressOverlay>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn UiDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }
}

/// 处理阶段的产出。
struct ProcessingReport {
    outcome: PickOutcome,
    skipped: usize,
}

/// 单个事务的临时状态，只在该事务的后台线程上存活。
pub(crate) struct PipelineState {
    transaction_id: u64,
    request: PickRequest,
    raw_handles: Vec<ContentHandle>,
    size_limit_exceeded: bool,
    skipped: usize,
    accumulated: Vec<MediaDescriptor>,
    /// 本事务新建的文件（含缩略图），中止时只清理这些。
    owned_files: Vec<PathBuf>,
    progress: ProgressNotifier,
}

impl PipelineState {
    fn new(
        transaction_id: u64,
        request: PickRequest,
        raw_handles: Vec<ContentHandle>,
        progress: ProgressNotifier,
    ) -> Self {
        Self {
            transaction_id,
            request,
            raw_handles,
            size_limit_exceeded: false,
            skipped: 0,
            accumulated: Vec::new(),
            owned_files: Vec::new(),
            progress,
        }
    }

    fn run(
        mut self,
        materializer: &FileMaterializer,
        config: &PickerConfig,
    ) -> Result<ProcessingReport, PickerError> {
        let _progress = self.progress.guard();
        let total_start = Instant::now();
        let mut query_elapsed = Duration::ZERO;
        let mut copy_elapsed = Duration::ZERO;
        let mut classify_elapsed = Duration::ZERO;

        let mut names = NameRegistry::new(config.unique_names);
        let max_items = self.request.max_item_count() as usize;
        let handles = std::mem::take(&mut self.raw_handles);

        log::info!(
            "📥 事务 #{} 开始处理 {} 个条目（上限 {}，策略 {:?}）",
            self.transaction_id,
            handles.len(),
            max_items,
            config.scan_policy
        );

        for (index, handle) in handles.iter().enumerate() {
            let limit_reached = match config.scan_policy {
                ScanPolicy::Positional => index >= max_items,
                ScanPolicy::Accepted => self.accumulated.len() >= max_items,
            };
            if limit_reached {
                log::info!(
                    "✂️ 事务 #{} 已达数量上限，忽略剩余 {} 个条目",
                    self.transaction_id,
                    handles.len() - index
                );
                break;
            }

            if self.request.has_size_limit() {
                let query_start = Instant::now();
                let metadata = match materializer.query_metadata(handle) {
                    Ok(metadata) => metadata,
                    Err(err) => return Err(self.abort(err)),
                };
                query_elapsed += query_start.elapsed();

                if self.exceeds_size_limit(metadata.as_ref()) {
                    log::info!("📏 条目超出大小限制，已跳过：{}", handle);
                    self.size_limit_exceeded = true;
                    self.skipped += 1;
                    continue;
                }
            }

            let copy_start = Instant::now();
            let file = match materializer.copy_into(handle, self.request.subdirectory(), &mut names) {
                Ok(file) => file,
                Err(err) => return Err(self.abort(err)),
            };
            copy_elapsed += copy_start.elapsed();

            if file.created {
                self.owned_files.push(file.path.clone());
            }

            let classify_start = Instant::now();
            let descriptor = describe(&file, config);
            classify_elapsed += classify_start.elapsed();

            if let Some(thumbnail) = &descriptor.thumbnail_path {
                self.owned_files.push(thumbnail.clone());
            }
            self.accumulated.push(descriptor);
        }

        log::info!(
            "✅ 事务 #{} 处理完成 - 接收 {} 个，跳过 {} 个；query={}ms copy={}ms classify={}ms total={}ms",
            self.transaction_id,
            self.accumulated.len(),
            self.skipped,
            query_elapsed.as_millis(),
            copy_elapsed.as_millis(),
            classify_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(ProcessingReport {
            outcome: PickOutcome {
                media: std::mem::take(&mut self.accumulated),
                cancelled: false,
                size_limit_exceeded: self.size_limit_exceeded,
            },
            skipped: self.skipped,
        })
    }

    fn exceeds_size_limit(&self, metadata: Option<&ContentMetadata>) -> bool {
        let (size_mb, kind) = metadata
            .map(|meta| {
                (
                    meta.size_mb(),
                    classify(&meta.display_name, meta.mime_type.as_deref()),
                )
            })
            .unwrap_or((0.0, MediaKind::Image));

        match self.request.size_limit_for(kind) {
            Some(limit) => size_mb > limit,
            None => false,
        }
    }

    /// 作废整批：只删除本事务新建的文件，被覆盖的已有文件保留；返回原错误。
    fn abort(&mut self, error: PickerError) -> PickerError {
        log::error!(
            "❌ 事务 #{} 中止，丢弃 {} 个已落地条目：{}",
            self.transaction_id,
            self.accumulated.len(),
            error
        );

        self.accumulated.clear();
        for path in self.owned_files.drain(..) {
            if let Err(err) = std::fs::remove_file(&path) {
                log::warn!("⚠️ 清理 {} 失败：{}", path.display(), err);
            }
        }

        error
    }
}

fn describe(file: &MaterializedFile, config: &PickerConfig) -> MediaDescriptor {
    let kind = classify_local(
        &file.path,
        &file.metadata.display_name,
        file.metadata.mime_type.as_deref(),
    );
    let dimensions = probe_dimensions(&file.path);
    let thumbnail_path = if kind.is_video() {
        make_video_thumbnail(&file.path, config)
    } else {
        None
    };

    MediaDescriptor {
        local_path: file.path.clone(),
        is_video: kind.is_video(),
        width: dimensions.width,
        height: dimensions.height,
        thumbnail_path,
    }
}

type WorkerResult = Result<ProcessingReport, PickerError>;

fn spawn_worker(
    pipeline: PipelineState,
    materializer: FileMaterializer,
    config: PickerConfig,
) -> Result<oneshot::Receiver<WorkerResult>, PickerError> {
    let (sender, receiver) = oneshot::channel();

    thread::Builder::new()
        .name(format!("media-picker-tx{}", pipeline.transaction_id))
        .spawn(move || {
            let result = pipeline.run(&materializer, &config);
            let _ = sender.send(result);
        })
        .map_err(|e| PickerError::Worker(format!("无法启动后台处理线程：{}", e)))?;

    Ok(receiver)
}

/// 媒体选择器：对外的三个命令入口（检查权限、请求权限、选择媒体）。
pub struct MediaPicker {
    config: Arc<RwLock<PickerConfig>>,
    platform: PickerPlatform,
    gate: PermissionGate,
    next_transaction: AtomicU64,
}

impl MediaPicker {
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use media_picker::picker::{FsContentResolver, MediaPicker, PickerConfig, PickerPlatform, PickerSurface};
    ///
    /// # fn demo(surface: Arc<dyn PickerSurface>) -> Result<(), media_picker::picker::PickerError> {
    /// let platform = PickerPlatform::new(surface, Arc::new(FsContentResolver));
    /// let picker = MediaPicker::new(PickerConfig::default(), platform)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: PickerConfig, platform: PickerPlatform) -> Result<Self, PickerError> {
        config.validate()?;
        let gate = PermissionGate::new(Arc::clone(&platform.permissions));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            platform,
            gate,
            next_transaction: AtomicU64::new(1),
        })
    }

    /// 获取配置快照，保证单次事务参数一致。
    pub fn config_snapshot(&self) -> Result<PickerConfig, PickerError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| PickerError::Worker("配置读取锁已中毒".to_string()))
    }

    /// 替换运行时配置；进行中的事务不受影响。
    pub fn set_config(&self, config: PickerConfig) -> Result<(), PickerError> {
        config.validate()?;
        let mut current = self
            .config
            .write()
            .map_err(|_| PickerError::Worker("配置写入锁已中毒".to_string()))?;
        *current = config;
        log::info!("⚙️ 选择器配置已更新：{:?}", *current);
        Ok(())
    }

    pub fn check_permission(&self) -> bool {
        self.gate.has_permission()
    }

    pub async fn request_permission(&self) -> bool {
        self.gate.request().await
    }

    /// 请求平台关闭正在展示的选择器。
    pub fn close_picker(&self) {
        log::info!("🚪 请求关闭选择器");
        self.platform.surface.dismiss();
    }

    /// 处理主入口：校验参数并执行一次完整的选择事务。
    ///
    /// # 示例
    /// ```rust,ignore
    /// let outcome = picker
    ///     .pick_media(PickOptions { maximum_images_count: Some(5), ..Default::default() })
    ///     .await?;
    /// for item in &outcome.media {
    ///     println!("{}", item.local_path.display());
    /// }
    /// ```
    pub async fn pick_media(&self, options: PickOptions) -> Result<PickOutcome, PickerError> {
        let config = self.config_snapshot()?;
        let request = options.into_request(&config)?;
        self.run_transaction(request, config).await
    }

    /// 以已校验的请求执行选择事务。
    pub async fn pick_with_request(&self, request: PickRequest) -> Result<PickOutcome, PickerError> {
        let config = self.config_snapshot()?;
        self.run_transaction(request, config).await
    }

    async fn run_transaction(
        &self,
        request: PickRequest,
        config: PickerConfig,
    ) -> Result<PickOutcome, PickerError> {
        let mut transaction = Transaction::new(self.next_transaction.fetch_add(1, Ordering::Relaxed));
        let started = Instant::now();

        let result = self.drive(&mut transaction, request, config).await;

        let completion = match &result {
            Ok(outcome) if outcome.cancelled => Completion::Cancelled,
            Ok(_) => Completion::Success,
            Err(_) => Completion::Error,
        };
        transaction.advance(PickerState::Completed(completion));

        match &result {
            Ok(outcome) => log::info!(
                "🏁 事务 #{} 结束：{:?}，{} 个条目，耗时 {}ms",
                transaction.id,
                completion,
                outcome.len(),
                started.elapsed().as_millis()
            ),
            Err(err) => log::warn!(
                "🏁 事务 #{} 失败 [{}:{}]：{}",
                transaction.id,
                err.stage(),
                err.code(),
                err
            ),
        }

        result
    }

    async fn drive(
        &self,
        transaction: &mut Transaction,
        request: PickRequest,
        config: PickerConfig,
    ) -> Result<PickOutcome, PickerError> {
        if !self.gate.has_permission() {
            transaction.advance(PickerState::AwaitingPermission);
            if !self.gate.request().await {
                return Err(PickerError::PermissionDenied);
            }
        }
        transaction.advance(PickerState::AwaitingSelection);

        let (request, clamped) = request.clamp_to(self.platform.surface.selection_limit());
        if let Some(advisory) = clamped {
            self.publish(advisory);
        }
        self.publish(Advisory::SelectionLimit {
            limit: request.max_item_count(),
            broad_picker: request.use_broad_picker(),
        });

        log::info!(
            "📷 事务 #{} 打开选择器（上限 {}，视频 {}，文件选择器 {}）",
            transaction.id,
            request.max_item_count(),
            request.allow_video(),
            request.use_broad_picker()
        );

        let result = self.platform.surface.present(&request).await.map_err(|_| {
            log::warn!("⚠️ 事务 #{} 选择器未返回结果", transaction.id);
            PickerError::NoSelection
        })?;

        let handles = match result {
            PickResult::Cancelled {
                message: Some(message),
            } if !message.trim().is_empty() => {
                return Err(PickerError::PlatformReported(message));
            }
            PickResult::Cancelled { .. } => {
                log::info!("🙅 事务 #{} 用户取消选择", transaction.id);
                return Ok(PickOutcome::cancelled());
            }
            PickResult::Selected(handles) => handles,
        };

        transaction.advance(PickerState::Processing);

        let materializer = FileMaterializer::new(
            Arc::clone(&self.platform.resolver),
            config.storage_root.clone(),
            config.copy_chunk_size,
        );
        let progress = ProgressNotifier::new(
            Arc::clone(&self.platform.overlay),
            Arc::clone(&self.platform.dispatcher),
        );
        let pipeline = PipelineState::new(transaction.id, request, handles, progress);

        let report = spawn_worker(pipeline, materializer, config)?
            .await
            .map_err(|_| PickerError::Worker("后台处理线程异常退出".to_string()))??;

        if report.skipped > 0 {
            self.publish(Advisory::SizeLimitExceeded {
                skipped: report.skipped,
            });
        }

        Ok(report.outcome)
    }

    fn publish(&self, advisory: Advisory) {
        notice::publish(&self.platform.dispatcher, &self.platform.notices, advisory);
    }
}
