//! # 进度遮罩
//!
//! ## 设计思路
//!
//! 遮罩状态归单个事务所有（存放在 `PipelineState` 中），不使用全局引用，
//! 因此一个事务不可能关闭另一个事务的遮罩。
//!
//! ## 实现思路
//!
//! - `show` / `hide` 用 `AtomicBool::swap` 保证幂等：重复调用只触发一次平台操作。
//! - 真正的界面操作经 `UiDispatcher` 投递到交互线程，后台线程调用也安全。
//! - `ProgressGuard` 采用 RAII：构造时显示，`Drop` 时隐藏，错误路径与 panic 展开都会执行。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::platform::{ProgressOverlay, UiDispatcher};

#[derive(Clone)]
pub struct ProgressNotifier {
    overlay: Arc<dyn ProgressOverlay>,
    dispatcher: Arc<dyn UiDispatcher>,
    visible: Arc<AtomicBool>,
}

impl ProgressNotifier {
    pub fn new(overlay: Arc<dyn ProgressOverlay>, dispatcher: Arc<dyn UiDispatcher>) -> Self {
        Self {
            overlay,
            dispatcher,
            visible: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn show(&self) {
        if self.visible.swap(true, Ordering::SeqCst) {
            return;
        }
        let overlay = Arc::clone(&self.overlay);
        self.dispatcher.dispatch(Box::new(move || overlay.show_overlay()));
    }

    /// 未显示或已隐藏时为空操作。
    pub fn hide(&self) {
        if !self.visible.swap(false, Ordering::SeqCst) {
            return;
        }
        let overlay = Arc::clone(&self.overlay);
        self.dispatcher.dispatch(Box::new(move || overlay.hide_overlay()));
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// 显示遮罩并返回守卫，守卫释放时自动隐藏。
    pub fn guard(&self) -> ProgressGuard {
        self.show();
        ProgressGuard {
            notifier: self.clone(),
        }
    }
}

/// 遮罩的 RAII 守卫。
///
/// # 示例
/// ```rust
/// use std::sync::Arc;
/// use media_picker::picker::{InlineDispatcher, NoopOverlay, ProgressNotifier};
///
/// let notifier = ProgressNotifier::new(Arc::new(NoopOverlay), Arc::new(InlineDispatcher));
/// {
///     let _guard = notifier.guard();
///     assert!(notifier.is_visible());
/// }
/// assert!(!notifier.is_visible());
/// ```
pub struct ProgressGuard {
    notifier: ProgressNotifier,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.notifier.hide();
    }
}
