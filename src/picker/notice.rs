//! # 提示通知
//!
//! 非致命情况（数量被截断、条目超出大小限制）以提示形式发出，
//! 不改变事务结果。投递是“发出即忘”：经 `UiDispatcher` 转到交互线程后交给 `NoticeSink`。

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::platform::{NoticeSink, UiDispatcher};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// 请求数量超过平台硬上限，已截断。
    CountClamped { requested: u32, limit: u32 },
    /// 派发时提示本次可选数量。
    SelectionLimit { limit: u32, broad_picker: bool },
    /// 有条目超出大小限制，被跳过。
    SizeLimitExceeded { skipped: usize },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountClamped { requested, limit } => write!(
                f,
                "请求数量 {} 超过设备可选上限 {}，本次最多可选 {} 个",
                requested, limit, limit
            ),
            Self::SelectionLimit {
                limit,
                broad_picker: true,
            } => write!(f, "仅保留前 {} 个所选媒体", limit),
            Self::SelectionLimit {
                limit,
                broad_picker: false,
            } => write!(f, "最多可选择 {} 个媒体", limit),
            Self::SizeLimitExceeded { skipped } => {
                write!(f, "有 {} 个媒体超过大小限制，未被选取", skipped)
            }
        }
    }
}

/// 发出提示，不等待展示完成。
pub(crate) fn publish(
    dispatcher: &Arc<dyn UiDispatcher>,
    sink: &Arc<dyn NoticeSink>,
    advisory: Advisory,
) {
    log::info!("💬 提示：{}", advisory);
    let sink = Arc::clone(sink);
    dispatcher.dispatch(Box::new(move || sink.notify(&advisory)));
}
