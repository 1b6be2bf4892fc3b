//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 一次选择事务中所有致命错误都收敛到 `PickerError`，调用侧按分支匹配即可。
//! 非致命情况（超出大小限制、缩略图生成失败）不进入这里，
//! 它们以提示通知或空的可选字段体现。
//!
//! 用户干净地取消选择不是错误，而是 `PickOutcome::cancelled()`。

/// 选择事务统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    #[error("未获得媒体读取权限")]
    PermissionDenied,

    /// 元数据查询、读取流或写入流失败；整批结果作废。
    #[error("无法访问文件：{0}")]
    FileAccess(String),

    #[error("未选择任何媒体")]
    NoSelection,

    /// 选择器以取消状态返回，并附带了错误信息。
    #[error("选择器返回错误：{0}")]
    PlatformReported(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),

    #[error("后台处理异常：{0}")]
    Worker(String),
}

impl PickerError {
    /// 稳定的错误码，供 IPC / CLI 输出。
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::FileAccess(_) => "file_access",
            Self::NoSelection => "no_selection",
            Self::PlatformReported(_) => "platform_error",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Worker(_) => "worker",
        }
    }

    /// 出错所在的事务阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission",
            Self::InvalidConfig(_) => "config",
            Self::NoSelection | Self::PlatformReported(_) => "selection",
            Self::FileAccess(_) | Self::Worker(_) => "processing",
        }
    }

    pub(crate) fn file_access(context: &str, error: impl std::fmt::Display) -> Self {
        Self::FileAccess(format!("{}：{}", context, error))
    }
}

impl From<PickerError> for String {
    fn from(error: PickerError) -> Self {
        error.to_string()
    }
}
