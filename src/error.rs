//! 应用级错误类型
//!
//! # 设计思路
//!
//! 库内各阶段的错误都是 `PickerError`；命令行入口还会遇到参数、I/O 与序列化错误，
//! 统一收敛到 `AppError`，避免 `main` 里散落 `.map_err(|e| e.to_string())`。

use crate::picker::PickerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 选择事务错误
    #[error("{0}")]
    Picker(#[from] PickerError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 结果输出失败
    #[error("输出结果失败: {0}")]
    Output(String),
}

impl AppError {
    /// 稳定错误码；选择事务错误沿用 `PickerError::code`。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Picker(err) => err.code(),
            Self::Io(_) => "io",
            Self::Output(_) => "output",
        }
    }
}
