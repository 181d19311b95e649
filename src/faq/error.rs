//! 存储错误分类
//!
//! 键冲突/缺失是用户可见的类型化结果；后端故障单独归类，需额外上报运维日志。

use thiserror::Error;

/// FAQ 存储操作错误
#[derive(Error, Debug)]
pub enum StoreError {
    /// 键不存在（update / alias 源 / remove）
    #[error("{0} is not a registered command")]
    NotFound(String),

    /// 键已存在（create / alias 目标）
    #[error("{0} is already a registered command")]
    AlreadyExists(String),

    /// 后端存储不可用（基础设施故障，不是用户错误）
    #[error("backing store unavailable: {0}")]
    Backing(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backing(e.to_string())
    }
}
