//! FAQ 核心
//!
//! - **store**: 键→答案文本的持久存储（内存 / SQLite 两种实现）
//! - **matcher**: 未命中时的模糊匹配建议
//! - **resolver**: 单条消息的五态解析协议
//! - **admin**: 管理命令面（add / update / alias / remove / commands）
//! - **error**: 存储错误分类

mod admin;
mod error;
mod matcher;
mod resolver;
mod store;

pub use admin::{AdminCommand, AdminOutcome, AdminSurface};
pub use error::StoreError;
pub use matcher::suggest;
pub use resolver::{RejectReason, Resolution, Resolver};
pub use store::{create_faq_store, default_entries, FaqStore, MemoryFaqStore, SqliteFaqStore};
