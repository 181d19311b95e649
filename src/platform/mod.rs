//! 聊天平台协作方接口
//!
//! 网关连接、在线状态、富文本渲染都属于外部协作方；核心只通过本模块的
//! 类型与 [`ChatHost`] trait 消费平台能力：
//! - 向会话上下文投递文本（普通 / 短暂）
//! - 查询身份在上下文内的能力标志（平台侧已完成鉴权）
//! - 读取当前命令前缀与框架内置命令名集合
//! - 读取配置的指定机器人频道

mod context;
mod host;

pub use context::{ChannelId, ConversationKind, ConversationRef, InboundMessage, UserId};
pub use host::{split_message_chunks, Capability, ChatHost, OutboundPayload};
