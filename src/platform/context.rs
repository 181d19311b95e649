//! 会话上下文类型
//!
//! 平台提供已鉴权的身份与频道引用，这里只做承载，不做任何校验。

use serde::{Deserialize, Serialize};

/// 频道 ID（平台雪花 ID）
pub type ChannelId = u64;

/// 用户 ID
pub type UserId = u64;

/// 会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    /// 服务器频道
    Guild,
    /// 私聊；指定频道限制对私聊不适用
    Direct,
}

/// 会话上下文引用：投递与权限判断的目标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRef {
    pub channel: ChannelId,
    pub kind: ConversationKind,
    /// 平台附加元数据（服务器 ID 等），核心不解释
    pub metadata: Option<serde_json::Value>,
}

impl ConversationRef {
    pub fn guild(channel: ChannelId) -> Self {
        Self {
            channel,
            kind: ConversationKind::Guild,
            metadata: None,
        }
    }

    pub fn direct(channel: ChannelId) -> Self {
        Self {
            channel,
            kind: ConversationKind::Direct,
            metadata: None,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.kind, ConversationKind::Direct)
    }
}

/// 入站消息：解析协议的唯一输入
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author: UserId,
    /// 发送者是否为机器人；机器人消息一律忽略
    pub author_is_bot: bool,
    pub content: String,
    pub context: ConversationRef,
}

impl InboundMessage {
    pub fn new(author: UserId, content: impl Into<String>, context: ConversationRef) -> Self {
        Self {
            author,
            author_is_bot: false,
            content: content.into(),
            context,
        }
    }
}
