//! 平台宿主接口与出站载荷

use async_trait::async_trait;

use super::context::{ChannelId, ConversationRef, UserId};

/// 平台能力标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// 消息管理权，视为版主能力
    ManageMessages,
}

/// 出站载荷
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPayload {
    /// 普通文本
    Text(String),
    /// 短暂提示：投递后由平台在给定秒数后删除
    Transient { text: String, expire_after_secs: u64 },
}

impl OutboundPayload {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) => t,
            Self::Transient { text, .. } => text,
        }
    }
}

/// 聊天平台宿主：核心消费平台能力的唯一入口
///
/// 内置命令集合运行期可变（框架可热加载/卸载命令），因此每次解析都重新读取。
#[async_trait]
pub trait ChatHost: Send + Sync {
    /// 当前命令前缀
    fn prefix(&self) -> &str;

    /// 框架内置命令名集合
    async fn built_in_commands(&self) -> Vec<String>;

    /// 向会话上下文投递一条载荷
    async fn deliver(&self, ctx: &ConversationRef, payload: OutboundPayload) -> anyhow::Result<()>;

    /// 身份在上下文内是否持有某能力
    async fn has_capability(&self, user: UserId, ctx: &ConversationRef, cap: Capability) -> bool;

    /// 配置的指定机器人频道；None 表示不限制
    fn designated_channel(&self) -> Option<ChannelId>;

    /// 用户的私聊频道；用户拒收私聊时返回 None
    async fn direct_channel(&self, user: UserId) -> Option<ChannelId>;
}

/// 按平台消息长度上限切分文本（按字符计数，避免截断多字节字符）
pub fn split_message_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    text.chars()
        .collect::<Vec<_>>()
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}
