//! 解析协议：单条入站消息的五态判定
//!
//! 判定顺序固定：忽略 → 移交框架 → 精确 FAQ（过范围门）→ 建议 → 静默。
//! 顺序不可重排：内置命令与 FAQ 键同名时必须移交框架，绝不能抢答。
//! 任何畸形输入都不报错；"无命中也无建议"是合法的静默结果。

use std::sync::Arc;

use tracing::debug;

use crate::platform::{Capability, ChatHost, InboundMessage};

use super::error::StoreError;
use super::matcher;
use super::store::FaqStore;

/// 解析结果：调用方按变体分发
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// 非命令消息或机器人自身消息；静默无建议也归于此，终态
    Ignored,
    /// 命中框架内置命令，移交框架的命令机制处理，终态
    Deferred,
    /// 精确命中 FAQ 且通过范围门，携带答案文本
    Answer(String),
    /// 未精确命中但存在相近候选
    Suggestion(Vec<String>),
    /// 范围门拒绝；不泄露 FAQ 文本
    Rejected(RejectReason),
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// 不在指定机器人频道，且发送者无版主能力
    NotInBotChannel,
}

/// 无状态解析器：组合存储、匹配器与平台能力查询
pub struct Resolver {
    store: Arc<dyn FaqStore>,
    host: Arc<dyn ChatHost>,
}

impl Resolver {
    pub fn new(store: Arc<dyn FaqStore>, host: Arc<dyn ChatHost>) -> Self {
        Self { store, host }
    }

    /// 解析单条入站消息；只有后端存储故障会返回 Err
    pub async fn resolve(&self, message: &InboundMessage) -> Result<Resolution, StoreError> {
        if message.author_is_bot {
            return Ok(Resolution::Ignored);
        }
        let Some(stripped) = message.content.strip_prefix(self.host.prefix()) else {
            return Ok(Resolution::Ignored);
        };
        let Some(command) = stripped.split_whitespace().next() else {
            return Ok(Resolution::Ignored);
        };
        let command = command.to_lowercase();

        let built_ins = self.host.built_in_commands().await;
        if built_ins.iter().any(|name| name == &command) {
            debug!(command = %command, "deferred to framework command");
            return Ok(Resolution::Deferred);
        }

        if let Some(text) = self.store.get(&command).await? {
            if self.allowed_in_scope(message).await {
                return Ok(Resolution::Answer(text));
            }
            debug!(command = %command, channel = message.context.channel, "faq rejected by channel scope");
            return Ok(Resolution::Rejected(RejectReason::NotInBotChannel));
        }

        let candidates = self.store.keys().await?.into_iter().chain(built_ins);
        let closest = matcher::suggest(&command, candidates);
        if closest.is_empty() {
            Ok(Resolution::Ignored)
        } else {
            Ok(Resolution::Suggestion(closest))
        }
    }

    /// 范围门：未配置指定频道、私聊、就在指定频道，三者任一即放行；
    /// 否则要求发送者持有消息管理权
    pub async fn allowed_in_scope(&self, message: &InboundMessage) -> bool {
        let Some(designated) = self.host.designated_channel() else {
            return true;
        };
        if message.context.is_direct() {
            return true;
        }
        if message.context.channel == designated {
            return true;
        }
        self.host
            .has_capability(message.author, &message.context, Capability::ManageMessages)
            .await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use crate::platform::{ChannelId, ConversationRef, OutboundPayload, UserId};

    use super::super::store::MemoryFaqStore;
    use super::*;

    const MODERATOR: UserId = 10;
    const MEMBER: UserId = 20;
    const BOT_CHANNEL: ChannelId = 100;
    const OTHER_CHANNEL: ChannelId = 200;

    struct TestHost {
        built_ins: RwLock<Vec<String>>,
        designated: Option<ChannelId>,
    }

    impl TestHost {
        fn new(designated: Option<ChannelId>) -> Self {
            Self {
                built_ins: RwLock::new(vec!["help".to_string(), "reload".to_string()]),
                designated,
            }
        }
    }

    #[async_trait]
    impl ChatHost for TestHost {
        fn prefix(&self) -> &str {
            "$"
        }

        async fn built_in_commands(&self) -> Vec<String> {
            self.built_ins.read().await.clone()
        }

        async fn deliver(
            &self,
            _ctx: &ConversationRef,
            _payload: OutboundPayload,
        ) -> anyhow::Result<()> {
            Ok(())
        }

        async fn has_capability(
            &self,
            user: UserId,
            _ctx: &ConversationRef,
            _cap: Capability,
        ) -> bool {
            user == MODERATOR
        }

        fn designated_channel(&self) -> Option<ChannelId> {
            self.designated
        }

        async fn direct_channel(&self, user: UserId) -> Option<ChannelId> {
            Some(user + 1000)
        }
    }

    async fn resolver_with(designated: Option<ChannelId>) -> Resolver {
        let store = MemoryFaqStore::new();
        store.create("rates", "exp rates listing").await.unwrap();
        store.create("patch", "run the patcher").await.unwrap();
        Resolver::new(
            std::sync::Arc::new(store),
            std::sync::Arc::new(TestHost::new(designated)),
        )
    }

    fn message(author: UserId, content: &str, channel: ChannelId) -> InboundMessage {
        InboundMessage::new(author, content, ConversationRef::guild(channel))
    }

    #[tokio::test]
    async fn test_bot_author_ignored() {
        let resolver = resolver_with(None).await;
        let mut msg = message(MEMBER, "$rates", BOT_CHANNEL);
        msg.author_is_bot = true;
        assert_eq!(resolver.resolve(&msg).await.unwrap(), Resolution::Ignored);
    }

    #[tokio::test]
    async fn test_no_prefix_ignored() {
        let resolver = resolver_with(None).await;
        let msg = message(MEMBER, "rates", BOT_CHANNEL);
        assert_eq!(resolver.resolve(&msg).await.unwrap(), Resolution::Ignored);
    }

    #[tokio::test]
    async fn test_prefix_only_ignored() {
        let resolver = resolver_with(None).await;
        let msg = message(MEMBER, "$   ", BOT_CHANNEL);
        assert_eq!(resolver.resolve(&msg).await.unwrap(), Resolution::Ignored);
    }

    #[tokio::test]
    async fn test_built_in_beats_store_key() {
        let store = MemoryFaqStore::new();
        // "help" 同时是内置命令和 FAQ 键：必须移交框架，不得抢答
        store.create("help", "shadowed answer").await.unwrap();
        let resolver = Resolver::new(
            std::sync::Arc::new(store),
            std::sync::Arc::new(TestHost::new(None)),
        );
        let msg = message(MEMBER, "$help", BOT_CHANNEL);
        assert_eq!(resolver.resolve(&msg).await.unwrap(), Resolution::Deferred);
    }

    #[tokio::test]
    async fn test_exact_match_answers() {
        let resolver = resolver_with(None).await;
        let msg = message(MEMBER, "$RATES extra words", BOT_CHANNEL);
        assert_eq!(
            resolver.resolve(&msg).await.unwrap(),
            Resolution::Answer("exp rates listing".to_string())
        );
    }

    #[tokio::test]
    async fn test_near_miss_suggests_store_and_built_ins() {
        let resolver = resolver_with(None).await;
        let msg = message(MEMBER, "$hlp", BOT_CHANNEL);
        // "hlp" 接近内置的 "help"
        assert_eq!(
            resolver.resolve(&msg).await.unwrap(),
            Resolution::Suggestion(vec!["help".to_string()])
        );
    }

    #[tokio::test]
    async fn test_no_match_no_suggestion_is_silent() {
        let resolver = resolver_with(None).await;
        let msg = message(MEMBER, "$zzzzzz", BOT_CHANNEL);
        assert_eq!(resolver.resolve(&msg).await.unwrap(), Resolution::Ignored);
    }

    #[tokio::test]
    async fn test_scope_gate_rejects_member_outside_bot_channel() {
        let resolver = resolver_with(Some(BOT_CHANNEL)).await;
        let msg = message(MEMBER, "$rates", OTHER_CHANNEL);
        assert_eq!(
            resolver.resolve(&msg).await.unwrap(),
            Resolution::Rejected(RejectReason::NotInBotChannel)
        );
    }

    #[tokio::test]
    async fn test_scope_gate_allows_member_in_bot_channel() {
        let resolver = resolver_with(Some(BOT_CHANNEL)).await;
        let msg = message(MEMBER, "$rates", BOT_CHANNEL);
        assert!(matches!(
            resolver.resolve(&msg).await.unwrap(),
            Resolution::Answer(_)
        ));
    }

    #[tokio::test]
    async fn test_scope_gate_allows_moderator_anywhere() {
        let resolver = resolver_with(Some(BOT_CHANNEL)).await;
        let msg = message(MODERATOR, "$rates", OTHER_CHANNEL);
        assert!(matches!(
            resolver.resolve(&msg).await.unwrap(),
            Resolution::Answer(_)
        ));
    }

    #[tokio::test]
    async fn test_scope_gate_allows_direct_message() {
        let resolver = resolver_with(Some(BOT_CHANNEL)).await;
        let msg = InboundMessage::new(MEMBER, "$rates", ConversationRef::direct(999));
        assert!(matches!(
            resolver.resolve(&msg).await.unwrap(),
            Resolution::Answer(_)
        ));
    }
}
