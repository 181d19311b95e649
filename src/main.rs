//! Windia FAQ Bot - 本地控制台入口
//!
//! 入口：初始化日志、加载配置、打开 FAQ 存储，然后运行控制台回环：
//! 标准输入一行当作一条入站消息，出站投递打印到标准输出。
//! 真正的聊天网关（连接、在线状态、富文本渲染）属于外部协作方，不在本仓库内。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::AsyncBufReadExt;
use tokio::sync::RwLock;

use windia_faq::bot::FaqBot;
use windia_faq::config::load_config;
use windia_faq::faq::{create_faq_store, AdminCommand};
use windia_faq::platform::{
    Capability, ChannelId, ChatHost, ConversationRef, InboundMessage, OutboundPayload, UserId,
};

/// 控制台操作者的固定身份（视为持有消息管理权）
const CONSOLE_USER: UserId = 1;

/// 控制台宿主：前缀与指定频道来自配置，投递即打印
struct ConsoleHost {
    prefix: String,
    designated: Option<ChannelId>,
    built_ins: RwLock<Vec<String>>,
}

#[async_trait]
impl ChatHost for ConsoleHost {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn built_in_commands(&self) -> Vec<String> {
        self.built_ins.read().await.clone()
    }

    async fn deliver(&self, ctx: &ConversationRef, payload: OutboundPayload) -> anyhow::Result<()> {
        let target = if ctx.is_direct() { "dm" } else { "channel" };
        match payload {
            OutboundPayload::Text(text) => println!("[windia → {target}] {text}"),
            OutboundPayload::Transient {
                text,
                expire_after_secs,
            } => println!("[windia → {target}] (expires in {expire_after_secs}s) {text}"),
        }
        Ok(())
    }

    async fn has_capability(
        &self,
        user: UserId,
        _ctx: &ConversationRef,
        _cap: Capability,
    ) -> bool {
        user == CONSOLE_USER
    }

    fn designated_channel(&self) -> Option<ChannelId> {
        self.designated
    }

    async fn direct_channel(&self, user: UserId) -> Option<ChannelId> {
        Some(user)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    windia_faq::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let store = create_faq_store(Some(&cfg.store.db_path));

    // 控制台场景下框架内置命令就是管理命令面本身
    let built_ins: Vec<String> = AdminCommand::names().iter().map(|s| s.to_string()).collect();
    let host = Arc::new(ConsoleHost {
        prefix: cfg.bot.prefix.clone(),
        designated: cfg.bot.channel,
        built_ins: RwLock::new(built_ins),
    });

    let bot = FaqBot::new(store, host, Duration::from_millis(cfg.queue.tick_ms));

    tracing::info!(prefix = %cfg.bot.prefix, "windia-faq console ready, Ctrl-D to exit");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let context = ConversationRef::guild(cfg.bot.channel.unwrap_or(1));
    while let Some(line) = lines.next_line().await.context("stdin read failed")? {
        if line.trim().is_empty() {
            continue;
        }
        let message = InboundMessage::new(CONSOLE_USER, line, context.clone());
        bot.handle_message(&message).await;
    }

    // 退出前等待队列排空
    while bot.backlog().await > 0 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Ok(())
}
