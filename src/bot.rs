//! 无头消息运行时：单条入站消息从解析到投递的闭环
//!
//! 解析结果按变体分发：Answer / Suggestion / 拒绝提示进入调度队列投递；
//! Deferred 交还框架命令机制。管理命令先于 FAQ 解析拦截（它们在框架侧
//! 也注册为内置命令），统一过版主能力门后映射到存储操作。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::dispatch::{CommandQueue, InvocationExecutor, PendingInvocation};
use crate::faq::{
    AdminCommand, AdminOutcome, AdminSurface, FaqStore, Resolution, Resolver,
};
use crate::platform::{
    Capability, ChatHost, ConversationRef, InboundMessage, OutboundPayload,
};

/// 范围拒绝等短暂提示的存活秒数
const TRANSIENT_TTL_SECS: u64 = 5;

/// 生产投递回调：把队列条目转成一次 ChatHost::deliver
struct HostExecutor {
    host: Arc<dyn ChatHost>,
}

#[async_trait]
impl InvocationExecutor for HostExecutor {
    async fn execute(&self, invocation: PendingInvocation) -> anyhow::Result<()> {
        self.host
            .deliver(&invocation.context, invocation.payload)
            .await
    }
}

/// FAQ 机器人运行时
pub struct FaqBot {
    host: Arc<dyn ChatHost>,
    resolver: Resolver,
    admin: AdminSurface,
    queue: CommandQueue,
}

impl FaqBot {
    pub fn new(store: Arc<dyn FaqStore>, host: Arc<dyn ChatHost>, tick: Duration) -> Self {
        let executor = Arc::new(HostExecutor { host: host.clone() });
        Self {
            resolver: Resolver::new(store.clone(), host.clone()),
            admin: AdminSurface::new(store, host.clone()),
            queue: CommandQueue::new(executor, tick),
            host,
        }
    }

    /// 处理单条入站消息；所有出站文本统一走调度队列
    pub async fn handle_message(&self, message: &InboundMessage) {
        if let Some(cmd) = self.parse_admin(message) {
            self.handle_admin(cmd, message).await;
            return;
        }

        match self.resolver.resolve(message).await {
            Ok(Resolution::Ignored) => {}
            Ok(Resolution::Deferred) => {
                // 框架自己的命令机制接管；本核心到此为止
                debug!("message deferred to framework");
            }
            Ok(Resolution::Answer(text)) => {
                self.send(message.context.clone(), OutboundPayload::Text(text))
                    .await;
            }
            Ok(Resolution::Suggestion(candidates)) => {
                self.send(
                    message.context.clone(),
                    OutboundPayload::Text(render_suggestions(&candidates)),
                )
                .await;
            }
            Ok(Resolution::Rejected(_)) => {
                self.send(
                    message.context.clone(),
                    OutboundPayload::Transient {
                        text: "Please use this command in the bot channel.".to_string(),
                        expire_after_secs: TRANSIENT_TTL_SECS,
                    },
                )
                .await;
            }
            Err(e) => {
                error!(error = %e, "faq resolution failed");
                self.send(
                    message.context.clone(),
                    OutboundPayload::Text(
                        "Something went wrong processing this command.".to_string(),
                    ),
                )
                .await;
            }
        }
    }

    /// 管理命令识别：机器人消息与无前缀消息直接排除
    fn parse_admin(&self, message: &InboundMessage) -> Option<AdminCommand> {
        if message.author_is_bot {
            return None;
        }
        let stripped = message.content.strip_prefix(self.host.prefix())?;
        let mut parts = stripped.trim().splitn(2, char::is_whitespace);
        let command = parts.next()?.to_lowercase();
        let rest = parts.next().unwrap_or("");
        AdminCommand::parse(&command, rest)
    }

    async fn handle_admin(&self, cmd: AdminCommand, message: &InboundMessage) {
        let allowed = self
            .host
            .has_capability(message.author, &message.context, Capability::ManageMessages)
            .await;
        if !allowed {
            self.send(
                message.context.clone(),
                OutboundPayload::Text("You lack permission to use this command.".to_string()),
            )
            .await;
            return;
        }

        match self.admin.execute(cmd).await {
            AdminOutcome::Reply(text) => {
                self.send(message.context.clone(), OutboundPayload::Text(text))
                    .await;
            }
            AdminOutcome::CommandList(chunks) => match self.host.direct_channel(message.author).await {
                Some(channel) => {
                    let dm = ConversationRef::direct(channel);
                    for chunk in chunks {
                        self.send(dm.clone(), OutboundPayload::Text(chunk)).await;
                    }
                    self.send(
                        message.context.clone(),
                        OutboundPayload::Transient {
                            text: "I have DMed you a list of commands.".to_string(),
                            expire_after_secs: TRANSIENT_TTL_SECS,
                        },
                    )
                    .await;
                }
                None => {
                    self.send(
                        message.context.clone(),
                        OutboundPayload::Text(
                            "I could not DM you a list of commands since you are not \
                             accepting DMs from me."
                                .to_string(),
                        ),
                    )
                    .await;
                }
            },
        }
    }

    async fn send(&self, context: ConversationRef, payload: OutboundPayload) {
        self.queue
            .enqueue(PendingInvocation::new(context, payload))
            .await;
    }

    /// 队列积压（观测用）
    pub async fn backlog(&self) -> usize {
        self.queue.backlog().await
    }
}

fn render_suggestions(candidates: &[String]) -> String {
    let lines: Vec<String> = candidates.iter().map(|c| format!("**{c}**")).collect();
    format!("Did you mean...\n{}", lines.join("\n"))
}
