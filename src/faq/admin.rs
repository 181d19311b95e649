//! FAQ 管理命令面：add / update / alias / remove / commands
//!
//! 每个操作直接映射到一次存储调用，结果译成面向调用者的短文本。
//! add 与 alias 同时拒绝与框架内置命令同名的键（FAQ 不得遮蔽框架命令）。
//! commands 列表走私聊投递，按平台消息长度上限分块。

use std::sync::Arc;

use tracing::error;

use crate::platform::{split_message_chunks, ChatHost};

use super::error::StoreError;
use super::store::FaqStore;

/// 平台单条消息长度上限的保守值，commands 清单按此切分
const LIST_CHUNK_CHARS: usize = 1900;

/// 管理命令（聊天文本形式，不是进程 CLI）
///
/// 参数允许缺失：缺参不是解析失败，而是在执行时回以用法提示。
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Add {
        key: Option<String>,
        text: Option<String>,
    },
    Update {
        key: Option<String>,
        text: Option<String>,
    },
    Alias {
        key: Option<String>,
        alias: Option<String>,
    },
    Remove {
        key: Option<String>,
    },
    /// 列出内置命令与全部 FAQ 键
    Commands,
}

impl AdminCommand {
    /// 管理命令名集合：宿主应把它们并入内置命令集，避免被 FAQ 键遮蔽
    pub fn names() -> [&'static str; 5] {
        ["add", "update", "alias", "remove", "commands"]
    }

    /// 从去前缀后的首词与剩余文本解析；不是管理命令时返回 None
    pub fn parse(command: &str, rest: &str) -> Option<Self> {
        let mut words = rest.trim().splitn(2, char::is_whitespace);
        let first = words.next().filter(|w| !w.is_empty()).map(str::to_string);
        let second = words
            .next()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string);

        match command {
            "add" => Some(Self::Add {
                key: first,
                text: second,
            }),
            "update" => Some(Self::Update {
                key: first,
                text: second,
            }),
            "alias" => Some(Self::Alias {
                key: first,
                alias: second,
            }),
            "remove" => Some(Self::Remove { key: first }),
            "commands" => Some(Self::Commands),
            _ => None,
        }
    }
}

/// 执行结果：普通回执发回原频道，命令清单走私聊
#[derive(Debug, Clone, PartialEq)]
pub enum AdminOutcome {
    /// 单条回执
    Reply(String),
    /// 命令清单，已按长度分块
    CommandList(Vec<String>),
}

/// 管理命令执行器
pub struct AdminSurface {
    store: Arc<dyn FaqStore>,
    host: Arc<dyn ChatHost>,
}

impl AdminSurface {
    pub fn new(store: Arc<dyn FaqStore>, host: Arc<dyn ChatHost>) -> Self {
        Self { store, host }
    }

    /// 执行管理命令；存储故障译为通用错误提示并写运维日志
    pub async fn execute(&self, cmd: AdminCommand) -> AdminOutcome {
        match self.try_execute(cmd).await {
            Ok(outcome) => outcome,
            Err(StoreError::NotFound(key)) => {
                AdminOutcome::Reply(format!("{key} is not a registered command."))
            }
            Err(StoreError::AlreadyExists(key)) => {
                AdminOutcome::Reply(format!("{key} is already a registered command."))
            }
            Err(StoreError::Backing(e)) => {
                error!(error = %e, "backing store unavailable during admin command");
                AdminOutcome::Reply("Something went wrong processing this command.".to_string())
            }
        }
    }

    async fn try_execute(&self, cmd: AdminCommand) -> Result<AdminOutcome, StoreError> {
        let reply = match cmd {
            AdminCommand::Add { key, text } => {
                let Some(key) = key else {
                    return Ok(AdminOutcome::Reply("Please enter a command to add.".into()));
                };
                let Some(text) = text else {
                    return Ok(AdminOutcome::Reply(
                        "Please enter a description for the command.".into(),
                    ));
                };
                let key = key.to_lowercase();
                if self.shadows_built_in(&key).await {
                    return Ok(AdminOutcome::Reply(format!(
                        "{key} is a built-in command and cannot be used as an FAQ command."
                    )));
                }
                self.store.create(&key, &text).await?;
                format!("{key} was added.")
            }
            AdminCommand::Update { key, text } => {
                let Some(key) = key else {
                    return Ok(AdminOutcome::Reply(
                        "Please enter a command to update.".into(),
                    ));
                };
                let Some(text) = text else {
                    return Ok(AdminOutcome::Reply(
                        "Please enter a description for the command.".into(),
                    ));
                };
                let key = key.to_lowercase();
                self.store.update(&key, &text).await?;
                format!("{key} was updated.")
            }
            AdminCommand::Alias { key, alias } => {
                let Some(key) = key else {
                    return Ok(AdminOutcome::Reply(
                        "Please enter a command to alias.".into(),
                    ));
                };
                let Some(alias) = alias else {
                    return Ok(AdminOutcome::Reply(
                        "Please enter an alias for the command.".into(),
                    ));
                };
                let key = key.to_lowercase();
                let alias = alias.to_lowercase();
                if self.shadows_built_in(&alias).await {
                    return Ok(AdminOutcome::Reply(format!(
                        "{alias} is a built-in command and cannot be used as an FAQ command."
                    )));
                }
                self.store.alias(&key, &alias).await?;
                format!("{key} was aliased to {alias}.")
            }
            AdminCommand::Remove { key } => {
                let Some(key) = key else {
                    return Ok(AdminOutcome::Reply(
                        "Please enter a command to remove.".into(),
                    ));
                };
                let key = key.to_lowercase();
                self.store.delete(&key).await?;
                format!("{key} was removed.")
            }
            AdminCommand::Commands => {
                return Ok(AdminOutcome::CommandList(self.render_command_list().await?));
            }
        };
        Ok(AdminOutcome::Reply(reply))
    }

    async fn shadows_built_in(&self, key: &str) -> bool {
        self.host
            .built_in_commands()
            .await
            .iter()
            .any(|name| name == key)
    }

    /// 渲染命令清单：内置命令在前，FAQ 键在后，分块并套等宽围栏
    async fn render_command_list(&self) -> Result<Vec<String>, StoreError> {
        let mut listing = String::from("Here is our list of commands\n\nBot Commands\n------------\n");
        for name in self.host.built_in_commands().await {
            listing.push_str(&name);
            listing.push('\n');
        }
        listing.push_str("\nFAQ Commands\n------------\n");
        for key in self.store.keys().await? {
            listing.push_str(&key);
            listing.push('\n');
        }
        Ok(split_message_chunks(&listing, LIST_CHUNK_CHARS)
            .into_iter()
            .map(|chunk| format!("```\n{chunk}\n```"))
            .collect())
    }
}
