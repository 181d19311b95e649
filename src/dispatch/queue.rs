//! FIFO 队列与惰性排水循环
//!
//! 队列空时排水循环自行终止，由下一次 enqueue 重启。
//! 每个节拍最多处理一条，且必须等上一条执行完才取下一条。

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::invocation::PendingInvocation;

/// 投递回调：队列唯一的执行出口；生产实现通过 ChatHost 发消息
#[async_trait]
pub trait InvocationExecutor: Send + Sync {
    async fn execute(&self, invocation: PendingInvocation) -> anyhow::Result<()>;
}

/// 队列与运行标志由同一把锁保护：
/// 终止判定与 enqueue 互斥，不会出现"循环刚退出、新条目无人排水"的窗口
struct QueueState {
    pending: VecDeque<PendingInvocation>,
    draining: bool,
}

/// 单飞行命令队列
pub struct CommandQueue {
    state: Arc<Mutex<QueueState>>,
    executor: Arc<dyn InvocationExecutor>,
    tick: Duration,
}

impl CommandQueue {
    pub fn new(executor: Arc<dyn InvocationExecutor>, tick: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
            })),
            executor,
            tick,
        }
    }

    /// 追加到队尾；排水循环未运行时启动它
    pub async fn enqueue(&self, invocation: PendingInvocation) {
        let mut state = self.state.lock().await;
        debug!(id = %invocation.id, backlog = state.pending.len(), "invocation enqueued");
        state.pending.push_back(invocation);
        if !state.draining {
            state.draining = true;
            drop(state);
            self.spawn_drain_loop();
        }
    }

    /// 当前积压条数
    pub async fn backlog(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// 排水循环是否在运行
    pub async fn is_draining(&self) -> bool {
        self.state.lock().await.draining
    }

    fn spawn_drain_loop(&self) {
        let state = Arc::clone(&self.state);
        let executor = Arc::clone(&self.executor);
        let tick = self.tick;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let next = {
                    let mut state = state.lock().await;
                    match state.pending.pop_front() {
                        Some(invocation) => invocation,
                        None => {
                            state.draining = false;
                            break;
                        }
                    }
                };
                let id = next.id.clone();
                // 失败不重试：只上报日志，继续排后续条目
                if let Err(e) = executor.execute(next).await {
                    error!(id = %id, error = %e, "invocation delivery failed");
                }
            }
            debug!("drain loop idle, stopped");
        });
    }
}
