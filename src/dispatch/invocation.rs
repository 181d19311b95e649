//! 待投递记录

use chrono::Utc;

use crate::platform::{ConversationRef, OutboundPayload};

/// 队列元素：入队后由队列独占持有，出队交给投递回调后即销毁。
/// 成败都不重排队，也不重试。
#[derive(Debug, Clone)]
pub struct PendingInvocation {
    /// 入队 ID，日志定位用
    pub id: String,
    /// 投递目标上下文
    pub context: ConversationRef,
    /// 出站载荷
    pub payload: OutboundPayload,
    /// 入队时间（毫秒时间戳）
    pub requested_at: i64,
}

impl PendingInvocation {
    pub fn new(context: ConversationRef, payload: OutboundPayload) -> Self {
        Self {
            id: format!("inv_{}", uuid::Uuid::new_v4()),
            context,
            payload,
            requested_at: Utc::now().timestamp_millis(),
        }
    }
}
