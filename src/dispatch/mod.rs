//! 单飞行调度队列
//!
//! 把已解析的投递请求按到达顺序排队，单进程同一时刻最多一条在途，
//! 用固定节拍逐条排水。突发流量由此被整平：延迟换可预测的负载上限。
//!
//! - **invocation**: 队列元素（待投递记录）
//! - **queue**: FIFO 队列与惰性排水循环

mod invocation;
mod queue;

pub use invocation::PendingInvocation;
pub use queue::{CommandQueue, InvocationExecutor};
