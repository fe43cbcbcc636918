//! 日志行为（LoggingBehavior）
//!
//! 以全局行为的方式记录每次请求/命令管线的开始、耗时与结果。
//! 订阅器（`tracing-subscriber`）的安装由可执行程序负责，库内不做初始化。
//!
use crate::{
    context::AppContext,
    error::AppError,
    pipeline::{Erased, GlobalBehavior, MessageRef, Next, Shape},
};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 记录管线执行情况的全局行为，可同时注册到请求与命令形态
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingBehavior;

#[async_trait]
impl<K> GlobalBehavior<K> for LoggingBehavior
where
    K: Shape,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        message: MessageRef<'_>,
        next: Next<'_, Erased>,
    ) -> Result<Erased, AppError> {
        let started = Instant::now();
        debug!(
            kind = %message.kind(),
            message = message.name(),
            correlation_id = ctx.correlation_id(),
            "handling message"
        );

        let out = next().await;
        let elapsed_ms = elapsed_millis(started.elapsed());

        match &out {
            Ok(_) => info!(
                kind = %message.kind(),
                message = message.name(),
                correlation_id = ctx.correlation_id(),
                elapsed_ms,
                "message handled"
            ),
            Err(err) => warn!(
                kind = %message.kind(),
                message = message.name(),
                correlation_id = ctx.correlation_id(),
                elapsed_ms,
                error = %err,
                "message failed"
            ),
        }

        out
    }
}

// 超出 u64 的耗时饱和为 u64::MAX
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
