use crate::error::AppError;
use bon::Builder;
use tokio_util::sync::CancellationToken;

/// 应用层上下文（Application Context）
///
/// 承载一次分发调用（请求/命令/事件）所需的横切信息，贯穿管线的每个阶段与处理器：
/// - 取消信号（`cancellation`）：协作式取消，分发器不会强行中断正在运行的处理器，
///   由各阶段自行观察并响应；
/// - 业务语境：关联追踪 `correlation_id`、因果链 `causation_id`、执行者 `actor_id`；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等。
///
/// 典型用法：
/// ```rust
/// use praetor::context::AppContext;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let ctx = AppContext::builder()
///     .cancellation(token.clone())
///     .correlation_id("cor-123".into())
///     .maybe_actor_id(Some("u-1".into()))
///     .build();
///
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// token.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct AppContext {
    /// 协作式取消信号
    #[builder(default)]
    cancellation: CancellationToken,
    /// 关联ID
    correlation_id: Option<String>,
    /// 因果ID
    causation_id: Option<String>,
    /// 触发调用的主体ID
    actor_id: Option<String>,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    idempotency_key: Option<String>,
}

impl AppContext {
    /// 以给定取消信号创建上下文，其余字段为空
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            ..Default::default()
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// 若已取消则返回 [`AppError::Cancelled`]，供处理器与行为在关键点协作检查
    pub fn ensure_active(&self, stage: &'static str) -> Result<(), AppError> {
        if self.cancellation.is_cancelled() {
            return Err(AppError::Cancelled(stage));
        }
        Ok(())
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }
}
