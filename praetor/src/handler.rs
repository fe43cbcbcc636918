//! 处理器契约（Handler）
//!
//! 每个处理器以其消息类型参数化，通过静态 trait 分发调用；
//! 分发器只持有类型擦除后的 `Arc<dyn ...Handler<M>>`。
//!
use crate::{
    context::AppContext,
    error::AppError,
    message::{Command, Event, Request},
};
use async_trait::async_trait;

/// 请求处理器：每个请求类型恰好注册一个
#[async_trait]
pub trait RequestHandler<Q>: Send + Sync
where
    Q: Request,
{
    async fn handle(&self, ctx: &AppContext, request: &Q) -> Result<Q::Response, AppError>;
}

/// 命令处理器：每个命令类型恰好注册一个
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, command: &C) -> Result<(), AppError>;
}

/// 事件处理器：同一事件类型可注册任意多个，发布时并发执行
///
/// 处理器之间不应依赖执行顺序，也不应依赖彼此在同一次发布中的副作用。
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: Event,
{
    /// 处理器名称（用于失败聚合与日志），默认取实现类型名
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn handle(&self, ctx: &AppContext, event: &E) -> Result<(), AppError>;
}
