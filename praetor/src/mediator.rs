use crate::{
    context::AppContext,
    error::AppError,
    message::{Command, Event, Request},
};
use async_trait::async_trait;

/// 中介者（Mediator）
///
/// - `send`：将请求路由到唯一处理器并返回其结果；
/// - `execute`：将命令路由到唯一处理器，只返回成功/失败；
/// - `publish`：将事件并发投递给全部已注册处理器，汇总失败。
///
/// 该 trait 带有泛型方法，通常以具体实现类型注入使用，例如 [`Dispatcher`](crate::Dispatcher)。
#[async_trait]
pub trait Mediator: Send + Sync {
    async fn send<Q>(&self, ctx: &AppContext, request: Q) -> Result<Q::Response, AppError>
    where
        Q: Request;

    async fn execute<C>(&self, ctx: &AppContext, command: C) -> Result<(), AppError>
    where
        C: Command;

    async fn publish<E>(&self, ctx: &AppContext, event: E) -> Result<(), AppError>
    where
        E: Event;
}
