use crate::{
    config::DispatcherConfig,
    context::AppContext,
    error::{AppError, HandlerFailure, PublishError},
    handler::{CommandHandler, EventHandler, RequestHandler},
    mediator::Mediator,
    message::{Command, Event, MessageKind, Request},
    pipeline::{
        self, CommandBehavior, CommandShape, GlobalBehavior, MessageRef, Next, RequestBehavior,
        RequestShape,
    },
    resolver::Resolver,
};
use async_trait::async_trait;
use bon::Builder;
use futures_core::future::BoxFuture;
use futures_util::{FutureExt, StreamExt, future, stream};
use std::any::type_name;
use std::sync::Arc;
use tracing::{Instrument, debug, debug_span, warn};

/// 进程内分发器
/// - 通过 [`Resolver`] 查找处理器与行为，每次调用重新组装管线（不缓存）
/// - 请求/命令：严格串行的洋葱式管线，错误原样返回
/// - 事件：全部处理器并发执行，汇总失败
///
/// 分发器自身不持有可变状态，可克隆后在任意任务间共享。
#[derive(Builder)]
pub struct Dispatcher<R>
where
    R: Resolver,
{
    resolver: Arc<R>,
    #[builder(default)]
    config: DispatcherConfig,
}

impl<R> Clone for Dispatcher<R>
where
    R: Resolver,
{
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            config: self.config,
        }
    }
}

impl<R> Dispatcher<R>
where
    R: Resolver,
{
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            config: DispatcherConfig::default(),
        }
    }

    pub fn resolver(&self) -> &Arc<R> {
        &self.resolver
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// 分发请求到唯一处理器，返回其结果
    pub async fn send<Q>(&self, ctx: &AppContext, request: Q) -> Result<Q::Response, AppError>
    where
        Q: Request,
    {
        self.send_impl(ctx, request)
            .instrument(debug_span!("praetor.send", message = Q::NAME))
            .await
    }

    /// 分发命令到唯一处理器
    pub async fn execute<C>(&self, ctx: &AppContext, command: C) -> Result<(), AppError>
    where
        C: Command,
    {
        self.execute_impl(ctx, command)
            .instrument(debug_span!("praetor.execute", message = C::NAME))
            .await
    }

    /// 发布事件到全部已注册处理器；无处理器时直接成功
    pub async fn publish<E>(&self, ctx: &AppContext, event: E) -> Result<(), AppError>
    where
        E: Event,
    {
        self.publish_impl(ctx, event)
            .instrument(debug_span!("praetor.publish", event = E::NAME))
            .await
    }

    async fn send_impl<Q>(&self, ctx: &AppContext, request: Q) -> Result<Q::Response, AppError>
    where
        Q: Request,
    {
        let Some(handler) = self.resolver.resolve_one::<dyn RequestHandler<Q>>() else {
            return Err(AppError::HandlerNotFound {
                message: Q::NAME,
                contract: type_name::<dyn RequestHandler<Q>>(),
            });
        };
        let behaviors = self.resolver.resolve_many::<dyn RequestBehavior<Q>>();
        let globals = self
            .resolver
            .resolve_many::<dyn GlobalBehavior<RequestShape>>();
        debug!(
            behaviors = behaviors.len(),
            globals = globals.len(),
            "resolved request pipeline"
        );

        let request = &request;
        let terminal: Next<'_, Q::Response> =
            Box::new(move || async move { handler.handle(ctx, request).await }.boxed());

        pipeline::run(
            ctx,
            MessageRef::new(MessageKind::Request, Q::NAME, request),
            terminal,
            behaviors,
            move |behavior, next| async move { behavior.handle(ctx, request, next).await }.boxed(),
            globals,
        )
        .await
    }

    async fn execute_impl<C>(&self, ctx: &AppContext, command: C) -> Result<(), AppError>
    where
        C: Command,
    {
        let Some(handler) = self.resolver.resolve_one::<dyn CommandHandler<C>>() else {
            return Err(AppError::HandlerNotFound {
                message: C::NAME,
                contract: type_name::<dyn CommandHandler<C>>(),
            });
        };
        let behaviors = self.resolver.resolve_many::<dyn CommandBehavior<C>>();
        let globals = self
            .resolver
            .resolve_many::<dyn GlobalBehavior<CommandShape>>();
        debug!(
            behaviors = behaviors.len(),
            globals = globals.len(),
            "resolved command pipeline"
        );

        let command = &command;
        let terminal: Next<'_, ()> =
            Box::new(move || async move { handler.handle(ctx, command).await }.boxed());

        pipeline::run(
            ctx,
            MessageRef::new(MessageKind::Command, C::NAME, command),
            terminal,
            behaviors,
            move |behavior, next| async move { behavior.handle(ctx, command, next).await }.boxed(),
            globals,
        )
        .await
    }

    async fn publish_impl<E>(&self, ctx: &AppContext, event: E) -> Result<(), AppError>
    where
        E: Event,
    {
        // 解析结果是快照：之后注册的处理器不参与本次发布
        let handlers = self.resolver.resolve_many::<dyn EventHandler<E>>();
        if handlers.is_empty() {
            debug!("no event handlers registered");
            return Ok(());
        }

        let total = handlers.len();
        let event = &event;
        // 先收集为装箱的 future，避免惰性迭代器跨越 await 影响 Send 推断
        let calls: Vec<BoxFuture<'_, (usize, &'static str, Result<(), AppError>)>> = handlers
            .into_iter()
            .enumerate()
            .map(move |(index, handler)| {
                async move {
                    let outcome = handler.handle(ctx, event).await;
                    (index, handler.handler_name(), outcome)
                }
                .boxed()
            })
            .collect();

        let outcomes: Vec<_> = match self.config.publish_concurrency {
            Some(limit) => {
                stream::iter(calls)
                    .buffer_unordered(limit.max(1))
                    .collect()
                    .await
            }
            None => future::join_all(calls).await,
        };

        let mut failures: Vec<HandlerFailure> = outcomes
            .into_iter()
            .filter_map(|(index, handler, outcome)| {
                let error = outcome.err()?;
                warn!(handler, error = %error, "event handler failed");
                Some(HandlerFailure {
                    index,
                    handler,
                    error,
                })
            })
            .collect();

        if failures.is_empty() {
            debug!(handlers = total, "event published");
            return Ok(());
        }

        failures.sort_by_key(|f| f.index);
        Err(PublishError {
            event: E::NAME,
            total,
            failures,
        }
        .into())
    }
}

#[async_trait]
impl<R> Mediator for Dispatcher<R>
where
    R: Resolver,
{
    async fn send<Q>(&self, ctx: &AppContext, request: Q) -> Result<Q::Response, AppError>
    where
        Q: Request,
    {
        Dispatcher::send(self, ctx, request).await
    }

    async fn execute<C>(&self, ctx: &AppContext, command: C) -> Result<(), AppError>
    where
        C: Command,
    {
        Dispatcher::execute(self, ctx, command).await
    }

    async fn publish<E>(&self, ctx: &AppContext, event: E) -> Result<(), AppError>
    where
        E: Event,
    {
        Dispatcher::publish(self, ctx, event).await
    }
}
