//! 管线契约（Pipeline Contract）
//!
//! 行为（Behavior）包裹处理器形成洋葱式管线：先注册者在最外层，最先观察到调用，
//! 也最后观察到结果。每个行为拿到的 [`Next`] 代表“管线的剩余部分”：
//! - 调用 `next().await` 并返回/透传其结果；
//! - 或不调用 `next`，直接返回自己的结果或错误（短路，例如校验失败）。
//!
//! `Next` 是 `FnOnce`，因此“至多调用一次”由类型系统保证。
//!
//! 全局行为（[`GlobalBehavior`]）作用于某一形态的全部消息，看到的是类型擦除后的
//! [`MessageRef`] 与 [`Erased`] 结果；分发器在其外层擦除、在返回时还原结果类型。
//!
use crate::{
    context::AppContext,
    error::AppError,
    message::{Command, MessageKind, Request},
};
use async_trait::async_trait;
use futures_core::future::BoxFuture;
use futures_util::FutureExt;
use std::any::{Any, type_name};
use std::sync::Arc;

/// 管线的剩余部分：零参数、至多调用一次，返回最终结果
pub type Next<'a, R> = Box<dyn FnOnce() -> BoxFuture<'a, Result<R, AppError>> + Send + 'a>;

/// 全局行为使用的类型擦除结果
pub type Erased = Box<dyn Any + Send>;

/// 针对某个请求类型的行为
#[async_trait]
pub trait RequestBehavior<Q>: Send + Sync
where
    Q: Request,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        request: &Q,
        next: Next<'_, Q::Response>,
    ) -> Result<Q::Response, AppError>;
}

/// 针对某个命令类型的行为
#[async_trait]
pub trait CommandBehavior<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, command: &C, next: Next<'_, ()>)
    -> Result<(), AppError>;
}

/// 管线形态标记：全局行为按形态注册
pub trait Shape: Send + Sync + 'static {
    const KIND: MessageKind;
}

/// 带返回值请求的管线
pub enum RequestShape {}

/// 无返回值命令的管线
pub enum CommandShape {}

impl Shape for RequestShape {
    const KIND: MessageKind = MessageKind::Request;
}

impl Shape for CommandShape {
    const KIND: MessageKind = MessageKind::Command;
}

/// 全局行为：作用于形态 `K` 的全部消息，位于按类型注册的行为之外
#[async_trait]
pub trait GlobalBehavior<K>: Send + Sync
where
    K: Shape,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        message: MessageRef<'_>,
        next: Next<'_, Erased>,
    ) -> Result<Erased, AppError>;
}

/// 类型擦除后的消息视图
#[derive(Clone, Copy)]
pub struct MessageRef<'a> {
    kind: MessageKind,
    name: &'static str,
    type_name: &'static str,
    value: &'a (dyn Any + Send + Sync),
}

impl<'a> MessageRef<'a> {
    pub fn new<M>(kind: MessageKind, name: &'static str, value: &'a M) -> Self
    where
        M: Any + Send + Sync,
    {
        Self {
            kind,
            name,
            type_name: type_name::<M>(),
            value,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// 消息的稳定名称（`NAME`）
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for MessageRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRef")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 按注册顺序的逆序折叠行为：第一个注册的行为位于最外层
pub(crate) fn compose<'a, B, R, F>(behaviors: Vec<Arc<B>>, terminal: Next<'a, R>, stage: F) -> Next<'a, R>
where
    B: ?Sized + Send + Sync + 'a,
    R: Send + 'a,
    F: Fn(Arc<B>, Next<'a, R>) -> BoxFuture<'a, Result<R, AppError>> + Copy + Send + 'a,
{
    behaviors
        .into_iter()
        .rev()
        .fold(terminal, |next: Next<'a, R>, behavior| -> Next<'a, R> {
            Box::new(move || stage(behavior, next))
        })
}

pub(crate) fn erase<'a, R>(next: Next<'a, R>) -> Next<'a, Erased>
where
    R: Send + 'static,
{
    Box::new(move || {
        async move { next().await.map(|out| Box::new(out) as Erased) }.boxed()
    })
}

pub(crate) fn restore<R>(out: Erased) -> Result<R, AppError>
where
    R: 'static,
{
    out.downcast::<R>()
        .map(|out| *out)
        .map_err(|_| AppError::TypeMismatch {
            expected: type_name::<R>(),
            found: "unknown",
        })
}

/// 执行一次完整管线：全局行为（外）→ 按类型行为 → 处理器（内）
pub(crate) async fn run<'a, K, R, B, F>(
    ctx: &'a AppContext,
    message: MessageRef<'a>,
    terminal: Next<'a, R>,
    behaviors: Vec<Arc<B>>,
    stage: F,
    globals: Vec<Arc<dyn GlobalBehavior<K>>>,
) -> Result<R, AppError>
where
    K: Shape,
    R: Send + 'static,
    B: ?Sized + Send + Sync + 'a,
    F: Fn(Arc<B>, Next<'a, R>) -> BoxFuture<'a, Result<R, AppError>> + Copy + Send + 'a,
{
    let typed = compose(behaviors, terminal, stage);
    if globals.is_empty() {
        return typed().await;
    }

    let outer = compose(globals, erase(typed), move |global, next| {
        async move { global.handle(ctx, message, next).await }.boxed()
    });
    restore(outer().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Tag(&'static str);

    fn record(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    #[tokio::test]
    async fn compose_wraps_in_registration_order() {
        let log: Log = Arc::default();
        let behaviors = vec![Arc::new(Tag("b1")), Arc::new(Tag("b2")), Arc::new(Tag("b3"))];

        let inner_log = log.clone();
        let terminal: Next<'_, u32> = Box::new(move || {
            async move {
                record(&inner_log, "handler");
                Ok::<_, AppError>(7)
            }
            .boxed()
        });

        let stage_log = &log;
        let pipeline = compose(behaviors, terminal, move |tag: Arc<Tag>, next| {
            async move {
                record(stage_log, format!("{} pre", tag.0));
                let out = next().await;
                record(stage_log, format!("{} post", tag.0));
                out
            }
            .boxed()
        });

        assert_eq!(pipeline().await.unwrap(), 7);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["b1 pre", "b2 pre", "b3 pre", "handler", "b3 post", "b2 post", "b1 post"]
        );
    }

    #[tokio::test]
    async fn compose_without_behaviors_is_the_terminal() {
        let terminal: Next<'_, &'static str> = Box::new(|| async { Ok::<_, AppError>("done") }.boxed());
        let pipeline = compose(Vec::<Arc<Tag>>::new(), terminal, |_tag, next| next());
        assert_eq!(pipeline().await.unwrap(), "done");
    }

    #[tokio::test]
    async fn erased_result_restores_to_original_type() {
        let terminal: Next<'_, u64> = Box::new(|| async { Ok::<_, AppError>(42u64) }.boxed());
        let out = erase(terminal)().await.unwrap();
        assert_eq!(restore::<u64>(out).unwrap(), 42);
    }

    #[test]
    fn restore_reports_type_mismatch() {
        let out: Erased = Box::new("not a number");
        match restore::<u64>(out) {
            Err(AppError::TypeMismatch { expected, .. }) => assert_eq!(expected, "u64"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn message_ref_downcasts_to_concrete_type() {
        struct Ping {
            id: u32,
        }
        let ping = Ping { id: 9 };
        let message = MessageRef::new(MessageKind::Request, "Ping", &ping);
        assert_eq!(message.name(), "Ping");
        assert_eq!(message.kind(), MessageKind::Request);
        assert!(message.type_name().ends_with("Ping"));
        assert_eq!(message.downcast_ref::<Ping>().map(|p| p.id), Some(9));
        assert!(message.downcast_ref::<u32>().is_none());
    }
}
