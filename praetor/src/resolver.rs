//! 解析器（Resolver）与进程内注册表（Registry）
//!
//! 分发器只通过 [`Resolver`] 查找实现：
//! - `resolve_one`：命令/请求处理器（单个）；
//! - `resolve_many`：事件处理器与行为（有序，可为空）。
//!
//! 契约类型以 `dyn Trait<M>` 表达，例如 `dyn RequestHandler<Q>`，
//! 其 `TypeId` 同时编码了消息类型与结果类型。
//!
use crate::{
    error::AppError,
    handler::{CommandHandler, EventHandler, RequestHandler},
    message::{Command, Event, MessageKind, Request},
    pipeline::{CommandBehavior, GlobalBehavior, RequestBehavior, Shape},
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

/// 服务查找：按契约类型返回单个或全部已注册实现
///
/// 该 trait 带有泛型方法，通常以具体实现类型注入 [`Dispatcher`](crate::Dispatcher) 使用。
pub trait Resolver: Send + Sync + 'static {
    /// 返回契约 `S` 的唯一实现；未注册时为 `None`
    fn resolve_one<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static;

    /// 返回契约 `S` 的全部实现（注册顺序），调用时刻的快照
    fn resolve_many<S>(&self) -> Vec<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static;
}

/// 可注册多个实现的契约：事件处理器、各类行为，以及自定义扩展点
///
/// 自定义契约在本地为其 trait object 实现即可，例如 `impl MultiContract for dyn Audit {}`。
pub trait MultiContract: Send + Sync + 'static {}

impl<E: Event> MultiContract for dyn EventHandler<E> {}

impl<Q: Request> MultiContract for dyn RequestBehavior<Q> {}

impl<C: Command> MultiContract for dyn CommandBehavior<C> {}

impl<K: Shape> MultiContract for dyn GlobalBehavior<K> {}

// 每个条目实际保存 `Arc<S>`，以契约 `S` 的 TypeId 为键
type Service = Box<dyn Any + Send + Sync>;

/// 进程内注册表
/// - 通过契约类型的 TypeId 注册实现
/// - 请求/命令处理器在注册时即拒绝重复与形态冲突（快速失败）
#[derive(Default)]
pub struct Registry {
    services: DashMap<TypeId, Vec<Service>>,
    // 消息类型 -> 已注册的处理器形态，保证请求与命令互斥
    kinds: DashMap<TypeId, (MessageKind, &'static str)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册请求处理器
    pub fn register_request_handler<Q, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        Q: Request,
        H: RequestHandler<Q> + 'static,
    {
        let handler: Arc<dyn RequestHandler<Q>> = handler;
        self.insert_single::<Q, _>(MessageKind::Request, Q::NAME, handler)
    }

    /// 注册命令处理器
    pub fn register_command_handler<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let handler: Arc<dyn CommandHandler<C>> = handler;
        self.insert_single::<C, _>(MessageKind::Command, C::NAME, handler)
    }

    /// 注册事件处理器（同一事件可注册多个）
    pub fn register_event_handler<E, H>(&self, handler: Arc<H>)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let handler: Arc<dyn EventHandler<E>> = handler;
        self.add(handler);
    }

    /// 为请求类型追加行为，先注册者位于外层
    pub fn register_request_behavior<Q, B>(&self, behavior: Arc<B>)
    where
        Q: Request,
        B: RequestBehavior<Q> + 'static,
    {
        let behavior: Arc<dyn RequestBehavior<Q>> = behavior;
        self.add(behavior);
    }

    /// 为命令类型追加行为，先注册者位于外层
    pub fn register_command_behavior<C, B>(&self, behavior: Arc<B>)
    where
        C: Command,
        B: CommandBehavior<C> + 'static,
    {
        let behavior: Arc<dyn CommandBehavior<C>> = behavior;
        self.add(behavior);
    }

    /// 追加作用于形态 `K` 全部消息的全局行为，位于按类型注册的行为之外
    pub fn register_global_behavior<K, B>(&self, behavior: Arc<B>)
    where
        K: Shape,
        B: GlobalBehavior<K> + 'static,
    {
        let behavior: Arc<dyn GlobalBehavior<K>> = behavior;
        self.add(behavior);
    }

    /// 在可多次注册的契约下追加实现
    ///
    /// 请求/命令处理器契约未实现 [`MultiContract`]，只能经由
    /// `register_request_handler` / `register_command_handler` 注册：
    /// ```compile_fail
    /// use async_trait::async_trait;
    /// use praetor::{context::AppContext, error::AppError, handler::RequestHandler, message::Request};
    /// use praetor::Registry;
    /// use std::sync::Arc;
    ///
    /// struct Ping;
    /// impl Request for Ping {
    ///     const NAME: &'static str = "Ping";
    ///     type Response = u32;
    /// }
    ///
    /// struct Pong;
    /// #[async_trait]
    /// impl RequestHandler<Ping> for Pong {
    ///     async fn handle(&self, _ctx: &AppContext, _req: &Ping) -> Result<u32, AppError> {
    ///         Ok(1)
    ///     }
    /// }
    ///
    /// let handler: Arc<dyn RequestHandler<Ping>> = Arc::new(Pong);
    /// Registry::new().add(handler);
    /// ```
    pub fn add<S>(&self, service: Arc<S>)
    where
        S: ?Sized + MultiContract,
    {
        self.services
            .entry(TypeId::of::<S>())
            .or_default()
            .push(Box::new(service));
    }

    /// 获取已注册处理器的请求/命令清单（只读视图）
    pub fn registered_handlers(&self) -> Vec<(MessageKind, &'static str)> {
        self.kinds.iter().map(|e| *e.value()).collect()
    }

    fn insert_single<M, S>(
        &self,
        kind: MessageKind,
        name: &'static str,
        service: Arc<S>,
    ) -> Result<(), AppError>
    where
        M: 'static,
        S: ?Sized + Send + Sync + 'static,
    {
        match self.kinds.entry(TypeId::of::<M>()) {
            Entry::Occupied(e) => {
                let (registered, _) = *e.get();
                if registered == kind {
                    Err(AppError::AlreadyRegistered {
                        message: name,
                        contract: type_name::<S>(),
                    })
                } else {
                    Err(AppError::ConflictingRegistration {
                        message: name,
                        registered,
                        requested: kind,
                    })
                }
            }
            Entry::Vacant(e) => {
                let mut slot = self.services.entry(TypeId::of::<S>()).or_default();
                if !slot.is_empty() {
                    return Err(AppError::AlreadyRegistered {
                        message: name,
                        contract: type_name::<S>(),
                    });
                }
                slot.push(Box::new(service));
                e.insert((kind, name));
                Ok(())
            }
        }
    }
}

impl Resolver for Registry {
    fn resolve_one<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let entry = self.services.get(&TypeId::of::<S>())?;
        entry.first()?.downcast_ref::<Arc<S>>().cloned()
    }

    fn resolve_many<S>(&self) -> Vec<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.services
            .get(&TypeId::of::<S>())
            .map(|entry| {
                entry
                    .iter()
                    .filter_map(|s| s.downcast_ref::<Arc<S>>().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use async_trait::async_trait;

    struct Ping;

    impl Request for Ping {
        const NAME: &'static str = "Ping";
        type Response = &'static str;
    }

    impl Command for Ping {
        const NAME: &'static str = "Ping";
    }

    struct Pinged;

    impl Event for Pinged {
        const NAME: &'static str = "Pinged";
    }

    struct Pong(&'static str);

    #[async_trait]
    impl RequestHandler<Ping> for Pong {
        async fn handle(&self, _ctx: &AppContext, _req: &Ping) -> Result<&'static str, AppError> {
            Ok(self.0)
        }
    }

    #[async_trait]
    impl CommandHandler<Ping> for Pong {
        async fn handle(&self, _ctx: &AppContext, _cmd: &Ping) -> Result<(), AppError> {
            Ok(())
        }
    }

    struct Listener;

    #[async_trait]
    impl EventHandler<Pinged> for Listener {
        async fn handle(&self, _ctx: &AppContext, _ev: &Pinged) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn resolves_registered_request_handler() {
        let registry = Registry::new();
        registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("pong")))
            .unwrap();

        let handler = registry
            .resolve_one::<dyn RequestHandler<Ping>>()
            .expect("handler registered");
        let out = handler.handle(&AppContext::default(), &Ping).await.unwrap();
        assert_eq!(out, "pong");
        assert!(registry.resolve_one::<dyn CommandHandler<Ping>>().is_none());
    }

    #[test]
    fn duplicate_request_handler_is_rejected() {
        let registry = Registry::new();
        registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("first")))
            .unwrap();
        let err = registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("second")))
            .unwrap_err();
        match err {
            AppError::AlreadyRegistered { message, contract } => {
                assert_eq!(message, "Ping");
                assert!(contract.contains("RequestHandler"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn request_and_command_registration_are_exclusive() {
        let registry = Registry::new();
        registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("pong")))
            .unwrap();
        let err = registry
            .register_command_handler::<Ping, _>(Arc::new(Pong("pong")))
            .unwrap_err();
        match err {
            AppError::ConflictingRegistration {
                message,
                registered,
                requested,
            } => {
                assert_eq!(message, "Ping");
                assert_eq!(registered, MessageKind::Request);
                assert_eq!(requested, MessageKind::Command);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(registry.resolve_one::<dyn CommandHandler<Ping>>().is_none());
    }

    #[test]
    fn resolve_many_preserves_registration_order() {
        let registry = Registry::new();
        for _ in 0..5 {
            registry.register_event_handler::<Pinged, _>(Arc::new(Listener));
        }
        let names: Vec<&str> = registry
            .resolve_many::<dyn EventHandler<Pinged>>()
            .iter()
            .map(|h| h.handler_name())
            .collect();
        assert_eq!(names.len(), 5);
        assert!(names.iter().all(|n| n.ends_with("Listener")));
    }

    #[test]
    fn resolve_many_is_a_snapshot() {
        let registry = Registry::new();
        registry.register_event_handler::<Pinged, _>(Arc::new(Listener));
        let snapshot = registry.resolve_many::<dyn EventHandler<Pinged>>();
        registry.register_event_handler::<Pinged, _>(Arc::new(Listener));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.resolve_many::<dyn EventHandler<Pinged>>().len(), 2);
    }

    #[test]
    fn unknown_contract_resolves_to_nothing() {
        let registry = Registry::new();
        assert!(registry.resolve_one::<dyn RequestHandler<Ping>>().is_none());
        assert!(registry.resolve_many::<dyn EventHandler<Pinged>>().is_empty());
    }

    trait Audit: Send + Sync {
        fn tag(&self) -> &'static str;
    }

    impl MultiContract for dyn Audit {}

    struct Tagged(&'static str);

    impl Audit for Tagged {
        fn tag(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn custom_contracts_accept_many_implementations() {
        let registry = Registry::new();
        for tag in ["a", "b"] {
            let audit: Arc<dyn Audit> = Arc::new(Tagged(tag));
            registry.add(audit);
        }
        let tags: Vec<&str> = registry
            .resolve_many::<dyn Audit>()
            .iter()
            .map(|a| a.tag())
            .collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert!(registry.registered_handlers().is_empty());
    }

    #[test]
    fn occupied_handler_slot_is_never_replaced() {
        let registry = Registry::new();
        let existing: Arc<dyn RequestHandler<Ping>> = Arc::new(Pong("existing"));
        registry
            .services
            .entry(TypeId::of::<dyn RequestHandler<Ping>>())
            .or_default()
            .push(Box::new(existing));

        let err = registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("late")))
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyRegistered { message: "Ping", .. }));
        assert!(registry.registered_handlers().is_empty());
        assert_eq!(registry.resolve_many::<dyn RequestHandler<Ping>>().len(), 1);
    }

    #[tokio::test]
    async fn rejected_registration_keeps_first_handler() {
        let registry = Registry::new();
        registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("first")))
            .unwrap();
        assert!(registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("second")))
            .is_err());

        let handlers = registry.resolve_many::<dyn RequestHandler<Ping>>();
        assert_eq!(handlers.len(), 1);
        let out = handlers[0].handle(&AppContext::default(), &Ping).await.unwrap();
        assert_eq!(out, "first");
    }

    #[test]
    fn lists_registered_handlers() {
        let registry = Registry::new();
        registry
            .register_request_handler::<Ping, _>(Arc::new(Pong("pong")))
            .unwrap();
        assert_eq!(
            registry.registered_handlers(),
            vec![(MessageKind::Request, "Ping")]
        );
    }
}
