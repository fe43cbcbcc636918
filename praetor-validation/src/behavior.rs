//! 校验行为
//!
//! 没有校验器时直接调用 `next`；否则并发运行全部校验器并汇总失败，
//! 存在任一失败则返回 [`AppError::Validation`]，不再调用 `next`。
//!
use crate::validator::Validator;
use async_trait::async_trait;
use futures_util::future::join_all;
use praetor::{
    context::AppContext,
    error::{AppError, ValidationErrors},
    message::{Command, Request},
    pipeline::{CommandBehavior, Next, RequestBehavior},
};
use std::sync::Arc;
use tracing::debug;

pub struct ValidationBehavior<T> {
    validators: Vec<Arc<dyn Validator<T>>>,
}

impl<T> ValidationBehavior<T>
where
    T: Send + Sync,
{
    pub fn new(validators: Vec<Arc<dyn Validator<T>>>) -> Self {
        Self { validators }
    }

    /// 追加一个校验器
    pub fn with<V>(mut self, validator: V) -> Self
    where
        V: Validator<T> + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    async fn check(&self, ctx: &AppContext, name: &'static str, value: &T) -> Result<(), AppError> {
        if self.validators.is_empty() {
            return Ok(());
        }

        let failures: Vec<_> = join_all(self.validators.iter().map(|v| v.validate(ctx, value)))
            .await
            .into_iter()
            .flatten()
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        debug!(message = name, failed = failures.len(), "validation rejected message");
        Err(AppError::Validation(ValidationErrors::new(failures)))
    }
}

impl<T> Default for ValidationBehavior<T> {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
        }
    }
}

#[async_trait]
impl<Q> RequestBehavior<Q> for ValidationBehavior<Q>
where
    Q: Request,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        request: &Q,
        next: Next<'_, Q::Response>,
    ) -> Result<Q::Response, AppError> {
        self.check(ctx, Q::NAME, request).await?;
        next().await
    }
}

#[async_trait]
impl<C> CommandBehavior<C> for ValidationBehavior<C>
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, command: &C, next: Next<'_, ()>) -> Result<(), AppError> {
        self.check(ctx, C::NAME, command).await?;
        next().await
    }
}
