use async_trait::async_trait;
use praetor::{context::AppContext, error::ValidationFailure};

/// 消息校验器：返回全部失败，空集合表示通过
#[async_trait]
pub trait Validator<T>: Send + Sync {
    async fn validate(&self, ctx: &AppContext, value: &T) -> Vec<ValidationFailure>;
}
