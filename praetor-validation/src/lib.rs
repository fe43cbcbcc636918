//! praetor 的校验插件
//!
//! 校验以普通行为的形式接入管线，分发器对其一无所知：
//! - [`Validator`]：对某个消息类型给出全部校验失败；
//! - [`Rules`]：同步规则构建器，覆盖常见字段规则；
//! - [`ValidationBehavior`]：并发运行全部校验器，任一失败即短路并返回
//!   [`AppError::Validation`](praetor::error::AppError::Validation)；
//! - [`ValidationRegistryExt`]：在 [`Registry`](praetor::Registry) 上按消息类型注册校验。
//!
pub mod behavior;
pub mod registration;
pub mod rules;
pub mod validator;

pub use behavior::ValidationBehavior;
pub use registration::ValidationRegistryExt;
pub use rules::Rules;
pub use validator::Validator;
