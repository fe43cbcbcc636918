use crate::{behavior::ValidationBehavior, validator::Validator};
use praetor::{
    Registry,
    message::{Command, Request},
};
use std::sync::Arc;

/// 在注册表上按消息类型注册校验行为
///
/// 校验行为与其他按类型注册的行为一样遵循注册顺序：先注册者位于外层。
pub trait ValidationRegistryExt {
    fn add_request_validation<Q>(&self, validators: Vec<Arc<dyn Validator<Q>>>)
    where
        Q: Request;

    fn add_command_validation<C>(&self, validators: Vec<Arc<dyn Validator<C>>>)
    where
        C: Command;
}

impl ValidationRegistryExt for Registry {
    fn add_request_validation<Q>(&self, validators: Vec<Arc<dyn Validator<Q>>>)
    where
        Q: Request,
    {
        self.register_request_behavior::<Q, _>(Arc::new(ValidationBehavior::new(validators)));
    }

    fn add_command_validation<C>(&self, validators: Vec<Arc<dyn Validator<C>>>)
    where
        C: Command,
    {
        self.register_command_behavior::<C, _>(Arc::new(ValidationBehavior::new(validators)));
    }
}
