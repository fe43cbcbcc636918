use crate::message::MessageKind;
use serde::Serialize;
use std::fmt;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("validation: {0}")]
    Validation(ValidationErrors),

    #[error("authorization: {0}")]
    Authorization(String),

    #[error("infra: {0}")]
    Infra(String),

    #[error("handler: {0}")]
    Handler(#[from] anyhow::Error),

    #[error("cancelled: {0}")]
    Cancelled(&'static str),

    #[error("handler not found: message={message}, contract={contract}")]
    HandlerNotFound {
        message: &'static str,
        contract: &'static str,
    },

    #[error("handler already registered: message={message}, contract={contract}")]
    AlreadyRegistered {
        message: &'static str,
        contract: &'static str,
    },

    #[error(
        "conflicting registration: message={message} is a {registered}, cannot register as {requested}"
    )]
    ConflictingRegistration {
        message: &'static str,
        registered: MessageKind,
        requested: MessageKind,
    },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// 单条校验失败
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 一次校验收集到的全部失败（保持收集顺序）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationFailure>);

impl ValidationErrors {
    pub fn new(failures: Vec<ValidationFailure>) -> Self {
        Self(failures)
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否存在指定字段的失败
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|f| f.field == field)
    }
}

impl From<Vec<ValidationFailure>> for ValidationErrors {
    fn from(failures: Vec<ValidationFailure>) -> Self {
        Self(failures)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", failure.field, failure.message)?;
        }
        Ok(())
    }
}

/// 事件发布的聚合失败：标识每个失败的处理器，成功处理器的副作用不回滚
#[derive(thiserror::Error, Debug)]
#[error("publish failed: event={event}, failed={}/{total}", .failures.len())]
pub struct PublishError {
    pub event: &'static str,
    /// 本次发布解析到的处理器总数
    pub total: usize,
    /// 按注册顺序排列
    pub failures: Vec<HandlerFailure>,
}

#[derive(Debug)]
pub struct HandlerFailure {
    /// 处理器在注册顺序中的位置
    pub index: usize,
    pub handler: &'static str,
    pub error: AppError,
}

impl PublishError {
    pub fn failed_handlers(&self) -> Vec<&'static str> {
        self.failures.iter().map(|f| f.handler).collect()
    }
}
