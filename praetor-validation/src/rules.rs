//! 同步规则构建器
//!
//! ```rust
//! use praetor_validation::Rules;
//!
//! struct CreateUser {
//!     user_name: String,
//!     email: String,
//! }
//!
//! let rules = Rules::<CreateUser>::new()
//!     .not_empty("user_name", |c| c.user_name.as_str())
//!     .min_length("user_name", 3, |c| c.user_name.as_str())
//!     .must("email", |c| c.email.contains('@'), "is not a valid email address");
//!
//! let failures = rules.check(&CreateUser { user_name: "".into(), email: "nope".into() });
//! assert_eq!(failures.len(), 3);
//! ```
use crate::validator::Validator;
use async_trait::async_trait;
use praetor::{context::AppContext, error::ValidationFailure};

type Check<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

struct Rule<T> {
    field: &'static str,
    check: Check<T>,
}

/// 按添加顺序执行的字段规则集合
pub struct Rules<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for Rules<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> Rules<T>
where
    T: 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// 字段去除首尾空白后不能为空
    pub fn not_empty<F>(self, field: &'static str, get: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        self.rule(field, move |value| {
            get(value)
                .trim()
                .is_empty()
                .then(|| "must not be empty".to_string())
        })
    }

    /// 字段字符数不少于 `min`
    pub fn min_length<F>(self, field: &'static str, min: usize, get: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        self.rule(field, move |value| {
            (get(value).chars().count() < min)
                .then(|| format!("must be at least {min} characters"))
        })
    }

    /// 自定义谓词，返回 `false` 时记录 `message`
    pub fn must<F>(self, field: &'static str, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.rule(field, move |value| {
            (!predicate(value)).then(|| message.clone())
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 同步执行全部规则，不短路
    pub fn check(&self, value: &T) -> Vec<ValidationFailure> {
        self.rules
            .iter()
            .filter_map(|rule| {
                (rule.check)(value).map(|message| ValidationFailure::new(rule.field, message))
            })
            .collect()
    }

    fn rule<F>(mut self, field: &'static str, check: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            field,
            check: Box::new(check),
        });
        self
    }
}

#[async_trait]
impl<T> Validator<T> for Rules<T>
where
    T: Send + Sync + 'static,
{
    async fn validate(&self, _ctx: &AppContext, value: &T) -> Vec<ValidationFailure> {
        self.check(value)
    }
}
