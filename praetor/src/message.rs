//! 消息模型（Message Model）
//!
//! 三种互不相交的消息形态，仅以静态类型区分：
//! - [`Request`]：带返回值的命令/查询，由唯一处理器处理；
//! - [`Command`]：无返回值的命令，只表达成功/失败；
//! - [`Event`]：已发生的事实，可有零个或多个处理器。
//!
//! 运行时唯一的类型检查是取具体类型的 `TypeId`，用于注册表查找。
//!
use std::fmt;

/// 带返回值的请求（命令或查询）
///
/// - 表达“产生一个 `Response`”的静态契约；
/// - 调用方拥有消息值，分发期间借出给管线各阶段，调用结束即释放。
///
/// 关联常量：
/// - `NAME`：请求的稳定名称，用于日志、错误与注册表清单。避免依赖 `type_name::<T>()`。
pub trait Request: Send + Sync + 'static {
    /// 请求的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 处理器产生的结果类型
    type Response: Send + 'static;
}

/// 无返回值的命令
///
/// 建议保持语义化的“动宾结构”命名，如 `DeleteUser`、`CloseOrder`。
/// 同一类型不能同时作为 [`Request`] 与 `Command` 注册。
pub trait Command: Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}

/// 事件：宣告已经发生的事情，不声明返回类型
pub trait Event: Send + Sync + 'static {
    /// 事件的稳定名称
    const NAME: &'static str;
}

/// 消息形态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Command,
    Event,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Request => "request",
            MessageKind::Command => "command",
            MessageKind::Event => "event",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
