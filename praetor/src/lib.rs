//! 进程内中介者（praetor）
//!
//! 调用方提交请求、命令或事件，分发器负责：
//! - 按消息的具体类型解析唯一处理器（请求/命令）或全部处理器（事件）；
//! - 以洋葱方式组装行为管线（先注册者在外层），每次调用重新组装；
//! - 事件处理器并发执行，全部完成后汇总失败。
//!
//! 典型用法：
//! 1. 为消息类型实现 [`Request`](message::Request) / [`Command`](message::Command) /
//!    [`Event`](message::Event)（或使用 `praetor-macros` 的属性宏）；
//! 2. 实现对应处理器并注册到 [`Registry`]，按需注册行为；
//! 3. 以 `Arc<Registry>` 构造 [`Dispatcher`]，调用 `send` / `execute` / `publish`。
//!
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod logging;
pub mod mediator;
pub mod message;
pub mod pipeline;
pub mod resolver;

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use logging::LoggingBehavior;
pub use mediator::Mediator;
pub use resolver::{MultiContract, Registry, Resolver};

// 允许在本 crate 内部通过 ::praetor 进行自引用，
// 以便属性宏在本 crate 的单元测试中也能解析到 ::praetor 路径。
extern crate self as praetor;
