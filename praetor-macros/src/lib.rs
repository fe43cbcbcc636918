use proc_macro::TokenStream;

mod message;

use message::{MessageAttrConfig, MessageShape};
use syn::{Item, parse_macro_input};

/// 请求宏
/// - 为目标结构体/枚举实现 `::praetor::message::Request`
/// - 参数：`#[request(response = Type)]`（必填），`name = "..."`（可选，默认类型名）
/// - 泛型消息：生成的实现为每个类型参数追加 `Send + Sync + 'static` 约束（三个宏相同）
///
/// ```ignore
/// #[request(response = Option<UserDto>)]
/// struct GetUser {
///     id: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn request(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);
    message::expand(MessageShape::Request, cfg, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// 命令宏
/// - 为目标结构体/枚举实现 `::praetor::message::Command`
/// - 参数：`name = "..."`（可选）
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);
    message::expand(MessageShape::Command, cfg, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// 事件宏
/// - 为目标结构体/枚举实现 `::praetor::message::Event`
/// - 参数：`name = "..."`（可选）
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);
    message::expand(MessageShape::Event, cfg, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
