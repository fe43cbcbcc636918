/// 分发器配置
#[derive(Clone, Copy, Debug, Default)]
pub struct DispatcherConfig {
    /// 单次发布中同时执行的事件处理器上限；`None`（默认）表示全部同时执行
    pub publish_concurrency: Option<usize>,
}
