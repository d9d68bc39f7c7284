//! 诊断上报（emitter-notify）
//!
//! 为事件发射器等基础组件提供“带位置标签”的诊断上报能力：
//! - `Notifier`：按位置（location）作用域化的上报入口，提供 fatal/error/warning/info；
//! - `DiagnosticSink`：上报落地协议，可对接日志、遥测或内存收集；
//! - `TracingSink`：默认实现，将上报映射为 `tracing` 事件；
//! - `MemorySink`：内存收集实现，便于测试与嵌入方读取。
//!
//! 上报永远不会失败或 panic，调用方可以在任何位置安全使用。
//!
pub mod notifier;
pub mod report;
pub mod sink;

pub use notifier::Notifier;
pub use report::{Report, Severity};
pub use sink::{DiagnosticSink, MemorySink, TracingSink};
