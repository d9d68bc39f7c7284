//! 异步事件发射器（emitter）
//!
//! 为上层对象提供按名称注册/移除监听器、异步发射事件的基础能力：
//! - `EventEmitter`：监听器表 + 串行发射链，同一实例的发射严格按提交顺序处理；
//! - `Handler` / `Listener`：监听器的闭包与结构化两种写法，按身份（而非行为）比较；
//! - `EmitHandle`：一次 `emit` 的完成句柄，可直接 `.await`；
//! - `Evented`：以组合代替继承，让嵌入发射器的类型获得 on/off/emit；
//! - 处理器失败（返回错误或 panic）一律捕获并以 fatal 级别上报，不影响发射方。
//!
//! 发射器依赖 Tokio 运行时：构造时捕获当前运行时句柄，用于派生串行链与监听器的后台任务。
//!
pub mod chain;
pub mod config;
pub mod emitter;
pub mod error;
pub mod evented;
pub mod handler;
pub mod listener;

pub use chain::EmitHandle;
pub use config::EmitterConfig;
pub use emitter::EventEmitter;
pub use error::{EmitterError, EmitterResult};
pub use evented::Evented;
pub use handler::{Handler, HandlerFuture, Listener};
pub use listener::ListenerState;
