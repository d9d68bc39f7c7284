//! 事件发射器（EventEmitter）
//!
//! 维护“事件名 → 有序监听器记录列表”的映射，支持注册、移除与异步串行发射：
//! - `on`：追加监听器记录，同一处理器重复注册不会去重；
//! - `off_*`：按全部 / 事件名 / 事件名 + 处理器身份移除；
//! - `emit`：把本次调用涉及的记录按注册顺序追加到发射链，返回完成句柄。
//!
//! 所有方法均接收 `&self`，处理器内部可以安全地再次调用 on/off/emit。
//!
use crate::chain::{EmitChain, EmitHandle};
use crate::config::EmitterConfig;
use crate::error::EmitterResult;
use crate::handler::Handler;
use crate::listener::{ListenerRecord, ListenerState};
use dashmap::DashMap;
use emitter_notify::{DiagnosticSink, Notifier, TracingSink};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct EventEmitter<T> {
    listeners: DashMap<String, Vec<Arc<ListenerRecord<T>>>>,
    chain: EmitChain<T>,
    notifier: Notifier,
    runtime: Handle,
}

impl<T: Clone + Send + 'static> EventEmitter<T> {
    /// 使用默认配置与 `TracingSink` 创建发射器
    ///
    /// # Panics
    ///
    /// 不在 Tokio 运行时上下文中调用时 panic，可改用 [`EventEmitter::try_new`]。
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default(), Arc::new(TracingSink))
    }

    pub fn try_new() -> EmitterResult<Self> {
        Self::try_with_config(EmitterConfig::default(), Arc::new(TracingSink))
    }

    /// # Panics
    ///
    /// 不在 Tokio 运行时上下文中调用时 panic。
    pub fn with_config(config: EmitterConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self::with_runtime(config, sink, Handle::current())
    }

    pub fn try_with_config(
        config: EmitterConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> EmitterResult<Self> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(config, sink, runtime))
    }

    /// 在指定运行时上派生发射链与监听器任务
    pub fn with_runtime(
        config: EmitterConfig,
        sink: Arc<dyn DiagnosticSink>,
        runtime: Handle,
    ) -> Self {
        Self {
            listeners: DashMap::new(),
            chain: EmitChain::spawn(&runtime),
            notifier: Notifier::new(config.location, sink),
            runtime,
        }
    }

    /// 注册监听器，返回自身以便链式调用
    pub fn on(&self, name: impl Into<String>, handler: Handler<T>) -> &Self {
        let name = name.into();
        tracing::debug!(
            location = self.notifier.location(),
            event = %name,
            handler = handler.name(),
            "listener registered"
        );

        let record = ListenerRecord::spawn(
            Arc::from(name.as_str()),
            handler,
            self.notifier.clone(),
            &self.runtime,
        );
        self.listeners.entry(name).or_default().push(Arc::new(record));
        self
    }

    /// 移除全部事件的全部监听器
    pub fn off_all(&self) -> &Self {
        tracing::debug!(location = self.notifier.location(), "all listeners removed");
        self.listeners.clear();
        self
    }

    /// 移除某事件的全部监听器；事件不存在时什么也不做
    pub fn off(&self, name: &str) -> &Self {
        if self.listeners.remove(name).is_some() {
            tracing::debug!(location = self.notifier.location(), event = name, "listeners removed");
        }
        self
    }

    /// 移除某事件下与 `handler` 为同一身份的全部记录，其余记录保持原有顺序
    pub fn off_handler(&self, name: &str, handler: &Handler<T>) -> &Self {
        let removed = match self.listeners.get_mut(name) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|record| !record.handler().same_as(handler));
                before - list.len()
            }
            None => return self,
        };

        // 清空后的列表直接移除，之后的 emit 视为没有监听器
        self.listeners.remove_if(name, |_, list| list.is_empty());

        if removed > 0 {
            tracing::debug!(
                location = self.notifier.location(),
                event = name,
                handler = handler.name(),
                removed,
                "listener removed"
            );
        }
        self
    }

    /// 按可选参数移除监听器：
    /// - 均未提供：移除全部；
    /// - 仅提供事件名：移除该事件全部监听器；
    /// - 均提供：按身份移除该事件下的处理器；
    /// - 仅提供处理器：不做任何事（移除总是先按事件名定位）。
    pub fn off_matching(&self, name: Option<&str>, handler: Option<&Handler<T>>) -> &Self {
        match (name, handler) {
            (None, None) => self.off_all(),
            (Some(name), None) => self.off(name),
            (Some(name), Some(handler)) => self.off_handler(name, handler),
            (None, Some(_)) => self,
        }
    }

    /// 向 `name` 的全部监听器发射 `value`
    ///
    /// 没有监听器时直接返回当前链尾的句柄；否则按注册顺序为每条记录追加投递步骤。
    /// 处理器失败只会被上报，不会让返回的句柄失败。
    pub fn emit(&self, name: &str, value: T) -> EmitHandle {
        let records = match self.listeners.get(name) {
            Some(list) => list.value().clone(),
            None => return self.chain.tail(),
        };

        tracing::trace!(
            location = self.notifier.location(),
            event = name,
            listeners = records.len(),
            "emit"
        );
        self.chain.append(&records, value)
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map(|list| list.len()).unwrap_or(0)
    }

    pub fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    /// 当前有监听器的事件名（已排序）
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// 某事件下各记录的状态，按注册顺序
    pub fn listener_states(&self, name: &str) -> Vec<ListenerState> {
        self.listeners
            .get(name)
            .map(|list| list.iter().map(|record| record.state()).collect())
            .unwrap_or_default()
    }

    /// 诊断上报使用的位置标签
    pub fn location(&self) -> &str {
        self.notifier.location()
    }
}

impl<T: Clone + Send + 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("location", &self.location())
            .field("events", &self.event_names())
            .finish_non_exhaustive()
    }
}
