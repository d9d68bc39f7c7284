//! 监听器记录（ListenerRecord）
//!
//! 每条记录对应一次 `on` 注册，内部持有一个容量为 1 的信号通道与一个后台任务：
//! - 发射链通过 `deliver` 向记录投递值，并等待本轮“结算”；
//! - 后台任务收到值后立即回到就绪态（通道可以接收下一个值），再调用处理器；
//! - 处理器的同步部分与首次 poll 在后台任务内完成，剩余的异步部分脱离到独立任务；
//! - 处理器的失败（`Err` 或 panic）统一以 fatal 级别上报，然后结算本轮。
//!
//! 状态机：`Armed`（就绪）→ `Signaled`（值已投递，调度中）→ `Armed`。
//!
use crate::error::EmitterError;
use crate::handler::Handler;
use emitter_notify::Notifier;
use futures_util::FutureExt;
use futures_util::future;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

const ARMED: u8 = 0;
const SIGNALED: u8 = 1;

/// 监听器记录所处的状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    /// 就绪，可以接收下一个值
    Armed,
    /// 值已投递，处理器调度中
    Signaled,
}

struct Signal<T> {
    value: T,
    settled: oneshot::Sender<()>,
}

pub(crate) struct ListenerRecord<T> {
    handler: Handler<T>,
    signal: mpsc::Sender<Signal<T>>,
    state: Arc<AtomicU8>,
}

impl<T: Send + 'static> ListenerRecord<T> {
    /// 创建记录并在 `runtime` 上启动其后台任务
    pub(crate) fn spawn(
        event: Arc<str>,
        handler: Handler<T>,
        notifier: Notifier,
        runtime: &Handle,
    ) -> Self {
        let (signal, rx) = mpsc::channel(1);
        let state = Arc::new(AtomicU8::new(ARMED));

        runtime.spawn(run_listener(
            event,
            handler.clone(),
            rx,
            state.clone(),
            notifier,
        ));

        Self {
            handler,
            signal,
            state,
        }
    }

    pub(crate) fn handler(&self) -> &Handler<T> {
        &self.handler
    }

    pub(crate) fn state(&self) -> ListenerState {
        match self.state.load(Ordering::Acquire) {
            SIGNALED => ListenerState::Signaled,
            _ => ListenerState::Armed,
        }
    }

    /// 投递一个值并等待本轮结算（处理器已被调用且其完成已脱离）
    pub(crate) async fn deliver(&self, value: T) {
        let (settled, done) = oneshot::channel();
        self.state.store(SIGNALED, Ordering::Release);

        if self.signal.send(Signal { value, settled }).await.is_err() {
            // 后台任务已退出（运行时关闭），没有需要等待的结算
            self.state.store(ARMED, Ordering::Release);
            tracing::warn!(
                handler = self.handler.name(),
                "listener worker is gone, value dropped"
            );
            return;
        }

        let _ = done.await;
    }
}

async fn run_listener<T: Send + 'static>(
    event: Arc<str>,
    handler: Handler<T>,
    mut rx: mpsc::Receiver<Signal<T>>,
    state: Arc<AtomicU8>,
    notifier: Notifier,
) {
    while let Some(Signal { value, settled }) = rx.recv().await {
        state.store(ARMED, Ordering::Release);
        invoke(&event, &handler, value, &notifier).await;
        let _ = settled.send(());
    }

    tracing::trace!(event = %event, handler = handler.name(), "listener worker stopped");
}

type Outcome = Result<anyhow::Result<()>, Box<dyn Any + Send>>;

async fn invoke<T: Send + 'static>(
    event: &Arc<str>,
    handler: &Handler<T>,
    value: T,
    notifier: &Notifier,
) {
    let fut = match panic::catch_unwind(AssertUnwindSafe(|| handler.call(value))) {
        Ok(fut) => fut,
        Err(payload) => {
            report(event, handler.name(), Err(payload), notifier);
            return;
        }
    };

    let mut fut = AssertUnwindSafe(fut).catch_unwind();
    match future::poll_immediate(&mut fut).await {
        Some(outcome) => report(event, handler.name(), outcome, notifier),
        None => {
            let event = event.clone();
            let name = handler.name().to_string();
            let notifier = notifier.clone();
            tokio::spawn(async move {
                let outcome = fut.await;
                report(&event, &name, outcome, &notifier);
            });
        }
    }
}

fn report(event: &str, handler: &str, outcome: Outcome, notifier: &Notifier) {
    let err = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(err)) => EmitterError::handler_failed(event, handler, &err),
        Err(payload) => EmitterError::handler_panicked(event, handler, &*payload),
    };

    tracing::debug!(event, handler, "event handler failed");

    // 落地实现自身 panic 时不能带走监听器的后台任务
    let reason = err.to_string();
    if panic::catch_unwind(AssertUnwindSafe(|| notifier.fatal(err))).is_err() {
        tracing::error!(
            event,
            handler,
            location = notifier.location(),
            %reason,
            "diagnostic sink panicked while reporting"
        );
    }
}
