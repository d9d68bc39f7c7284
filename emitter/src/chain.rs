//! 串行发射链（EmitChain）与完成句柄（EmitHandle）
//!
//! 每个发射器持有一条单消费者 FIFO 队列，后台任务逐个处理队列中的步骤：
//! “向某条监听器记录投递值，并等待其结算”。`emit` 在调用时同步入队，
//! 因此不同调用（无论事件名是否相同）的步骤严格按提交顺序执行，不会交错。
//!
//! 每个步骤带有递增序号，后台任务处理完后通过 `watch` 公布进度；
//! 链尾即最后一个已入队步骤的序号，`EmitHandle` 等待进度追上目标序号。
//!
use crate::listener::ListenerRecord;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::future::IntoFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

struct ChainStep<T> {
    record: Arc<ListenerRecord<T>>,
    value: T,
    seq: u64,
}

struct ChainTail<T> {
    queue: mpsc::UnboundedSender<ChainStep<T>>,
    last_seq: u64,
}

pub(crate) struct EmitChain<T> {
    tail: Mutex<ChainTail<T>>,
    progress: watch::Receiver<u64>,
}

impl<T: Clone + Send + 'static> EmitChain<T> {
    pub(crate) fn spawn(runtime: &Handle) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (progress_tx, progress) = watch::channel(0);

        runtime.spawn(run_chain(rx, progress_tx));

        Self {
            tail: Mutex::new(ChainTail { queue, last_seq: 0 }),
            progress,
        }
    }

    /// 当前链尾的句柄，不追加任何步骤
    pub(crate) fn tail(&self) -> EmitHandle {
        let last_seq = self.lock().last_seq;
        EmitHandle::new(self.progress.clone(), last_seq)
    }

    /// 按顺序为每条记录追加一个投递步骤，返回覆盖这些步骤的句柄
    pub(crate) fn append(&self, records: &[Arc<ListenerRecord<T>>], value: T) -> EmitHandle {
        let mut tail = self.lock();

        for record in records {
            let seq = tail.last_seq + 1;
            let step = ChainStep {
                record: record.clone(),
                value: value.clone(),
                seq,
            };
            // 只有成功入队的步骤才推进链尾
            if tail.queue.send(step).is_err() {
                tracing::warn!("emit chain closed, dropping remaining steps");
                break;
            }
            tail.last_seq = seq;
        }

        EmitHandle::new(self.progress.clone(), tail.last_seq)
    }

    fn lock(&self) -> MutexGuard<'_, ChainTail<T>> {
        self.tail.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run_chain<T: Send + 'static>(
    mut queue: mpsc::UnboundedReceiver<ChainStep<T>>,
    progress: watch::Sender<u64>,
) {
    while let Some(ChainStep { record, value, seq }) = queue.recv().await {
        record.deliver(value).await;
        tracing::trace!(seq, "emit chain step settled");
        progress.send_replace(seq);
    }
}

/// 一次 `emit` 的完成句柄
///
/// 在本次调用入队的所有投递步骤都被发射链处理完毕（每条监听器已收到值并结算）后完成；
/// 处理器自身异步部分的完成不在等待范围内。发射器被丢弃后句柄同样会完成。
///
/// 句柄可以直接 `.await`，也可以丢弃而不影响投递。
#[derive(Clone, Debug)]
pub struct EmitHandle {
    progress: watch::Receiver<u64>,
    target: u64,
}

impl EmitHandle {
    fn new(progress: watch::Receiver<u64>, target: u64) -> Self {
        Self { progress, target }
    }

    /// 进度已追上目标，或发射链已关闭
    pub fn is_complete(&self) -> bool {
        *self.progress.borrow() >= self.target || self.progress.has_changed().is_err()
    }

    pub async fn wait(mut self) {
        let target = self.target;
        // 发射链已关闭时返回错误，此时同样视为完成
        let _ = self.progress.wait_for(|seq| *seq >= target).await;
    }
}

impl IntoFuture for EmitHandle {
    type Output = ();
    type IntoFuture = BoxFuture<'static, ()>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait().boxed()
    }
}
