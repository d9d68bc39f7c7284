//! 上报落地（DiagnosticSink）
//!
//! 定义上报的最终去向。实现必须吞掉自身的错误：上报链路不允许向调用方传播失败。
//!
use crate::report::{Report, Severity};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 上报落地协议
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, report: Report);
}

/// 默认实现：将上报写入 `tracing`
///
/// fatal 与 error 均映射为 `ERROR` 级别，并携带 `severity` 字段加以区分。
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, report: Report) {
        let Report {
            location,
            severity,
            message,
            ..
        } = report;

        match severity {
            Severity::Fatal | Severity::Error => {
                tracing::error!(%location, %severity, "{message}")
            }
            Severity::Warning => tracing::warn!(%location, %severity, "{message}"),
            Severity::Info => tracing::info!(%location, %severity, "{message}"),
        }
    }
}

/// 内存收集实现，按到达顺序保存全部上报
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Report>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前已收集上报的快照
    pub fn reports(&self) -> Vec<Report> {
        self.lock().clone()
    }

    /// 仅返回 fatal 级别的上报
    pub fn fatal_reports(&self) -> Vec<Report> {
        self.lock()
            .iter()
            .filter(|r| r.is_fatal())
            .cloned()
            .collect()
    }

    /// 取走并清空已收集的上报
    pub fn take(&self) -> Vec<Report> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // 上报方 panic 不应让收集器永久不可用
    fn lock(&self) -> MutexGuard<'_, Vec<Report>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, report: Report) {
        self.lock().push(report);
    }
}
