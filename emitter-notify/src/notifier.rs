//! 作用域化上报入口（Notifier）
//!
//! 每个 `Notifier` 绑定一个位置标签，所有上报都带上该标签后交给共享的 `DiagnosticSink`。
//! 通过 `scoped` 可以派生出共享同一落地、但位置不同的子 Notifier。
//!
use crate::report::{Report, Severity};
use crate::sink::{DiagnosticSink, TracingSink};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

#[derive(Clone)]
pub struct Notifier {
    location: Arc<str>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Notifier {
    pub fn new(location: impl Into<String>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            location: Arc::from(location.into()),
            sink,
        }
    }

    /// 使用默认的 `TracingSink`
    pub fn tracing(location: impl Into<String>) -> Self {
        Self::new(location, Arc::new(TracingSink))
    }

    /// 派生一个共享同一落地的子 Notifier
    pub fn scoped(&self, location: impl Into<String>) -> Self {
        Self::new(location, self.sink.clone())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn notify(&self, severity: Severity, message: impl Display) {
        self.sink.report(Report::new(
            self.location.as_ref(),
            severity,
            message.to_string(),
        ));
    }

    pub fn fatal(&self, message: impl Display) {
        self.notify(Severity::Fatal, message);
    }

    pub fn error(&self, message: impl Display) {
        self.notify(Severity::Error, message);
    }

    pub fn warning(&self, message: impl Display) {
        self.notify(Severity::Warning, message);
    }

    pub fn info(&self, message: impl Display) {
        self.notify(Severity::Info, message);
    }
}

impl Debug for Notifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn reports_carry_location_and_severity() {
        let sink = Arc::new(MemorySink::new());
        let notify = Notifier::new("EventEmitter", sink.clone());

        notify.fatal("handler exploded");
        notify.info(42);

        let reports = sink.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].location, "EventEmitter");
        assert_eq!(reports[0].severity, Severity::Fatal);
        assert_eq!(reports[0].message, "handler exploded");
        assert_eq!(reports[1].severity, Severity::Info);
        assert_eq!(reports[1].message, "42");
    }

    #[test]
    fn scoped_notifier_shares_sink() {
        let sink = Arc::new(MemorySink::new());
        let root = Notifier::new("root", sink.clone());
        let child = root.scoped("child");

        root.warning("w");
        child.error("e");

        let locations: Vec<_> = sink.reports().into_iter().map(|r| r.location).collect();
        assert_eq!(locations, vec!["root", "child"]);
        assert_eq!(child.location(), "child");
    }
}
