use emitter_notify::{DiagnosticSink, MemorySink, Notifier, Report, Severity};
use std::sync::Arc;

struct ForwardingSink {
    inner: MemorySink,
}

impl DiagnosticSink for ForwardingSink {
    fn report(&self, report: Report) {
        self.inner.report(report);
    }
}

#[test]
fn custom_sink_receives_all_severities_in_order() {
    let sink = Arc::new(ForwardingSink {
        inner: MemorySink::new(),
    });
    let notify = Notifier::new("Saved Search", sink.clone());

    notify.info("loaded");
    notify.warning("slow");
    notify.error("retrying");
    notify.fatal("gave up");

    let severities: Vec<_> = sink.inner.reports().into_iter().map(|r| r.severity).collect();
    assert_eq!(
        severities,
        vec![
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Fatal
        ]
    );
    assert_eq!(sink.inner.fatal_reports().len(), 1);
}

#[test]
fn reports_roundtrip_through_json() {
    let report = Report::new("EventEmitter", Severity::Warning, "careful");
    let json = serde_json::to_string(&report).unwrap();
    let back: Report = serde_json::from_str(&json).unwrap();

    assert_eq!(back, report);
}
