use async_trait::async_trait;
use emitter::{EmitterConfig, EventEmitter, Evented, Handler, Listener};
use emitter_notify::{DiagnosticSink, MemorySink, Report, TracingSink};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct SaveEvent {
    id: u64,
    title: String,
}

/// 嵌入发射器的业务对象
struct SavedSearch {
    id: u64,
    title: Mutex<String>,
    events: EventEmitter<SaveEvent>,
}

impl SavedSearch {
    fn new(id: u64, title: &str, events: EventEmitter<SaveEvent>) -> Self {
        Self {
            id,
            title: Mutex::new(title.to_string()),
            events,
        }
    }

    fn rename(&self, title: &str) -> emitter::EmitHandle {
        *self.title.lock().unwrap() = title.to_string();
        self.emit(
            "save",
            SaveEvent {
                id: self.id,
                title: title.to_string(),
            },
        )
    }
}

impl Evented<SaveEvent> for SavedSearch {
    fn events(&self) -> &EventEmitter<SaveEvent> {
        &self.events
    }
}

/// 同时写入 tracing 与内存，便于示例结束时汇总
struct TeeSink {
    memory: MemorySink,
}

impl DiagnosticSink for TeeSink {
    fn report(&self, report: Report) {
        TracingSink.report(report.clone());
        self.memory.report(report);
    }
}

struct TitleIndex {
    titles: Mutex<Vec<String>>,
}

#[async_trait]
impl Listener<SaveEvent> for TitleIndex {
    fn listener_name(&self) -> &str {
        "title-index"
    }

    async fn handle(&self, value: SaveEvent) -> anyhow::Result<()> {
        anyhow::ensure!(!value.title.trim().is_empty(), "title must not be blank");
        self.titles.lock().unwrap().push(value.title);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = std::env::var("EMITTER_CONFIG")
        .ok()
        .map(|raw| EmitterConfig::from_json(&raw))
        .transpose()
        .unwrap_or_else(|e| {
            eprintln!("invalid EMITTER_CONFIG, using defaults: {e}");
            None
        })
        .unwrap_or_else(|| EmitterConfig::builder().location("SavedSearch").build());

    let sink = Arc::new(TeeSink {
        memory: MemorySink::new(),
    });
    let search = SavedSearch::new(
        1,
        "errors by host",
        EventEmitter::with_config(config, sink.clone()),
    );

    tracing::info!(location = search.events().location(), "saved search ready");
    println!("=== SavedSearch 事件示例 ===\n");

    let index = Arc::new(TitleIndex {
        titles: Mutex::new(Vec::new()),
    });
    let printer = Handler::from_fn(|e: SaveEvent| {
        println!("  printer: #{} -> {}", e.id, e.title);
        Ok(())
    })
    .named("printer");

    search
        .on("save", printer.clone())
        .on("save", Handler::from_listener(index.clone()));

    search.rename("errors by host (24h)").await;
    println!("✅ 重命名一次，title-index: {:?}", index.titles.lock().unwrap());

    // 空标题会让 title-index 失败，失败被上报而不影响 printer
    search.rename("   ").await;
    println!(
        "✅ 空标题发射完成，fatal 上报 {} 条",
        sink.memory.fatal_reports().len()
    );

    search.off_handler("save", &printer);
    search.rename("errors by host (7d)").await;
    println!("✅ 移除 printer 后再次发射");

    // 无监听器的事件同样返回可等待的句柄
    search
        .emit(
            "delete",
            SaveEvent {
                id: 1,
                title: String::new(),
            },
        )
        .await;

    println!("\n--- 汇总 ---");
    println!("current title: {}", search.title.lock().unwrap());
    println!("indexed titles: {:?}", index.titles.lock().unwrap());
    for report in sink.memory.reports() {
        println!("report: {report}");
    }
}
