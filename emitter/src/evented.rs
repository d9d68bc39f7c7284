//! 以组合代替继承：嵌入发射器的类型获得事件能力
//!
//! 需要事件能力的类型持有一个 `EventEmitter<T>`，实现 `events` 返回它，
//! 即可直接在自身上调用 `on` / `off` / `emit`，并保持链式调用返回自身。
//!
use crate::chain::EmitHandle;
use crate::emitter::EventEmitter;
use crate::handler::Handler;

pub trait Evented<T: Clone + Send + 'static> {
    fn events(&self) -> &EventEmitter<T>;

    fn on(&self, name: impl Into<String>, handler: Handler<T>) -> &Self {
        self.events().on(name, handler);
        self
    }

    fn off(&self, name: &str) -> &Self {
        self.events().off(name);
        self
    }

    fn off_handler(&self, name: &str, handler: &Handler<T>) -> &Self {
        self.events().off_handler(name, handler);
        self
    }

    fn off_all(&self) -> &Self {
        self.events().off_all();
        self
    }

    fn emit(&self, name: &str, value: T) -> EmitHandle {
        self.events().emit(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitterConfig;
    use emitter_notify::MemorySink;
    use std::sync::{Arc, Mutex};

    struct Vis {
        title: String,
        events: EventEmitter<String>,
    }

    impl Evented<String> for Vis {
        fn events(&self) -> &EventEmitter<String> {
            &self.events
        }
    }

    #[tokio::test]
    async fn embedding_type_gets_chained_on_off_emit() {
        let vis = Vis {
            title: "pie".into(),
            events: EventEmitter::with_config(
                EmitterConfig::builder().location("Vis").build(),
                Arc::new(MemorySink::new()),
            ),
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let h = {
            let seen = seen.clone();
            Handler::from_fn(move |v: String| {
                seen.lock().unwrap().push(v);
                Ok(())
            })
        };

        vis.on("update", h.clone()).on("render", h.clone());
        vis.emit("update", vis.title.clone()).await;
        vis.off_handler("update", &h).emit("update", "ignored".into()).await;
        vis.emit("render", "drawn".into()).await;
        vis.off_all();

        assert_eq!(*seen.lock().unwrap(), vec!["pie", "drawn"]);
        assert!(vis.events().event_names().is_empty());
    }
}
