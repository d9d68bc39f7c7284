//! 发射器统一错误定义
//!
//! 处理器失败不会返回给 `emit` 的调用方，而是转换为 `EmitterError` 后交给诊断上报。
//!
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EmitterError {
    // --- 处理器 ---
    #[error("event handler error: event={event}, handler={handler}, reason={reason}")]
    HandlerFailed {
        event: String,
        handler: String,
        reason: String,
    },
    #[error("event handler panicked: event={event}, handler={handler}, message={message}")]
    HandlerPanicked {
        event: String,
        handler: String,
        message: String,
    },

    // --- 配置/运行时 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("runtime unavailable: {reason}")]
    Runtime { reason: String },
}

impl EmitterError {
    pub fn handler_failed(
        event: impl Into<String>,
        handler: impl Into<String>,
        err: &anyhow::Error,
    ) -> Self {
        EmitterError::HandlerFailed {
            event: event.into(),
            handler: handler.into(),
            // `{:#}` 会带上完整的 context 链
            reason: format!("{err:#}"),
        }
    }

    pub fn handler_panicked(
        event: impl Into<String>,
        handler: impl Into<String>,
        payload: &(dyn std::any::Any + Send),
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        EmitterError::HandlerPanicked {
            event: event.into(),
            handler: handler.into(),
            message,
        }
    }
}

impl From<tokio::runtime::TryCurrentError> for EmitterError {
    fn from(err: tokio::runtime::TryCurrentError) -> Self {
        EmitterError::Runtime {
            reason: err.to_string(),
        }
    }
}

/// 统一 Result 类型别名
pub type EmitterResult<T> = Result<T, EmitterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_failed_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("saving document");
        let e = EmitterError::handler_failed("save", "persist", &err);

        assert_eq!(
            e.to_string(),
            "event handler error: event=save, handler=persist, reason=saving document: disk full"
        );
    }

    #[test]
    fn handler_panicked_extracts_str_and_string_payloads() {
        let e = EmitterError::handler_panicked("save", "h", &"static boom");
        assert!(e.to_string().ends_with("message=static boom"));

        let e = EmitterError::handler_panicked("save", "h", &String::from("owned boom"));
        assert!(e.to_string().ends_with("message=owned boom"));

        let e = EmitterError::handler_panicked("save", "h", &7_u32);
        assert!(e.to_string().ends_with("message=non-string panic payload"));
    }
}
