//! 发射器配置
//!
use crate::error::EmitterResult;
use bon::Builder;
use serde::{Deserialize, Serialize};

/// 诊断上报的默认位置标签
pub const DEFAULT_LOCATION: &str = "EventEmitter";

/// 发射器配置
///
/// 既可以通过 `EmitterConfig::builder()` 构造，也可以从 JSON 反序列化，缺省字段取默认值。
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// 处理器失败上报时使用的位置标签
    #[builder(into, default = DEFAULT_LOCATION.to_string())]
    pub location: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl EmitterConfig {
    pub fn from_json(raw: &str) -> EmitterResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_default_agree() {
        assert_eq!(EmitterConfig::builder().build(), EmitterConfig::default());
        assert_eq!(
            EmitterConfig::builder().location("SearchSource").build().location,
            "SearchSource"
        );
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = EmitterConfig::from_json("{}").unwrap();
        assert_eq!(config.location, DEFAULT_LOCATION);

        let config = EmitterConfig::from_json(r#"{"location":"Vis"}"#).unwrap();
        assert_eq!(config.location, "Vis");
    }

    #[test]
    fn from_json_reports_malformed_input() {
        let err = EmitterConfig::from_json("{").unwrap_err();
        assert!(err.to_string().starts_with("serialization error"));
    }
}
