//! Batch codecs.
//!
//! A batch is one opaque string carrying one or more encoded events. The
//! queue stores events individually encoded; a codec only joins N encoded
//! events into one batch on the way out and splits a batch into N decoded
//! JSON values on the way in.
//!
//! | Codec | Batch form |
//! |-------|------------|
//! | [`JsonArrayCodec`] | `[{"event":..},{"event":..}]` |
//! | [`LineCodec`] | one event per line |

use crate::EventError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Joins and splits batches.
pub trait BatchCodec: Send + Sync {
    /// Codec name, as used in configuration.
    fn name(&self) -> &'static str;

    /// Joins individually encoded events into one batch token.
    fn join(&self, events: &[String]) -> String;

    /// Splits a batch into its events.
    ///
    /// Each element decodes independently so that one malformed event does
    /// not hide its neighbours. A batch that cannot be split at all yields a
    /// single `Err`.
    fn split(&self, batch: &str) -> Vec<Result<Value, EventError>>;
}

/// Batches as a JSON array. A lone JSON object is accepted as a batch of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArrayCodec;

impl BatchCodec for JsonArrayCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn join(&self, events: &[String]) -> String {
        format!("[{}]", events.join(","))
    }

    fn split(&self, batch: &str) -> Vec<Result<Value, EventError>> {
        match serde_json::from_str::<Value>(batch) {
            Ok(Value::Array(items)) => items.into_iter().map(Ok).collect(),
            Ok(single @ Value::Object(_)) => vec![Ok(single)],
            Ok(other) => vec![Err(EventError::Decode(format!(
                "batch must be an array of events, got {}",
                crate::value_kind(&other)
            )))],
            Err(e) => vec![Err(EventError::Decode(e.to_string()))],
        }
    }
}

/// Batches as newline-delimited JSON. Blank lines are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl BatchCodec for LineCodec {
    fn name(&self) -> &'static str {
        "lines"
    }

    fn join(&self, events: &[String]) -> String {
        events.join("\n")
    }

    fn split(&self, batch: &str) -> Vec<Result<Value, EventError>> {
        batch
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| EventError::Decode(e.to_string())))
            .collect()
    }
}

/// Codec selector used by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// [`JsonArrayCodec`].
    #[default]
    Json,
    /// [`LineCodec`].
    Lines,
}

impl CodecKind {
    /// Instantiates the codec.
    #[must_use]
    pub fn build(self) -> Box<dyn BatchCodec> {
        match self {
            Self::Json => Box::new(JsonArrayCodec),
            Self::Lines => Box::new(LineCodec),
        }
    }

    /// Configuration name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Lines => "lines",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "array" => Ok(Self::Json),
            "lines" | "ndjson" => Ok(Self::Lines),
            other => Err(EventError::invalid_field("codec", "json or lines", other)),
        }
    }
}
