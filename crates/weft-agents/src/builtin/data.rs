use futures::future::BoxFuture;

use weft_core::error::{Result, WeftError};
use weft_core::settings::SettingsMap;
use weft_core::traits::DeterministicAgent;
use weft_core::types::SettingField;

use super::require_text_input;

// ── CsvToJsonAgent ──────────────────────────────────────────────

/// Parse CSV text into a JSON array of row objects. The first line is the
/// header row.
pub struct CsvToJsonAgent;

impl DeterministicAgent for CsvToJsonAgent {
    fn name(&self) -> &str {
        "CSV to JSON"
    }
    fn description(&self) -> &str {
        "Parse CSV text into a JSON array of objects keyed by the header row."
    }
    fn settings_schema(&self) -> Vec<SettingField> {
        vec![SettingField::new("delimiter", "Delimiter", "string", false)
            .with_default(serde_json::json!(","))]
    }
    fn execute(
        &self,
        input: Option<serde_json::Value>,
        settings: SettingsMap,
    ) -> BoxFuture<'_, Result<serde_json::Value>> {
        Box::pin(async move {
            let csv = require_text_input("csv-to-json", input)?;
            let delimiter = settings
                .get_str("delimiter")
                .and_then(|d| d.chars().next())
                .unwrap_or(',');

            let mut lines = csv.lines();
            let headers: Vec<&str> = match lines.next() {
                Some(h) => h.split(delimiter).map(|s| s.trim()).collect(),
                None => {
                    return Err(WeftError::AgentExecution {
                        agent: "csv-to-json".to_string(),
                        message: "empty CSV input".to_string(),
                    })
                }
            };

            let mut rows = Vec::new();
            for line in lines {
                if line.trim().is_empty() {
                    continue;
                }
                let values: Vec<&str> = line.split(delimiter).map(|s| s.trim()).collect();
                let mut obj = serde_json::Map::new();
                for (i, header) in headers.iter().enumerate() {
                    obj.insert(
                        header.to_string(),
                        serde_json::Value::String(values.get(i).unwrap_or(&"").to_string()),
                    );
                }
                rows.push(serde_json::Value::Object(obj));
            }
            Ok(serde_json::Value::Array(rows))
        })
    }
}

// ── JsonToCsvAgent ──────────────────────────────────────────────

/// Render a JSON array of flat objects as CSV. Column order follows the
/// first row's keys.
pub struct JsonToCsvAgent;

impl DeterministicAgent for JsonToCsvAgent {
    fn name(&self) -> &str {
        "JSON to CSV"
    }
    fn description(&self) -> &str {
        "Render a JSON array of objects as CSV text."
    }
    fn execute(
        &self,
        input: Option<serde_json::Value>,
        _settings: SettingsMap,
    ) -> BoxFuture<'_, Result<serde_json::Value>> {
        Box::pin(async move {
            let value = match input {
                Some(serde_json::Value::String(s)) => serde_json::from_str(&s)
                    .map_err(|e| WeftError::AgentExecution {
                        agent: "json-to-csv".to_string(),
                        message: format!("input is not valid JSON: {}", e),
                    })?,
                Some(v) => v,
                None => {
                    return Err(WeftError::AgentExecution {
                        agent: "json-to-csv".to_string(),
                        message: "no upstream input".to_string(),
                    })
                }
            };

            let rows = value.as_array().ok_or_else(|| WeftError::AgentExecution {
                agent: "json-to-csv".to_string(),
                message: "expected a JSON array of objects".to_string(),
            })?;

            let headers: Vec<String> = rows
                .iter()
                .find_map(|r| r.as_object())
                .map(|obj| obj.keys().cloned().collect())
                .unwrap_or_default();

            let mut out = headers.join(",");
            for row in rows {
                let obj = row.as_object();
                let line: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        obj.and_then(|o| o.get(h))
                            .map(render_cell)
                            .unwrap_or_default()
                    })
                    .collect();
                out.push('\n');
                out.push_str(&line.join(","));
            }
            Ok(serde_json::Value::String(out))
        })
    }
}

fn render_cell(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── JsonQueryAgent ──────────────────────────────────────────────

/// Query a JSON value by dot-notation path (e.g. `items[0].name`).
pub struct JsonQueryAgent;

impl DeterministicAgent for JsonQueryAgent {
    fn name(&self) -> &str {
        "JSON Query"
    }
    fn description(&self) -> &str {
        "Query a JSON value by dot-notation path (e.g. 'items[0].name')."
    }
    fn settings_schema(&self) -> Vec<SettingField> {
        vec![SettingField::new("path", "Path", "string", true)]
    }
    fn execute(
        &self,
        input: Option<serde_json::Value>,
        settings: SettingsMap,
    ) -> BoxFuture<'_, Result<serde_json::Value>> {
        Box::pin(async move {
            let path = settings.require_str("path")?.to_string();
            let value = match input {
                Some(serde_json::Value::String(s)) => serde_json::from_str(&s)
                    .map_err(|e| WeftError::AgentExecution {
                        agent: "json-query".to_string(),
                        message: format!("input is not valid JSON: {}", e),
                    })?,
                Some(v) => v,
                None => {
                    return Err(WeftError::AgentExecution {
                        agent: "json-query".to_string(),
                        message: "no upstream input".to_string(),
                    })
                }
            };
            Ok(json_path_query(&value, &path))
        })
    }
}

fn json_path_query(value: &serde_json::Value, path: &str) -> serde_json::Value {
    let mut current = value.clone();
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        // Check for array index: key[0]
        if let Some(bracket_pos) = segment.find('[') {
            let key = &segment[..bracket_pos];
            let idx_str = &segment[bracket_pos + 1..segment.len() - 1];
            if !key.is_empty() {
                current = current.get(key).cloned().unwrap_or(serde_json::Value::Null);
            }
            if let Ok(idx) = idx_str.parse::<usize>() {
                current = current.get(idx).cloned().unwrap_or(serde_json::Value::Null);
            }
        } else {
            current = current
                .get(segment)
                .cloned()
                .unwrap_or(serde_json::Value::Null);
        }
    }
    current
}
