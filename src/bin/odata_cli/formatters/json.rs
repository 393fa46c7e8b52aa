use anyhow::Result;
use serde_json::json;
use odata_query::{Properties, Value};

use crate::formatters::Formatter;

/// Formateur au format JSON
pub struct JsonFormatter {
    /// Indique si l'indentation est activée
    pretty: bool,
}

impl JsonFormatter {
    /// Crée un nouveau formateur JSON
    pub fn new() -> Self {
        JsonFormatter { pretty: true }
    }

    fn render(&self, json_value: &serde_json::Value) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(json_value)?)
        } else {
            Ok(serde_json::to_string(json_value)?)
        }
    }

    /// Rendu d'un message simple; ne peut pas échouer pour un objet de chaînes
    fn message(&self, key: &str, text: &str) -> String {
        self.render(&json!({ key: text }))
            .unwrap_or_else(|_| format!("{{\"{}\":\"{}\"}}", key, text))
    }
}

impl Formatter for JsonFormatter {
    fn format_query(&self, query: &str) -> String {
        self.message("query", query)
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        self.render(&value.to_json())
    }

    fn format_entries(&self, entries: &[Properties]) -> Result<String> {
        let items: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| Value::Object(entry.clone()).to_json())
            .collect();
        self.render(&serde_json::Value::Array(items))
    }

    fn format_names(&self, names: &[String]) -> Result<String> {
        self.render(&json!(names))
    }

    fn format_error(&self, error: &str) -> String {
        self.message("error", error)
    }

    fn format_info(&self, info: &str) -> String {
        self.message("info", info)
    }

    fn format_success(&self, success: &str) -> String {
        self.message("success", success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_entries() {
        let mut entry = Properties::new();
        entry.insert("ProductID".to_string(), Value::Integer(1));
        entry.insert("ProductName".to_string(), Value::from("Chai"));

        let output = JsonFormatter::new().format_entries(&[entry]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"ProductID": 1, "ProductName": "Chai"}]));
    }

    #[test]
    fn test_format_query() {
        let output = JsonFormatter::new().format_query("Price gt 10");
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["query"], "Price gt 10");
    }
}
