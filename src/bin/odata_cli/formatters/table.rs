use std::io::{self, IsTerminal};

use anyhow::Result;
use colored::*;
use prettytable::{Cell, Row, Table};
use odata_query::{Properties, Value};

use crate::formatters::Formatter;

/// Formateur au format tableau
pub struct TableFormatter {
    /// Indique si les couleurs sont activées
    colored: bool,
}

impl TableFormatter {
    /// Crée un nouveau formateur tableau
    pub fn new() -> Self {
        TableFormatter {
            colored: io::stdout().is_terminal(),
        }
    }
}

impl Formatter for TableFormatter {
    fn format_query(&self, query: &str) -> String {
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Filtre")]));
        table.add_row(Row::new(vec![Cell::new(query)]));
        table.to_string()
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        let mut table = Table::new();

        // En-têtes
        table.add_row(Row::new(vec![Cell::new("Type"), Cell::new("Valeur")]));
        table.add_row(Row::new(vec![
            Cell::new(value.type_name()),
            Cell::new(&cell_text(value)),
        ]));

        Ok(table.to_string())
    }

    fn format_entries(&self, entries: &[Properties]) -> Result<String> {
        // Colonnes: union des propriétés, dans l'ordre de première apparition
        let mut columns: Vec<&str> = Vec::new();
        for entry in entries {
            for key in entry.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }

        let mut table = Table::new();
        table.add_row(Row::new(columns.iter().map(|c| Cell::new(c)).collect()));

        for entry in entries {
            let cells = columns
                .iter()
                .map(|column| match entry.get(*column) {
                    Some(value) => Cell::new(&cell_text(value)),
                    None => Cell::new(""),
                })
                .collect();
            table.add_row(Row::new(cells));
        }

        Ok(table.to_string())
    }

    fn format_names(&self, names: &[String]) -> Result<String> {
        let mut table = Table::new();

        // En-têtes
        table.add_row(Row::new(vec![Cell::new("Index"), Cell::new("Nom")]));

        for (i, name) in names.iter().enumerate() {
            table.add_row(Row::new(vec![Cell::new(&i.to_string()), Cell::new(name)]));
        }

        Ok(table.to_string())
    }

    fn format_error(&self, error: &str) -> String {
        if self.colored {
            format!("{}", error.red().bold())
        } else {
            format!("Erreur: {}", error)
        }
    }

    fn format_info(&self, info: &str) -> String {
        if self.colored {
            format!("{}", info.blue())
        } else {
            format!("Info: {}", info)
        }
    }

    fn format_success(&self, success: &str) -> String {
        if self.colored {
            format!("{}", success.green().bold())
        } else {
            format!("Succès: {}", success)
        }
    }
}

/// Convertit une valeur en texte de cellule
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => {
            // Tronquer les chaînes longues
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("{}...", head)
            } else {
                s.clone()
            }
        }
        Value::Object(_) => "{object}".to_string(),
        Value::Array(_) => "[array]".to_string(),
        other => other.to_string(),
    }
}
