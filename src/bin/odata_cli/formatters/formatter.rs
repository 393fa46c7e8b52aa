use anyhow::Result;
use odata_query::{Properties, Value};

/// Trait définissant un formateur de sortie
pub trait Formatter {
    /// Formate un filtre compilé
    fn format_query(&self, query: &str) -> String;

    /// Formate une valeur pour l'affichage
    fn format_value(&self, value: &Value) -> Result<String>;

    /// Formate une liste d'entrées (une ligne par entrée)
    fn format_entries(&self, entries: &[Properties]) -> Result<String>;

    /// Formate une liste de noms pour l'affichage
    fn format_names(&self, names: &[String]) -> Result<String>;

    /// Formate un message d'erreur
    fn format_error(&self, error: &str) -> String;

    /// Formate un message d'information
    fn format_info(&self, info: &str) -> String;

    /// Formate un message de succès
    fn format_success(&self, success: &str) -> String;
}
