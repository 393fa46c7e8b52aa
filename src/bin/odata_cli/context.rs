use std::path::Path;

use odata_query::{Session, Settings};

use crate::formatters::json::JsonFormatter;
use crate::formatters::table::TableFormatter;
use crate::formatters::text::TextFormatter;
use crate::formatters::{Formatter, OutputFormat};
use crate::utils::error::CliError;

/// Contexte d'exécution du CLI
pub struct Context {
    /// Session OData (schéma + paramètres)
    session: Option<Session>,

    /// Paramètres appliqués au prochain schéma chargé
    settings: Settings,

    /// Format de sortie
    format: OutputFormat,

    /// Niveau de verbosité
    verbosity: u8,

    /// Formateur actuel
    formatter: Box<dyn Formatter>,
}

fn formatter_for(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Table => Box::new(TableFormatter::new()),
    }
}

impl Context {
    /// Crée un nouveau contexte
    pub fn new(verbosity: u8, format: OutputFormat, settings: Settings) -> Self {
        Context {
            session: None,
            settings,
            format,
            verbosity,
            formatter: formatter_for(format),
        }
    }

    /// Vérifie si un schéma est chargé
    pub fn has_schema(&self) -> bool {
        self.session.is_some()
    }

    /// Obtient la session courante
    pub fn session(&self) -> Result<&Session, CliError> {
        self.session.as_ref().ok_or(CliError::NoSchema)
    }

    /// Charge un schéma et ouvre une nouvelle session
    pub fn load_schema(&mut self, path: &Path) -> Result<(), CliError> {
        let session = Session::open(path, self.settings.clone())?;
        self.session = Some(session);
        Ok(())
    }

    /// Obtient le formateur actuel
    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Définit le format de sortie
    pub fn set_format(&mut self, format: OutputFormat) {
        if format != self.format {
            self.format = format;
            self.formatter = formatter_for(format);
        }
    }

    /// Obtient le niveau de verbosité
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }
}
