use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use odata_query::{ProtocolVersion, Settings};

use crate::commands;
use crate::context::Context;
use crate::formatters::OutputFormat;
use crate::repl::Repl;

#[derive(Parser)]
#[command(name = "odata-cli")]
#[command(about = "Résolution de métadonnées et compilation de filtres OData", long_about = None)]
pub struct Cli {
    /// Niveau de verbosité
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Format de sortie (text, json, table)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Mode interactif (REPL)
    #[arg(short, long)]
    interactive: bool,

    /// Fichier de schéma (JSON)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Fichier de paramètres de session (JSON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Version du protocole (v3, v4)
    #[arg(short, long)]
    protocol: Option<ProtocolVersion>,

    /// Désactiver la correspondance singulier/pluriel
    #[arg(long)]
    no_pluralize: bool,

    /// Commande à exécuter
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compiler une expression de filtre
    Compile {
        /// Expression à compiler
        expression: String,

        /// Ensemble d'entités ciblé (ex: Products, People/Employee)
        #[arg(short = 'e', long)]
        entity_set: Option<String>,

        /// Compiler comme options de requête personnalisées (A == 1 && B == 2)
        #[arg(short = 'o', long)]
        query_option: bool,
    },

    /// Résoudre un nom contre le schéma
    Resolve {
        /// Nom à résoudre
        name: String,

        /// Ensemble d'entités dans lequel chercher une propriété
        #[arg(short = 'e', long)]
        entity_set: Option<String>,
    },

    /// Lister les ensembles d'entités du schéma
    Sets,

    /// Inspecter une réponse JSON
    Inspect {
        /// Fichier de réponse
        payload: PathBuf,

        /// Inclure les annotations dans les entrées
        #[arg(short, long)]
        annotations: bool,
    },
}

/// Construit les paramètres de session à partir des options
fn build_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    if let Some(version) = cli.protocol {
        settings.protocol_version = version;
    }
    if cli.no_pluralize {
        settings.pluralize = false;
    }

    Ok(settings)
}

/// Exécute l'application CLI
pub fn run(cli: Cli) -> Result<()> {
    let settings = build_settings(&cli)?;

    // Créer un contexte
    let mut context = Context::new(cli.verbose, cli.format, settings);

    // Si un schéma est fourni, le charger
    if let Some(schema) = &cli.schema {
        commands::load::execute(&mut context, schema)?;
    }

    // Exécuter la commande spécifiée ou entrer en mode interactif
    match (cli.command, cli.interactive) {
        (Some(Commands::Compile { expression, entity_set, query_option }), _) => {
            commands::compile::execute(&context, entity_set.as_deref(), &expression, query_option)?;
        }
        (Some(Commands::Resolve { name, entity_set }), _) => {
            commands::resolve::execute(&context, entity_set.as_deref(), &name)?;
        }
        (Some(Commands::Sets), _) => {
            commands::sets::execute(&context)?;
        }
        (Some(Commands::Inspect { payload, annotations }), _) => {
            commands::inspect::execute(&context, &payload, annotations)?;
        }
        (None, true) => {
            // Mode interactif
            let mut repl = Repl::new(context)?;
            repl.run()?;
        }
        (None, false) => {
            println!("Erreur : Aucune commande spécifiée.");
            println!("Utilisez --help pour voir les options disponibles.");
        }
    }

    Ok(())
}
