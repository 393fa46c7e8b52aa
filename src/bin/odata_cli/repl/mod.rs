mod history;

use std::path::Path;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use self::history::History;
use crate::commands;
use crate::context::Context;
use crate::formatters::OutputFormat;
use crate::utils::error::CliError;

/// Mode interactif (REPL)
pub struct Repl {
    /// Contexte d'exécution
    context: Context,

    /// Éditeur de ligne
    editor: DefaultEditor,

    /// Historique personnalisé
    history: History,

    /// Ensemble d'entités courant pour la compilation
    entity_set: Option<String>,

    /// Compiler les lignes comme options de requête personnalisées
    query_option: bool,

    running: bool,
}

impl Repl {
    /// Crée un nouveau REPL
    pub fn new(context: Context) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        // Créer et charger l'historique s'il existe
        let mut history = History::new("odata_history.txt", 1000);
        let _ = history.load();

        // Charger l'historique dans l'éditeur
        for line in history.lines() {
            let _ = editor.add_history_entry(line);
        }

        Ok(Repl {
            context,
            editor,
            history,
            entity_set: None,
            query_option: false,
            running: true,
        })
    }

    fn prompt(&self) -> String {
        if !self.context.has_schema() {
            return "odata (sans schéma)> ".to_string();
        }
        match (&self.entity_set, self.query_option) {
            (_, true) => "odata [options]> ".to_string(),
            (Some(set), false) => format!("odata [{}]> ", set),
            (None, false) => "odata> ".to_string(),
        }
    }

    /// Exécute le REPL
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.context.formatter().format_info("OData CLI - Mode interactif"));
        println!("{}", self.context.formatter().format_info("Tapez .help pour l'aide ou .exit pour quitter"));

        while self.running {
            let prompt = self.prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());
                    self.history.add(self.entity_set.as_deref(), &line);

                    if let Err(e) = self.process_line(line.trim()) {
                        println!("{}", self.context.formatter().format_error(&e.to_string()));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C
                    println!("Interruption (Ctrl-C)");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl-D
                    println!("Fin de l'entrée (Ctrl-D)");
                    break;
                }
                Err(err) => {
                    println!("{}", self.context.formatter().format_error(&format!("Erreur: {}", err)));
                    break;
                }
            }
        }

        // Sauvegarder l'historique
        self.history.save()?;

        Ok(())
    }

    /// Traite une ligne entrée par l'utilisateur
    fn process_line(&mut self, line: &str) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }

        // Traiter les commandes spéciales
        if let Some(cmd) = line.strip_prefix('.') {
            return self.process_special_command(cmd);
        }

        // Toute autre ligne est un filtre
        commands::compile::execute(&self.context, self.entity_set.as_deref(), line, self.query_option)
    }

    /// Traite les commandes spéciales (commençant par '.')
    fn process_special_command(&mut self, cmd: &str) -> Result<()> {
        let parts: Vec<&str> = cmd.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return Err(CliError::UnknownCommand(cmd.to_string()).into());
        };

        match name {
            "help" => self.print_help(),
            "exit" | "quit" => {
                println!("Au revoir !");
                self.running = false;
            }
            "load" => match args.first() {
                Some(path) => {
                    commands::load::execute(&mut self.context, Path::new(path))?;
                    self.entity_set = None;
                    println!("{}", self.context.formatter().format_success(&format!("Schéma chargé: {}", path)));
                }
                None => println!("{}", self.context.formatter().format_error("Usage: .load <fichier>")),
            },
            "sets" => commands::sets::execute(&self.context)?,
            "set" => match args.first() {
                Some(set) => {
                    // Valider l'ensemble avant de le retenir
                    self.context.session()?.context_for(set)?;
                    self.entity_set = Some(set.to_string());
                    self.query_option = false;
                }
                None => self.entity_set = None,
            },
            "option" => {
                self.query_option = !self.query_option;
                let state = if self.query_option { "activé" } else { "désactivé" };
                println!("{}", self.context.formatter().format_info(&format!("Mode options de requête {}", state)));
            }
            "resolve" => match args.first() {
                Some(target) => commands::resolve::execute(&self.context, self.entity_set.as_deref(), target)?,
                None => println!("{}", self.context.formatter().format_error("Usage: .resolve <nom>")),
            },
            "inspect" => match args.first() {
                Some(path) => {
                    let annotations = args.contains(&"--annotations");
                    commands::inspect::execute(&self.context, Path::new(path), annotations)?;
                }
                None => println!("{}", self.context.formatter().format_error("Usage: .inspect <fichier> [--annotations]")),
            },
            "format" => {
                let format = match args.first().copied() {
                    Some("text") => OutputFormat::Text,
                    Some("json") => OutputFormat::Json,
                    Some("table") => OutputFormat::Table,
                    Some(other) => return Err(CliError::UnknownFormat(other.to_string()).into()),
                    None => {
                        println!("{}", self.context.formatter().format_error("Usage: .format <text|json|table>"));
                        return Ok(());
                    }
                };
                self.context.set_format(format);
                println!("{}", self.context.formatter().format_success(&format!("Format défini à {:?}", format)));
            }
            "history" => {
                let entries = match args.first() {
                    Some(pattern) => self.history.search(pattern),
                    None => self.history.numbered().collect(),
                };

                if entries.is_empty() {
                    println!("Aucune commande dans l'historique.");
                } else {
                    for (number, entry) in entries {
                        match &entry.entity_set {
                            Some(set) => println!("{}: [{}] {}", number, set, entry.line),
                            None => println!("{}: {}", number, entry.line),
                        }
                    }
                }
            }
            "replay" => {
                let Some(number) = args.first().and_then(|n| n.parse::<usize>().ok()) else {
                    println!("{}", self.context.formatter().format_error("Usage: .replay <numéro>"));
                    return Ok(());
                };
                let entry = self
                    .history
                    .get(number)
                    .cloned()
                    .ok_or_else(|| CliError::UnknownCommand(format!("replay {}", number)))?;

                if entry.line.starts_with(".replay") {
                    return Err(CliError::UnknownCommand(entry.line).into());
                }

                // Rejouer dans l'ensemble d'entités d'origine
                self.entity_set = entry.entity_set;
                self.process_line(&entry.line)?;
            }
            _ => return Err(CliError::UnknownCommand(cmd.to_string()).into()),
        }

        Ok(())
    }

    /// Affiche l'aide
    fn print_help(&self) {
        println!("Commandes disponibles:");
        println!("  .help                     Affiche cette aide");
        println!("  .exit, .quit              Quitte le CLI");
        println!("  .load <fichier>           Charge un schéma JSON");
        println!("  .sets                     Liste les ensembles d'entités");
        println!("  .set [ensemble]           Définit (ou efface) l'ensemble d'entités courant");
        println!("  .option                   Bascule le mode options de requête");
        println!("  .resolve <nom>            Résout un nom contre le schéma");
        println!("  .inspect <fichier>        Affiche le contenu d'une réponse JSON");
        println!("  .format <text|json|table> Définit le format de sortie");
        println!("  .history [motif]          Affiche l'historique (avec l'ensemble d'entités de chaque ligne)");
        println!("  .replay <numéro>          Rejoue une ligne de l'historique dans son ensemble d'entités");
        println!();
        println!("Toute autre entrée est compilée comme un filtre.");
    }
}
