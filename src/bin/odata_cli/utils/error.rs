use thiserror::Error;

/// Erreurs propres au CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Aucun schéma chargé (utilisez --schema ou .load <fichier>)")]
    NoSchema,

    #[error("Commande inconnue: {0}")]
    UnknownCommand(String),

    #[error("Format inconnu: {0}")]
    UnknownFormat(String),

    #[error("Réponse invalide: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    OData(#[from] odata_query::ODataError),
}
