use std::path::Path;

use anyhow::Result;
use log::info;

use crate::context::Context;

/// Exécute la commande de chargement de schéma
pub fn execute(context: &mut Context, path: &Path) -> Result<()> {
    // Charger le schéma
    context.load_schema(path)?;

    let session = context.session()?;
    let count = session.schema().entity_sets().count();
    info!("Schéma {} chargé ({} ensembles d'entités)", path.display(), count);

    if context.verbosity() > 0 {
        let message = format!("Schéma chargé: {} ({} ensembles d'entités)", path.display(), count);
        println!("{}", context.formatter().format_success(&message));
    }

    Ok(())
}
