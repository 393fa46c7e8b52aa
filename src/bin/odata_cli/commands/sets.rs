use anyhow::Result;

use crate::context::Context;

/// Exécute la commande de listage des ensembles d'entités
pub fn execute(context: &Context) -> Result<()> {
    let session = context.session()?;

    let names: Vec<String> = session
        .resolver()
        .entity_set_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    // Formater et afficher les noms
    println!("{}", context.formatter().format_names(&names)?);

    Ok(())
}
