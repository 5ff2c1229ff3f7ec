//! Subcommand implementations.
//!
//! Each command is a short script of [`SyncCommand`]s. Mutations end with a
//! `Save` or delete, after which the loop reloads on its own.

use std::path::Path;

use anyhow::{Context, Result, bail};
use secretly_domain::{Environment, RowKey};
use secretly_infrastructure::{DotenvFile, ExportFormat, export_environment, write_text};
use secretly_ui::{EnvironmentView, SyncCommand, render_environment};

use crate::cli::Command;
use crate::session::Session;

/// Runs one subcommand and returns what to print on stdout.
///
/// # Errors
/// Returns an error if the backend rejects an operation or a name or key
/// does not exist.
pub async fn execute(session: &mut Session, command: Command) -> Result<String> {
    match command {
        Command::List => list(session).await,
        Command::Show { name, reveal } => show(session, &name, reveal).await,
        Command::Get { name, key } => get(session, &name, &key).await,
        Command::Create { name, vars } => create(session, &name, vars).await,
        Command::Set { name, vars } => set(session, &name, vars).await,
        Command::Rename { name, new_name } => rename(session, &name, new_name).await,
        Command::Delete { name } => delete(session, &name).await,
        Command::Unset { name, key } => unset(session, &name, &key).await,
        Command::Export {
            name,
            format,
            output,
        } => export(session, &name, format, output.as_deref()).await,
        Command::Import { file, name } => import(session, &file, &name).await,
    }
}

async fn list(session: &mut Session) -> Result<String> {
    let view = session
        .dispatch_checked(SyncCommand::Reload)
        .await?
        .into_view()?;
    if view.is_empty() {
        return Ok("No environments\n".to_string());
    }
    Ok(view
        .environments
        .iter()
        .map(|env| format!("{env}\n"))
        .collect())
}

async fn show(session: &mut Session, name: &str, reveal: bool) -> Result<String> {
    let environment = lookup(session, name).await?;
    Ok(format!(
        "{}\n",
        render_environment(RowKey::generate(), &environment, reveal)
    ))
}

async fn get(session: &mut Session, name: &str, key: &str) -> Result<String> {
    let environment = lookup(session, name).await?;
    let variable = environment
        .find_by_key(key)
        .with_context(|| format!("variable not found: {key}"))?;
    Ok(format!("{}\n", variable.value))
}

async fn create(session: &mut Session, name: &str, vars: Vec<(String, String)>) -> Result<String> {
    let view = session
        .dispatch_checked(SyncCommand::Reload)
        .await?
        .into_view()?;
    if view.find(name).is_some() {
        bail!("environment already exists: {name}");
    }

    let row = session
        .dispatch_checked(SyncCommand::AddEnvironment {
            name: name.to_string(),
        })
        .await?
        .environment
        .context("no row was added")?;
    save_with(session, row, vars).await
}

async fn set(session: &mut Session, name: &str, vars: Vec<(String, String)>) -> Result<String> {
    let row = find_row(session, name).await?.row;
    save_with(session, row, vars).await
}

async fn rename(session: &mut Session, name: &str, new_name: String) -> Result<String> {
    let row = find_row(session, name).await?.row;
    session
        .dispatch_checked(SyncCommand::RenameEnvironment {
            row,
            name: new_name,
        })
        .await?;
    save_with(session, row, Vec::new()).await
}

async fn delete(session: &mut Session, name: &str) -> Result<String> {
    let row = find_row(session, name).await?.row;
    Ok(session
        .dispatch_checked(SyncCommand::DeleteEnvironment { row })
        .await?
        .messages())
}

async fn unset(session: &mut Session, name: &str, key: &str) -> Result<String> {
    let env = find_row(session, name).await?;
    let variable = env
        .variable(key)
        .with_context(|| format!("variable not found: {key}"))?
        .row;
    Ok(session
        .dispatch_checked(SyncCommand::DeleteVariable {
            row: env.row,
            variable,
        })
        .await?
        .messages())
}

async fn export(
    session: &mut Session,
    name: &str,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<String> {
    let environment = lookup(session, name).await?;
    let Some(path) = output else {
        return Ok(export_environment(&environment, format)?);
    };

    match format {
        ExportFormat::Dotenv => DotenvFile::new(path).save(&environment).await?,
        ExportFormat::Json => write_text(path, &export_environment(&environment, format)?).await?,
    }
    tracing::info!(%name, path = %path.display(), %format, "environment exported");
    Ok(format!("Exported {name} to {}\n", path.display()))
}

async fn import(session: &mut Session, file: &Path, name: &str) -> Result<String> {
    let vars = DotenvFile::new(file).load().await?;
    let view = session
        .dispatch_checked(SyncCommand::Reload)
        .await?
        .into_view()?;

    let row = match view.find(name) {
        Some(existing) => existing.row,
        None => session
            .dispatch_checked(SyncCommand::AddEnvironment {
                name: name.to_string(),
            })
            .await?
            .environment
            .context("no row was added")?,
    };
    tracing::info!(%name, count = vars.len(), "importing variables");
    save_with(session, row, vars).await
}

/// Reloads and returns the visible environment called `name`.
async fn find_row(session: &mut Session, name: &str) -> Result<EnvironmentView> {
    let view = session
        .dispatch_checked(SyncCommand::Reload)
        .await?
        .into_view()?;
    view.find(name)
        .cloned()
        .with_context(|| format!("environment not found: {name}"))
}

/// Fetches the environment called `name` without loading the collection.
async fn lookup(session: &mut Session, name: &str) -> Result<Environment> {
    session
        .dispatch_checked(SyncCommand::Lookup {
            name: name.to_string(),
        })
        .await?
        .found
        .and_then(|found| found.into_iter().next())
        .with_context(|| format!("environment not found: {name}"))
}

async fn save_with(session: &mut Session, row: RowKey, vars: Vec<(String, String)>) -> Result<String> {
    for (key, value) in vars {
        session
            .dispatch_checked(SyncCommand::SetVariable { row, key, value })
            .await?;
    }
    Ok(session
        .dispatch_checked(SyncCommand::Save { row })
        .await?
        .messages())
}
