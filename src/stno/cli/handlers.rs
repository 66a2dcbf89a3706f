use super::args::{Cli, Commands};
use super::print::{print_config, print_document, print_entries, print_messages, print_uids};
use clap::Parser;
use colored::Colorize;
use stno::api::{CmdResult, ConfigAction, FieldFilter, QueryOptions, StnoApi};
use stno::commands;
use stno::editor::{get_editor, EditBuffer};
use stno::error::{Result, StnoError};
use stno::init::{initialize, StnoPaths};
use stno::store::fs::FileStore;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Log filter directives, e.g. `STNO_LOG=stno=debug`.
const LOG_ENV: &str = "STNO_LOG";

struct AppContext {
    api: StnoApi<FileStore>,
    editor: String,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = StnoPaths::resolve()?;

    // Config must stay reachable even when the stored templates are broken.
    let command = match cli.command {
        Some(Commands::Config { key, value }) => return handle_config(&paths, key, value),
        other => other,
    };

    let ctx = init_context(&paths, cli.notebook.as_deref())?;

    match command {
        Some(Commands::Add { file }) => handle_add(&ctx, file),
        Some(Commands::Edit { uid }) => handle_edit(&ctx, &uid),
        Some(Commands::View { uids }) => handle_view(&ctx, &uids),
        Some(Commands::List { prefix }) => handle_list(&ctx, prefix.as_deref()),
        Some(Commands::Query {
            path,
            filters,
            select,
            limit,
        }) => handle_query(&ctx, path, &filters, select, limit),
        Some(Commands::Rm { uids }) => handle_remove(&ctx, &uids),
        Some(Commands::Mv { src, dest }) => handle_rename(&ctx, &src, &dest),
        Some(Commands::Config { .. }) => Ok(()),
        None => handle_list(&ctx, None),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn init_context(paths: &StnoPaths, notebook: Option<&str>) -> Result<AppContext> {
    let ctx = initialize(paths, notebook)?;
    let editor = get_editor(ctx.config.editor.as_deref());
    Ok(AppContext {
        api: ctx.api,
        editor,
    })
}

fn handle_add(ctx: &AppContext, file: Option<PathBuf>) -> Result<()> {
    if let Some(path) = file {
        let text = read_input(&path)?;
        let result = ctx.api.add_entry(&text)?;
        print_messages(&result.messages);
        return Ok(());
    }

    let seed = ctx.api.entry_template_text()?;
    edit_until_valid(&ctx.editor, &seed, |text| ctx.api.add_entry(text))
}

fn handle_edit(ctx: &AppContext, uid: &str) -> Result<()> {
    let seed = ctx.api.entry_source(uid)?;
    edit_until_valid(&ctx.editor, &seed, |text| ctx.api.update_entry(uid, text))
}

/// Opens the editor on `seed` and hands the result to `save`. On a parse
/// error the user may re-open the edited text. Closing the editor without
/// saving is an error so that scripts see a non-zero exit.
fn edit_until_valid<F>(editor: &str, seed: &str, save: F) -> Result<()>
where
    F: Fn(&str) -> Result<CmdResult>,
{
    let buffer = EditBuffer::create(seed)?;
    loop {
        let Some(text) = buffer.edit(editor)? else {
            return Err(StnoError::Unchanged);
        };

        match save(&text) {
            Ok(result) => {
                print_messages(&result.messages);
                return Ok(());
            }
            Err(StnoError::Parse(e)) => {
                eprintln!("{}", format!("Invalid TOML: {}", e).red());
                if !confirm("Try again? (y/N) ")? {
                    return Err(StnoError::Parse(e));
                }
            }
            Err(e) => return Err(e),
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn handle_view(ctx: &AppContext, uids: &[String]) -> Result<()> {
    let result = ctx.api.view_entries(uids)?;
    print_entries(&result.entries)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext, prefix: Option<&str>) -> Result<()> {
    let result = ctx.api.list_entries(prefix)?;
    print_uids(&result.listed_uids);
    print_messages(&result.messages);
    Ok(())
}

fn handle_query(
    ctx: &AppContext,
    section: Option<String>,
    filters: &[String],
    select: Vec<String>,
    limit: Option<usize>,
) -> Result<()> {
    let filter = filters
        .iter()
        .try_fold(FieldFilter::new(), |filter, clause| filter.where_clause(clause))?
        .select(select);

    let result = ctx.api.query(QueryOptions {
        section,
        filter,
        limit,
        workers: None,
    })?;
    if let Some(document) = &result.document {
        print_document(document)?;
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_remove(ctx: &AppContext, uids: &[String]) -> Result<()> {
    let result = ctx.api.remove_entries(uids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_rename(ctx: &AppContext, src: &str, dest: &str) -> Result<()> {
    let result = ctx.api.rename_entry(src, dest)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(paths: &StnoPaths, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = commands::config::run(paths.config_dir(), action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}
