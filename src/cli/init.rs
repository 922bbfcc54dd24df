use std::io::IsTerminal;

use crate::budget::BudgetStructure;
use crate::cli::prompt::{Prompt, ScriptPrompt, TerminalPrompt};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, shellexpand_path, Settings};
use crate::store;
use crate::taxonomy::Taxonomy;

/// Where the data lives: the flag wins, otherwise ask once on first run.
fn choose_data_dir(current: &str, flag: Option<String>) -> Result<String> {
    if let Some(dir) = flag {
        return Ok(shellexpand_path(&dir));
    }
    if settings_file_exists() {
        return Ok(current.to_string());
    }
    let label = "Data directory";
    let answer = if std::io::stdin().is_terminal() {
        TerminalPrompt.ask(label, Some(current))?
    } else {
        ScriptPrompt::new(std::io::stdin().lock()).ask(label, Some(current))?
    };
    Ok(answer.map_or_else(|| current.to_string(), |a| shellexpand_path(&a)))
}

/// Create the directory tree, the live file and a starter budget structure.
/// Existing files are left alone.
pub fn prepare(settings: &Settings) -> Result<()> {
    settings.ensure_dirs()?;

    let live = settings.expenses_file();
    if store::initialize(&live, settings.live_schema())? {
        println!("Created {}", live.display());
    }

    let budget_file = settings.budget_file();
    if !budget_file.exists() {
        BudgetStructure::from_taxonomy(&Taxonomy::from_settings(settings)).save(&budget_file)?;
        println!("Created {}", budget_file.display());
    }
    Ok(())
}

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    settings.data_dir = choose_data_dir(&settings.data_dir, data_dir)?;
    save_settings(&settings)?;
    prepare(&settings)?;
    println!("Initialized carnet at {}", settings.data_path().display());
    Ok(())
}
