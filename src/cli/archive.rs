use chrono::NaiveDate;
use colored::Colorize;

use crate::cli::Context;
use crate::error::Result;
use crate::store::{self, ArchiveOutcome};

pub fn run(ctx: &Context, today: NaiveDate) -> Result<()> {
    let outcome = store::archive(&ctx.settings.expenses_file(), &ctx.settings.history_dir(), today)?;
    match outcome {
        ArchiveOutcome::Archived { path, records } => {
            println!("{}", format!("Month archived: {}", path.display()).green());
            println!("{records} records moved. The live file is ready for a new month.");
        }
        ArchiveOutcome::NothingToArchive => println!("No expenses to archive."),
    }
    Ok(())
}
