use std::path::PathBuf;

use crate::cli::Context;
use crate::error::Result;
use crate::store;

pub fn run(ctx: &Context, file: &str) -> Result<()> {
    let source = PathBuf::from(file);
    let result = store::import_legacy(
        &source,
        &ctx.settings.expenses_file(),
        ctx.settings.live_schema(),
        &ctx.taxonomy,
        &ctx.settings.legacy_accounts,
    )?;

    println!(
        "{} imported, {} skipped (malformed)",
        result.imported, result.skipped
    );
    if result.coerced > 0 {
        println!(
            "{} with an unknown account or category were moved to {} / {}",
            result.coerced,
            ctx.taxonomy.primary_account(),
            ctx.taxonomy.default_category()
        );
    }
    Ok(())
}
