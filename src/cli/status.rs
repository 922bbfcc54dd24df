use crate::cli::Context;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::settings_file_exists;
use crate::store;

pub fn run(ctx: &Context) -> Result<()> {
    let settings = &ctx.settings;
    let live = settings.expenses_file();

    println!("Data dir:   {}", settings.data_path().display());
    println!("Live file:  {}", live.display());
    println!("Schema:     {:?}", settings.live_schema());
    if !settings_file_exists() {
        println!("Settings:   (defaults, run `carnet init` to save them)");
    }

    if !live.exists() {
        println!();
        println!("Live file not found. Run `carnet init` to set up.");
        return Ok(());
    }

    let loaded = store::load(&live)?;
    let history = store::history_files(&settings.history_dir())?;
    let budget = ctx.budget();

    println!();
    println!("Live records:    {}", loaded.records.len());
    if loaded.skipped > 0 {
        println!("Malformed rows:  {}", loaded.skipped);
    }
    println!("Archives:        {}", history.len());
    println!("Accounts:        {}", ctx.taxonomy.accounts().join(", "));
    println!("Budget lines:    {}", budget.categories.values().map(|s| s.len()).sum::<usize>());
    println!("Fixed charges:   {}", money(budget.total_fixed_charges()));
    Ok(())
}
