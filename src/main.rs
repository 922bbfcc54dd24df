mod budget;
mod cli;
mod error;
mod fmt;
mod input;
mod models;
mod reports;
mod schema;
mod settings;
mod store;
mod summary;
mod taxonomy;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, Context};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("CARNET_LOG")
        .unwrap_or_else(|_| EnvFilter::new("carnet=warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(command: Option<Commands>) -> error::Result<()> {
    let ctx = Context::load();
    let Some(command) = command else {
        return cli::shell::run(&ctx);
    };
    match command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            amount,
            date,
            account,
            category,
            subcategory,
            description,
        } => cli::expenses::add(
            &ctx,
            &amount,
            date.as_deref(),
            account.as_deref(),
            category.as_deref(),
            subcategory.as_deref(),
            &description,
        ),
        Commands::Recent { limit } => cli::expenses::recent(&ctx, limit),
        Commands::Report { command } => cli::report::run(&ctx, command),
        Commands::Summary { command } => cli::summary::run(&ctx, command),
        Commands::Charts => cli::summary::charts(&ctx),
        Commands::Archive => cli::archive::run(&ctx, cli::today()),
        Commands::Import { file } => cli::import::run(&ctx, &file),
        Commands::Status => cli::status::run(&ctx),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}
