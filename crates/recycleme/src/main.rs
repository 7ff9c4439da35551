//! `recycleme` - CLI for the recycling lookup service
//!
//! This binary runs the web server and provides commands for loading the
//! catalog, answering single lookups, and reviewing logged misses.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use recycleme::cli::{
    CheckCommand, Cli, Command, ConfigCommand, ImportCommand, MissesAction, MissesCommand,
    OutputFormat, ServeCommand,
};
use recycleme::{catalog, init_logging, server, Config, Query, Recycler, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd),
        Command::Check(cmd) => handle_check(&config, &cmd),
        Command::Import(cmd) => handle_import(&config, &cmd),
        Command::Misses(cmd) => handle_misses(&config, cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening database {}", path.display()))
}

fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(server::serve(&config))?;
    Ok(())
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let recycler = Recycler::new(config.matcher());
    let query = Query::new(&cmd.location, &cmd.material, &cmd.item);

    let verdict = match recycler.check(&storage, &query) {
        Err(e) if e.is_catalog_unavailable() => {
            anyhow::bail!("{e}. Load a catalog with `recycleme import <file>` first.")
        }
        result => result?,
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verdict)?),
        OutputFormat::Plain => println!("{verdict}"),
    }
    Ok(())
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;

    for file in &cmd.files {
        let entries = catalog::read_file(file)?;
        let stats = storage.import(&entries)?;
        println!(
            "{}: {} entries, {} items added, {} already present",
            file.display(),
            stats.entries,
            stats.items_added,
            stats.items_skipped
        );
    }
    Ok(())
}

fn handle_misses(config: &Config, cmd: MissesCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;

    if let Some(MissesAction::Clear { yes }) = cmd.action {
        if yes {
            let deleted = storage.clear_misses()?;
            println!("Deleted {deleted} logged misses.");
        } else {
            println!("This will delete every logged miss.");
            println!("Use --yes to confirm.");
        }
        return Ok(());
    }

    let items = storage.non_recyclable_items(cmd.limit)?;
    let locations = storage.unavailable_locations(cmd.limit)?;

    if cmd.json {
        let misses = serde_json::json!({
            "non_recyclable_items": items,
            "unavailable_locations": locations,
        });
        println!("{}", serde_json::to_string_pretty(&misses)?);
        return Ok(());
    }

    println!("Unavailable locations");
    println!("---------------------");
    if locations.is_empty() {
        println!("  (none)");
    }
    for loc in &locations {
        println!(
            "  {:<24} {:>5} hits  last {}",
            loc.location,
            loc.hits,
            loc.timestamp.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("Non-recyclable items");
    println!("--------------------");
    if items.is_empty() {
        println!("  (none)");
    }
    for item in &items {
        println!(
            "  {}  {} / {} / {}",
            item.timestamp.format("%Y-%m-%d %H:%M"),
            item.location,
            item.material,
            item.item_name
        );
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("recycleme status");
        println!("----------------");
        println!("Database:      {}", config.database_path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Locations:     {}", stats.locations);
        println!("Materials:     {}", stats.materials);
        println!("Items:         {}", stats.items);
        println!();
        println!("Logged misses");
        println!("  Items:       {}", stats.non_recyclable_items);
        println!("  Locations:   {}", stats.unavailable_locations);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!();
                println!("[Matching]");
                println!("  Threshold:          {}", config.matching.threshold);
                println!("  Scorer:             {}", config.matching.scorer);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
