//! Command-line entry point.
//!
//! # Responsibility
//! - Wire configuration, logging and the SQLite store to the core services.
//! - Stand in for the transport layer: raw page/per-page/order-by strings are
//!   handed to the core untouched.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use spacesim_core::db::open_configured;
use spacesim_core::{
    init_logging, Commodity, CommodityService, CoreConfig, NewCommodityMarket, SolarSystem,
    SolarSystemService, SqliteCommodityMarketRepository, SqliteCommodityRepository,
    SqliteSolarSystemRepository,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "spacesim", version, about = "Space simulation economy store")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database file. Overrides the configured path.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core version.
    Ping,
    /// Create a commodity, a solar system and a market, then cascade-delete.
    Demo,
    /// List commodities.
    Commodities(PageArgs),
    /// List solar systems.
    SolarSystems(PageArgs),
    /// Show one solar system with its markets.
    SolarSystem { id: String },
}

#[derive(Debug, Args)]
struct PageArgs {
    #[arg(long)]
    page: Option<String>,
    #[arg(long)]
    per_page: Option<String>,
    #[arg(long)]
    order_by: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_deref() {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if cli.db.is_some() {
        config.database.path = cli.db.clone();
    }
    if cli.log_dir.is_some() {
        config.logging.log_dir = cli.log_dir.clone();
    }
    if config.logging.log_dir.is_some() {
        init_logging(&config.logging).map_err(anyhow::Error::msg)?;
    }

    match cli.command {
        Command::Ping => {
            println!("spacesim_core version={}", spacesim_core::core_version());
            Ok(())
        }
        command => run_store_command(command, &config),
    }
}

fn run_store_command(command: Command, config: &CoreConfig) -> Result<()> {
    let conn = open_configured(&config.database)?;
    let commodities = CommodityService::new(
        SqliteCommodityRepository::try_new(&conn)?,
        config.pagination,
    );
    let systems = SolarSystemService::new(
        SqliteSolarSystemRepository::try_new(&conn)?,
        SqliteCommodityMarketRepository::try_new(&conn)?,
        config.pagination,
    );

    match command {
        Command::Ping => {}
        Command::Demo => {
            let water = commodities.create(&Commodity::new("Water", 1.0, 1.0))?;
            let sol = systems.create(&SolarSystem::new("Sol"))?;
            let market = systems.create_market(&NewCommodityMarket {
                solar_system_id: sol.id.clone(),
                commodity_id: water.id.clone(),
                base_price: 100.0,
                demand_quantity: 50,
            })?;
            println!("created commodity {} ({})", water.id, water.name);
            println!("created solar system {} ({})", sol.id, sol.name);
            println!(
                "created market {} commodity={} base_price={} demand={}",
                market.id, market.commodity_name, market.base_price, market.demand_quantity
            );

            systems.remove(&sol.id)?;
            let remaining = systems.list_markets(&sol.id)?;
            println!(
                "removed solar system {} remaining_markets={}",
                sol.id,
                remaining.len()
            );
            info!("event=cli_demo module=cli status=ok");
        }
        Command::Commodities(args) => {
            let pagination = commodities.pagination(
                args.page.as_deref(),
                args.per_page.as_deref(),
                args.order_by.as_deref(),
            );
            for commodity in commodities.list(&pagination)? {
                println!(
                    "{}\t{}\tmass={}\tvolume={}",
                    commodity.id, commodity.name, commodity.unit_mass, commodity.unit_volume
                );
            }
        }
        Command::SolarSystems(args) => {
            let pagination = systems.pagination(
                args.page.as_deref(),
                args.per_page.as_deref(),
                args.order_by.as_deref(),
            );
            for system in systems.list(&pagination)? {
                println!("{}\t{}", system.id, system.name);
            }
        }
        Command::SolarSystem { id } => {
            let aggregate = systems
                .find(&id)
                .with_context(|| format!("loading solar system {id}"))?;
            println!("{}\t{}", aggregate.id, aggregate.name);
            for market in aggregate.commodity_markets {
                println!(
                    "  {}\t{}\tbase_price={}\tdemand={}",
                    market.id, market.commodity_name, market.base_price, market.demand_quantity
                );
            }
        }
    }

    Ok(())
}
