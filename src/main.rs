use std::error;

use summitdb::{Config, Reporter};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<(), Box<dyn error::Error>>
{
    let filter = EnvFilter::try_from_env("SUMMITDB_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;

    println!();
    println!("Expedition reporter");
    println!("Version : {}", VERSION);
    println!("Database used: {:?}", config.database);

    let reporter = summitdb::open_reporter(&config)?;

    report(&reporter)?;

    reporter.into_store().close()?;

    Ok(())
}

fn report(r : &Reporter) -> Result<(), Box<dyn error::Error>>
{
    let (longest, shortest) = r.longest_and_shortest_expedition()?;

    println!("---------------------------------------------------------------");
    println!("Total climbers:          {}", r.total_climbers());
    println!("Unique climbers:         {}", r.total_unique_climbers());
    println!("---------------------------------------------------------------");
    println!("Highest mountain:        {}", r.highest_mountain()?);
    println!("Most expeditions:        {}", r.mountain_with_most_expeditions()?);
    println!("---------------------------------------------------------------");
    println!("Longest expedition:      {}", longest);
    println!("  -> {}", longest.convert_duration("%D days, %H hours, %M minutes"));
    println!("Shortest expedition:     {}", shortest);
    println!("  -> {}", shortest.convert_duration("%D days, %H hours, %M minutes"));
    println!("Most climbers:           {}", r.expedition_with_most_climbers()?);
    println!("---------------------------------------------------------------");
    println!("First expedition:        {}", r.first_expedition(false)?);
    println!("First successful:        {}", r.first_expedition(true)?);
    println!("Latest expedition:       {}", r.latest_expedition(false)?);
    println!("Latest successful:       {}", r.latest_expedition(true)?);
    println!("---------------------------------------------------------------");

    Ok(())
}
