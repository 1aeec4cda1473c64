use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};

mod analysis;
mod api;
mod models;
mod output;

#[derive(Parser)]
#[command(name = "setlist-analyzer")]
#[command(about = "Concert history analytics over a setlist.fm-style API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively analyze artists' concert histories into a cumulative CSV
    Analyze {
        /// API key sent as the x-api-key header
        #[arg(long, env = "SETLIST_API_KEY")]
        api_key: String,
        #[arg(long, default_value = "https://api.setlist.fm/rest/1.0")]
        base_url: String,
        /// Cumulative output file; rows append across runs
        #[arg(long, default_value = "artist_analysis.csv")]
        out: PathBuf,
        /// Hard bound on setlist pages fetched per artist
        #[arg(long, default_value_t = 200)]
        max_pages: u32,
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
        /// Fixed delay between pagination requests
        #[arg(long, default_value_t = 1000)]
        page_delay_ms: u64,
    },
    /// Reshape a streaming-chart CSV into weekly per-artist stream totals
    ReshapeCharts {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "weekly_streams.csv")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            api_key,
            base_url,
            out,
            max_pages,
            timeout_secs,
            page_delay_ms,
        } => {
            let client = api::SetlistClient::new(api::ClientConfig {
                base_url,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
                page_delay: Duration::from_millis(page_delay_ms),
                max_pages,
            })?;
            run_interactive(&client, &out).await?;
        }
        Commands::ReshapeCharts { csv, out } => {
            let outcome = output::reshape_charts(&csv, &out)?;
            println!(
                "Wrote {} weekly rows to {} ({} source rows, {} dropped).",
                outcome.rows_written,
                out.display(),
                outcome.rows_read,
                outcome.rows_dropped
            );
        }
    }

    Ok(())
}

/// Prompts for artist names until `quit` or end of input. Per-artist failures
/// are printed and the loop keeps going.
async fn run_interactive(client: &api::SetlistClient, out: &Path) -> anyhow::Result<()> {
    let stdin = io::stdin();

    loop {
        print!("Enter artist name to analyze (or 'quit' to exit): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case("quit") {
            println!("Goodbye.");
            break;
        }

        if let Err(err) = analyze_artist(client, name, out).await {
            println!("Analysis for {name} failed: {err:#}");
        }
    }

    Ok(())
}

async fn analyze_artist(
    client: &api::SetlistClient,
    name: &str,
    out: &Path,
) -> anyhow::Result<()> {
    println!("Searching for artist: {name}");
    let Some(artist) = client.search_artist(name).await? else {
        println!("No artist found with that name.");
        return Ok(());
    };
    println!("Found artist: {} (MBID: {})", artist.name, artist.mbid);

    let events = client.fetch_all_setlists(&artist.mbid).await?;
    if events.is_empty() {
        println!("No setlists found for {name}.");
        return Ok(());
    }

    let normalized = analysis::normalize_events(&events);
    if normalized.discarded > 0 {
        println!(
            "Discarded {} events with missing or unparseable dates.",
            normalized.discarded
        );
    }

    let Some(result) = analysis::analyze(name, normalized.records) else {
        println!("No valid concert data found for {name}.");
        return Ok(());
    };

    let rows = output::append_analysis(out, &result.summary, &result.records)?;
    println!("Appended {rows} rows to {}.", out.display());

    let summary = &result.summary;
    println!();
    println!("Analysis summary:");
    println!("- Artist: {}", summary.artist_name);
    println!("- Total concerts: {}", summary.total_concerts);
    println!(
        "- Date range: {} to {}",
        summary.first_concert, summary.last_concert
    );
    println!("- Years active: {:.1}", summary.years_active);
    println!("- Countries visited: {}", summary.countries_visited);
    println!("- Cities visited: {}", summary.cities_visited);
    println!("- Venues played: {}", summary.venues_played);

    Ok(())
}
