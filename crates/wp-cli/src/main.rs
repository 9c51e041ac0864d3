//! # wp — Waypoint terminal client
//!
//! - `wp search <q>`: hotels, cities and countries containing `q`.
//! - `wp hotel <id>`: one hotel by id.
//! - `wp city <name>`: one city by exact name.
//! - `wp country <name-or-iso>`: one country by full name or ISO code.

use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use reqwest::{StatusCode, Url};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use wp_core::SearchResults;

#[derive(Parser)]
#[command(name = "wp", version, about, long_about = None)]
struct Cli {
    /// Base URL of the lookup service.
    #[arg(long, env = "WAYPOINT_URL", default_value = "http://127.0.0.1:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Substring search across hotels, cities and countries.
    Search { query: String },

    /// Show a hotel by id.
    Hotel { id: String },

    /// Show a city by exact name.
    City { name: String },

    /// Show a country by full name or ISO code.
    Country { name: String },
}

#[derive(Tabled)]
struct HotelRow {
    id: String,
    hotel: String,
    chain: String,
    city: String,
    country: String,
}

#[derive(Tabled)]
struct CityRow {
    city: String,
}

#[derive(Tabled)]
struct CountryRow {
    country: String,
    iso: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let client = reqwest::Client::new();
    let base = Url::parse(&cli.url).with_context(|| format!("invalid base URL {}", cli.url))?;

    let (url, is_search) = match &cli.command {
        Commands::Search { query } => {
            let mut url = endpoint(&base, &["search"])?;
            url.query_pairs_mut().append_pair("q", query);
            (url, true)
        }
        Commands::Hotel { id } => (endpoint(&base, &["hotels", id.as_str()])?, false),
        Commands::City { name } => (endpoint(&base, &["cities", name.as_str()])?, false),
        Commands::Country { name } => (endpoint(&base, &["countries", name.as_str()])?, false),
    };

    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        eprintln!("{}", describe_failure(status, &body));
        return Ok(ExitCode::FAILURE);
    }

    if is_search {
        let results: SearchResults = resp.json().await.context("decoding search results")?;
        println!("{}", render_search(&results));
    } else {
        let json: serde_json::Value = resp.json().await.context("decoding response")?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(ExitCode::SUCCESS)
}

/// Append percent-encoded path segments to `base`.
fn endpoint(base: &Url, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("base URL {} cannot carry a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    if body.is_empty() {
        format!("{}", status)
    } else {
        format!("{}: {}", status, body)
    }
}

fn render_search(results: &SearchResults) -> String {
    let hotels: Vec<HotelRow> = results
        .hotels
        .iter()
        .map(|h| HotelRow {
            id: h.id.to_string(),
            hotel: h.hotel_name.clone(),
            chain: h.chain_name.clone(),
            city: h.city.clone(),
            country: h.country.clone(),
        })
        .collect();
    let cities: Vec<CityRow> = results
        .cities
        .iter()
        .map(|c| CityRow {
            city: c.name.clone(),
        })
        .collect();
    let countries: Vec<CountryRow> = results
        .countries
        .iter()
        .map(|c| CountryRow {
            country: c.country.clone(),
            iso: c.countryisocode.clone(),
        })
        .collect();

    let mut out = String::new();
    out.push_str(&section("Hotels", hotels));
    out.push_str(&section("Cities", cities));
    out.push_str(&section("Countries", countries));
    out.trim_end().to_string()
}

fn section<T: Tabled>(title: &str, rows: Vec<T>) -> String {
    if rows.is_empty() {
        return format!("{} (0)\n  no matches\n\n", title);
    }
    let count = rows.len();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{} ({})\n{}\n\n", title, count, table)
}
