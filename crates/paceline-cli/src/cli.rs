//! CLI argument definitions for Paceline.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `countries` | List countries, one page at a time |
//! | `venues` | List venues, optionally filtered and fetched several pages at once |
//! | `venue` | Fetch one venue by id |
//! | `limits` | Show the windows of the active rate-limit profile |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--profile` | `standard` | Rate-limit profile |
//! | `--timeout-ms` | `10000` | Per-request network timeout |
//! | `--language` | none | `accept-language` sent with every request |
//! | `--base-url` | `https://api.paceline.io/v1` | API root |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! The API key and user agent are read from `PACELINE_API_KEY` and
//! `PACELINE_USER_AGENT`. Flags override the other `PACELINE_*` variables.
//!
//! # Examples
//!
//! ```bash
//! paceline countries --page 2 --limit 50
//! paceline venues --country FR --name café --pages 3 --pretty
//! paceline venue 42
//! paceline --profile premium limits
//! ```

use clap::{Args, Parser, Subcommand};
use paceline_core::RateLimitProfile;

/// Rate-limited client for the Paceline venues API.
#[derive(Debug, Parser)]
#[command(
    name = "paceline",
    author,
    version,
    about = "Rate-limited client for the Paceline venues API",
    long_about = "Paceline issues validated, rate-limited requests against the venues API \
and prints the raw response together with its pagination metadata and the current \
rate-limit usage.\n\
\n\
Use 'paceline <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Rate-limit profile (standard, premium, disabled).
    ///
    /// Overrides PACELINE_RATE_LIMIT_PROFILE.
    #[arg(long, global = true)]
    pub profile: Option<RateLimitProfile>,

    /// Network timeout for each request, in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Preferred response language (e.g. "fr").
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// API root URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List countries.
    ///
    /// # Examples
    ///
    ///   paceline countries
    ///   paceline countries --page 3 --limit 100
    Countries(PageArgs),

    /// List venues.
    ///
    /// With --pages N, pages page..page+N are requested concurrently and
    /// admitted by the shared rate limiter.
    ///
    /// # Examples
    ///
    ///   paceline venues --country DE
    ///   paceline venues --name "jazz club" --pages 4
    Venues(VenuesArgs),

    /// Fetch a single venue by id.
    Venue(VenueArgs),

    /// Show rate-limit windows for the selected profile.
    Limits,
}

/// Paging shared by list commands.
#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// 1-based page number.
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page (1-100).
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct VenuesArgs {
    /// Two-letter ISO country code.
    #[arg(long)]
    pub country: Option<String>,

    /// Name filter.
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub paging: PageArgs,

    /// Number of consecutive pages to fetch.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub pages: u32,
}

#[derive(Debug, Args)]
pub struct VenueArgs {
    /// Venue identifier.
    pub id: u64,
}
