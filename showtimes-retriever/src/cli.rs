//! Command-line arguments for the `showtimes` binary

use chrono::NaiveTime;
use clap::{ArgGroup, Args, Parser, Subcommand};
use showtimes_common::theaters::DEFAULT_THEATER;
use showtimes_common::time::parse_time_of_day;
use showtimes_common::Filter;
use std::path::PathBuf;

const NEXT_MOVIE_WEEK: &str = "next movie week";

pub const DATES_ENV: &str = "SCHEDULE_RETRIEVER_DATES";
pub const THEATERS_ENV: &str = "SCHEDULE_RETRIEVER_THEATERS";
pub const SENDER_ENV: &str = "MAILTRAP_SENDER";
pub const SENDER_NAME_ENV: &str = "MAILTRAP_SENDER_NAME";
pub const RECEIVER_ENV: &str = "MAILTRAP_RECEIVER";

#[derive(Parser, Debug)]
#[command(name = "showtimes")]
#[command(about = "Collect theater showtimes and print, mail or store them")]
#[command(version)]
pub struct Cli {
    /// Config file (default: $SHOWTIMES_CONFIG or ~/.config/showtimes/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root folder holding the database
    #[arg(long, global = true)]
    pub root_folder: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a schedule to stdout
    Plaintext(PlaintextArgs),
    /// Mail a digest covering one or more theaters
    Email(EmailArgs),
    /// Reconcile a schedule into the SQLite database
    Sqlite(SqliteArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["filepath", "date"])))]
pub struct PlaintextArgs {
    #[arg(long, default_value = DEFAULT_THEATER)]
    pub theater: String,

    /// Saved listing document to read instead of fetching
    #[arg(long)]
    pub filepath: Option<PathBuf>,

    /// Date or range, e.g. `friday`, `next movie week`, `2024-01-05 to 2024-01-07`
    #[arg(long)]
    pub date: Option<String>,

    /// Only list movie names
    #[arg(long)]
    pub name_only: bool,

    /// List movie names with the dates they play
    #[arg(long)]
    pub date_only: bool,

    /// Earliest start time, e.g. `6pm`
    #[arg(short, long, value_parser = parse_time_arg)]
    pub earliest: Option<NaiveTime>,

    /// Latest start time
    #[arg(short, long, value_parser = parse_time_arg)]
    pub latest: Option<NaiveTime>,

    /// Only these movies (repeatable)
    #[arg(short = 'm', long = "movie")]
    pub movies: Vec<String>,

    /// Skip these movies (repeatable)
    #[arg(long = "not-movie")]
    pub not_movies: Vec<String>,

    #[arg(short = 'f', long = "format")]
    pub formats: Vec<String>,

    #[arg(long = "not-format")]
    pub not_formats: Vec<String>,
}

impl PlaintextArgs {
    pub fn filter(&self) -> Filter {
        Filter::new(
            self.earliest,
            self.latest,
            self.movies.clone(),
            self.not_movies.clone(),
            self.formats.clone(),
            self.not_formats.clone(),
        )
    }
}

#[derive(Args, Debug)]
pub struct EmailArgs {
    #[arg(long, env = DATES_ENV, default_value = NEXT_MOVIE_WEEK)]
    pub date: String,

    /// Theaters to include (repeatable or `;`-separated, default: all)
    #[arg(long = "theater", env = THEATERS_ENV, value_delimiter = ';')]
    pub theaters: Vec<String>,

    /// Sender address (default: [mail] sender)
    #[arg(long, env = SENDER_ENV)]
    pub from: Option<String>,

    /// Sender display name (default: [mail] sender_name)
    #[arg(long, env = SENDER_NAME_ENV)]
    pub from_name: Option<String>,

    /// Recipient address (default: [mail] receiver)
    #[arg(long, env = RECEIVER_ENV)]
    pub to: Option<String>,
}

#[derive(Args, Debug)]
pub struct SqliteArgs {
    #[arg(long, default_value = DEFAULT_THEATER)]
    pub theater: String,

    #[arg(long, default_value = NEXT_MOVIE_WEEK)]
    pub date: String,
}

fn parse_time_arg(value: &str) -> Result<NaiveTime, String> {
    parse_time_of_day(value).map_err(|e| e.to_string())
}
