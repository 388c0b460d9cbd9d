//! CLI commands and argument parsing

use crate::types::{Sort, TimeRange};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Read Reddit listings as JSON lines
#[derive(Parser, Debug)]
#[command(name = "redpage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Posts of a subreddit
    Posts {
        /// Subreddit name, without `r/`
        subreddit: String,

        /// Sort order
        #[arg(short, long, default_value = "hot")]
        sort: SortArg,

        /// Time range for `top` and `controversial`
        #[arg(short, long, default_value = "day")]
        time: TimeArg,

        /// Stop after this many posts
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Submissions of a user
    User {
        /// Username, without `u/`
        username: String,

        /// Stop after this many posts
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search posts within a subreddit
    Search {
        /// Subreddit name, without `r/`
        subreddit: String,

        /// Search query
        query: String,

        /// Stop after this many posts
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Comment tree of a post, depth first
    Comments {
        /// Post id (`abc123` or `t3_abc123`)
        post_id: String,

        /// Stop after this many comments
        #[arg(short, long)]
        limit: Option<usize>,

        /// Do not resolve `more` stubs
        #[arg(long)]
        no_expand: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Indented JSON
    Pretty,
}

/// Sort order accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortArg {
    Hot,
    New,
    Rising,
    Top,
    Controversial,
}

/// Time range accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TimeArg {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl From<TimeArg> for TimeRange {
    fn from(arg: TimeArg) -> Self {
        match arg {
            TimeArg::Hour => TimeRange::Hour,
            TimeArg::Day => TimeRange::Day,
            TimeArg::Week => TimeRange::Week,
            TimeArg::Month => TimeRange::Month,
            TimeArg::Year => TimeRange::Year,
            TimeArg::All => TimeRange::All,
        }
    }
}

impl SortArg {
    /// Combine with a time range; the range is ignored for unranked sorts
    pub fn with_time(self, time: TimeArg) -> Sort {
        match self {
            SortArg::Hot => Sort::Hot,
            SortArg::New => Sort::New,
            SortArg::Rising => Sort::Rising,
            SortArg::Top => Sort::Top(time.into()),
            SortArg::Controversial => Sort::Controversial(time.into()),
        }
    }
}
