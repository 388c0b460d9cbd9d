//! CLI module
//!
//! Command-line interface for reading listings.
//!
//! # Commands
//!
//! - `posts` - Posts of a subreddit
//! - `user` - Submissions of a user
//! - `search` - Search within a subreddit
//! - `comments` - Comment tree of a post

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, SortArg, TimeArg};
pub use runner::Runner;
