//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::listing::Listing;
use crate::objects::Comment;
use futures::future::BoxFuture;
use futures::{FutureExt, TryStreamExt};
use serde::Serialize;
use std::ops::ControlFlow;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = Client::new(&self.load_config()?)?;

        match &self.cli.command {
            Commands::Posts {
                subreddit,
                sort,
                time,
                limit,
            } => {
                let listing = client.subreddit_posts(subreddit, sort.with_time(*time));
                self.print_listing(&listing, *limit).await
            }
            Commands::User { username, limit } => {
                self.print_listing(&client.user_posts(username), *limit).await
            }
            Commands::Search {
                subreddit,
                query,
                limit,
            } => {
                self.print_listing(&client.search(subreddit, query), *limit)
                    .await
            }
            Commands::Comments {
                post_id,
                limit,
                no_expand,
            } => {
                let tree = client.comments(post_id).await?;
                let mut budget = limit.unwrap_or(usize::MAX);
                self.print_comments(&tree, !no_expand, &mut budget).await?;
                Ok(())
            }
        }
    }

    /// File config (if any) with environment overrides on top
    fn load_config(&self) -> Result<ClientConfig> {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        Ok(config.apply_env())
    }

    async fn print_listing<T: Serialize>(
        &self,
        listing: &Listing<T>,
        limit: Option<usize>,
    ) -> Result<()> {
        let limit = limit.unwrap_or(usize::MAX);
        let mut printed = 0;
        let mut failed = None;
        if limit == 0 {
            return Ok(());
        }

        // Break on the last wanted item so the following page is never fetched
        listing
            .for_each(|item| {
                if let Err(e) = self.output(item) {
                    failed = Some(e);
                    return ControlFlow::Break(());
                }
                printed += 1;
                if printed >= limit {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await?;

        if let Some(e) = failed {
            return Err(e);
        }

        info!(printed, "Done");
        Ok(())
    }

    /// Depth-first walk; returns `Break` once the budget is spent
    fn print_comments<'a>(
        &'a self,
        listing: &'a Listing<Comment>,
        expand: bool,
        budget: &'a mut usize,
    ) -> BoxFuture<'a, Result<ControlFlow<()>>> {
        async move {
            if expand {
                let mut comments = std::pin::pin!(listing.stream());
                while let Some(comment) = comments.try_next().await? {
                    if self.print_comment(comment, expand, budget).await?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
            } else {
                for comment in listing.items() {
                    if self.print_comment(comment, expand, budget).await?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
            }
            Ok(ControlFlow::Continue(()))
        }
        .boxed()
    }

    async fn print_comment(
        &self,
        comment: &Comment,
        expand: bool,
        budget: &mut usize,
    ) -> Result<ControlFlow<()>> {
        if *budget == 0 {
            return Ok(ControlFlow::Break(()));
        }
        *budget -= 1;
        self.output(&comment.data)?;
        self.print_comments(&comment.replies, expand, budget).await
    }

    fn output<T: Serialize>(&self, item: &T) -> Result<()> {
        println!("{}", self.render(item)?);
        Ok(())
    }

    fn render<T: Serialize>(&self, item: &T) -> Result<String> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(item)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(item)?,
        };
        Ok(line)
    }
}
