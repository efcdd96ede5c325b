use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use revreach::{
    CommitGraphSource, CommitId, Direction, GitSource, HistoryQuery, RefEntry,
};

#[derive(Parser)]
#[command(name = "revreach")]
#[command(about = "Reachability and tag-proximity queries over commit history", long_about = None)]
struct Cli {
    /// Path to the repository
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List branches whose history contains a commit
    Branches {
        /// Commit to look up (sha, branch or tag; defaults to HEAD)
        #[arg(default_value = "HEAD")]
        commit: String,
    },
    /// Show the nearest tags before and after a commit
    Tags {
        /// Commit to look up (sha, branch or tag; defaults to HEAD)
        #[arg(default_value = "HEAD")]
        commit: String,
    },
    /// Check whether one commit is an ancestor of another
    IsAncestor {
        /// Candidate ancestor
        candidate: String,
        /// Descendant tip
        tip: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let source = GitSource::open(Some(&cli.repo)).context("failed to open repository")?;
    let query = HistoryQuery::new(&source);

    match cli.command {
        Commands::Branches { commit } => {
            let target = source.resolve(&commit)?;
            let tips = branch_tips(&source)?;
            let containing = query.branches_containing(&target, &tips)?;
            if containing.is_empty() {
                println!("no branch contains {target}");
            } else {
                for name in containing {
                    println!("{name}");
                }
            }
        }
        Commands::Tags { commit } => {
            let target = source.resolve(&commit)?;
            let entries = source.refs()?;
            report_tag(&source, &query, &target, Direction::Preceding, &entries)?;
            report_tag(&source, &query, &target, Direction::Following, &entries)?;
        }
        Commands::IsAncestor { candidate, tip } => {
            let candidate = source.resolve(&candidate)?;
            let tip = source.resolve(&tip)?;
            if query.is_ancestor(&candidate, &tip)? {
                println!("{candidate} is an ancestor of {tip}");
            } else {
                println!("{candidate} is not an ancestor of {tip}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn branch_tips(source: &GitSource) -> Result<BTreeMap<String, CommitId>> {
    Ok(source
        .refs()?
        .into_iter()
        .filter(RefEntry::is_branch)
        .map(|r| (r.name, r.target))
        .collect())
}

fn report_tag(
    source: &GitSource,
    query: &HistoryQuery<'_, GitSource>,
    target: &CommitId,
    direction: Direction,
    entries: &[RefEntry],
) -> Result<()> {
    let side = match direction {
        Direction::Preceding => "precedes",
        Direction::Following => "follows",
    };
    match query.nearest_tag_from_refs(target, direction, entries)? {
        Some(name) => {
            let when = entries
                .iter()
                .find(|e| e.name == name)
                .and_then(|e| source.peel(e).ok())
                .and_then(|peeled| match peeled {
                    revreach::Peeled::Commit(id) => source.timestamp_of(&id).ok(),
                    revreach::Peeled::NotACommit => None,
                })
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .map(|dt| dt.format(" (%Y-%m-%d)").to_string())
                .unwrap_or_default();
            println!("{side}: {name}{when}");
        }
        None => println!("{side}: none"),
    }
    Ok(())
}
