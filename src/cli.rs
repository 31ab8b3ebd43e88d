//! Command-line entry points: replay a script file, or read commands
//! interactively. A thin `clap` derive CLI over the book's own textual
//! grammar.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::book::Book;
use crate::driver;

#[derive(Parser)]
#[command(name = "engine-cli")]
#[command(version, about = "A limit order book engine driven by a line-oriented script")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a script file of `A`/`R`/`M`/`P` records against a fresh book.
    Run {
        /// Path to the script; `-` reads from stdin.
        path: String,
    },
    /// Read records from stdin until EOF, applying each as it arrives.
    Repl,
}

/// Runs the parsed CLI, returning the process exit code: 0 on clean EOF,
/// non-zero on IO/parse failure.
pub fn run(cli: Cli) -> i32 {
    let mut book = Book::new();
    let stdout = io::stdout();
    let result = match cli.command {
        Commands::Run { path } => run_path(&mut book, &path, stdout.lock()),
        Commands::Repl => driver::run(&mut book, io::stdin().lock(), stdout.lock()),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{e:#}");
            1
        }
    }
}

fn run_path(book: &mut Book, path: &str, out: impl io::Write) -> Result<()> {
    if path == "-" {
        return driver::run(book, io::stdin().lock(), out);
    }
    let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
    driver::run(book, BufReader::new(file), out)
}
