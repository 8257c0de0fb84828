//! `jslt` command-line interface.
//!
//! Provides the logic behind the `jslt` binary:
//! - `jslt transform <EXPR> [--input FILE]` runs an expression over JSON
//!   read from FILE or stdin
//! - `jslt validate <EXPR>` checks an expression without running it
//!
//! Both print their result as JSON on stdout.

use crate::engine::Engine;
use crate::options::EngineOptions;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Transform JSON with JSLT-like expressions
#[derive(Parser, Debug)]
#[command(name = "jslt")]
#[command(about = "Transform JSON with JSLT-like expressions", long_about = None)]
pub struct Args {
    /// Maximum expression nesting depth
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Pretty-print the JSON result
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate an expression against input JSON
    Transform {
        /// The expression to evaluate
        expression: String,

        /// Input JSON file (reads stdin when omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Check an expression for structural errors
    Validate {
        /// The expression to check
        expression: String,
    },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Installs a stderr `tracing` subscriber filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"));
    if let Ok(filter) = filter {
        // A subscriber may already be installed when embedded; keep it.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .try_init();
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(buf)
        }
    }
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

/// Runs one command: the rendered result and whether it succeeded.
pub fn run(args: &Args) -> Result<(String, bool), CliError> {
    let mut options = EngineOptions::from_env();
    if let Some(depth) = args.max_depth {
        options = options.with_max_depth(depth);
    }
    let engine = Engine::with_options(options);
    match &args.command {
        Command::Transform { expression, input } => {
            let text = read_input(input.as_ref())?;
            let result = engine.transform_json(&text, expression);
            Ok((render(&result, args.pretty)?, result.success))
        }
        Command::Validate { expression } => {
            let result = engine.validate(expression);
            Ok((render(&result, args.pretty)?, result.valid))
        }
    }
}
