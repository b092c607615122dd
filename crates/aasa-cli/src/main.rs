//! aasa-cli
//!
//! CLI tool for checking association documents and matching URLs against them.

mod report;

use std::fs;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use aasa_core::{association_locations, AssociationDocument, LinkSetMatcher};

use crate::report::{DocumentSummary, UrlMatches};

#[derive(Parser)]
#[command(name = "aasa-cli")]
#[command(about = "App-site-association document checker and URL matcher")]
struct Cli {
    /// Log matching decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the identifiers a document associates with each URL
    Match {
        /// Association document (JSON)
        #[arg(short, long)]
        input: String,

        /// URLs to match
        #[arg(short, long, required = true)]
        url: Vec<String>,

        /// Drop repeated identifiers
        #[arg(long)]
        unique: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Decode a document and compile every wildcard
    Check {
        /// Association document (JSON)
        #[arg(short, long)]
        input: String,
    },

    /// Print where an origin serves its association document
    Locations {
        /// HTTPS origin, e.g. https://www.example.com
        #[arg(short, long)]
        origin: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Match {
            input,
            url,
            unique,
            json,
        } => cmd_match(&input, &url, unique, json),
        Commands::Check { input } => cmd_check(&input),
        Commands::Locations { origin } => cmd_locations(&origin),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "aasa_core=debug,aasa_cli=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_document(path: &str) -> Result<AssociationDocument, String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    let document = AssociationDocument::from_slice(&bytes)
        .map_err(|e| format!("Failed to decode '{}': {}", path, e))?;
    tracing::debug!(path, "document decoded");
    Ok(document)
}

fn cmd_match(input: &str, urls: &[String], unique: bool, json: bool) -> Result<(), String> {
    let document = load_document(input)?;
    let matcher = LinkSetMatcher::from_document(&document);

    let mut results = Vec::with_capacity(urls.len());
    for raw in urls {
        let url = Url::parse(raw).map_err(|e| format!("Invalid URL '{}': {}", raw, e))?;
        let mut app_ids = matcher.matched_app_ids(&url);
        if unique {
            let mut seen = std::collections::HashSet::new();
            app_ids.retain(|id| seen.insert(id.clone()));
        }
        tracing::debug!(url = %url, matches = app_ids.len(), "url matched");
        results.push(UrlMatches {
            url: raw.clone(),
            app_ids,
        });
    }

    if json {
        let out = serde_json::to_string_pretty(&results)
            .map_err(|e| format!("Failed to encode results: {}", e))?;
        println!("{out}");
    } else {
        for result in &results {
            println!("{result}");
        }
    }

    Ok(())
}

fn cmd_check(input: &str) -> Result<(), String> {
    let document = load_document(input)?;
    let matcher = LinkSetMatcher::from_document(&document);
    let failures = matcher.precompile();

    let summary = DocumentSummary::new(&document, matcher.cache().len());
    println!("Document '{}' decoded", input);
    print!("{summary}");

    if failures.is_empty() {
        return Ok(());
    }

    println!();
    println!("Wildcards that never match:");
    for failure in &failures {
        println!(
            "  details[{}].components[{}] {:?}: {}",
            failure.rule_set, failure.component, failure.wildcard, failure.error
        );
    }
    Err(format!("{} wildcard(s) failed to compile", failures.len()))
}

fn cmd_locations(origin: &str) -> Result<(), String> {
    let origin = Url::parse(origin).map_err(|e| format!("Invalid URL '{}': {}", origin, e))?;
    let locations = association_locations(&origin)
        .map_err(|e| format!("Cannot derive locations for '{}': {}", origin, e))?;

    for location in &locations {
        println!("{location}");
    }
    Ok(())
}
