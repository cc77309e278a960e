//! delicious - bookmark homepage builder and Fluidinfo importer
//!
//! Without a subcommand, fetches the bookmark feed (or reads the cache with
//! `-c`) and writes the homepage; `-p` writes the phone page from the cache.

#![allow(clippy::print_stdout, clippy::print_stderr)] // Terminal front end; the library writes through `impl Write`

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use fdb::config::{Config, ConfigOverrides, Credentials, SANDBOX_HOST};
use fdb::delicious::{self, Params};
use fdb::fluiddb::FluidDb;
use fdb::logging;

/// Build a homepage from bookmarks tagged "home", or import bookmarks into Fluidinfo
#[derive(Parser, Debug)]
#[command(name = "delicious")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Build from the cached feed instead of downloading it
    #[arg(short = 'c', long = "cache")]
    use_cache: bool,

    /// Build the phone page (always from the cache)
    #[arg(short, long)]
    phone: bool,

    /// Settings file (default: ~/.config/fdb/delicious.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log debugging detail
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload public bookmarks from the cache as tagged objects
    Import {
        /// Download the feed first instead of using the cache
        #[arg(long)]
        fetch: bool,

        /// Put tags under this namespace of the user's
        #[arg(long, value_name = "NAMESPACE")]
        namespace: Option<String>,

        /// Use the Fluidinfo credentials file of another user
        #[arg(short, long)]
        user: Option<String>,

        /// Use the sandbox at https://sandbox.fluidinfo.com
        #[arg(short, long)]
        sandbox: bool,

        /// Use the specified Fluidinfo host
        #[arg(long, value_name = "URL")]
        hostname: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let params = Params::load(cli.config.as_deref())?;
    logging::init(cli.verbose || params.verbose, cli.debug);

    match cli.command {
        None => {
            let use_cache = cli.use_cache || cli.phone;
            delicious::build_homepage(&params, use_cache, cli.phone)?;
            let page = if cli.phone {
                &params.phone_page
            } else {
                &params.homepage
            };
            if params.verbose {
                println!("{} Wrote {}", style("✓").green(), page.display());
            }
            Ok(())
        }
        Some(Command::Import {
            fetch,
            namespace,
            user,
            sandbox,
            hostname,
        }) => {
            let config = Config::load_with(&store_overrides(hostname, sandbox))?;
            let credentials = Credentials::load(user.as_deref())?;
            let db = FluidDb::connect(&config, &credentials)?;

            let xml = delicious::load_feed(&params, !fetch)?;
            let posts = delicious::feed::parse_posts(&xml);
            let summary = delicious::import(&db, &posts, namespace.as_deref())?;
            summary
                .report(&mut io::stdout().lock())
                .context("Failed to write summary")?;
            if summary.private > 0 {
                println!(
                    "{} {} private bookmarks left out",
                    style("ℹ").cyan(),
                    summary.private
                );
            }
            Ok(())
        }
    }
}

/// Host flags of `import`, applied over the fdb settings file
fn store_overrides(hostname: Option<String>, sandbox: bool) -> ConfigOverrides {
    ConfigOverrides {
        host: hostname.or_else(|| sandbox.then(|| SANDBOX_HOST.to_string())),
        ..Default::default()
    }
}
