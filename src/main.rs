//! fdb - command-line client for the Fluidinfo object store
//!
//! Tags, untags and shows objects, lists and removes tags and namespaces,
//! manages permissions, and issues raw API requests.

#![allow(clippy::print_stdout, clippy::print_stderr)] // Terminal front end; the library writes through `impl Write`

use std::io::{self, Write};

use fdb::cli::{Cli, Commands, ObjectArgs, RawArgs};
use fdb::commands::{self, account, http, namespaces, objects};
use fdb::config::{Config, Credentials};
use fdb::fluiddb::FluidDb;
use fdb::perms::Preset;
use fdb::{logging, Result};
use tracing::debug;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

/// Main application entry point
fn run() -> i32 {
    let cli = Cli::parse_args();

    match execute(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

/// Execute the requested command
fn execute(cli: Cli) -> Result<()> {
    let config = Config::load_with(&cli.config_overrides())?;
    logging::init(cli.verbose, config.debug);
    debug!(host = %config.base_url(), timeout = config.timeout_secs, "configuration");

    let user = cli.user.as_deref();
    let connect = || -> Result<FluidDb> {
        let credentials = Credentials::load(user)?;
        debug!(user = %credentials.username, "credentials");
        FluidDb::connect(&config, &credentials)
    };
    let verbose = cli.verbose;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Tag { objects, tags } => handle_tag(&connect()?, &objects, &tags, verbose, &mut out),
        Commands::Untag { objects, tags } => {
            handle_untag(&connect()?, &objects, &tags, verbose, &mut out)
        }
        Commands::Show { objects, tags } => handle_show(&connect()?, &objects, &tags, &mut out),
        Commands::Tags { objects } => handle_tags(&connect()?, &objects, &mut out),
        Commands::Count { objects } => handle_count(&connect()?, &objects, &mut out),
        Commands::Ls {
            long,
            longer,
            group,
            recurse,
            namespace_only,
            path,
        } => {
            let options = namespaces::LsOptions {
                long,
                longer,
                group,
                recurse,
                namespace_only,
            };
            namespaces::ls(&connect()?, path.as_deref(), options, &mut out)
        }
        Commands::Rm { recurse, paths } => namespaces::rm(&connect()?, &paths, recurse),
        Commands::Perms {
            preset,
            group,
            paths,
        } => handle_perms(&connect()?, preset, &paths, &group, verbose, &mut out),
        Commands::Whoami => account::whoami(connect()?.paths(), &mut out),
        Commands::Pwd => account::pwd(connect()?.paths(), &mut out),
        Commands::Su { user } => account::su(&user, &mut out),
        Commands::Get(raw) => handle_raw(&connect()?, "get", &raw, &mut out),
        Commands::Put(raw) => handle_raw(&connect()?, "put", &raw, &mut out),
        Commands::Post(raw) => handle_raw(&connect()?, "post", &raw, &mut out),
        Commands::Delete(raw) => handle_raw(&connect()?, "delete", &raw, &mut out),
        Commands::Head(raw) => handle_raw(&connect()?, "head", &raw, &mut out),
        Commands::Version => handle_version(&mut out),
    }
}

/// Handle tag command
fn handle_tag(
    db: &FluidDb,
    selection: &ObjectArgs,
    tags: &[String],
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    commands::require_objects(selection, "tag")?;
    if commands::nothing_to_do(tags, out)? {
        return Ok(());
    }
    let selected = commands::resolve_objects(db, selection, out)?;
    objects::tag(db, &selected, tags, verbose, out)
}

/// Handle untag command
fn handle_untag(
    db: &FluidDb,
    selection: &ObjectArgs,
    tags: &[String],
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    commands::require_objects(selection, "untag")?;
    if commands::nothing_to_do(tags, out)? {
        return Ok(());
    }
    let selected = commands::resolve_objects(db, selection, out)?;
    objects::untag(db, &selected, tags, verbose, out)
}

/// Handle show command
fn handle_show(
    db: &FluidDb,
    selection: &ObjectArgs,
    tags: &[String],
    out: &mut impl Write,
) -> Result<()> {
    commands::require_objects(selection, "show")?;
    if commands::nothing_to_do(tags, out)? {
        return Ok(());
    }
    let selected = commands::resolve_objects(db, selection, out)?;
    objects::show(db, &selected, tags, out)
}

/// Handle tags command
fn handle_tags(db: &FluidDb, selection: &ObjectArgs, out: &mut impl Write) -> Result<()> {
    let selected = commands::resolve_objects(db, selection, out)?;
    objects::tags(db, &selected, out)
}

/// Handle count command
fn handle_count(db: &FluidDb, selection: &ObjectArgs, out: &mut impl Write) -> Result<()> {
    let selected = commands::resolve_objects(db, selection, out)?;
    objects::count(&selected, out)
}

/// Handle perms command
fn handle_perms(
    db: &FluidDb,
    preset: Preset,
    paths: &[String],
    group: &[String],
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    commands::perms::perms(db, preset, paths, group, verbose, out)
}

/// Handle the raw HTTP commands
fn handle_raw(db: &FluidDb, method: &str, raw: &RawArgs, out: &mut impl Write) -> Result<()> {
    let method = http::parse_method(method)?;
    http::request(db, method, &raw.uri, &raw.params, out)
}

/// Handle version command
fn handle_version(out: &mut impl Write) -> Result<()> {
    writeln!(out, "{} {}", fdb::NAME, fdb::VERSION)?;
    Ok(())
}
