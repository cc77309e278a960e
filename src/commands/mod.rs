//! Command implementations
//!
//! Each command writes its results to the given writer and reports
//! per-item failures as `warn!` events, carrying on with the rest.

use std::io::Write;

use crate::cli::ObjectArgs;
use crate::client::status;
use crate::error::{CliError, Result};
use crate::fluiddb::FluidDb;
use crate::output::{plural, Selector};

pub mod account;
pub mod http;
pub mod namespaces;
pub mod objects;
pub mod perms;

/// Turn `-a`, `-i` and `-q` into object selectors
///
/// About tags come first, then ids, then the ids matched by each query in
/// turn. Each query reports `N objects matched`; a failing query aborts.
pub fn resolve_objects(
    db: &FluidDb,
    args: &ObjectArgs,
    out: &mut impl Write,
) -> Result<Vec<Selector>> {
    let mut objects: Vec<Selector> = args.about.iter().cloned().map(Selector::About).collect();
    objects.extend(args.id.iter().cloned().map(Selector::Id));
    for query in &args.query {
        let ids = db.query(query)?;
        writeln!(out, "{} matched", plural(ids.len(), "object"))?;
        objects.extend(ids.into_iter().map(Selector::Id));
    }
    Ok(objects)
}

/// Require at least one of `-a`, `-i`, `-q`
pub fn require_objects(args: &ObjectArgs, command: &str) -> Result<()> {
    if args.is_empty() {
        Err(CliError::MissingArgument(format!(
            "You must use -q, -a or -i with {command}"
        )))
    } else {
        Ok(())
    }
}

/// Status description for an error, or its message when there is no status
#[must_use]
pub fn error_code(err: &CliError) -> String {
    err.status()
        .map_or_else(|| err.to_string(), status::describe)
}

/// Print `Nothing to do.` when no tags were given; returns whether to stop
pub fn nothing_to_do(tags: &[String], out: &mut impl Write) -> Result<bool> {
    if tags.is_empty() {
        writeln!(out, "Nothing to do.")?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_selection_is_an_error() {
        let err = require_objects(&ObjectArgs::default(), "tag").expect_err("no objects");
        assert!(err.to_string().contains("You must use -q, -a or -i with tag"));
        let args = ObjectArgs {
            id: vec!["abc".into()],
            ..Default::default()
        };
        assert!(require_objects(&args, "tag").is_ok());
    }

    #[test]
    fn error_codes_describe_status() {
        assert_eq!(error_code(&CliError::api(404, "x")), "404 (NOT FOUND)");
        assert_eq!(
            error_code(&CliError::Http("reset".into())),
            "HTTP request failed: reset"
        );
    }

    #[test]
    fn empty_tag_list_stops() {
        let mut out = Vec::new();
        assert!(nothing_to_do(&[], &mut out).expect("write"));
        assert_eq!(String::from_utf8_lossy(&out), "Nothing to do.\n");
        assert!(!nothing_to_do(&["x".into()], &mut Vec::new()).expect("write"));
    }
}
