//! Namespace commands: ls and rm

use std::io::Write;

use tracing::info;

use crate::client::status;
use crate::error::{CliError, Result};
use crate::fluiddb::{FluidDb, NamespaceInfo};
use crate::output::{to_string_grid, MAX_COLUMNS, PAGE_WIDTH};

/// How `ls` presents what it finds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LsOptions {
    /// `-l`: permission summaries
    pub long: bool,
    /// `-L`: full permission descriptions
    pub longer: bool,
    /// `-g`: summaries with group members
    pub group: bool,
    /// `-R`: descend into sub-namespaces
    pub recurse: bool,
    /// `-d`: the namespace itself rather than its contents
    pub namespace_only: bool,
}

impl LsOptions {
    const fn shows_perms(self) -> bool {
        self.long || self.longer || self.group
    }
}

/// List a namespace, or show a tag
///
/// With no path, the user's own namespace is listed. A path naming both a
/// namespace and a tag shows both.
pub fn ls(db: &FluidDb, path: Option<&str>, options: LsOptions, out: &mut impl Write) -> Result<()> {
    let input = path.map_or_else(|| db.paths().home(), str::to_string);
    let absolute = db.paths().from_input(&input);
    let absolute = absolute.trim_end_matches('/');

    let is_namespace = db.namespace_exists(absolute)?;
    let is_tag = absolute.matches('/').count() >= 2 && db.tag_exists(absolute)?;
    if !is_namespace && !is_tag {
        return Err(CliError::api(
            status::NOT_FOUND,
            format!("{} not found", db.paths().for_output(absolute)),
        ));
    }

    if is_namespace {
        if options.namespace_only {
            if options.shows_perms() {
                writeln!(out, "{}", entry_perms(db, absolute, true, options)?)?;
            } else {
                writeln!(out, "{}", db.paths().for_output(absolute))?;
            }
        } else {
            list(db, absolute, options, out)?;
        }
    }
    if is_tag {
        if options.shows_perms() {
            writeln!(out, "{}", entry_perms(db, absolute, false, options)?)?;
        } else {
            writeln!(out, "{}", db.paths().for_output(absolute))?;
        }
    }
    Ok(())
}

/// Sorted entries of a namespace: tags as-is, namespaces with a trailing `/`
#[must_use]
pub fn sorted_entries(info: &NamespaceInfo) -> Vec<String> {
    let mut items: Vec<String> = info
        .tag_names
        .iter()
        .cloned()
        .chain(info.namespace_names.iter().map(|ns| format!("{ns}/")))
        .collect();
    items.sort();
    items
}

fn list(db: &FluidDb, namespace: &str, options: LsOptions, out: &mut impl Write) -> Result<()> {
    let info = match db.list_namespace(namespace) {
        Ok(info) => info,
        Err(err) if err.status() == Some(status::UNAUTHORIZED) => {
            writeln!(out, "Permission denied.")?;
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    let items = sorted_entries(&info);

    if options.recurse {
        writeln!(out)?;
        writeln!(out, "{}:", db.paths().for_output(namespace))?;
    }
    if options.shows_perms() {
        for item in &items {
            let is_namespace = item.ends_with('/');
            let child = format!("{namespace}/{}", item.trim_end_matches('/'));
            writeln!(out, "{}", entry_perms(db, &child, is_namespace, options)?)?;
        }
    } else if !items.is_empty() {
        writeln!(out, "{}", to_string_grid(&items, PAGE_WIDTH, MAX_COLUMNS))?;
    }

    if options.recurse {
        let mut children = info.namespace_names;
        children.sort();
        for child in children {
            list(db, &format!("{namespace}/{child}"), options, out)?;
        }
    }
    Ok(())
}

/// One `ls -l`, `-g` or `-L` entry for a tag or namespace
fn entry_perms(db: &FluidDb, path: &str, is_namespace: bool, options: LsOptions) -> Result<String> {
    let mut shown = db.paths().for_output(path);
    if is_namespace {
        shown.push('/');
    }
    if options.longer {
        let description = db.perms_long_description(path, is_namespace)?;
        return Ok(format!("\n{shown}:\n\n{description}"));
    }
    let summary = if is_namespace {
        db.ns_perms_string(path)?
    } else {
        db.tag_perms_string(path)?
    };
    if options.group {
        let members = db.perms_group(path, is_namespace)?;
        let members = if members.is_empty() {
            "-".to_string()
        } else {
            members.join(",")
        };
        Ok(format!("{summary}   {members}   {shown}"))
    } else {
        Ok(format!("{summary}   {shown}"))
    }
}

/// Remove tags or namespaces
///
/// Namespaces must be empty unless `recurse` is set.
pub fn rm(db: &FluidDb, paths: &[String], recurse: bool) -> Result<()> {
    for path in paths {
        let absolute = db.paths().from_input(path);
        let absolute = absolute.trim_end_matches('/');
        let shown = db.paths().for_output(absolute);

        if db.namespace_exists(absolute)? {
            if recurse {
                db.remove_namespace_recursive(absolute)?;
            } else {
                db.delete_namespace(absolute)?;
            }
            info!("Removed namespace {shown}");
        } else if absolute.matches('/').count() >= 2 && db.tag_exists(absolute)? {
            db.delete_abstract_tag(absolute)?;
            info!("Removed tag {shown}");
        } else {
            return Err(CliError::api(status::NOT_FOUND, format!("{shown} not found")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_mark_namespaces() {
        let info = NamespaceInfo {
            namespace_names: vec!["books".into(), "music".into()],
            tag_names: vec!["rating".into(), "about".into()],
            ..Default::default()
        };
        assert_eq!(
            sorted_entries(&info),
            vec!["about", "books/", "music/", "rating"]
        );
    }

    #[test]
    fn perms_shown_for_any_long_flag() {
        assert!(!LsOptions::default().shows_perms());
        for options in [
            LsOptions { long: true, ..Default::default() },
            LsOptions { longer: true, ..Default::default() },
            LsOptions { group: true, ..Default::default() },
        ] {
            assert!(options.shows_perms());
        }
    }
}
