//! The perms command

use std::io::Write;

use crate::client::status;
use crate::error::{CliError, Result};
use crate::fluiddb::FluidDb;
use crate::perms::Preset;

/// Apply `preset` to each path
///
/// A trailing `/` marks a namespace. Otherwise the preset goes to the tag of
/// that name, and also to the namespace when one exists with the same path.
pub fn perms(
    db: &FluidDb,
    preset: Preset,
    paths: &[String],
    group: &[String],
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    for path in paths {
        let absolute = db.paths().from_input(path);
        let trimmed = absolute.trim_end_matches('/');
        let shown = db.paths().for_output(trimmed);

        let targets: Vec<bool> = if absolute.ends_with('/') {
            vec![true]
        } else {
            let mut targets = Vec::new();
            if trimmed.matches('/').count() >= 2 && db.tag_exists(trimmed)? {
                targets.push(false);
            }
            if db.namespace_exists(trimmed)? {
                targets.push(true);
            }
            targets
        };
        if targets.is_empty() {
            return Err(CliError::api(status::NOT_FOUND, format!("{shown} not found")));
        }

        for is_namespace in targets {
            db.apply_preset(trimmed, is_namespace, preset, group)?;
            if verbose {
                let kind = if is_namespace { "namespace" } else { "tag" };
                writeln!(out, "Set {} permissions on {kind} {shown}", preset_name(preset))?;
            }
        }
    }
    Ok(())
}

fn preset_name(preset: Preset) -> String {
    use clap::ValueEnum;
    preset
        .to_possible_value()
        .map_or_else(|| format!("{preset:?}"), |value| value.get_name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_named_as_on_the_command_line() {
        assert_eq!(preset_name(Preset::GroupRead), "group-read");
        assert_eq!(preset_name(Preset::Private), "private");
    }
}
