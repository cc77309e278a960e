//! Object commands: tag, untag, show, tags and count

use std::io::Write;

use tracing::warn;

use crate::commands::error_code;
use crate::error::Result;
use crate::fluiddb::FluidDb;
use crate::output::{cli_bracket, plural, Selector};
use crate::value::{formatted_tag_value, parse_assignment, TagValue};

/// Apply each `tag[=value]` to each object
pub fn tag(
    db: &FluidDb,
    objects: &[Selector],
    tags: &[String],
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    let assignments: Vec<_> = tags.iter().map(|tag| parse_assignment(tag)).collect();
    for object in objects {
        for assignment in &assignments {
            let path = db.paths().from_input(&assignment.tag);
            let value = assignment.value.as_ref();
            let result = match object {
                Selector::About(about) => db.tag_object_by_about(about, &path, value, true),
                Selector::Id(id) => db.tag_object_by_id(id, &path, value, true),
            };
            match result {
                Ok(()) if verbose => writeln!(
                    out,
                    "Tagged object {object} with {}",
                    formatted_tag_value(&assignment.tag, value)
                )?,
                Ok(()) => {}
                Err(err) => {
                    warn!("Failed to tag object {object} with {}", assignment.tag);
                    warn!("Error code {}", error_code(&err));
                }
            }
        }
    }
    Ok(())
}

/// Remove each tag from each object; a tag that is not there is not an error
pub fn untag(
    db: &FluidDb,
    objects: &[Selector],
    tags: &[String],
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    for object in objects {
        for tag in tags {
            let path = db.paths().from_input(tag);
            let result = match object {
                Selector::About(about) => db.untag_object_by_about(about, &path, true),
                Selector::Id(id) => db.untag_object_by_id(id, &path, true),
            };
            match result {
                Ok(()) if verbose => writeln!(out, "Removed tag {tag} from object {object}")?,
                Ok(()) => {}
                Err(err) => {
                    warn!("Failed to remove tag {tag} from object {object}");
                    warn!("Error code {}", error_code(&err));
                }
            }
        }
    }
    Ok(())
}

/// Print the named tags of each object
///
/// The pseudo-tag `/id` (or `id` with Fluidinfo-style paths) prints the
/// object's id.
pub fn show(
    db: &FluidDb,
    objects: &[Selector],
    tags: &[String],
    out: &mut impl Write,
) -> Result<()> {
    for object in objects {
        writeln!(out, "Object {object}:")?;
        for tag in tags {
            let path = db.paths().from_input(tag);
            let shown = db.paths().for_output(&path);
            let result = if db.paths().is_special_id(tag) {
                object_id(db, object).map(|id| id.map(TagValue::Str))
            } else {
                match object {
                    Selector::About(about) => db.get_tag_value_by_about(about, &path),
                    Selector::Id(id) => db.get_tag_value_by_id(id, &path),
                }
            };
            print_value(&shown, result, out)?;
        }
    }
    Ok(())
}

/// Print every tag on each object with its value
pub fn tags(db: &FluidDb, objects: &[Selector], out: &mut impl Write) -> Result<()> {
    for object in objects {
        writeln!(out, "Object {object}:")?;
        let id = match object {
            Selector::About(about) => db.create_object(Some(about))?.id,
            Selector::Id(id) => id.clone(),
        };
        for tag in db.get_object_tags_by_id(&id)? {
            let shown = db.paths().for_output(&tag);
            print_value(&shown, db.get_tag_value_by_id(&id, &tag), out)?;
        }
    }
    Ok(())
}

/// Print how many objects were selected
pub fn count(objects: &[Selector], out: &mut impl Write) -> Result<()> {
    writeln!(out, "Total: {}", plural(objects.len(), "object"))?;
    Ok(())
}

/// Id of a selected object; an about tag is looked up without creating it
fn object_id(db: &FluidDb, object: &Selector) -> Result<Option<String>> {
    match object {
        Selector::Id(id) => Ok(Some(id.clone())),
        Selector::About(about) => {
            let query = format!("fluiddb/about = \"{}\"", about.replace('"', "\\\""));
            Ok(db.query(&query)?.into_iter().next())
        }
    }
}

fn print_value(
    shown: &str,
    result: Result<Option<TagValue>>,
    out: &mut impl Write,
) -> Result<()> {
    match result {
        Ok(Some(value)) => writeln!(out, "  {}", formatted_tag_value(shown, Some(&value)))?,
        Ok(None) => writeln!(out, "  {}", cli_bracket(&format!("tag {shown} not present")))?,
        Err(err) if err.status().is_some() => writeln!(
            out,
            "{}",
            cli_bracket(&format!("error code {} getting tag {shown}", error_code(&err)))
        )?,
        Err(err) => return Err(err),
    }
    Ok(())
}
