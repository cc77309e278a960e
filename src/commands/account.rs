//! Account commands: whoami, pwd and su

use std::io::Write;
use std::path::Path;

use crate::config::credentials::{credentials_file, switch_credentials};
use crate::error::Result;
use crate::paths::TagPaths;

/// Print the authenticated username
pub fn whoami(paths: &TagPaths, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", paths.username())?;
    Ok(())
}

/// Print the user's top-level namespace in the active path style
pub fn pwd(paths: &TagPaths, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", paths.home())?;
    Ok(())
}

/// Make `user`'s credentials file the default one
pub fn su(user: &str, out: &mut impl Write) -> Result<()> {
    let source = credentials_file(Some(user))?;
    let dest = credentials_file(None)?;
    switch_to(user, &source, &dest, out)
}

/// Copy `source` over `dest` and report whose credentials are now in use
///
/// The file name is mentioned when it differs from the username inside.
pub fn switch_to(user: &str, source: &Path, dest: &Path, out: &mut impl Write) -> Result<()> {
    let credentials = switch_credentials(source, dest)?;
    let extra = if credentials.username == user {
        String::new()
    } else {
        format!(" (file {user})")
    };
    writeln!(out, "Credentials set to user {}{extra}.", credentials.username)?;
    Ok(())
}
