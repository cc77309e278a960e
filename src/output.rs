//! Text formatting shared by the commands

use std::fmt;

/// Default width for column grids
pub const PAGE_WIDTH: usize = 78;

/// Most columns a grid will use
pub const MAX_COLUMNS: usize = 9;

/// How an object was picked on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// By about tag (`-a`)
    About(String),
    /// By id (`-i`, or a query match)
    Id(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::About(about) => write!(f, "with about=\"{about}\""),
            Self::Id(id) => f.write_str(id),
        }
    }
}

/// `1 object`, `2 objects`
#[must_use]
pub fn plural(n: usize, stem: &str) -> String {
    if n == 1 {
        format!("{n} {stem}")
    } else {
        format!("{n} {stem}s")
    }
}

/// Wrap a message in parentheses
#[must_use]
pub fn cli_bracket(text: &str) -> String {
    format!("({text})")
}

/// Lay items out column-major in a grid
///
/// Column count is as many of the widest item as fit in `page_width`,
/// between 1 and `max_cols`. Rows are joined with newlines, with no
/// trailing newline; an empty list gives an empty string.
#[must_use]
pub fn to_string_grid(items: &[String], page_width: usize, max_cols: usize) -> String {
    let Some(widest) = items.iter().map(|item| item.chars().count()).max() else {
        return String::new();
    };
    let n_cols = (page_width / (widest + 1)).clamp(1, max_cols.max(1));
    let col_width = page_width.div_ceil(n_cols).saturating_sub(1);
    let n_rows = items.len().div_ceil(n_cols);

    (0..n_rows)
        .map(|row| {
            (0..n_cols)
                .filter_map(|col| items.get(col * n_rows + row))
                .map(|item| format!("{item:<col_width$}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
