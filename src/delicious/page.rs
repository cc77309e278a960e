//! Homepage layout
//!
//! Entries are sorted and laid out column-major: the first column holds the
//! first `n / cols` entries (plus one while the remainder lasts), the next
//! column the following ones, and so on.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::warn;

use super::params::Params;

/// A homepage link, with any links attached to it through `main + extra` keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Target of the main link
    pub url: String,
    /// Extra (label, url) links shown after the main one
    pub extras: Vec<(String, String)>,
}

/// Fold `main + extra` keys into the entry called `main`
///
/// A key whose main part is missing stays as an entry of its own.
#[must_use]
pub fn attach_extras(home: BTreeMap<String, String>) -> BTreeMap<String, Entry> {
    let (combined, plain): (Vec<_>, Vec<_>) =
        home.into_iter().partition(|(key, _)| key.contains('+'));

    let mut entries: BTreeMap<String, Entry> = plain
        .into_iter()
        .map(|(key, url)| {
            let entry = Entry {
                url,
                extras: Vec::new(),
            };
            (key, entry)
        })
        .collect();

    for (key, url) in combined {
        let (main, extra) = key.split_once('+').unwrap_or((key.as_str(), ""));
        let (main, extra) = (main.trim(), extra.trim());
        match entries.get_mut(main) {
            Some(entry) => entry.extras.push((extra.to_string(), url)),
            None => {
                warn!("No main key {main:?} for {key:?}; adding as a separate entry");
                entries.insert(
                    key.clone(),
                    Entry {
                        url,
                        extras: Vec::new(),
                    },
                );
            }
        }
    }
    entries
}

/// Keys in display order; ties under case folding fall back to exact order
#[must_use]
pub fn sorted_keys<'a>(keys: impl Iterator<Item = &'a String>, case_sensitive: bool) -> Vec<&'a str> {
    let mut keys: Vec<&str> = keys.map(String::as_str).collect();
    if case_sensitive {
        keys.sort_unstable();
    } else {
        keys.sort_by(|a, b| compare_folded(a, b));
    }
    keys
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Entries per column for `n` entries over `cols` columns
#[must_use]
pub fn column_counts(n: usize, cols: usize) -> Vec<usize> {
    (0..cols)
        .map(|col| n / cols + usize::from(n % cols > col))
        .collect()
}

/// Row-by-row indexes into the sorted keys; `None` marks an empty cell
#[must_use]
pub fn layout(n: usize, cols: usize) -> Vec<Vec<Option<usize>>> {
    let counts = column_counts(n, cols);
    let rows = counts.first().copied().unwrap_or(0);
    let starts: Vec<usize> = counts
        .iter()
        .scan(0, |start, count| {
            let this = *start;
            *start += count;
            Some(this)
        })
        .collect();

    (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| (row < counts[col]).then(|| starts[col] + row))
                .collect()
        })
        .collect()
}

/// Fixed parts of the page around the table
#[derive(Debug, Clone)]
pub struct PageTemplate<'a> {
    params: &'a Params,
    phone: bool,
}

impl<'a> PageTemplate<'a> {
    /// Template for the homepage, or the phone page when `phone` is set
    #[must_use]
    pub const fn new(params: &'a Params, phone: bool) -> Self {
        Self { params, phone }
    }

    fn columns(&self) -> usize {
        self.params.columns(self.phone).max(1)
    }

    fn font_open(&self) -> String {
        if self.params.font.is_empty() {
            String::new()
        } else {
            format!(r#"<font face="{}">"#, escape(&self.params.font))
        }
    }

    fn font_close(&self) -> &'static str {
        if self.params.font.is_empty() {
            ""
        } else {
            "</font>"
        }
    }

    /// Everything up to the first table row
    #[must_use]
    pub fn head(&self) -> String {
        let p = self.params;
        let size = if self.phone { 400 } else { 100 };
        let heading = if self.phone {
            String::new()
        } else {
            format!(
                "<h1 style=\"color: {}\">{}</h1>\n",
                escape(&p.title_color),
                escape(&p.title)
            )
        };
        let align = if self.phone { "<div>" } else { "<center>" };
        let width = 100 / self.columns();
        let cols = format!("<col width=\"{width}%\"/>").repeat(self.columns());

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\"\n  \
\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n\
<html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
<head>\n\
<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\"/>\n\
<title>{title}</title>\n\
<style type=\"text/css\">\n\
body {{ font-size: {size}%; }}\n\
td {{ padding: 0.2em 0.5em; }}\n\
</style>\n\
</head>\n\
<body bgcolor=\"{bgcolor}\" text=\"{text}\" link=\"{link}\" vlink=\"{vlink}\" alink=\"{alink}\">\n\
{heading}{align}{font}\n\
<table>\n\
<colgroup>{cols}</colgroup>\n",
            title = escape(&p.title),
            bgcolor = escape(&p.bgcolor),
            text = escape(&p.text),
            link = escape(&p.link),
            vlink = escape(&p.vlink),
            alink = escape(&p.alink),
            font = self.font_open(),
        )
    }

    /// Everything after the last table row
    #[must_use]
    pub fn foot(&self) -> String {
        let p = self.params;
        let refresh = match &p.refresh_url {
            Some(url) if p.refresh_at_bottom => format!(
                "<p><a href=\"{}\">{}</a></p>\n",
                escape(url),
                escape(&p.refresh_label)
            ),
            _ => String::new(),
        };
        let align = if self.phone { "</div>" } else { "</center>" };
        format!("</table>\n{refresh}{}{align}\n</body>\n</html>\n", self.font_close())
    }
}

fn cell(key: &str, entry: &Entry) -> String {
    let extras: String = entry
        .extras
        .iter()
        .map(|(label, url)| format!(" <a href=\"{}\">{}</a>", escape(url), escape(label)))
        .collect();
    format!(
        "<td><a href=\"{}\">{}</a>{extras}</td>",
        escape(&entry.url),
        escape(key)
    )
}

/// Build the whole page from label to URL entries
#[must_use]
pub fn build_page(home: BTreeMap<String, String>, params: &Params, phone: bool) -> String {
    let template = PageTemplate::new(params, phone);
    let entries = attach_extras(home);
    let keys = sorted_keys(entries.keys(), params.case_sensitive);

    let mut page = template.head();
    for row in layout(keys.len(), template.columns()) {
        page.push_str("<tr>");
        for index in row.into_iter().flatten() {
            let key = keys[index];
            if let Some(entry) = entries.get(key) {
                page.push_str(&cell(key, entry));
            }
        }
        page.push_str("</tr>\n");
    }
    page.push_str(&template.foot());
    page
}

/// Escape text for XHTML content and attribute values
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
