//! Gemtext rendering.
//!
//! Turns the lines of a `text/gemini` body into styled, wrapped terminal
//! lines and builds the numbered link table for the page.

pub mod style;
pub mod wrap;

use tracing::debug;

use crate::domain::{Link, Session};
use crate::resolver;

use self::style::{Style, StyleTable};
use self::wrap::{visible_width, wrap};

const PREFORMAT_TOGGLE: &str = "```";
const HEADER: &str = "#";
const LINK: &str = "=>";
const QUOTE: &str = ">";
const OVERFLOW_GLYPH: &str = "…";

/// Output of rendering one document.
#[derive(Debug, Default)]
pub struct Rendered {
    pub lines: Vec<String>,
    pub links: Vec<Link>,
}

pub struct Renderer<'a> {
    styles: &'a StyleTable,
    columns: usize,
    wrap_text: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(styles: &'a StyleTable, columns: usize, wrap_text: bool) -> Self {
        Self {
            styles,
            columns,
            wrap_text,
        }
    }

    /// Render `body` for the session's current page, replacing its link table.
    pub fn render(&self, body: &[String], session: &mut Session) -> Vec<String> {
        let current = session
            .current_url
            .as_ref()
            .map(|u| u.as_str())
            .unwrap_or("");
        let rendered = self.render_document(body, &session.current_host, current);
        session.current_links = rendered.links;
        rendered.lines
    }

    pub fn render_document(&self, body: &[String], host: &str, current_url: &str) -> Rendered {
        let mut out = Rendered::default();
        let mut preformatted = false;

        for line in body {
            if line.starts_with(PREFORMAT_TOGGLE) {
                preformatted = !preformatted;
                let styled = self.styles.paint(Style::Preformat, line);
                out.lines.extend(self.wrap(&styled));
            } else if preformatted {
                out.lines.push(self.truncate(line));
            } else if line.starts_with(HEADER) {
                let styled = self.styles.paint(Style::Header, line);
                out.lines.extend(self.wrap(&styled));
            } else if let Some(rest) = line.strip_prefix(LINK) {
                let styled = self.link_line(rest, host, current_url, &mut out.links);
                out.lines.extend(self.wrap(&styled));
            } else if let Some(rest) = line.strip_prefix(QUOTE) {
                out.lines.push(format!("|{}", rest));
            } else {
                out.lines.extend(self.wrap(line));
            }
        }

        debug!(
            "Rendered {} lines with {} links",
            out.lines.len(),
            out.links.len()
        );
        out
    }

    /// Wrap a message the same way document text is wrapped.
    pub fn wrap(&self, line: &str) -> Vec<String> {
        if self.wrap_text {
            wrap(line, self.columns)
        } else {
            vec![line.to_string()]
        }
    }

    fn link_line(&self, rest: &str, host: &str, current_url: &str, links: &mut Vec<Link>) -> String {
        let rest = rest.trim();
        let (target, label) = match rest.split_once(char::is_whitespace) {
            Some((target, label)) if !label.trim().is_empty() => (target, label.trim()),
            Some((target, _)) => (target, target),
            None => (rest, rest),
        };

        if target.is_empty() {
            return self.styles.paint(Style::Error, "[invalid link]");
        }

        let url = match resolver::resolve(target, host, current_url, false) {
            Ok(Some(url)) => url,
            other => {
                debug!("Skipping link {:?}: {:?}", target, other);
                return self
                    .styles
                    .paint(Style::Error, &format!("[invalid link] {}", rest));
            }
        };

        let link = Link::new(url, label.to_string(), links.len());
        let number = self
            .styles
            .paint(Style::LinkNumber, &format!("[{}]", link.ordinal));
        let line = if link.is_native() {
            format!("{} {}", number, label)
        } else {
            let tag = self
                .styles
                .paint(Style::SchemeTag, &format!("[{}]", link.scheme));
            format!("{} {} {}", number, tag, label)
        };
        links.push(link);
        line
    }

    /// Fit a preformatted line into the column budget without wrapping.
    fn truncate(&self, line: &str) -> String {
        if self.columns == 0 || visible_width(line) <= self.columns {
            return line.to_string();
        }

        let budget = self.columns.saturating_sub(1);
        let mut kept = String::new();
        let mut used = 0;
        for ch in line.chars() {
            let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + w > budget {
                break;
            }
            kept.push(ch);
            used += w;
        }
        kept.push_str(&self.styles.paint(Style::Overflow, OVERFLOW_GLYPH));
        kept
    }
}
