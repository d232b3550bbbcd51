//! Fixed mapping of style names to terminal escape sequences.

/// Named styles used by the renderer, pager and status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Header,
    Preformat,
    LinkNumber,
    SchemeTag,
    Overflow,
    Error,
    Warning,
    Prompt,
}

/// Escape sequences for every [`Style`], plus the reset sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTable {
    pub reset: &'static str,
    pub header: &'static str,
    pub preformat: &'static str,
    pub link_number: &'static str,
    pub scheme_tag: &'static str,
    pub overflow: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub prompt: &'static str,
}

/// ANSI SGR codes for colour terminals.
pub const ANSI: StyleTable = StyleTable {
    reset: "\x1b[0m",
    header: "\x1b[1m",
    preformat: "\x1b[2;3m",
    link_number: "\x1b[36m",
    scheme_tag: "\x1b[33m",
    overflow: "\x1b[2m",
    error: "\x1b[31m",
    warning: "\x1b[33m",
    prompt: "\x1b[1m",
};

/// No escape codes at all; used for dumb terminals and in tests.
pub const PLAIN: StyleTable = StyleTable {
    reset: "",
    header: "",
    preformat: "",
    link_number: "",
    scheme_tag: "",
    overflow: "",
    error: "",
    warning: "",
    prompt: "",
};

impl StyleTable {
    pub fn code(&self, style: Style) -> &'static str {
        match style {
            Style::Header => self.header,
            Style::Preformat => self.preformat,
            Style::LinkNumber => self.link_number,
            Style::SchemeTag => self.scheme_tag,
            Style::Overflow => self.overflow,
            Style::Error => self.error,
            Style::Warning => self.warning,
            Style::Prompt => self.prompt,
        }
    }

    /// Wrap `text` in the given style followed by a reset.
    pub fn paint(&self, style: Style, text: &str) -> String {
        let code = self.code(style);
        if code.is_empty() {
            return text.to_string();
        }
        format!("{}{}{}", code, text, self.reset)
    }
}
