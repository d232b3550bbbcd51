//! Greedy word wrapping that ignores embedded style codes.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use unicode_width::UnicodeWidthStr;

static STYLE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid escape regex"));

/// Remove terminal style codes from `s`.
pub fn strip_styles(s: &str) -> Cow<'_, str> {
    STYLE_CODE.replace_all(s, "")
}

/// Display width of `s` on a terminal, not counting style codes.
pub fn visible_width(s: &str) -> usize {
    strip_styles(s).width()
}

/// Wrap `line` into pieces no wider than `width` columns.
///
/// Words are split on spaces; a line without spaces (a long URL, say) is
/// split after hyphens instead, and so is any word wider than `width`. A
/// word that still does not fit is kept whole on its own line.
/// Whitespace-only input yields one empty line.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    if line.trim().is_empty() {
        return vec![String::new()];
    }
    if width == 0 {
        return vec![line.to_string()];
    }

    // Each token carries the separator that goes before it on a shared line
    let tokens: Vec<(&str, &str)> = if line.contains(' ') {
        line.split(' ')
            .flat_map(|word| {
                if word.contains('-') && visible_width(word) > width {
                    hyphen_pieces(word, " ")
                } else {
                    vec![(word, " ")]
                }
            })
            .collect()
    } else {
        hyphen_pieces(line, "")
    };

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut started = false;

    for (token, sep) in tokens {
        let token_width = visible_width(token);
        let sep_width = sep.len();

        if started && current_width + sep_width + token_width > width {
            if !current.trim().is_empty() {
                out.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push_str(token);
            current_width = token_width;
            continue;
        }

        if started {
            current.push_str(sep);
            current_width += sep_width;
        }
        current.push_str(token);
        current_width += token_width;
        started = true;
    }

    if !current.trim().is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

/// Split `word` after each hyphen; only the first piece keeps `lead`.
fn hyphen_pieces<'a>(word: &'a str, lead: &'static str) -> Vec<(&'a str, &'static str)> {
    word.split_inclusive('-')
        .enumerate()
        .map(|(i, piece)| (piece, if i == 0 { lead } else { "" }))
        .collect()
}
