//! Turns typed or linked references into absolute URLs.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

pub const NATIVE_SCHEME: &str = "gemini";

/// `host.label[.label...][:port][/path...]` or `localhost[:port][/path...]`
/// with no scheme in front.
static BARE_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(localhost|[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+)(:\d+)?(/.*)?$")
        .expect("valid host regex")
});

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("empty reference")]
    Empty,

    #[error("cannot resolve relative reference {0:?} without a current page")]
    NoBase(String),

    #[error("invalid URL {reference:?}: {source}")]
    Invalid {
        reference: String,
        source: url::ParseError,
    },
}

/// Resolve `reference` against the current page.
///
/// Returns `Ok(None)` when a user-typed reference is a bare word such as
/// `back` or `3`; the caller routes those to commands or link ordinals.
pub fn resolve(
    reference: &str,
    host: &str,
    current_url: &str,
    user_typed: bool,
) -> Result<Option<Url>, ResolveError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ResolveError::Empty);
    }

    if user_typed && !reference.contains("://") {
        if is_bare_word(reference) {
            return Ok(None);
        }
        if BARE_HOST.is_match(reference) {
            let qualified = format!("{NATIVE_SCHEME}://{reference}");
            return parse(&qualified).map(Some);
        }
    }

    match Url::parse(reference) {
        Ok(url) => Ok(Some(url)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base_for(reference, host, current_url)?;
            base.join(reference)
                .map(Some)
                .map_err(|source| ResolveError::Invalid {
                    reference: reference.to_string(),
                    source,
                })
        }
        Err(source) => Err(ResolveError::Invalid {
            reference: reference.to_string(),
            source,
        }),
    }
}

/// Single token with no dots, slashes or colons.
fn is_bare_word(reference: &str) -> bool {
    !reference.contains(|c: char| c == '.' || c == '/' || c == ':' || c.is_whitespace())
}

fn base_for(reference: &str, host: &str, current_url: &str) -> Result<Url, ResolveError> {
    let root_relative = reference.starts_with('/') && !reference.starts_with("//");

    if root_relative && !host.is_empty() {
        return parse(&format!("{NATIVE_SCHEME}://{host}/"));
    }

    if current_url.is_empty() {
        return Err(ResolveError::NoBase(reference.to_string()));
    }
    parse(current_url)
}

fn parse(s: &str) -> Result<Url, ResolveError> {
    Url::parse(s).map_err(|source| ResolveError::Invalid {
        reference: s.to_string(),
        source,
    })
}
