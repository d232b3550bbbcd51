use url::Url;

use super::Link;

/// Per-process browsing state.
///
/// Only the navigator writes `history`, the redirect counters and the
/// current page fields; commands and the pager read them.
#[derive(Debug, Default)]
pub struct Session {
    pub current_host: String,
    pub current_url: Option<Url>,
    pub history: Vec<Url>,
    pub redirect_count: u32,
    pub last_load_was_redirect: bool,
    pub current_links: Vec<Link>,
    /// Rendered lines of the current page, kept for redisplay.
    pub current_body: Vec<String>,
    /// Undecorated body lines of the last successful fetch.
    pub current_response_body: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(&self, ordinal: usize) -> Option<&Link> {
        self.current_links.get(ordinal)
    }

    /// Resets the redirect loop guard after a non-redirect response.
    pub fn clear_redirects(&mut self) {
        self.redirect_count = 0;
        self.last_load_was_redirect = false;
    }
}
