use url::Url;

/// A hyperlink found while rendering a page.
///
/// `ordinal` is the number shown to the user and is only meaningful for
/// the page that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: Url,
    pub label: String,
    /// Empty when the link uses the native `gemini` scheme.
    pub scheme: String,
    pub ordinal: usize,
}

impl Link {
    pub fn new(url: Url, label: String, ordinal: usize) -> Self {
        let scheme = if url.scheme() == crate::resolver::NATIVE_SCHEME {
            String::new()
        } else {
            url.scheme().to_string()
        };

        Self {
            url,
            label,
            scheme,
            ordinal,
        }
    }

    pub fn is_native(&self) -> bool {
        self.scheme.is_empty()
    }
}
