//! Navigation state machine.
//!
//! A navigation starts with one request and follows input prompts and
//! redirects until it either renders a page or fails. Each request is
//! pushed onto the session history before it is sent.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::app::{AppContext, GemletError};
use crate::domain::Session;
use crate::fetcher::{Response, StatusClass};
use crate::resolver::{self, ResolveError, NATIVE_SCHEME};

/// Longest run of contiguous redirects that is followed.
pub const MAX_REDIRECT_CHAIN: u32 = 6;

/// Upper bound on requests made by a single navigation.
pub const MAX_HOPS: u32 = 32;

/// Characters left unescaped in user input sent as a query.
const QUERY_INPUT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Error)]
pub enum NavError {
    #[error(transparent)]
    Transport(#[from] GemletError),

    #[error("Malformed response header: {0:?}")]
    MalformedHeader(String),

    #[error("Input cancelled")]
    InputCancelled,

    #[error("Redirect loop detected after {0} redirects")]
    RedirectLoop(u32),

    #[error("Not following redirect to non-gemini URL {0}")]
    ForeignRedirect(Url),

    #[error("Invalid redirect target {target:?}: {source}")]
    BadRedirect {
        target: String,
        source: ResolveError,
    },

    #[error("Error {status}: {meta}")]
    ServerFailure { status: String, meta: String },

    #[error("The server requires a client certificate ({0}); configure one to view this page")]
    CertificateRequired(String),

    #[error("Invalid status code {0:?}")]
    InvalidStatus(String),

    #[error("Gave up after {0} requests")]
    TooManyHops(u32),
}

#[derive(Debug)]
enum State {
    Requesting(Url),
    AwaitingInput {
        url: Url,
        prompt: String,
        sensitive: bool,
    },
    Redirecting {
        from: Url,
        target: String,
    },
    Rendering {
        url: Url,
        response: Response,
    },
    Failed(NavError),
}

/// Fetch `url` and follow the protocol until a page is rendered into the
/// session or the navigation fails.
pub async fn navigate(ctx: &AppContext, session: &mut Session, url: Url) -> Result<(), NavError> {
    // Each navigation starts a fresh redirect chain
    session.clear_redirects();
    let mut state = State::Requesting(url);
    let mut hops = 0;

    loop {
        state = match state {
            State::Requesting(url) => {
                hops += 1;
                if hops > MAX_HOPS {
                    State::Failed(NavError::TooManyHops(MAX_HOPS))
                } else {
                    request(ctx, session, url).await
                }
            }
            State::AwaitingInput {
                url,
                prompt,
                sensitive,
            } => {
                let prompt = format!("{}> ", prompt);
                match ctx.terminal.read_line(&prompt, sensitive) {
                    Ok(Some(input)) => State::Requesting(with_input(url, &input)),
                    Ok(None) => State::Failed(NavError::InputCancelled),
                    Err(e) => State::Failed(e.into()),
                }
            }
            State::Redirecting { from, target } => redirect(session, &from, &target),
            State::Rendering { url, response } => {
                display(ctx, session, url, response);
                return Ok(());
            }
            State::Failed(err) => {
                debug!("Navigation failed: {}", err);
                session.clear_redirects();
                return Err(err);
            }
        };
    }
}

/// Go back one page. Returns `false` without fetching when there is
/// nothing to go back to.
pub async fn back(ctx: &AppContext, session: &mut Session) -> Result<bool, NavError> {
    if session.history.len() <= 1 {
        return Ok(false);
    }
    session.history.pop();
    let Some(previous) = session.history.pop() else {
        return Ok(false);
    };
    navigate(ctx, session, previous).await?;
    Ok(true)
}

/// Fetch the current page again, replacing its history entry.
pub async fn reload(ctx: &AppContext, session: &mut Session) -> Result<bool, NavError> {
    let Some(url) = session.current_url.clone() else {
        return Ok(false);
    };
    if session.history.last() == Some(&url) {
        session.history.pop();
    }
    navigate(ctx, session, url).await?;
    Ok(true)
}

async fn request(ctx: &AppContext, session: &mut Session, url: Url) -> State {
    session.history.push(url.clone());
    debug!("Requesting {}", url);

    if let Some(host) = url.host_str() {
        if let Err(e) = ctx.terminal.set_title(host) {
            debug!("Could not set terminal title: {}", e);
        }
    }

    let response = match ctx.fetcher.fetch(&url).await {
        Ok(response) => response,
        Err(e) => return State::Failed(e.into()),
    };

    match response.class() {
        StatusClass::Malformed => State::Failed(NavError::MalformedHeader(
            format!("{} {}", response.status, response.meta).trim().to_string(),
        )),
        StatusClass::Input => {
            session.clear_redirects();
            State::AwaitingInput {
                sensitive: response.is_sensitive_input(),
                prompt: response.meta,
                url,
            }
        }
        StatusClass::Success => State::Rendering { url, response },
        StatusClass::Redirect => State::Redirecting {
            from: url,
            target: response.meta,
        },
        StatusClass::TemporaryFailure | StatusClass::PermanentFailure => {
            session.clear_redirects();
            State::Failed(NavError::ServerFailure {
                status: response.status,
                meta: response.meta,
            })
        }
        StatusClass::CertificateRequired => {
            session.clear_redirects();
            State::Failed(NavError::CertificateRequired(response.meta))
        }
        StatusClass::Unknown => State::Failed(NavError::InvalidStatus(response.status)),
    }
}

fn redirect(session: &mut Session, from: &Url, target: &str) -> State {
    if session.redirect_count >= MAX_REDIRECT_CHAIN {
        warn!(
            "Redirect loop at {} after {} redirects",
            from, session.redirect_count
        );
        let count = session.redirect_count;
        session.clear_redirects();
        return State::Failed(NavError::RedirectLoop(count));
    }

    if !session.last_load_was_redirect {
        session.redirect_count = 0;
    }
    session.redirect_count += 1;
    session.last_load_was_redirect = true;

    let host = from.host_str().unwrap_or_default();
    match resolver::resolve(target, host, from.as_str(), false) {
        Ok(Some(url)) if url.scheme() == NATIVE_SCHEME => {
            debug!("Redirect {} of chain: {} -> {}", session.redirect_count, from, url);
            State::Requesting(url)
        }
        Ok(Some(url)) => {
            session.clear_redirects();
            State::Failed(NavError::ForeignRedirect(url))
        }
        Ok(None) => State::Failed(NavError::BadRedirect {
            target: target.to_string(),
            source: ResolveError::Empty,
        }),
        Err(source) => {
            session.clear_redirects();
            State::Failed(NavError::BadRedirect {
                target: target.to_string(),
                source,
            })
        }
    }
}

/// Build the follow-up request for an input prompt: the prompting URL
/// without a trailing slash, with the input as its query.
fn with_input(mut url: Url, input: &str) -> Url {
    url.set_query(None);
    url.set_fragment(None);
    let base = url.as_str().strip_suffix('/').unwrap_or(url.as_str());
    let target = format!("{}?{}", base, utf8_percent_encode(input, QUERY_INPUT));
    Url::parse(&target).unwrap_or_else(|_| {
        url.set_query(Some(&utf8_percent_encode(input, QUERY_INPUT).to_string()));
        url
    })
}

fn display(ctx: &AppContext, session: &mut Session, url: Url, response: Response) {
    session.clear_redirects();
    session.current_host = url.host_str().unwrap_or_default().to_string();
    session.current_url = Some(url);

    let body = response.body.unwrap_or_default();
    let renderer = ctx.renderer();
    let lines = if is_gemtext(&response.meta) {
        renderer.render(&body, session)
    } else {
        session.current_links.clear();
        body.iter().flat_map(|line| renderer.wrap(line)).collect()
    };

    session.current_response_body = body;
    session.current_body = lines;
}

fn is_gemtext(meta: &str) -> bool {
    let mime = meta.split(';').next().unwrap_or_default().trim();
    mime.is_empty() || mime.eq_ignore_ascii_case("text/gemini")
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::fetcher::testing::ScriptedFetcher;
    use crate::render::style::PLAIN;
    use crate::terminal::testing::ScriptedTerminal;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn context(
        fetcher: ScriptedFetcher,
        inputs: &[Option<&str>],
    ) -> (AppContext, Arc<ScriptedFetcher>, Rc<ScriptedTerminal>) {
        let fetcher = Arc::new(fetcher);
        let terminal = Rc::new(ScriptedTerminal::new(80, 24, inputs));
        let ctx = AppContext::with_parts(Config::default(), fetcher.clone(), terminal.clone(), PLAIN);
        (ctx, fetcher, terminal)
    }

    /// Routes /0 .. /n where each redirects to the next and /n is a page.
    fn redirect_chain(length: usize) -> ScriptedFetcher {
        let mut fetcher = ScriptedFetcher::new();
        for i in 0..length {
            fetcher = fetcher.route(
                &format!("gemini://example.org/{}", i),
                "30",
                &format!("/{}", i + 1),
                None,
            );
        }
        fetcher.route(
            &format!("gemini://example.org/{}", length),
            "20",
            "text/gemini",
            Some("# Arrived"),
        )
    }

    #[tokio::test]
    async fn test_success_updates_session() {
        let fetcher = ScriptedFetcher::new().route(
            "gemini://example.org/dir/index.gmi",
            "20",
            "text/gemini; charset=utf-8",
            Some("# Hello\n=> next.gmi Next"),
        );
        let (ctx, _, terminal) = context(fetcher, &[]);
        let mut session = Session::new();
        session.redirect_count = 3;
        session.last_load_was_redirect = true;

        navigate(&ctx, &mut session, url("gemini://example.org/dir/index.gmi"))
            .await
            .unwrap();

        assert_eq!(session.current_host, "example.org");
        assert_eq!(
            session.current_url.as_ref().map(Url::as_str),
            Some("gemini://example.org/dir/index.gmi")
        );
        assert_eq!(session.redirect_count, 0);
        assert!(!session.last_load_was_redirect);
        assert_eq!(session.current_body, vec!["# Hello", "[0] Next"]);
        assert_eq!(session.current_response_body, vec!["# Hello", "=> next.gmi Next"]);
        assert_eq!(
            session.current_links[0].url.as_str(),
            "gemini://example.org/dir/next.gmi"
        );
        assert_eq!(*terminal.title.borrow(), "example.org");
    }

    #[tokio::test]
    async fn test_failed_fetch_still_recorded_in_history() {
        let (ctx, _, _) = context(ScriptedFetcher::new(), &[]);
        let mut session = Session::new();

        let err = navigate(&ctx, &mut session, url("gemini://down.example/"))
            .await
            .unwrap_err();

        assert!(matches!(err, NavError::Transport(_)));
        assert_eq!(session.history, vec![url("gemini://down.example/")]);
        assert!(session.current_url.is_none());
    }

    #[tokio::test]
    async fn test_six_redirects_are_followed() {
        let (ctx, fetcher, _) = context(redirect_chain(6), &[]);
        let mut session = Session::new();

        navigate(&ctx, &mut session, url("gemini://example.org/0"))
            .await
            .unwrap();

        assert_eq!(fetcher.requests().len(), 7);
        assert_eq!(session.current_body, vec!["# Arrived"]);
        assert_eq!(session.redirect_count, 0);
    }

    #[tokio::test]
    async fn test_seventh_redirect_aborts_and_resets() {
        let (ctx, fetcher, _) = context(redirect_chain(7), &[]);
        let mut session = Session::new();

        let err = navigate(&ctx, &mut session, url("gemini://example.org/0"))
            .await
            .unwrap_err();

        assert!(matches!(err, NavError::RedirectLoop(6)));
        assert_eq!(session.redirect_count, 0);
        assert_eq!(fetcher.requests().len(), 7);
        assert!(session.current_url.is_none());
    }

    #[tokio::test]
    async fn test_failed_chain_does_not_leak_into_next_navigation() {
        let mut fetcher = ScriptedFetcher::new();
        for i in 0..6 {
            fetcher = fetcher.route(
                &format!("gemini://example.org/{}", i),
                "30",
                &format!("/{}", i + 1),
                None,
            );
        }
        let fetcher = fetcher
            .route("gemini://example.org/6", "99", "odd", None)
            .route("gemini://other.org/", "30", "/home", None)
            .route("gemini://other.org/home", "20", "text/gemini", Some("welcome"));
        let (ctx, _, _) = context(fetcher, &[]);
        let mut session = Session::new();

        let err = navigate(&ctx, &mut session, url("gemini://example.org/0"))
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::InvalidStatus(_)));
        assert_eq!(session.redirect_count, 0);
        assert!(!session.last_load_was_redirect);

        navigate(&ctx, &mut session, url("gemini://other.org/"))
            .await
            .unwrap();
        assert_eq!(session.current_body, vec!["welcome"]);
    }

    #[tokio::test]
    async fn test_stale_counters_are_reset_on_new_navigation() {
        let fetcher = ScriptedFetcher::new()
            .route("gemini://other.org/", "30", "/home", None)
            .route("gemini://other.org/home", "20", "text/gemini", Some("welcome"));
        let (ctx, _, _) = context(fetcher, &[]);
        let mut session = Session::new();
        session.redirect_count = MAX_REDIRECT_CHAIN;
        session.last_load_was_redirect = true;

        navigate(&ctx, &mut session, url("gemini://other.org/"))
            .await
            .unwrap();
        assert_eq!(session.current_body, vec!["welcome"]);
    }

    #[test]
    fn test_redirect_count_only_tracks_contiguous_chain() {
        let mut session = Session::new();
        let from = url("gemini://example.org/a");

        session.redirect_count = 4;
        session.last_load_was_redirect = false;
        assert!(matches!(redirect(&mut session, &from, "/b"), State::Requesting(_)));
        assert_eq!(session.redirect_count, 1);

        assert!(matches!(redirect(&mut session, &from, "/c"), State::Requesting(_)));
        assert_eq!(session.redirect_count, 2);
    }

    #[tokio::test]
    async fn test_redirect_to_other_scheme_is_refused() {
        let fetcher = ScriptedFetcher::new().route(
            "gemini://example.org/",
            "31",
            "https://example.org/",
            None,
        );
        let (ctx, fetcher, _) = context(fetcher, &[]);
        let mut session = Session::new();

        let err = navigate(&ctx, &mut session, url("gemini://example.org/"))
            .await
            .unwrap_err();

        assert!(matches!(err, NavError::ForeignRedirect(u) if u.scheme() == "https"));
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_input_prompt_appends_query() {
        let fetcher = ScriptedFetcher::new()
            .route("gemini://example.org/search/", "10", "Search terms", None)
            .route(
                "gemini://example.org/search?rust%20gemini",
                "20",
                "text/gemini",
                Some("results"),
            );
        let (ctx, _, terminal) = context(fetcher, &[Some("rust gemini")]);
        let mut session = Session::new();

        navigate(&ctx, &mut session, url("gemini://example.org/search/"))
            .await
            .unwrap();

        assert_eq!(session.current_body, vec!["results"]);
        assert_eq!(
            terminal.prompts.borrow().as_slice(),
            &[("Search terms> ".to_string(), false)]
        );
        assert_eq!(session.history.len(), 2);
    }

    #[tokio::test]
    async fn test_sensitive_input_is_masked_and_cancellable() {
        let fetcher = ScriptedFetcher::new().route("gemini://example.org/login", "11", "Password", None);
        let (ctx, _, terminal) = context(fetcher, &[None]);
        let mut session = Session::new();

        let err = navigate(&ctx, &mut session, url("gemini://example.org/login"))
            .await
            .unwrap_err();

        assert!(matches!(err, NavError::InputCancelled));
        assert!(terminal.prompts.borrow()[0].1);
    }

    #[tokio::test]
    async fn test_failure_statuses() {
        let fetcher = ScriptedFetcher::new()
            .route("gemini://example.org/gone", "51", "Not found", None)
            .route("gemini://example.org/busy", "44", "Slow down", None)
            .route("gemini://example.org/private", "60", "Cert please", None)
            .route("gemini://example.org/odd", "99", "what", None)
            .route("gemini://example.org/short", "2", "", None);
        let (ctx, _, _) = context(fetcher, &[]);
        let mut session = Session::new();

        let result = navigate(&ctx, &mut session, url("gemini://example.org/gone")).await;
        assert!(matches!(result, Err(NavError::ServerFailure { ref status, .. }) if status == "51"));

        let result = navigate(&ctx, &mut session, url("gemini://example.org/busy")).await;
        assert_eq!(result.unwrap_err().to_string(), "Error 44: Slow down");

        let result = navigate(&ctx, &mut session, url("gemini://example.org/private")).await;
        assert!(matches!(result, Err(NavError::CertificateRequired(_))));

        let result = navigate(&ctx, &mut session, url("gemini://example.org/odd")).await;
        assert!(matches!(result, Err(NavError::InvalidStatus(_))));

        let result = navigate(&ctx, &mut session, url("gemini://example.org/short")).await;
        assert!(matches!(result, Err(NavError::MalformedHeader(_))));

        assert_eq!(session.history.len(), 5);
    }

    #[tokio::test]
    async fn test_endless_input_prompts_are_bounded() {
        let fetcher = ScriptedFetcher::new()
            .route("gemini://example.org/q", "10", "Again", None)
            .route("gemini://example.org/q?x", "10", "Again", None);
        let answers = vec![Some("x"); 40];
        let (ctx, _, _) = context(fetcher, &answers);
        let mut session = Session::new();

        let err = navigate(&ctx, &mut session, url("gemini://example.org/q"))
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::TooManyHops(MAX_HOPS)));
    }

    #[tokio::test]
    async fn test_back_with_single_entry_is_noop() {
        let (ctx, fetcher, _) = context(ScriptedFetcher::new(), &[]);
        let mut session = Session::new();
        session.history.push(url("gemini://example.org/"));

        assert!(!back(&ctx, &mut session).await.unwrap());
        assert_eq!(session.history.len(), 1);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_back_refetches_previous_page() {
        let fetcher = ScriptedFetcher::new()
            .route("gemini://example.org/a", "20", "text/gemini", Some("page a"))
            .route("gemini://example.org/b", "20", "text/gemini", Some("page b"));
        let (ctx, fetcher, _) = context(fetcher, &[]);
        let mut session = Session::new();

        navigate(&ctx, &mut session, url("gemini://example.org/a")).await.unwrap();
        navigate(&ctx, &mut session, url("gemini://example.org/b")).await.unwrap();
        assert_eq!(session.history.len(), 2);

        assert!(back(&ctx, &mut session).await.unwrap());
        assert_eq!(session.history, vec![url("gemini://example.org/a")]);
        assert_eq!(session.current_body, vec!["page a"]);
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_reload_keeps_history_length() {
        let fetcher = ScriptedFetcher::new().route("gemini://example.org/", "20", "", Some("hi"));
        let (ctx, fetcher, _) = context(fetcher, &[]);
        let mut session = Session::new();

        assert!(!reload(&ctx, &mut session).await.unwrap());

        navigate(&ctx, &mut session, url("gemini://example.org/")).await.unwrap();
        assert!(reload(&ctx, &mut session).await.unwrap());
        assert_eq!(session.history.len(), 1);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn test_with_input_strips_trailing_slash_and_encodes() {
        assert_eq!(
            with_input(url("gemini://example.org/search/"), "a&b c").as_str(),
            "gemini://example.org/search?a%26b%20c"
        );
        assert_eq!(
            with_input(url("gemini://example.org/q?old"), "new").as_str(),
            "gemini://example.org/q?new"
        );
    }

    #[test]
    fn test_plain_text_is_not_parsed_as_gemtext() {
        assert!(is_gemtext("text/gemini; lang=en"));
        assert!(is_gemtext(""));
        assert!(!is_gemtext("text/plain"));
    }
}
