//! The interactive prompt.
//!
//! Reads a line, routes it to a command, a link number or a URL, and acts
//! on whatever that produces until the user quits.

use tracing::{debug, warn};
use url::Url;

use crate::app::{AppContext, Result};
use crate::commands::{self, Outcome};
use crate::domain::Session;
use crate::nav::{self, NavError};
use crate::pager::{self, PagerOutcome};
use crate::render::style::Style;
use crate::resolver::{self, NATIVE_SCHEME};

/// Run the prompt loop, opening `start` first when given.
///
/// Returns when the user quits or interrupts the main prompt.
pub async fn run(ctx: &AppContext, session: &mut Session, start: Option<Url>) -> Result<()> {
    let mut pending = start.map(Outcome::Open);

    loop {
        match pending.take() {
            Some(Outcome::Quit) => break,
            Some(outcome) => pending = perform(ctx, session, outcome).await?,
            None => {
                let prompt = ctx.styles.paint(Style::Prompt, &prompt_text(session));
                let Some(input) = ctx.terminal.read_line(&prompt, false)? else {
                    break;
                };
                pending = route(ctx, session, input.trim())?;
            }
        }
    }

    debug!("Leaving prompt loop");
    Ok(())
}

fn prompt_text(session: &Session) -> String {
    if session.current_host.is_empty() {
        "gemlet> ".to_string()
    } else {
        format!("{}> ", session.current_host)
    }
}

/// Decide what a line of user input means.
fn route(ctx: &AppContext, session: &mut Session, input: &str) -> Result<Option<Outcome>> {
    if input.is_empty() {
        return Ok(None);
    }

    let args: Vec<&str> = input.split_whitespace().collect();
    if let Some(command) = commands::lookup(args[0]) {
        return Ok(match command.execute(&args, ctx, session) {
            Outcome::Done => None,
            outcome => Some(outcome),
        });
    }

    if let Ok(ordinal) = input.parse::<usize>() {
        return match session.link(ordinal) {
            Some(link) => Ok(Some(Outcome::Open(link.url.clone()))),
            None => {
                ctx.error(&format!("No link numbered {}", ordinal))?;
                Ok(None)
            }
        };
    }

    let current = session.current_url.as_ref().map(Url::as_str).unwrap_or("");
    match resolver::resolve(input, &session.current_host, current, true) {
        Ok(Some(url)) => Ok(Some(Outcome::Open(url))),
        Ok(None) => {
            ctx.error(&format!("Unknown command or link: {} (try 'help')", input))?;
            Ok(None)
        }
        Err(e) => {
            ctx.error(&e.to_string())?;
            Ok(None)
        }
    }
}

/// Carry out an outcome, returning the next one if paging produced it.
async fn perform(ctx: &AppContext, session: &mut Session, outcome: Outcome) -> Result<Option<Outcome>> {
    match outcome {
        Outcome::Open(url) => {
            if url.scheme() != NATIVE_SCHEME {
                ctx.warning(&format!(
                    "Not opening {}: only {}:// URLs are supported",
                    url, NATIVE_SCHEME
                ))?;
                return Ok(None);
            }
            match nav::navigate(ctx, session, url).await {
                Ok(()) => show_page(ctx, session),
                Err(e) => report(ctx, e).map(|_| None),
            }
        }
        Outcome::Back => match nav::back(ctx, session).await {
            Ok(true) => show_page(ctx, session),
            Ok(false) => {
                ctx.message("No previous page")?;
                Ok(None)
            }
            Err(e) => report(ctx, e).map(|_| None),
        },
        Outcome::Reload => match nav::reload(ctx, session).await {
            Ok(true) => show_page(ctx, session),
            Ok(false) => {
                ctx.error("No page loaded")?;
                Ok(None)
            }
            Err(e) => report(ctx, e).map(|_| None),
        },
        Outcome::Redisplay => show_page(ctx, session),
        Outcome::Show(lines) => show(ctx, session, &lines),
        Outcome::Done => Ok(None),
        Outcome::Quit => Ok(Some(Outcome::Quit)),
    }
}

fn show_page(ctx: &AppContext, session: &mut Session) -> Result<Option<Outcome>> {
    let lines = session.current_body.clone();
    show(ctx, session, &lines)
}

fn show(ctx: &AppContext, session: &mut Session, lines: &[String]) -> Result<Option<Outcome>> {
    match pager::page(ctx, session, lines)? {
        PagerOutcome::Finished | PagerOutcome::Cancelled => Ok(None),
        PagerOutcome::Navigate(input) => route(ctx, session, &input),
        PagerOutcome::Action(outcome) => Ok(Some(outcome)),
    }
}

fn report(ctx: &AppContext, err: NavError) -> Result<()> {
    match err {
        NavError::ForeignRedirect(_) | NavError::RedirectLoop(_) => {
            warn!("{}", err);
            ctx.warning(&err.to_string())
        }
        NavError::InputCancelled => ctx.message("Cancelled"),
        err => {
            debug!("Navigation error: {:?}", err);
            ctx.error(&err.to_string())
        }
    }
}
