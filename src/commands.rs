//! Commands available at the main prompt and the pager prompt.
//!
//! Each handler gets the full token list (command name first), the shared
//! context and the session. Handlers never navigate themselves; anything
//! that needs a fetch or a pager is returned as an [`Outcome`].

use std::fs;
use std::path::Path;

use tracing::warn;
use url::Url;

use crate::app::{AppContext, Result};
use crate::domain::Session;

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing further; the command printed whatever it had to say.
    Done,
    Open(Url),
    Back,
    /// Fetch the current page again.
    Reload,
    /// Page the current rendered body again without fetching.
    Redisplay,
    /// Page the given lines.
    Show(Vec<String>),
    Quit,
}

pub type Handler = fn(&[&str], &AppContext, &mut Session) -> Result<Outcome>;

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub help: &'static str,
    pub run: Handler,
}

impl Command {
    fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| *alias == token)
    }

    /// Run the command, reporting a failure to the user instead of
    /// propagating it.
    pub fn execute(&self, args: &[&str], ctx: &AppContext, session: &mut Session) -> Outcome {
        match (self.run)(args, ctx, session) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Command {} failed: {}", self.name, e);
                if let Err(e) = ctx.error(&format!("{}: {}", self.name, e)) {
                    warn!("Could not report error: {}", e);
                }
                Outcome::Done
            }
        }
    }
}

pub static COMMANDS: &[Command] = &[
    Command {
        name: "quit",
        aliases: &["exit", "q"],
        usage: "quit",
        help: "Leave gemlet",
        run: quit,
    },
    Command {
        name: "reload",
        aliases: &[],
        usage: "reload [hard]",
        help: "Show the current page again; with 'hard', fetch it again",
        run: reload,
    },
    Command {
        name: "back",
        aliases: &["b"],
        usage: "back",
        help: "Go to the previous page",
        run: back,
    },
    Command {
        name: "home",
        aliases: &[],
        usage: "home",
        help: "Open the configured homepage",
        run: home,
    },
    Command {
        name: "ls",
        aliases: &[],
        usage: "ls",
        help: "List the links on the current page",
        run: ls,
    },
    Command {
        name: "printurl",
        aliases: &[],
        usage: "printurl [n...]",
        help: "Print the current URL, or the URLs of the numbered links",
        run: printurl,
    },
    Command {
        name: "saveurl",
        aliases: &[],
        usage: "saveurl FILE [n...]",
        help: "Write the current URL, or the URLs of the numbered links, to FILE",
        run: saveurl,
    },
    Command {
        name: "inspect",
        aliases: &[],
        usage: "inspect",
        help: "Show the current page source without formatting",
        run: inspect,
    },
    Command {
        name: "help",
        aliases: &["?"],
        usage: "help",
        help: "Show this list",
        run: help,
    },
];

pub fn lookup(token: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.matches(token))
}

fn quit(_: &[&str], _: &AppContext, _: &mut Session) -> Result<Outcome> {
    Ok(Outcome::Quit)
}

fn reload(args: &[&str], ctx: &AppContext, session: &mut Session) -> Result<Outcome> {
    if session.current_url.is_none() {
        ctx.error("No page loaded")?;
        return Ok(Outcome::Done);
    }
    match args.get(1) {
        Some(&"hard") => Ok(Outcome::Reload),
        Some(other) => {
            ctx.error(&format!("Unknown reload mode {:?}; try 'reload hard'", other))?;
            Ok(Outcome::Done)
        }
        None => Ok(Outcome::Redisplay),
    }
}

fn back(_: &[&str], _: &AppContext, _: &mut Session) -> Result<Outcome> {
    Ok(Outcome::Back)
}

fn home(_: &[&str], ctx: &AppContext, _: &mut Session) -> Result<Outcome> {
    Ok(Outcome::Open(Url::parse(&ctx.config.homepage)?))
}

fn ls(_: &[&str], ctx: &AppContext, session: &mut Session) -> Result<Outcome> {
    if session.current_links.is_empty() {
        ctx.message("No links on this page")?;
        return Ok(Outcome::Done);
    }
    for link in &session.current_links {
        ctx.terminal
            .writeln(&format!("[{}] {}", link.ordinal, link.url))?;
    }
    Ok(Outcome::Done)
}

fn printurl(args: &[&str], ctx: &AppContext, session: &mut Session) -> Result<Outcome> {
    for url in selected_urls(&args[1..], ctx, session)? {
        ctx.terminal.writeln(url.as_str())?;
    }
    Ok(Outcome::Done)
}

fn saveurl(args: &[&str], ctx: &AppContext, session: &mut Session) -> Result<Outcome> {
    let Some(file) = args.get(1) else {
        ctx.error("Usage: saveurl FILE [n...]")?;
        return Ok(Outcome::Done);
    };

    let urls = selected_urls(&args[2..], ctx, session)?;
    if urls.is_empty() {
        return Ok(Outcome::Done);
    }

    let path = Path::new(file);
    if path.exists() && !confirm(ctx, &format!("{} exists. Overwrite? [y/N] ", file))? {
        ctx.message("Not saved")?;
        return Ok(Outcome::Done);
    }

    let mut contents = urls.iter().map(Url::as_str).collect::<Vec<_>>().join("\n");
    contents.push('\n');
    fs::write(path, contents)?;
    ctx.message(&format!("Saved {} URL(s) to {}", urls.len(), file))?;
    Ok(Outcome::Done)
}

fn inspect(_: &[&str], ctx: &AppContext, session: &mut Session) -> Result<Outcome> {
    if session.current_url.is_none() {
        ctx.error("No page loaded")?;
        return Ok(Outcome::Done);
    }
    Ok(Outcome::Show(session.current_response_body.clone()))
}

fn help(_: &[&str], ctx: &AppContext, _: &mut Session) -> Result<Outcome> {
    ctx.message("Type a link number or a URL to open it, or one of:")?;
    for command in COMMANDS {
        let mut usage = command.usage.to_string();
        if !command.aliases.is_empty() {
            usage = format!("{} ({})", usage, command.aliases.join(", "));
        }
        ctx.terminal
            .writeln(&format!("  {:<24}{}", usage, command.help))?;
    }
    Ok(Outcome::Done)
}

/// The URLs named by link ordinals, or the current URL when none are given.
///
/// Bad ordinals are reported one by one and skipped.
fn selected_urls(ordinals: &[&str], ctx: &AppContext, session: &Session) -> Result<Vec<Url>> {
    if ordinals.is_empty() {
        return match &session.current_url {
            Some(url) => Ok(vec![url.clone()]),
            None => {
                ctx.error("No page loaded")?;
                Ok(Vec::new())
            }
        };
    }

    let mut urls = Vec::new();
    for token in ordinals {
        match token.parse::<usize>().ok().and_then(|n| session.link(n)) {
            Some(link) => urls.push(link.url.clone()),
            None => ctx.error(&format!("No link numbered {}", token))?,
        }
    }
    Ok(urls)
}

fn confirm(ctx: &AppContext, prompt: &str) -> Result<bool> {
    let answer = ctx.terminal.read_line(prompt, false)?;
    Ok(matches!(
        answer.as_deref().map(str::trim),
        Some("y") | Some("Y") | Some("yes")
    ))
}
