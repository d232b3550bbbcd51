//! Prints long output one screenful at a time.
//!
//! Between screens the user can press Enter to continue, interrupt to stop,
//! run a command, or type a link number or URL to leave the page.

use tracing::debug;

use crate::app::{AppContext, Result};
use crate::commands::{self, Outcome};
use crate::domain::Session;
use crate::render::style::Style;

const CONTINUE_PROMPT: &str = "-- Enter to continue, or type a command or link --";
const ACKNOWLEDGE_PROMPT: &str = "-- Press Enter to return to the page --";

/// How paging ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PagerOutcome {
    /// Every line was shown.
    Finished,
    /// Interrupted at a continuation prompt.
    Cancelled,
    /// The user typed something that is not a command; the caller decides
    /// whether it is a link number or a URL.
    Navigate(String),
    /// A command asked for something the pager cannot do itself.
    Action(Outcome),
}

/// Page `lines` through the context's terminal, leaving one row for the
/// continuation prompt.
pub fn page(ctx: &AppContext, session: &mut Session, lines: &[String]) -> Result<PagerOutcome> {
    let (_, rows) = ctx.terminal.size();
    let chunk_size = rows.saturating_sub(1).max(1);
    let chunks: Vec<&[String]> = lines.chunks(chunk_size).collect();
    debug!("Paging {} lines in {} chunk(s)", lines.len(), chunks.len());

    let mut index = 0;
    while let Some(chunk) = chunks.get(index) {
        for line in chunk.iter() {
            ctx.terminal.writeln(line)?;
        }
        if index + 1 == chunks.len() {
            break;
        }

        let prompt = ctx.styles.paint(Style::Prompt, CONTINUE_PROMPT);
        let Some(input) = ctx.terminal.read_line(&prompt, false)? else {
            return Ok(PagerOutcome::Cancelled);
        };
        let input = input.trim();
        if input.is_empty() {
            index += 1;
            continue;
        }

        let args: Vec<&str> = input.split_whitespace().collect();
        let Some(command) = commands::lookup(args[0]) else {
            return Ok(PagerOutcome::Navigate(input.to_string()));
        };
        match command.execute(&args, ctx, session) {
            Outcome::Done => {
                let prompt = ctx.styles.paint(Style::Prompt, ACKNOWLEDGE_PROMPT);
                if ctx.terminal.read_line(&prompt, false)?.is_none() {
                    return Ok(PagerOutcome::Cancelled);
                }
            }
            other => return Ok(PagerOutcome::Action(other)),
        }
    }

    Ok(PagerOutcome::Finished)
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

    fn context(rows: usize, inputs: &[Option<&str>]) -> (AppContext, Rc<ScriptedTerminal>) {
        let terminal = Rc::new(ScriptedTerminal::new(80, rows, inputs));
        let ctx = AppContext::with_parts(
            Config::default(),
            Arc::new(ScriptedFetcher::new()),
            terminal.clone(),
            PLAIN,
        );
        (ctx, terminal)
    }

    fn numbered(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {}", i)).collect()
    }

    fn printed(terminal: &ScriptedTerminal) -> Vec<String> {
        terminal
            .output()
            .lines()
            .filter(|l| l.starts_with("line "))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_short_output_needs_no_prompt() {
        let (ctx, terminal) = context(10, &[]);
        let mut session = Session::new();

        let outcome = page(&ctx, &mut session, &numbered(9)).unwrap();

        assert_eq!(outcome, PagerOutcome::Finished);
        assert_eq!(printed(&terminal).len(), 9);
        assert!(terminal.prompts.borrow().is_empty());
    }

    #[test]
    fn test_chunks_leave_a_row_for_the_prompt() {
        let (ctx, terminal) = context(4, &[Some(""), Some("")]);
        let mut session = Session::new();

        let outcome = page(&ctx, &mut session, &numbered(7)).unwrap();

        assert_eq!(outcome, PagerOutcome::Finished);
        assert_eq!(printed(&terminal), numbered(7));
        assert_eq!(terminal.prompts.borrow().len(), 2);
    }

    #[test]
    fn test_cancel_discards_remaining_chunks() {
        let (ctx, terminal) = context(4, &[None]);
        let mut session = Session::new();

        let outcome = page(&ctx, &mut session, &numbered(7)).unwrap();

        assert_eq!(outcome, PagerOutcome::Cancelled);
        assert_eq!(printed(&terminal), numbered(3));
    }

    #[test]
    fn test_link_or_url_leaves_the_page() {
        let (ctx, _) = context(4, &[Some(" 2 ")]);
        let mut session = Session::new();
        assert_eq!(
            page(&ctx, &mut session, &numbered(7)).unwrap(),
            PagerOutcome::Navigate("2".into())
        );

        let (ctx, _) = context(4, &[Some("example.org/x")]);
        assert_eq!(
            page(&ctx, &mut session, &numbered(7)).unwrap(),
            PagerOutcome::Navigate("example.org/x".into())
        );
    }

    #[test]
    fn test_command_resumes_same_position() {
        let (ctx, terminal) = context(4, &[Some("ls"), Some(""), Some(""), Some("")]);
        let mut session = Session::new();

        let outcome = page(&ctx, &mut session, &numbered(7)).unwrap();

        assert_eq!(outcome, PagerOutcome::Finished);
        let output = terminal.output();
        assert!(output.contains("No links on this page"));
        let lines = printed(&terminal);
        let first = numbered(3);
        assert_eq!(lines[..3], first[..]);
        assert_eq!(lines[3..6], first[..]);
        assert_eq!(lines[6..], numbered(7)[3..]);
        assert_eq!(terminal.remaining_inputs(), 0);
    }

    #[test]
    fn test_navigating_command_is_returned() {
        let (ctx, _) = context(4, &[Some("quit")]);
        let mut session = Session::new();

        assert_eq!(
            page(&ctx, &mut session, &numbered(7)).unwrap(),
            PagerOutcome::Action(Outcome::Quit)
        );
    }
}
