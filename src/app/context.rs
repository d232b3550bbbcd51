use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::gemini::GeminiFetcher;
use crate::fetcher::Fetcher;
use crate::render::style::{Style, StyleTable, ANSI};
use crate::render::Renderer;
use crate::terminal::{CrosstermTerminal, Terminal};

/// Long-lived collaborators shared by navigation, paging and commands.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub terminal: Rc<dyn Terminal>,
    pub styles: StyleTable,
}

impl AppContext {
    /// Load configuration from `path`, or from the default location
    /// (creating it on first run) when no path is given.
    pub fn load_config(path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(config)
    }

    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(GeminiFetcher::new(&config)?);
        let terminal: Rc<dyn Terminal> = Rc::new(CrosstermTerminal::new());
        Ok(Self::with_parts(config, fetcher, terminal, ANSI))
    }

    pub fn with_parts(
        config: Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        terminal: Rc<dyn Terminal>,
        styles: StyleTable,
    ) -> Self {
        Self {
            config,
            fetcher,
            terminal,
            styles,
        }
    }

    /// Columns available for rendering after applying `wrap_width`.
    pub fn columns(&self) -> usize {
        self.config.wrap_columns(self.terminal.size().0)
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.styles, self.columns(), self.config.wrap_text)
    }

    /// Print a wrapped, unstyled message.
    pub fn message(&self, text: &str) -> Result<()> {
        for line in self.renderer().wrap(text) {
            self.terminal.writeln(&line)?;
        }
        Ok(())
    }

    pub fn error(&self, text: &str) -> Result<()> {
        self.styled(Style::Error, text)
    }

    pub fn warning(&self, text: &str) -> Result<()> {
        self.styled(Style::Warning, text)
    }

    fn styled(&self, style: Style, text: &str) -> Result<()> {
        for line in self.renderer().wrap(text) {
            self.terminal.writeln(&self.styles.paint(style, &line))?;
        }
        Ok(())
    }
}
