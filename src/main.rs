use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use gemlet::app::{repl, AppContext};
use gemlet::cli::Cli;
use gemlet::domain::Session;
use gemlet::resolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never mix with paged output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = AppContext::load_config(cli.config.as_deref())?;
    cli.apply(&mut config);

    let start = start_url(cli.url.as_deref().unwrap_or(&config.homepage))?;
    let ctx = AppContext::new(config)?;
    let mut session = Session::new();

    repl::run(&ctx, &mut session, Some(start)).await?;
    Ok(())
}

/// Resolve the URL given on the command line as if it had been typed.
fn start_url(arg: &str) -> anyhow::Result<Url> {
    let url = match resolver::resolve(arg, "", "", true) {
        Ok(Some(url)) => url,
        // A lone word such as `localhost` names a host here, not a command
        Ok(None) => Url::parse(&format!("{}://{}/", resolver::NATIVE_SCHEME, arg))
            .with_context(|| format!("Invalid start URL: {}", arg))?,
        Err(e) => bail!("Invalid start URL: {}", e),
    };
    Ok(url)
}
