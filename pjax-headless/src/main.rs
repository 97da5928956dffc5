//! pjax headless runner
//!
//! Opens a page, follows links through in-place transitions and prints where
//! it ended up.

mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pjax_core::{HttpFetcher, Settings};
use url::Url;

use session::Session;

#[derive(Parser)]
#[command(name = "pjax", about = "Follow links through pjax transitions without a browser")]
struct Args {
    /// Page to open
    url: Url,

    /// Click the link with this href; repeatable, applied in order
    #[arg(short, long = "follow", value_name = "HREF")]
    follow: Vec<String>,

    /// Go back one history entry afterwards; repeat to go back further
    #[arg(short, long, action = clap::ArgAction::Count)]
    back: u8,

    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    pjax_core::init_logging();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let fetcher = HttpFetcher::new(settings.request_timeout())?;

    let session = Session::open(settings, fetcher, args.url).await?;
    print!("{}", session.report());

    for href in &args.follow {
        session.follow(href).await?;
        print!("\n{}", session.report());
    }
    for _ in 0..args.back {
        session.back().await?;
        print!("\n{}", session.report());
    }
    Ok(())
}
