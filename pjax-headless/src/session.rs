//! Headless browsing session
//!
//! Plays the part of the browser around the engine: opens the first page,
//! turns `--follow` hrefs into clicks on matching links, and performs the
//! native loads the engine falls back to.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use pjax_core::{
    fetch_page, ClickDisposition, ClickEvent, Completion, Document, Engine, Fetch, MemoryWindow,
    Navigator, NodeHandle, Settings, Window,
};
use url::Url;

pub struct Session<F> {
    settings: Settings,
    fetcher: F,
    navigator: Navigator<MemoryWindow, F>,
}

impl<F> Session<F>
where
    F: Fetch + Clone,
{
    /// Load `url` the way a browser would before any script runs.
    pub async fn open(settings: Settings, fetcher: F, url: Url) -> Result<Self> {
        let page = fetch_page(&fetcher, &url)
            .await
            .with_context(|| format!("Failed to open {url}"))?;
        let location = landing(&url, page.final_url);

        tracing::info!(url = %location, title = %page.document.title(), "Page opened");

        let engine = Engine::new(settings.clone(), &location);
        let window = MemoryWindow::new(location, page.document);
        Ok(Self {
            settings,
            navigator: Navigator::new(engine, window, fetcher.clone()),
            fetcher,
        })
    }

    /// Click the first link on the live page whose href is `href`, either
    /// literally or once resolved.
    pub async fn follow(&self, href: &str) -> Result<ClickDisposition> {
        let target = self.find_link(href)?;
        let disposition = self.navigator.click(ClickEvent::primary(target)).await;

        if let ClickDisposition::Ignored(reason) = &disposition {
            tracing::warn!(href, ?reason, "Link is not handled in place; skipping");
        }

        self.settle_reload().await?;
        Ok(disposition)
    }

    /// Press the back button.
    pub async fn back(&self) -> Result<Option<Completion>> {
        if !self.navigator.window().lock().back() {
            bail!("No previous history entry");
        }
        let completion = self.navigator.popstate().await;
        self.settle_reload().await?;
        Ok(completion)
    }

    /// Title, location and session history of the current page
    pub fn report(&self) -> String {
        let window = self.navigator.window().lock();
        let mut out = String::new();
        let _ = writeln!(out, "{}", window.document().title());
        let _ = writeln!(out, "{}", window.location());
        for (i, entry) in window.history().iter().enumerate() {
            let marker = if i == window.history_index() { '*' } else { ' ' };
            let _ = writeln!(out, "{marker} {} {}", entry.url, entry.title);
        }
        out
    }

    pub fn navigator(&self) -> &Navigator<MemoryWindow, F> {
        &self.navigator
    }

    fn find_link(&self, href: &str) -> Result<NodeHandle> {
        let window = self.navigator.window().lock();
        let document = window.document();
        let base = document.base_url(window.location());
        let wanted = base.join(href).ok();

        let found = document
            .elements()
            .filter(|el| el.value().name() == "a")
            .find(|el| match el.value().attr("href") {
                Some(candidate) => {
                    candidate == href || (wanted.is_some() && base.join(candidate).ok() == wanted)
                }
                None => false,
            })
            .map(|el| document.handle(*el));
        let Some(found) = found else {
            bail!("No link to {href} on {}", window.location());
        };
        Ok(found)
    }

    /// Carry out a native reload the engine asked for. The reloaded page
    /// starts with a fresh engine.
    async fn settle_reload(&self) -> Result<()> {
        let Some(url) = self.navigator.window().lock().take_pending_reload() else {
            return Ok(());
        };

        tracing::info!(url = %url, "Native load");

        let fetched = self
            .fetcher
            .fetch(&url)
            .await
            .with_context(|| format!("Failed to load {url}"))?;
        let document = Document::parse(&String::from_utf8_lossy(&fetched.body));
        let location = landing(&url, fetched.final_url);

        *self.navigator.engine().lock() = Engine::new(self.settings.clone(), &location);
        self.navigator.window().lock().load(location, document);
        Ok(())
    }
}

/// Where a load ends up: the final URL, keeping the requested fragment
/// across redirects.
fn landing(requested: &Url, mut final_url: Url) -> Url {
    if final_url.fragment().is_none() {
        final_url.set_fragment(requested.fragment());
    }
    final_url
}
