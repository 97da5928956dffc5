//! Async driver
//!
//! Connects an [`Engine`] and a [`Window`] to a [`Fetch`] transport: every
//! transition that needs a fetch is awaited here, racing the load-indicator
//! delay, and its result is fed back to the engine.
//!
//! Locks are taken engine first, window second, and never held across an
//! `.await`.

use std::sync::Arc;

use parking_lot::Mutex;
use pjax_navigation::Overrides;
use pjax_net::{Fetch, Page};
use url::Url;

use crate::engine::{Completion, Engine, FetchRequest, Transition};
use crate::interception::{ClickDisposition, ClickEvent};
use crate::window::Window;
use crate::Result;

pub struct Navigator<W, F> {
    engine: Arc<Mutex<Engine>>,
    window: Arc<Mutex<W>>,
    fetcher: Arc<F>,
}

impl<W, F> Clone for Navigator<W, F> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            window: self.window.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<W, F> Navigator<W, F>
where
    W: Window,
    F: Fetch,
{
    pub fn new(engine: Engine, window: W, fetcher: F) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            window: Arc::new(Mutex::new(window)),
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn engine(&self) -> &Arc<Mutex<Engine>> {
        &self.engine
    }

    pub fn window(&self) -> &Arc<Mutex<W>> {
        &self.window
    }

    /// Handle a click and, if it starts a fetch, see it through.
    pub async fn click(&self, event: ClickEvent) -> ClickDisposition {
        let disposition = {
            let mut engine = self.engine.lock();
            let mut window = self.window.lock();
            engine.handle_click(&mut *window, event)
        };

        if let ClickDisposition::Intercepted(Transition::Fetch(request)) = &disposition {
            self.drive(request.clone()).await;
        }
        disposition
    }

    /// Handle a history traversal the window has already performed.
    pub async fn popstate(&self) -> Option<Completion> {
        let transition = {
            let mut engine = self.engine.lock();
            let mut window = self.window.lock();
            engine.handle_popstate(&mut *window)
        };
        self.settle(transition?).await
    }

    pub async fn visit(&self, target: Overrides) -> Result<Option<Completion>> {
        let transition = {
            let mut engine = self.engine.lock();
            let mut window = self.window.lock();
            engine.visit(&mut *window, target)?
        };
        Ok(self.settle(transition).await)
    }

    pub async fn reload(&self) -> Result<Option<Completion>> {
        let transition = {
            let mut engine = self.engine.lock();
            let mut window = self.window.lock();
            engine.reload(&mut *window)?
        };
        Ok(self.settle(transition).await)
    }

    async fn settle(&self, transition: Transition) -> Option<Completion> {
        match transition {
            Transition::Fetch(request) => Some(self.drive(request).await),
            Transition::SamePage | Transition::Dropped => None,
        }
    }

    async fn drive(&self, request: FetchRequest) -> Completion {
        let delay = self.engine.lock().settings().load_indicator_delay();

        let fetch = self.fetcher.fetch(&request.url);
        tokio::pin!(fetch);

        let result = if delay.is_zero() {
            fetch.await
        } else {
            tokio::select! {
                result = &mut fetch => result,
                _ = tokio::time::sleep(delay) => {
                    {
                        let mut engine = self.engine.lock();
                        let mut window = self.window.lock();
                        engine.indicator_elapsed(&mut *window, request.id);
                    }
                    fetch.await
                }
            }
        };

        let mut engine = self.engine.lock();
        let mut window = self.window.lock();
        engine.complete(&mut *window, request.id, result)
    }
}

/// Fetch and parse a page outside of any transition, e.g. the initial load.
pub async fn fetch_page<F: Fetch>(fetcher: &F, url: &Url) -> Result<Page> {
    let fetched = fetcher.fetch(url).await?;
    Ok(fetched.into_page()?)
}
