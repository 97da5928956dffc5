//! Transition Engine
//!
//! One engine lives as long as the page. Request lifecycle:
//! ```text
//! Idle
//!   ↓ navigate (different page, or forced)
//! InFlight ── navigate → dropped, the first request wins
//!   ↓ complete
//! Idle  (success: swap in place / failure: native reload)
//! ```
//! Pushes to the current page never leave `Idle`: they only update history
//! and scroll.

use pjax_dom::{swap_document, SwapOptions};
use pjax_navigation::{fragment_id, NavigationConfig, NavigationSource, Overrides, PathMemory};
use pjax_net::{FailureKind, FetchError, FetchedPage, Page};
use url::Url;

use crate::indicator::{DimPage, LoadIndicator};
use crate::scroll::ScrollController;
use crate::settings::Settings;
use crate::window::{FrameHandle, TransitionEvent, Window};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A `GET` the host must perform and report back through
/// [`Engine::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: RequestId,
    pub url: Url,
}

/// What `navigate` decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Same page: history and scroll were handled, nothing to fetch
    SamePage,
    /// Another request is in flight
    Dropped,
    Fetch(FetchRequest),
}

/// How a completed request was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The new document was swapped in
    Committed,
    /// The transition was abandoned for a native reload
    FellBack(FailureKind),
    /// The id does not match the request in flight
    Stale,
}

#[derive(Debug)]
pub(crate) enum RequestState {
    Idle,
    InFlight(InFlight),
}

#[derive(Debug)]
pub(crate) struct InFlight {
    id: RequestId,
    config: NavigationConfig,
    indicator_shown: bool,
}

pub struct Engine {
    pub(crate) settings: Settings,
    indicator: Box<dyn LoadIndicator + Send>,
    state: RequestState,
    pub(crate) paths: PathMemory,
    pub(crate) pending_scroll_restore: Option<FrameHandle>,
    next_request: u64,
}

impl Engine {
    /// Create the engine for a page opened at `location`
    pub fn new(settings: Settings, location: &Url) -> Self {
        Self {
            settings,
            indicator: Box::new(DimPage),
            state: RequestState::Idle,
            paths: PathMemory::new(location),
            pending_scroll_restore: None,
            next_request: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn set_load_indicator(&mut self, indicator: Box<dyn LoadIndicator + Send>) {
        self.indicator = indicator;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, RequestState::Idle)
    }

    /// The request currently in flight
    pub fn active_request(&self) -> Option<FetchRequest> {
        match &self.state {
            RequestState::Idle => None,
            RequestState::InFlight(active) => Some(FetchRequest {
                id: active.id,
                url: active.config.url().clone(),
            }),
        }
    }

    pub fn last_known_path(&self) -> &PathMemory {
        &self.paths
    }

    /// Start a transition.
    pub fn navigate<W: Window>(&mut self, window: &mut W, config: NavigationConfig) -> Transition {
        if config.is_push() && !config.force_reload() && config.targets_same_page(window.location())
        {
            self.same_page(window, &config);
            return Transition::SamePage;
        }

        if let RequestState::InFlight(active) = &self.state {
            tracing::debug!(
                url = %config.url(),
                active = %active.config.url(),
                "Request in flight; dropping navigation"
            );
            return Transition::Dropped;
        }

        self.next_request += 1;
        let request = FetchRequest {
            id: RequestId(self.next_request),
            url: config.url().clone(),
        };

        tracing::info!(
            request = %request.id,
            url = %request.url,
            push = config.is_push(),
            "Fetching page"
        );

        self.state = RequestState::InFlight(InFlight {
            id: request.id,
            config,
            indicator_shown: false,
        });

        Transition::Fetch(request)
    }

    /// Re-navigate to the current location without a native reload.
    pub fn reload<W: Window>(&mut self, window: &mut W) -> Result<Transition> {
        let location = window.location().clone();
        let config = NavigationConfig::build(
            NavigationSource::Location(location.clone()),
            Some(Overrides {
                force_reload: Some(true),
                no_scroll: Some(true),
                ..Overrides::default()
            }),
            &location,
        )?;
        Ok(self.navigate(window, config))
    }

    /// Navigate to an explicitly described target. Pushes a history entry
    /// unless `isPush` is set to false.
    pub fn visit<W: Window>(&mut self, window: &mut W, mut target: Overrides) -> Result<Transition> {
        target.is_push.get_or_insert(true);
        let base = window.document().base_url(window.location());
        let config = NavigationConfig::build(NavigationSource::Explicit(target), None, &base)?;
        Ok(self.navigate(window, config))
    }

    /// The load-indicator delay ran out for request `id`.
    pub fn indicator_elapsed<W: Window>(&mut self, window: &mut W, id: RequestId) {
        if let RequestState::InFlight(active) = &mut self.state {
            if active.id == id && !active.indicator_shown {
                active.indicator_shown = true;
                self.indicator.start(window);
            }
        }
    }

    /// Settle request `id` with the transport's result.
    pub fn complete<W: Window>(
        &mut self,
        window: &mut W,
        id: RequestId,
        result: std::result::Result<FetchedPage, FetchError>,
    ) -> Completion {
        let active = match std::mem::replace(&mut self.state, RequestState::Idle) {
            RequestState::InFlight(active) if active.id == id => active,
            other => {
                self.state = other;
                tracing::warn!(request = %id, "Ignoring completion of unknown request");
                return Completion::Stale;
            }
        };

        let final_url = result.as_ref().ok().map(|fetched| fetched.final_url.clone());

        // From here on scroll is ours to manage.
        if result.as_ref().is_ok_and(FetchedPage::is_success) {
            if let Some(handle) = self.pending_scroll_restore.take() {
                window.cancel_frame(handle);
            }
        }

        match result.and_then(FetchedPage::into_page) {
            Ok(page) => {
                self.commit(window, active, page);
                Completion::Committed
            }
            Err(err) => {
                let kind = err.kind();
                self.fall_back(window, active, final_url.as_ref(), &err);
                Completion::FellBack(kind)
            }
        }
    }

    fn same_page<W: Window>(&mut self, window: &mut W, config: &NavigationConfig) {
        // History first, so the browser remembers the position being left.
        if config.href() != window.location().as_str() {
            let title = window.document().title();
            window.push_state(&title, config.url());
            self.paths.remember(config.url());
        }

        tracing::debug!(url = %config.url(), "Same-page navigation");

        if let Some(id) = config.hash_id() {
            self.scroller().scroll_to_element(window, &id);
        }
    }

    fn commit<W: Window>(&mut self, window: &mut W, active: InFlight, page: Page) {
        let InFlight {
            id,
            config,
            indicator_shown,
        } = active;
        let Page {
            final_url,
            document,
        } = page;

        if config.is_push() {
            let url = history_url(&config, &final_url);
            window.push_state(&document.title(), &url);
            self.paths.remember(&url);
        }

        let target = self.scroll_target(window.location(), &config);
        let mitigations = self.settings.mitigations;
        let scroller = ScrollController::new(self.settings.scroll_offset_selector());

        if mitigations.scroll_before_swap {
            scroller.scroll_to_target(window, target.as_deref(), config.no_scroll());
        }

        window.dispatch_event(TransitionEvent::Before);

        let report = swap_document(
            window.document_mut(),
            document,
            SwapOptions {
                drop_destructive_scripts: mitigations.drop_destructive_scripts,
            },
        );
        window.execute_scripts(&report.executed);

        if indicator_shown {
            self.indicator.end(window);
        }

        window.dispatch_event(TransitionEvent::After);

        let outcome = scroller.scroll_to_target(window, target.as_deref(), config.no_scroll());

        tracing::info!(
            request = %id,
            url = %window.location(),
            scroll = ?outcome,
            "Transition committed"
        );
    }

    fn fall_back<W: Window>(
        &mut self,
        window: &mut W,
        active: InFlight,
        final_url: Option<&Url>,
        err: &FetchError,
    ) {
        let config = active.config;
        tracing::warn!(
            request = %active.id,
            url = %config.url(),
            error = %err,
            "Transition failed; falling back to a full reload"
        );

        // Keep the address bar on what the user asked for.
        if config.is_push() {
            let url = final_url
                .map(|final_url| history_url(&config, final_url))
                .unwrap_or_else(|| config.url().clone());
            window.push_state("", &url);
            self.paths.remember(&url);
        }

        window.reload();
    }

    /// Element id to scroll to after a swap: the location hash, else for
    /// pushes the link's `data-scroll-to-id` (empty means the default id).
    fn scroll_target(&self, location: &Url, config: &NavigationConfig) -> Option<String> {
        if let Some(id) = fragment_id(location) {
            return Some(id);
        }
        if !config.is_push() {
            return None;
        }
        match config.scroll_to_id() {
            Some("") => self.settings.default_main_id().map(str::to_string),
            Some(id) => Some(id.to_string()),
            None => None,
        }
    }

    pub(crate) fn scroller(&self) -> ScrollController<'_> {
        ScrollController::new(self.settings.scroll_offset_selector())
    }
}

/// URL for the history entry of a completed push. A redirect shows up as a
/// different final URL; the requested fragment is carried over to it.
fn history_url(config: &NavigationConfig, final_url: &Url) -> Url {
    let mut requested = config.url().clone();
    requested.set_fragment(None);
    let mut resolved = final_url.clone();
    resolved.set_fragment(None);

    if resolved == requested {
        return config.url().clone();
    }

    let mut url = final_url.clone();
    if url.fragment().is_none() {
        url.set_fragment(config.url().fragment());
    }
    url
}
