//! Shared fixtures for unit tests

use std::sync::Arc;

use parking_lot::Mutex;
use pjax_net::FetchedPage;
use url::Url;

use crate::engine::Engine;
use crate::indicator::LoadIndicator;
use crate::memory::MemoryWindow;
use crate::settings::Settings;
use crate::window::Window;

pub(crate) const HOME: &str = r##"<!DOCTYPE html>
<html>
<head><title>Home</title></head>
<body>
<nav>
  <a id="to-about" href="/about">About</a>
  <a id="to-self" href="/">Home</a>
  <a id="to-news" href="#news">News</a>
  <a id="to-team" href="team"><span id="team-label">Team</span></a>
  <a id="external" href="https://other.example/">Elsewhere</a>
  <a id="new-tab" href="/about" target="_blank">About (new tab)</a>
  <a id="opt-out" href="/about" data-no-pjax>About (native)</a>
  <a id="report" href="/report.pdf" download>Report</a>
  <a id="no-href">Nothing</a>
  <a id="forced" href="/" data-force-reload data-noscroll>Refresh</a>
</nav>
<p id="intro">Welcome</p>
<h2 id="news">News</h2>
</body>
</html>"##;

pub(crate) fn url(path: &str) -> Url {
    Url::parse("https://example.com/").unwrap().join(path).unwrap()
}

/// A `200 text/html` response served from `path`
pub(crate) fn fetched(path: &str, html: &str) -> FetchedPage {
    FetchedPage::html(url(path), html)
}

pub(crate) fn fixture() -> (Engine, MemoryWindow) {
    let window = MemoryWindow::open(url("/"), HOME);
    let engine = Engine::new(Settings::default(), window.location());
    (engine, window)
}

/// Records `start`/`end` calls in order
pub(crate) struct RecordingIndicator(Arc<Mutex<Vec<&'static str>>>);

impl RecordingIndicator {
    pub(crate) fn install(engine: &mut Engine) -> Arc<Mutex<Vec<&'static str>>> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        engine.set_load_indicator(Box::new(RecordingIndicator(calls.clone())));
        calls
    }
}

impl LoadIndicator for RecordingIndicator {
    fn start(&mut self, _window: &mut dyn Window) {
        self.0.lock().push("start");
    }

    fn end(&mut self, _window: &mut dyn Window) {
        self.0.lock().push("end");
    }
}
