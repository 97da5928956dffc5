//! Load indicator hooks

use crate::window::Window;

/// Visual feedback for transitions that take longer than the configured
/// delay. `end` is only called after a matching `start`.
pub trait LoadIndicator {
    fn start(&mut self, window: &mut dyn Window);
    fn end(&mut self, window: &mut dyn Window);
}

/// Dims the whole page while loading
#[derive(Debug, Clone, Copy, Default)]
pub struct DimPage;

impl LoadIndicator for DimPage {
    fn start(&mut self, window: &mut dyn Window) {
        window.set_root_style("transition", Some("opacity linear 0.05s"));
        window.set_root_style("opacity", Some("0.8"));
    }

    fn end(&mut self, window: &mut dyn Window) {
        window.set_root_style("transition", None);
        window.set_root_style("opacity", None);
    }
}
