//! Capture configuration.

use std::time::Duration;

use scrollshot_core::CancellationToken;
use scrollshot_render::Color;

/// Default wait after repositioning the viewport before sampling pixels.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Default cap on waiting for a container's layout-settled signal.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default interval between layout-settled checks.
pub const DEFAULT_SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Configuration for a capture.
///
/// # Settling
///
/// After each reposition a paginated capture waits for the container to
/// settle before rendering the page. Containers that report a layout signal
/// (see [`ScrollContainer::is_layout_settled`](crate::ScrollContainer::is_layout_settled))
/// are polled every `settle_poll_interval` and rendered as soon as they report
/// settled, or after `settle_timeout` at the latest. Containers without a
/// signal wait the fixed `settle_delay`.
///
/// # Example
///
/// ```
/// use scrollshot::CaptureConfig;
/// use scrollshot_render::Color;
/// use std::time::Duration;
///
/// let config = CaptureConfig::new()
///     .with_settle_delay(Duration::from_millis(120))
///     .with_deadline(Duration::from_secs(10))
///     .with_background(Color::LIGHT_GRAY);
///
/// assert_eq!(config.settle_delay, Duration::from_millis(120));
/// assert_eq!(config.deadline, Some(Duration::from_secs(10)));
/// ```
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Fixed wait for containers without a layout-settled signal.
    pub settle_delay: Duration,
    /// Longest wait for a container that reports it is still laying out.
    pub settle_timeout: Duration,
    /// Interval between layout-settled checks.
    pub settle_poll_interval: Duration,
    /// Overall time limit for a paginated capture. `None` disables it.
    pub deadline: Option<Duration>,
    /// Background used instead of the container's own background color.
    pub background: Option<Color>,
    /// Token checked between page steps.
    pub cancellation: Option<CancellationToken>,
}

impl CaptureConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixed settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the layout-settled timeout.
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Set the layout-settled polling interval.
    pub fn with_settle_poll_interval(mut self, interval: Duration) -> Self {
        self.settle_poll_interval = interval;
        self
    }

    /// Set an overall deadline for paginated captures.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Override the container's background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Resolve the background: override, then container color, then white.
    pub fn resolve_background(&self, container_background: Option<Color>) -> Color {
        self.background
            .or(container_background)
            .unwrap_or(Color::WHITE)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
            settle_poll_interval: DEFAULT_SETTLE_POLL_INTERVAL,
            deadline: None,
            background: None,
            cancellation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.settle_delay, Duration::from_millis(300));
        assert_eq!(config.settle_timeout, Duration::from_secs(2));
        assert!(config.deadline.is_none());
        assert!(config.background.is_none());
        assert!(config.cancellation.is_none());
    }

    #[test]
    fn test_background_resolution() {
        let config = CaptureConfig::new();
        assert_eq!(config.resolve_background(None), Color::WHITE);
        assert_eq!(config.resolve_background(Some(Color::BLUE)), Color::BLUE);

        let config = config.with_background(Color::RED);
        assert_eq!(config.resolve_background(Some(Color::BLUE)), Color::RED);
    }
}
