//! Logging facilities for Scrollshot.
//!
//! Scrollshot uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Capture code...
//! }
//! ```
//!
//! The constants below can be used in filter directives, for example
//! `RUST_LOG=scrollshot::walker=debug` to trace every page of a capture.

/// Span names used throughout Scrollshot for tracing.
pub mod span_names {
    /// Whole capture operation span.
    pub const CAPTURE: &str = "scrollshot::capture";
    /// Single page render span.
    pub const PAGE: &str = "scrollshot::page";
    /// Scheduler tick span.
    pub const TICK: &str = "scrollshot::tick";
}

/// Target names for log filtering.
pub mod targets {
    /// Core runtime target.
    pub const CORE: &str = "scrollshot_core";
    /// Timer queue target.
    pub const TIMER: &str = "scrollshot_core::timer";
    /// Cancellation token target.
    pub const CANCEL: &str = "scrollshot_core::cancel";
    /// Synchronous capture target.
    pub const CAPTURE: &str = "scrollshot::capture";
    /// Paginated walker target.
    pub const WALKER: &str = "scrollshot::walker";
    /// Viewport save/restore target.
    pub const VIEWPORT: &str = "scrollshot::viewport";
    /// Reference scroll container target.
    pub const SCROLL_AREA: &str = "scrollshot::scroll_area";
    /// Capture scheduler target.
    pub const SCHEDULER: &str = "scrollshot::scheduler";
    /// Output surface target.
    pub const SURFACE: &str = "scrollshot_render::surface";
    /// Image encoding and file output target.
    pub const IMAGE_BUFFER: &str = "scrollshot_render::image_buffer";
}
