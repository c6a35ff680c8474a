//! Patent Dashboard Core
//!
//! Central coordination layer for the dashboard page. The `Dashboard` owns the
//! document and every component; hosts only report events and advance time.

mod config;
mod dashboard;
mod error;
mod runtime;

pub use config::{Config, EXPECTED_TABS};
pub use dashboard::{Dashboard, PageEvent, PageTask};
pub use error::CoreError;
pub use runtime::{drive_realtime, shared, SharedDashboard};

// Re-export components
pub use dashboard_dom::{
    Document, DocumentSpec, DomError, IntersectionEntry, Key, MemoryDocument, NodeId,
    ObserveOptions, ScrollBehavior, Viewport,
};
pub use dashboard_page::{FilterTimings, PageError, ResponsiveSettings};
pub use dashboard_tabs::{
    ConfigurationError, IgnoreReason, StickyHeader, SwitchOutcome, Tab, TabController,
    TabDiagnostic, TabError, TransitionState, TransitionTimings,
};
pub use dashboard_timers::{ms, TimerQueue};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
