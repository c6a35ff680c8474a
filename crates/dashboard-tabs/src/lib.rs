//! Patent Dashboard Tab Navigation
//!
//! Owns the single active tab/panel pair and drives the crossfade between
//! panels:
//! - exactly one tab and one panel are active once initialized
//! - only one transition is in flight; requests made meanwhile are dropped
//! - ARIA state (`aria-selected`, `tabindex`, `aria-hidden`) follows the
//!   active flags
//!
//! The sticky header is a cosmetic extra that shares the nav markup.

mod controller;
mod error;
mod state;
mod sticky;
mod tab;

pub use controller::{
    IgnoreReason, SwitchOutcome, TabController, TabDiagnostic, TabTask, TransitionTimings,
};
pub use error::{ConfigurationError, TabError};
pub use state::TransitionState;
pub use sticky::StickyHeader;
pub use tab::{Panel, Tab};

pub type Result<T> = std::result::Result<T, TabError>;

/// Class carried by tab selector elements
pub const TAB_CLASS: &str = "nav-tab";
/// Class carried by panel elements
pub const PANEL_CLASS: &str = "tab-content";
/// Attribute on a tab holding its panel id
pub const TAB_TARGET_ATTR: &str = "data-tab";
pub const NAV_WRAPPER_CLASS: &str = "nav-wrapper";
pub const STICKY_CLASS: &str = "sticky";
