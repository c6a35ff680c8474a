//! Responsive tweaks
//!
//! - narrow viewports hide the nav strip scrollbar
//! - after a burst of resizes, card transitions are suspended briefly so
//!   relayout does not animate
//! - cards fade in on load, staggered by position

use std::time::Duration;

use dashboard_dom::{Document, NodeId, Viewport};
use dashboard_timers::{Debouncer, Scheduler};
use serde::{Deserialize, Serialize};

use crate::{css_seconds, elements_with_any_class};

const NAV_TABS_CLASS: &str = "nav-tabs";
const LOAD_CLASS: &str = "fade-in-up";
const LOAD_CLASSES: [&str; 3] = ["stat-card", "process-card", "matrix-card"];
const RELAYOUT_CLASSES: [&str; 2] = ["process-card", "matrix-card"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveSettings {
    /// Widths at or below this are treated as mobile
    pub mobile_breakpoint: u32,
    pub resize_debounce_ms: u64,
    /// How long card transitions stay off after a resize
    pub transition_restore_ms: u64,
    /// Load animation delay added per card
    pub load_stagger_ms: u64,
}

impl Default for ResponsiveSettings {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768,
            resize_debounce_ms: 250,
            transition_restore_ms: 100,
            load_stagger_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsiveTask {
    Relayout,
    RestoreTransitions,
}

#[derive(Debug, Clone)]
pub struct Responsive {
    settings: ResponsiveSettings,
    cards: Vec<NodeId>,
    resize: Debouncer,
}

impl Responsive {
    pub fn install<D: Document + Viewport + ?Sized>(
        doc: &mut D,
        settings: ResponsiveSettings,
    ) -> Self {
        if doc.width() <= settings.mobile_breakpoint {
            if let Some(nav) = doc.first_by_class(NAV_TABS_CLASS) {
                doc.set_style(nav, "scrollbar-width", "none");
                doc.set_style(nav, "-ms-overflow-style", "none");
                tracing::debug!(width = doc.width(), "Mobile viewport, nav scrollbar hidden");
            }
        }

        let elements = elements_with_any_class(doc, &LOAD_CLASSES);
        for (index, element) in elements.into_iter().enumerate() {
            let delay = css_seconds(index as u64 * settings.load_stagger_ms);
            doc.set_style(element, "animation-delay", &delay);
            doc.add_class(element, LOAD_CLASS);
        }

        Self {
            settings,
            cards: elements_with_any_class(doc, &RELAYOUT_CLASSES),
            resize: Debouncer::new(Duration::from_millis(settings.resize_debounce_ms)),
        }
    }

    pub fn on_resize<S: Scheduler<ResponsiveTask> + ?Sized>(&mut self, scheduler: &mut S) {
        self.resize.trigger(scheduler, ResponsiveTask::Relayout);
    }

    pub fn handle_task<D, S>(&mut self, doc: &mut D, scheduler: &mut S, task: ResponsiveTask)
    where
        D: Document + ?Sized,
        S: Scheduler<ResponsiveTask> + ?Sized,
    {
        match task {
            ResponsiveTask::Relayout => {
                self.resize.settle();
                for card in &self.cards {
                    doc.set_style(*card, "transition", "none");
                }
                scheduler.schedule_after(
                    Duration::from_millis(self.settings.transition_restore_ms),
                    ResponsiveTask::RestoreTransitions,
                );
            }
            ResponsiveTask::RestoreTransitions => {
                for card in &self.cards {
                    doc.set_style(*card, "transition", "");
                }
            }
        }
    }

    pub fn settings(&self) -> &ResponsiveSettings {
        &self.settings
    }
}
