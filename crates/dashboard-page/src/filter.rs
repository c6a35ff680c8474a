//! Process stage filtering
//!
//! Clicking a `.stage-btn` narrows the process grid to the cards of its
//! `data-stage`. The grid carries `filtering` for the whole animation and
//! clicks on other stage buttons are dropped until it is gone.
//!
//! ```text
//! click        button active, grid `filtering`, overview dimmed
//! next frame   non-matching cards get `exiting`
//!   +300ms       ... hidden
//!   +200ms     matching cards shown with `entering`
//!   +500ms       ... `entering` removed, 80ms apart per card
//!   +800ms     grid and overview restored, active button pulses
//! ```

use std::time::Duration;

use dashboard_dom::{Document, NodeId, ScrollBehavior};
use dashboard_timers::Scheduler;
use serde::{Deserialize, Serialize};

use crate::error::PageError;
use crate::{closest_with_class, css_seconds, Result};

/// `data-stage` value matching every card
pub const ALL_STAGES: &str = "all";

const STAGE_BUTTON_CLASS: &str = "stage-btn";
const CARD_CLASS: &str = "process-card";
const GRID_CLASS: &str = "process-grid";
const OVERVIEW_CLASS: &str = "process-overview";
const STAGE_ATTR: &str = "data-stage";
const SECTION_ID: &str = "process";

const FILTERING_CLASS: &str = "filtering";
const EXITING_CLASS: &str = "exiting";
const ENTERING_CLASS: &str = "entering";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterTimings {
    /// Exit animation before a card is hidden
    pub exit_ms: u64,
    /// Delay before matching cards are shown
    pub enter_delay_ms: u64,
    /// How long a shown card keeps `entering`
    pub entering_ms: u64,
    /// Extra `entering` time per card position
    pub stagger_ms: u64,
    pub cleanup_ms: u64,
    pub pulse_ms: u64,
    /// Delay before the process section is scrolled into view
    pub scroll_delay_ms: u64,
}

impl Default for FilterTimings {
    fn default() -> Self {
        Self {
            exit_ms: 300,
            enter_delay_ms: 200,
            entering_ms: 500,
            stagger_ms: 80,
            cleanup_ms: 800,
            pulse_ms: 600,
            scroll_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTask {
    /// First frame after the click: start exit animations
    Frame { stage: String },
    HideCard { card: NodeId },
    EnterCards,
    SettleCard { card: NodeId },
    Cleanup,
    EndPulse { button: NodeId },
    ScrollToSection,
}

#[derive(Debug, Clone)]
pub struct ProcessFilter {
    buttons: Vec<NodeId>,
    cards: Vec<NodeId>,
    grid: NodeId,
    overview: Option<NodeId>,
    section: Option<NodeId>,
    timings: FilterTimings,
    /// Cards matching the stage being filtered to
    visible: Vec<NodeId>,
}

impl ProcessFilter {
    /// `None` when the page has no stage buttons
    pub fn install<D: Document + ?Sized>(doc: &D, timings: FilterTimings) -> Result<Option<Self>> {
        let buttons = doc.elements_by_class(STAGE_BUTTON_CLASS);
        if buttons.is_empty() {
            tracing::debug!("No stage buttons, process filtering disabled");
            return Ok(None);
        }

        let grid = doc
            .first_by_class(GRID_CLASS)
            .ok_or_else(|| PageError::MissingElement(format!(".{}", GRID_CLASS)))?;

        let filter = Self {
            cards: doc.elements_by_class(CARD_CLASS),
            buttons,
            grid,
            overview: doc.first_by_class(OVERVIEW_CLASS),
            section: doc.element_by_id(SECTION_ID),
            timings,
            visible: Vec::new(),
        };

        tracing::debug!(
            buttons = filter.buttons.len(),
            cards = filter.cards.len(),
            "Process filtering installed"
        );

        Ok(Some(filter))
    }

    pub fn is_filtering<D: Document + ?Sized>(&self, doc: &D) -> bool {
        doc.has_class(self.grid, FILTERING_CLASS)
    }

    /// Stage of the active button
    pub fn active_stage<D: Document + ?Sized>(&self, doc: &D) -> Option<String> {
        self.buttons
            .iter()
            .find(|b| doc.is_active(**b))
            .and_then(|b| doc.attribute(*b, STAGE_ATTR))
    }

    /// Route a click. Returns true when it landed on a stage button.
    pub fn handle_click<D, S>(&mut self, doc: &mut D, scheduler: &mut S, node: NodeId) -> bool
    where
        D: Document + ?Sized,
        S: Scheduler<FilterTask> + ?Sized,
    {
        let Some(button) = closest_with_class(doc, node, STAGE_BUTTON_CLASS) else {
            return false;
        };
        if !self.buttons.contains(&button) {
            return false;
        }

        self.filter(doc, scheduler, button);

        if self.section.is_some() {
            scheduler.schedule_after(
                Duration::from_millis(self.timings.scroll_delay_ms),
                FilterTask::ScrollToSection,
            );
        }
        true
    }

    /// Start filtering to `button`'s stage. Returns false if a run is in flight.
    pub fn filter<D, S>(&mut self, doc: &mut D, scheduler: &mut S, button: NodeId) -> bool
    where
        D: Document + ?Sized,
        S: Scheduler<FilterTask> + ?Sized,
    {
        if self.is_filtering(doc) {
            tracing::debug!("Filtering in progress, ignoring stage click");
            return false;
        }

        let stage = doc
            .attribute(button, STAGE_ATTR)
            .unwrap_or_else(|| ALL_STAGES.to_string());

        for b in &self.buttons {
            doc.set_active(*b, false);
            doc.set_style(*b, "transform", "translateY(0)");
        }
        doc.set_active(button, true);
        doc.add_class(self.grid, FILTERING_CLASS);

        if let Some(overview) = self.overview {
            doc.set_style(overview, "opacity", "0.7");
            doc.set_style(overview, "transform", "translateY(-10px)");
        }

        tracing::debug!(stage = %stage, "Filtering process cards");
        scheduler.schedule_next_frame(FilterTask::Frame { stage });
        true
    }

    pub fn handle_task<D, S>(&mut self, doc: &mut D, scheduler: &mut S, task: FilterTask)
    where
        D: Document + ?Sized,
        S: Scheduler<FilterTask> + ?Sized,
    {
        match task {
            FilterTask::Frame { stage } => {
                let exit = Duration::from_millis(self.timings.exit_ms);
                self.visible.clear();
                for card in &self.cards {
                    if card_matches(doc, *card, &stage) {
                        self.visible.push(*card);
                    } else {
                        doc.add_class(*card, EXITING_CLASS);
                        scheduler.schedule_after(exit, FilterTask::HideCard { card: *card });
                    }
                }

                scheduler.schedule_after(
                    Duration::from_millis(self.timings.enter_delay_ms),
                    FilterTask::EnterCards,
                );
                scheduler.schedule_after(
                    Duration::from_millis(self.timings.cleanup_ms),
                    FilterTask::Cleanup,
                );
            }
            FilterTask::HideCard { card } => {
                doc.set_style(card, "display", "none");
                doc.remove_class(card, EXITING_CLASS);
            }
            FilterTask::EnterCards => {
                for (index, card) in self.visible.iter().enumerate() {
                    doc.set_style(*card, "display", "block");
                    doc.add_class(*card, ENTERING_CLASS);
                    let delay = self.timings.entering_ms + index as u64 * self.timings.stagger_ms;
                    scheduler.schedule_after(
                        Duration::from_millis(delay),
                        FilterTask::SettleCard { card: *card },
                    );
                }
            }
            FilterTask::SettleCard { card } => {
                doc.remove_class(card, ENTERING_CLASS);
            }
            FilterTask::Cleanup => {
                doc.remove_class(self.grid, FILTERING_CLASS);

                if let Some(overview) = self.overview {
                    doc.set_style(overview, "opacity", "1");
                    doc.set_style(overview, "transform", "translateY(0)");
                }

                if let Some(button) = self.buttons.iter().copied().find(|b| doc.is_active(*b)) {
                    let animation =
                        format!("pulse {} ease-out", css_seconds(self.timings.pulse_ms));
                    doc.set_style(button, "animation", &animation);
                    scheduler.schedule_after(
                        Duration::from_millis(self.timings.pulse_ms),
                        FilterTask::EndPulse { button },
                    );
                }

                tracing::debug!(visible = self.visible.len(), "Process filtering finished");
            }
            FilterTask::EndPulse { button } => {
                doc.set_style(button, "animation", "");
            }
            FilterTask::ScrollToSection => {
                if let Some(section) = self.section {
                    doc.scroll_into_view(section, ScrollBehavior::Smooth);
                }
            }
        }
    }
}

fn card_matches<D: Document + ?Sized>(doc: &D, card: NodeId, stage: &str) -> bool {
    stage == ALL_STAGES || doc.attribute(card, STAGE_ATTR).as_deref() == Some(stage)
}
