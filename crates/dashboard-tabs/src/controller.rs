//! Tab Navigation Controller
//!
//! Switching is split in two halves. The tab strip is updated synchronously.
//! The panels crossfade through scheduled `TabTask`s: the old panel fades
//! out, then is swapped for the new one, which fades in. While a crossfade is
//! in flight every further switch request is dropped.

use std::collections::HashSet;
use std::time::Duration;

use dashboard_dom::{Document, Key, NodeId};
use dashboard_timers::Scheduler;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, TabError};
use crate::state::TransitionState;
use crate::tab::{Panel, Tab};
use crate::{Result, PANEL_CLASS, TAB_CLASS, TAB_TARGET_ATTR};

/// Inline style properties that only exist while a panel is animating
const TRANSITION_STYLES: [&str; 3] = ["transition", "opacity", "transform"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTimings {
    pub fade_out_ms: u64,
    pub fade_in_ms: u64,
}

impl TransitionTimings {
    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    /// Length of a full crossfade
    pub fn total(&self) -> Duration {
        self.fade_out() + self.fade_in()
    }
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            fade_out_ms: 150,
            fade_in_ms: 200,
        }
    }
}

/// Deferred crossfade steps, tagged with the transition they belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabTask {
    FadeOutComplete { transition: u64 },
    FadeInComplete { transition: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The tab strip was updated and a crossfade scheduled
    Started,
    Ignored(IgnoreReason),
}

impl SwitchOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, SwitchOutcome::Started)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Another transition is still in flight
    Busy,
    /// No tab/panel pair matches the requested id
    UnknownTarget,
    AlreadyActive,
}

/// One line of `list_configured_tabs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabDiagnostic {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub target: String,
    /// Whether the target panel element exists in the document
    pub panel_resolved: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingSwitch {
    /// Panel fading out, if one was showing
    from: Option<usize>,
    to: usize,
}

pub struct TabController {
    /// Tabs in keyboard traversal order
    tabs: Vec<Tab>,
    panels: Vec<Panel>,
    state: TransitionState,
    timings: TransitionTimings,
    /// Sequence number of the latest transition
    transition: u64,
    pending: Option<PendingSwitch>,
}

impl TabController {
    /// Read tab and panel declarations from the document
    pub fn discover<D: Document + ?Sized>(doc: &D) -> (Vec<Tab>, Vec<Panel>) {
        let tabs = doc
            .elements_by_class(TAB_CLASS)
            .into_iter()
            .filter_map(|node| {
                let Some(target) = doc.attribute(node, TAB_TARGET_ATTR) else {
                    tracing::warn!(node = %node, "Tab element without {} skipped", TAB_TARGET_ATTR);
                    return None;
                };
                let id = doc
                    .attribute(node, "id")
                    .unwrap_or_else(|| format!("tab-{}", target));
                let label = doc.text_content(node).trim().to_string();
                Some(Tab::new(id, label, target, node).with_active(doc.is_active(node)))
            })
            .collect();

        let panels = doc
            .elements_by_class(PANEL_CLASS)
            .into_iter()
            .filter_map(|node| {
                let Some(id) = doc.attribute(node, "id") else {
                    tracing::warn!(node = %node, "Panel element without id skipped");
                    return None;
                };
                Some(Panel::new(id, node).with_active(doc.is_active(node)))
            })
            .collect();

        (tabs, panels)
    }

    /// Discover declarations and initialize in one go
    pub fn from_document<D, S>(
        doc: &mut D,
        scheduler: &mut S,
        timings: TransitionTimings,
    ) -> Result<Self>
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        let (tabs, panels) = Self::discover(doc);
        Self::initialize(doc, scheduler, tabs, panels, timings)
    }

    /// Validate declarations and bring the document to a single active pair.
    ///
    /// The first tab marked active (or the first tab) wins. If its panel was
    /// not already showing it fades in, skipping the fade-out phase. On error
    /// the document is left untouched.
    pub fn initialize<D, S>(
        doc: &mut D,
        scheduler: &mut S,
        tabs: Vec<Tab>,
        panels: Vec<Panel>,
        timings: TransitionTimings,
    ) -> Result<Self>
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        validate(&tabs, &panels)?;

        let mut controller = Self {
            tabs,
            panels,
            state: TransitionState::Idle,
            timings,
            transition: 0,
            pending: None,
        };

        let initial = controller.tabs.iter().position(|t| t.active).unwrap_or(0);
        let initial_panel = controller
            .panel_index(&controller.tabs[initial].target)
            .ok_or_else(|| TabError::NotFound(controller.tabs[initial].target.clone()))?;

        for index in 0..controller.panels.len() {
            if index != initial_panel {
                controller.hide_panel(doc, index);
            }
        }

        if controller.panels[initial_panel].active {
            controller.select_tab(doc, initial);
            controller.show_panel(doc, initial_panel);
        } else {
            controller.begin(doc, scheduler, initial);
        }

        tracing::info!(
            tabs = controller.tabs.len(),
            panels = controller.panels.len(),
            active = %controller.tabs[initial].target,
            "Tab navigation initialized"
        );

        Ok(controller)
    }

    /// Request activation of the tab/panel pair for `target_id`
    pub fn switch_to<D, S>(
        &mut self,
        doc: &mut D,
        scheduler: &mut S,
        target_id: &str,
    ) -> SwitchOutcome
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        if self.state.is_transitioning() {
            tracing::debug!(
                target_id,
                state = %self.state,
                "Transition in progress, ignoring switch"
            );
            return SwitchOutcome::Ignored(IgnoreReason::Busy);
        }

        let Some(index) = self.tab_index(target_id) else {
            let error = TabError::NotFound(target_id.to_string());
            tracing::warn!(%error, "Tab navigation: no tab or content for target");
            return SwitchOutcome::Ignored(IgnoreReason::UnknownTarget);
        };

        if !self.panel_attached(doc, target_id) {
            let error = TabError::NotFound(target_id.to_string());
            tracing::warn!(%error, "Tab navigation: panel element missing from document");
            return SwitchOutcome::Ignored(IgnoreReason::UnknownTarget);
        }

        if self.tabs[index].active {
            tracing::debug!(target_id, "Tab already active, ignoring");
            return SwitchOutcome::Ignored(IgnoreReason::AlreadyActive);
        }

        self.begin(doc, scheduler, index);
        SwitchOutcome::Started
    }

    /// Complete a crossfade phase
    pub fn handle_task<D, S>(&mut self, doc: &mut D, scheduler: &mut S, task: TabTask) -> Result<()>
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        match task {
            TabTask::FadeOutComplete { transition } => {
                self.check_current(transition)?;
                let pending = self.pending_switch(TransitionState::FadingIn)?;
                self.enter(TransitionState::FadingIn)?;

                if let Some(from) = pending.from {
                    self.hide_panel(doc, from);
                }
                self.fade_in(doc, scheduler, pending.to);
                Ok(())
            }
            TabTask::FadeInComplete { transition } => {
                self.check_current(transition)?;
                let pending = self.pending_switch(TransitionState::Idle)?;
                self.enter(TransitionState::Idle)?;

                clear_transition_styles(doc, self.panels[pending.to].node);
                self.pending = None;

                tracing::info!(panel = %self.panels[pending.to].id, "Tab transition completed");
                Ok(())
            }
        }
    }

    /// Move focus to the next tab (wrapping) and switch to it
    pub fn focus_next<D, S>(&mut self, doc: &mut D, scheduler: &mut S) -> String
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        self.focus_step(doc, scheduler, None, true)
    }

    /// Move focus to the previous tab (wrapping) and switch to it
    pub fn focus_previous<D, S>(&mut self, doc: &mut D, scheduler: &mut S) -> String
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        self.focus_step(doc, scheduler, None, false)
    }

    /// Keyboard handling for a key pressed on `node`.
    /// Returns true when the key was consumed.
    pub fn handle_key<D, S>(
        &mut self,
        doc: &mut D,
        scheduler: &mut S,
        node: NodeId,
        key: &Key,
    ) -> bool
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        let Some(index) = self.tab_index_for_node(doc, node) else {
            return false;
        };

        match key {
            key if key.is_activation() => {
                let target = self.tabs[index].target.clone();
                self.switch_to(doc, scheduler, &target);
                true
            }
            Key::ArrowRight => {
                self.focus_step(doc, scheduler, Some(index), true);
                true
            }
            Key::ArrowLeft => {
                self.focus_step(doc, scheduler, Some(index), false);
                true
            }
            _ => false,
        }
    }

    /// Click on `node` or anything inside a tab. `None` if no tab was hit.
    pub fn handle_click<D, S>(
        &mut self,
        doc: &mut D,
        scheduler: &mut S,
        node: NodeId,
    ) -> Option<SwitchOutcome>
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        let index = self.tab_index_for_node(doc, node)?;
        let target = self.tabs[index].target.clone();
        tracing::debug!(target = %target, "Tab clicked");
        Some(self.switch_to(doc, scheduler, &target))
    }

    pub fn list_configured_tabs<D: Document + ?Sized>(&self, doc: &D) -> Vec<TabDiagnostic> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| TabDiagnostic {
                index,
                id: tab.id.clone(),
                label: tab.display_label().to_string(),
                target: tab.target.clone(),
                panel_resolved: self.panel_attached(doc, &tab.target),
                active: tab.active,
            })
            .collect()
    }

    /// Expected ids lacking either a tab or a panel element
    pub fn verify_expected<D: Document + ?Sized>(
        &self,
        doc: &D,
        expected: &[String],
    ) -> Vec<String> {
        let missing: Vec<String> = expected
            .iter()
            .filter(|id| self.tab_index(id).is_none() || !self.panel_attached(doc, id))
            .cloned()
            .collect();

        if missing.is_empty() {
            tracing::info!(count = expected.len(), "Tab navigation: all expected tabs configured");
        } else {
            tracing::warn!(missing = ?missing, "Tab navigation: missing tabs or content");
        }

        missing
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn timings(&self) -> TransitionTimings {
        self.timings
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    pub fn active_panel(&self) -> Option<&Panel> {
        self.panels.iter().find(|p| p.active)
    }

    fn tab_index(&self, target_id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| t.target == target_id)
    }

    fn panel_index(&self, id: &str) -> Option<usize> {
        self.panels.iter().position(|p| p.id == id)
    }

    /// Whether the panel record for `id` is still part of the page body
    fn panel_attached<D: Document + ?Sized>(&self, doc: &D, id: &str) -> bool {
        let Some(index) = self.panel_index(id) else {
            return false;
        };
        let body = doc.body();
        let mut current = Some(self.panels[index].node);
        while let Some(n) = current {
            if n == body {
                return true;
            }
            current = doc.parent(n);
        }
        false
    }

    /// Tab owning `node`, looking through ancestors for clicks on inner content
    fn tab_index_for_node<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> Option<usize> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(index) = self.tabs.iter().position(|t| t.node == n) {
                return Some(index);
            }
            current = doc.parent(n);
        }
        None
    }

    fn focus_step<D, S>(
        &mut self,
        doc: &mut D,
        scheduler: &mut S,
        from: Option<usize>,
        forward: bool,
    ) -> String
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        let count = self.tabs.len();
        let current = from
            .or_else(|| doc.focused().and_then(|n| self.tab_index_for_node(doc, n)))
            .or_else(|| self.tabs.iter().position(|t| t.active))
            .unwrap_or(0);

        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };

        let target = self.tabs[next].target.clone();
        self.switch_to(doc, scheduler, &target);
        doc.focus(self.tabs[next].node);

        self.tabs[next].id.clone()
    }

    /// Start a transition towards tab `index`; callers have checked `Idle`
    fn begin<D, S>(&mut self, doc: &mut D, scheduler: &mut S, index: usize)
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        let Some(to) = self.panel_index(&self.tabs[index].target) else {
            return;
        };

        self.select_tab(doc, index);
        self.transition += 1;

        let current = self.panels.iter().position(|p| p.active).filter(|c| *c != to);
        self.pending = Some(PendingSwitch { from: current, to });

        tracing::debug!(
            transition = self.transition,
            from = ?current.map(|c| self.panels[c].id.as_str()),
            to = %self.panels[to].id,
            "Starting tab transition"
        );

        match current {
            Some(from) => {
                self.state = TransitionState::FadingOut;
                let node = self.panels[from].node;
                let ms = self.timings.fade_out_ms;
                doc.set_style(node, "transition", &transition_style(ms));
                doc.set_style(node, "opacity", "0");
                doc.set_style(node, "transform", "translateY(-4px)");
                scheduler.schedule_after(
                    self.timings.fade_out(),
                    TabTask::FadeOutComplete {
                        transition: self.transition,
                    },
                );
            }
            None => {
                self.state = TransitionState::FadingIn;
                self.fade_in(doc, scheduler, to);
            }
        }
    }

    fn fade_in<D, S>(&mut self, doc: &mut D, scheduler: &mut S, panel: usize)
    where
        D: Document + ?Sized,
        S: Scheduler<TabTask> + ?Sized,
    {
        self.show_panel(doc, panel);

        let node = self.panels[panel].node;
        let ms = self.timings.fade_in_ms;
        doc.set_style(node, "transition", &transition_style(ms));
        doc.set_style(node, "opacity", "1");
        doc.set_style(node, "transform", "translateY(0)");

        scheduler.schedule_after(
            self.timings.fade_in(),
            TabTask::FadeInComplete {
                transition: self.transition,
            },
        );
    }

    /// Mark exactly one tab selected, including its ARIA state
    fn select_tab<D: Document + ?Sized>(&mut self, doc: &mut D, index: usize) {
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            let selected = i == index;
            tab.active = selected;
            doc.set_active(tab.node, selected);
            doc.set_attribute(tab.node, "aria-selected", if selected { "true" } else { "false" });
            doc.set_attribute(tab.node, "tabindex", if selected { "0" } else { "-1" });
        }
    }

    fn show_panel<D: Document + ?Sized>(&mut self, doc: &mut D, index: usize) {
        let panel = &mut self.panels[index];
        panel.active = true;
        doc.set_active(panel.node, true);
        doc.set_attribute(panel.node, "aria-hidden", "false");
    }

    fn hide_panel<D: Document + ?Sized>(&mut self, doc: &mut D, index: usize) {
        let panel = &mut self.panels[index];
        panel.active = false;
        doc.set_active(panel.node, false);
        doc.set_attribute(panel.node, "aria-hidden", "true");
        clear_transition_styles(doc, panel.node);
    }

    fn enter(&mut self, next: TransitionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(TabError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    fn check_current(&self, transition: u64) -> Result<()> {
        if transition != self.transition {
            return Err(TabError::StaleTask {
                got: transition,
                current: self.transition,
            });
        }
        Ok(())
    }

    fn pending_switch(&self, next: TransitionState) -> Result<PendingSwitch> {
        self.pending.ok_or_else(|| TabError::InvalidTransition {
            from: self.state.to_string(),
            to: next.to_string(),
        })
    }
}

fn validate(tabs: &[Tab], panels: &[Panel]) -> std::result::Result<(), ConfigurationError> {
    if tabs.is_empty() {
        return Err(ConfigurationError::NoTabs);
    }

    let mut panel_ids = HashSet::new();
    for panel in panels {
        if !panel_ids.insert(panel.id.as_str()) {
            return Err(ConfigurationError::DuplicatePanel(panel.id.clone()));
        }
    }

    let mut targets = HashSet::new();
    for tab in tabs {
        if !targets.insert(tab.target.as_str()) {
            return Err(ConfigurationError::DuplicateTarget(tab.target.clone()));
        }
        if !panel_ids.contains(tab.target.as_str()) {
            return Err(ConfigurationError::MissingPanel {
                tab: tab.id.clone(),
                target: tab.target.clone(),
            });
        }
    }

    Ok(())
}

fn transition_style(ms: u64) -> String {
    format!("opacity {ms}ms ease-out, transform {ms}ms ease-out")
}

fn clear_transition_styles<D: Document + ?Sized>(doc: &mut D, node: NodeId) {
    for property in TRANSITION_STYLES {
        doc.set_style(node, property, "");
    }
}
