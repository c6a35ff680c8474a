//! Dashboard page state container
//!
//! Owns the document, the timer queue and every page component. Hosts feed it
//! `PageEvent`s and advance its clock; nothing else mutates the document.

use std::time::Duration;

use dashboard_dom::{Document, IntersectionEntry, Key, NodeId, Viewport};
use dashboard_page::{
    Anchors, FilterTask, HoverLift, Modal, PerfTask, Performance, ProcessFilter, Responsive,
    ResponsiveTask, ScrollReveal,
};
use dashboard_tabs::{StickyHeader, SwitchOutcome, TabController, TabDiagnostic, TabTask};
use dashboard_timers::TimerQueue;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::Result;

/// Deferred work of any page component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTask {
    Tab(TabTask),
    Filter(FilterTask),
    Responsive(ResponsiveTask),
    Perf(PerfTask),
}

impl From<TabTask> for PageTask {
    fn from(task: TabTask) -> Self {
        PageTask::Tab(task)
    }
}

impl From<FilterTask> for PageTask {
    fn from(task: FilterTask) -> Self {
        PageTask::Filter(task)
    }
}

impl From<ResponsiveTask> for PageTask {
    fn from(task: ResponsiveTask) -> Self {
        PageTask::Responsive(task)
    }
}

impl From<PerfTask> for PageTask {
    fn from(task: PerfTask) -> Self {
        PageTask::Perf(task)
    }
}

/// Input reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    Click { target: NodeId },
    /// `target` is the focused element, if any
    KeyDown { target: Option<NodeId>, key: Key },
    MouseEnter { target: NodeId },
    MouseLeave { target: NodeId },
    Intersection { entries: Vec<IntersectionEntry> },
    Resize,
    Scroll,
    Load { elapsed_ms: u64 },
}

pub struct Dashboard<D> {
    doc: D,
    timers: TimerQueue<PageTask>,
    config: Config,
    tabs: Option<TabController>,
    sticky: Option<StickyHeader>,
    filter: Option<ProcessFilter>,
    modal: Option<Modal>,
    reveal: ScrollReveal,
    hover: HoverLift,
    anchors: Option<Anchors>,
    responsive: Responsive,
    perf: Option<Performance>,
}

impl<D: Document + Viewport> Dashboard<D> {
    /// Wire every component up against `doc`.
    ///
    /// Only an invalid `config` is an error. A component whose markup is
    /// broken is logged and left out; the rest of the page keeps working.
    pub fn new(mut doc: D, config: Config) -> Result<Self> {
        config.validate()?;
        let mut timers: TimerQueue<PageTask> =
            TimerQueue::with_frame_interval(config.frame_interval());

        let perf = Performance::install(&mut doc, config.perf_resize_debounce())
            .map_err(|e| tracing::error!(error = %e, "Performance helpers disabled"))
            .ok();

        let tabs = match TabController::from_document(&mut doc, &mut timers, config.tabs) {
            Ok(controller) => {
                controller.verify_expected(&doc, &config.expected_tabs);
                Some(controller)
            }
            Err(e) => {
                tracing::error!(error = %e, "Tab navigation disabled");
                None
            }
        };
        let sticky = StickyHeader::install(&mut doc)
            .map_err(|e| tracing::error!(error = %e, "Sticky header disabled"))
            .ok()
            .flatten();

        let filter = ProcessFilter::install(&doc, config.filter)
            .map_err(|e| tracing::error!(error = %e, "Process filtering disabled"))
            .ok()
            .flatten();

        let modal = Modal::install(&doc)
            .map_err(|e| tracing::error!(error = %e, "Card modal disabled"))
            .ok()
            .flatten();

        let reveal = ScrollReveal::install(&mut doc, &config.reveal);
        let anchors = Anchors::parse(&config.base_url)
            .map_err(|e| tracing::error!(error = %e, "Anchor scrolling disabled"))
            .ok();
        let hover = HoverLift::install(&doc);

        let responsive = Responsive::install(&mut doc, config.responsive);

        tracing::info!(
            tabs = tabs.is_some(),
            filter = filter.is_some(),
            modal = modal.is_some(),
            "Dashboard initialized"
        );

        Ok(Self {
            doc,
            timers,
            config,
            tabs,
            sticky,
            filter,
            modal,
            reveal,
            hover,
            anchors,
            responsive,
            perf,
        })
    }

    /// Route one host event. Returns true when a component consumed it.
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        match event {
            PageEvent::Click { target } => self.click(target),
            PageEvent::KeyDown { target, key } => self.key_down(target, &key),
            PageEvent::MouseEnter { target } => self.hover.on_enter(&mut self.doc, target),
            PageEvent::MouseLeave { target } => self.hover.on_leave(&mut self.doc, target),
            PageEvent::Intersection { entries } => {
                let mut handled = false;
                for entry in &entries {
                    handled |= self.intersection(entry);
                }
                handled
            }
            PageEvent::Resize => {
                self.responsive.on_resize(&mut self.timers);
                if let Some(perf) = self.perf.as_mut() {
                    perf.on_resize(&mut self.timers);
                }
                true
            }
            PageEvent::Scroll => match self.perf.as_mut() {
                Some(perf) => perf.on_scroll(&mut self.timers),
                None => false,
            },
            PageEvent::Load { elapsed_ms } => match self.perf.as_ref() {
                Some(perf) => {
                    perf.on_load(Duration::from_millis(elapsed_ms));
                    true
                }
                None => false,
            },
        }
    }

    /// Advance the clock by `dt`, running every component task that falls due.
    /// Returns the number of tasks run.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let Self {
            doc,
            timers,
            tabs,
            filter,
            responsive,
            perf,
            ..
        } = self;

        timers.advance(dt, |queue, task| match task {
            PageTask::Tab(task) => {
                if let Some(tabs) = tabs.as_mut() {
                    if let Err(e) = tabs.handle_task(doc, queue, task) {
                        tracing::warn!(error = %e, "Tab task dropped");
                    }
                }
            }
            PageTask::Filter(task) => {
                if let Some(filter) = filter.as_mut() {
                    filter.handle_task(doc, queue, task);
                }
            }
            PageTask::Responsive(task) => responsive.handle_task(doc, queue, task),
            PageTask::Perf(task) => {
                if let Some(perf) = perf.as_mut() {
                    perf.handle_task(task);
                }
            }
        })
    }

    pub fn switch_to(&mut self, target_id: &str) -> Option<SwitchOutcome> {
        let tabs = self.tabs.as_mut()?;
        Some(tabs.switch_to(&mut self.doc, &mut self.timers, target_id))
    }

    pub fn focus_next(&mut self) -> Option<String> {
        let tabs = self.tabs.as_mut()?;
        Some(tabs.focus_next(&mut self.doc, &mut self.timers))
    }

    pub fn focus_previous(&mut self) -> Option<String> {
        let tabs = self.tabs.as_mut()?;
        Some(tabs.focus_previous(&mut self.doc, &mut self.timers))
    }

    pub fn list_configured_tabs(&self) -> Vec<TabDiagnostic> {
        self.tabs
            .as_ref()
            .map(|tabs| tabs.list_configured_tabs(&self.doc))
            .unwrap_or_default()
    }

    /// Log the tab configuration and click the first inactive tab
    pub fn smoke_test(&mut self) -> Option<SwitchOutcome> {
        let diagnostics = self.list_configured_tabs();
        tracing::info!(count = diagnostics.len(), "Testing tab navigation");
        for d in &diagnostics {
            tracing::info!(
                index = d.index,
                tab = %d.target,
                panel_resolved = d.panel_resolved,
                "Configured tab"
            );
        }

        let tabs = self.tabs.as_mut()?;
        let node = tabs.tabs().iter().find(|t| !t.active)?.node;
        tracing::info!(node = %node, "Testing click on first inactive tab");
        tabs.handle_click(&mut self.doc, &mut self.timers, node)
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tabs(&self) -> Option<&TabController> {
        self.tabs.as_ref()
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Deadline of the next pending task
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_idle()
    }

    fn click(&mut self, target: NodeId) -> bool {
        let mut handled = false;

        if let Some(tabs) = self.tabs.as_mut() {
            handled |= tabs
                .handle_click(&mut self.doc, &mut self.timers, target)
                .is_some();
        }
        if let Some(filter) = self.filter.as_mut() {
            handled |= filter.handle_click(&mut self.doc, &mut self.timers, target);
        }
        if let Some(modal) = self.modal.as_ref() {
            handled |= modal.handle_click(&mut self.doc, target);
        }
        if let Some(anchors) = self.anchors.as_ref() {
            handled |= anchors.handle_click(&mut self.doc, target);
        }

        handled
    }

    fn key_down(&mut self, target: Option<NodeId>, key: &Key) -> bool {
        let mut handled = false;

        if let Some(modal) = self.modal.as_ref() {
            handled |= modal.handle_key(&mut self.doc, key);
        }
        if let (Some(tabs), Some(target)) = (self.tabs.as_mut(), target) {
            handled |= tabs.handle_key(&mut self.doc, &mut self.timers, target, key);
        }

        handled
    }

    fn intersection(&mut self, entry: &IntersectionEntry) -> bool {
        if let Some(sticky) = self.sticky.as_mut() {
            if sticky.on_intersection(&mut self.doc, entry) {
                return true;
            }
        }
        self.reveal.on_intersection(&mut self.doc, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_dom::{DocumentSpec, MemoryDocument};
    use dashboard_tabs::{IgnoreReason, TransitionState};
    use dashboard_timers::ms;
    use serde_json::json;

    fn page() -> MemoryDocument {
        let spec = DocumentSpec::from_value(json!({
            "viewport_width": 1280,
            "body": [
                { "tag": "nav", "classes": ["nav-wrapper"], "children": [
                    { "classes": ["nav-tabs"], "children": [
                        { "tag": "button", "classes": ["nav-tab", "active"],
                          "attributes": { "data-tab": "overview" }, "text": "Overview" },
                        { "tag": "button", "classes": ["nav-tab"],
                          "attributes": { "data-tab": "process" }, "text": "Process" },
                        { "tag": "button", "classes": ["nav-tab"],
                          "attributes": { "data-tab": "matrix" }, "text": "Matrix" }
                    ]}
                ]},
                { "tag": "section", "id": "overview", "classes": ["tab-content", "active"],
                  "children": [
                    { "classes": ["stat-card"] },
                    { "tag": "a", "attributes": { "href": "#matrix" }, "text": "Jump" }
                ]},
                { "tag": "section", "id": "process", "classes": ["tab-content"], "children": [
                    { "tag": "button", "classes": ["stage-btn", "active"],
                      "attributes": { "data-stage": "all" } },
                    { "tag": "button", "classes": ["stage-btn"],
                      "attributes": { "data-stage": "capture" } },
                    { "classes": ["process-grid"], "children": [
                        { "classes": ["process-card"], "attributes": { "data-stage": "capture" },
                          "children": [
                            { "tag": "h3", "classes": ["process-title"], "text": "Capture" },
                            { "tag": "p", "classes": ["process-description"],
                              "text": "Collects signals" }
                        ]}
                    ]}
                ]},
                { "tag": "section", "id": "matrix", "classes": ["tab-content"] },
                { "id": "modal", "children": [
                    { "tag": "button", "id": "modal-close" },
                    { "id": "modal-title" },
                    { "id": "modal-body" }
                ]}
            ]
        }))
        .unwrap();
        MemoryDocument::from_spec(&spec)
    }

    fn dashboard() -> Dashboard<MemoryDocument> {
        Dashboard::new(page(), Config::default()).unwrap()
    }

    fn active_tab(dashboard: &Dashboard<MemoryDocument>) -> String {
        dashboard.tabs().unwrap().active_tab().unwrap().target.clone()
    }

    #[test]
    fn test_new_wires_components() {
        let dashboard = dashboard();
        let doc = dashboard.document();

        assert_eq!(active_tab(&dashboard), "overview");
        assert!(dashboard.is_idle());

        let card = doc.first_by_class("stat-card").unwrap();
        assert_eq!(doc.style(card, "opacity").as_deref(), Some("0"));
        assert!(doc.has_class(card, "fade-in-up"));
        assert_eq!(dashboard.list_configured_tabs().len(), 3);
    }

    #[test]
    fn test_tab_click_crossfades() {
        let mut dashboard = dashboard();
        let matrix_tab = dashboard.document().find_by_attribute("data-tab", "matrix").unwrap();

        assert!(dashboard.dispatch(PageEvent::Click { target: matrix_tab }));
        assert_eq!(dashboard.tabs().unwrap().state(), TransitionState::FadingOut);

        dashboard.advance(ms(350));
        assert_eq!(dashboard.tabs().unwrap().state(), TransitionState::Idle);
        assert_eq!(active_tab(&dashboard), "matrix");
        let doc = dashboard.document();
        assert!(doc.is_active(doc.element_by_id("matrix").unwrap()));
        assert!(!doc.is_active(doc.element_by_id("overview").unwrap()));

        assert_eq!(
            dashboard.switch_to("matrix"),
            Some(SwitchOutcome::Ignored(IgnoreReason::AlreadyActive))
        );
    }

    #[test]
    fn test_keyboard_navigation() {
        let mut dashboard = dashboard();
        let overview_tab = dashboard.document().find_by_attribute("data-tab", "overview").unwrap();

        let consumed = dashboard.dispatch(PageEvent::KeyDown {
            target: Some(overview_tab),
            key: Key::ArrowLeft,
        });
        assert!(consumed);
        assert_eq!(active_tab(&dashboard), "matrix");

        dashboard.advance(ms(350));
        assert_eq!(dashboard.focus_next().as_deref(), Some("tab-overview"));
    }

    #[test]
    fn test_filter_and_modal_share_click_stream() {
        let mut dashboard = dashboard();
        let doc = dashboard.document();
        let capture = doc.find_by_attribute("data-stage", "capture").unwrap();
        let card = doc.first_by_class("process-card").unwrap();
        let modal = doc.element_by_id("modal").unwrap();

        assert!(dashboard.dispatch(PageEvent::Click { target: capture }));
        dashboard.advance(ms(2000));
        assert!(dashboard.is_idle());
        let grid = dashboard.document().first_by_class("process-grid").unwrap();
        assert!(!dashboard.document().has_class(grid, "filtering"));

        assert!(dashboard.dispatch(PageEvent::Click { target: card }));
        assert!(dashboard.document().is_active(modal));

        assert!(dashboard.dispatch(PageEvent::KeyDown {
            target: None,
            key: Key::Escape
        }));
        assert!(!dashboard.document().is_active(modal));
    }

    #[test]
    fn test_intersection_routing() {
        let mut dashboard = dashboard();
        let doc = dashboard.document();
        let wrapper = doc.first_by_class("nav-wrapper").unwrap();
        let sentinel = doc.parent(wrapper).map(|body| doc.children(body)[0]).unwrap();
        let card = doc.first_by_class("stat-card").unwrap();

        assert!(dashboard.dispatch(PageEvent::Intersection {
            entries: vec![
                IntersectionEntry { target: sentinel, is_intersecting: false },
                IntersectionEntry { target: card, is_intersecting: true },
            ],
        }));

        let doc = dashboard.document();
        assert!(doc.has_class(wrapper, "sticky"));
        assert_eq!(doc.style(card, "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn test_anchor_and_scroll_events() {
        let mut dashboard = dashboard();
        let link = dashboard.document().elements_by_tag("a")[0];
        let matrix = dashboard.document().element_by_id("matrix").unwrap();

        assert!(dashboard.dispatch(PageEvent::Click { target: link }));
        assert_eq!(dashboard.document().scroll_log().last().map(|(n, _)| *n), Some(matrix));

        assert!(dashboard.dispatch(PageEvent::Scroll));
        assert!(!dashboard.dispatch(PageEvent::Scroll));
        assert!(dashboard.dispatch(PageEvent::Resize));
        dashboard.advance(ms(500));
        assert!(dashboard.is_idle());
        assert!(dashboard.dispatch(PageEvent::Load { elapsed_ms: 420 }));
    }

    #[test]
    fn test_broken_tabs_degrade() {
        let spec = DocumentSpec::from_value(json!({
            "body": [
                { "tag": "button", "classes": ["nav-tab"], "attributes": { "data-tab": "ghost" } },
                { "classes": ["stat-card"] }
            ]
        }))
        .unwrap();
        let mut dashboard =
            Dashboard::new(MemoryDocument::from_spec(&spec), Config::default()).unwrap();

        assert!(dashboard.tabs().is_none());
        assert!(dashboard.switch_to("ghost").is_none());
        assert!(dashboard.focus_next().is_none());
        assert!(dashboard.list_configured_tabs().is_empty());
        assert!(dashboard.smoke_test().is_none());

        let card = dashboard.document().first_by_class("stat-card").unwrap();
        assert!(dashboard.document().has_class(card, "fade-in-up"));
    }

    #[test]
    fn test_smoke_test_clicks_first_inactive_tab() {
        let mut dashboard = dashboard();
        assert_eq!(dashboard.smoke_test(), Some(SwitchOutcome::Started));
        assert_eq!(active_tab(&dashboard), "process");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            frame_interval_ms: 0,
            ..Config::default()
        };
        assert!(Dashboard::new(page(), config).is_err());
    }

    #[test]
    fn test_event_json() {
        let event: PageEvent =
            serde_json::from_str(r#"{ "type": "key_down", "target": null, "key": "Escape" }"#)
                .unwrap();
        assert_eq!(
            event,
            PageEvent::KeyDown {
                target: None,
                key: Key::Escape
            }
        );
    }
}
