//! Page performance helpers
//!
//! Preloads flagged images, coalesces scroll updates to one per frame and
//! debounces resize updates.

use std::time::Duration;

use dashboard_dom::Document;
use dashboard_timers::{Debouncer, Scheduler};

use crate::Result;

const PRELOAD_ATTR: &str = "data-preload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerfTask {
    ScrollFrame,
    ResizeSettled,
}

#[derive(Debug, Clone)]
pub struct Performance {
    /// A scroll update is already queued for the next frame
    ticking: bool,
    resize: Debouncer,
    updates: u64,
    preloaded: usize,
}

impl Performance {
    /// Append a `<link rel="preload">` to `head` for each `img[data-preload]`
    pub fn install<D: Document + ?Sized>(doc: &mut D, resize_debounce: Duration) -> Result<Self> {
        let head = doc.head();
        let mut preloaded = 0;

        for img in doc.elements_by_tag("img") {
            if doc.attribute(img, PRELOAD_ATTR).is_none() {
                continue;
            }
            let Some(src) = doc.attribute(img, "src") else {
                tracing::debug!(img = %img, "Preload image without src skipped");
                continue;
            };

            let link = doc.create_element("link");
            doc.set_attribute(link, "rel", "preload");
            doc.set_attribute(link, "as", "image");
            doc.set_attribute(link, "href", &src);
            doc.append_child(head, link)?;
            preloaded += 1;
        }

        if preloaded > 0 {
            tracing::debug!(count = preloaded, "Critical images preloaded");
        }

        Ok(Self {
            ticking: false,
            resize: Debouncer::new(resize_debounce),
            updates: 0,
            preloaded,
        })
    }

    /// Queue a scroll update unless one is already waiting for the frame
    pub fn on_scroll<S: Scheduler<PerfTask> + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if self.ticking {
            return false;
        }
        scheduler.schedule_next_frame(PerfTask::ScrollFrame);
        self.ticking = true;
        true
    }

    pub fn on_resize<S: Scheduler<PerfTask> + ?Sized>(&mut self, scheduler: &mut S) {
        self.resize.trigger(scheduler, PerfTask::ResizeSettled);
    }

    pub fn handle_task(&mut self, task: PerfTask) {
        match task {
            PerfTask::ScrollFrame => self.ticking = false,
            PerfTask::ResizeSettled => self.resize.settle(),
        }
        self.updates += 1;
    }

    pub fn on_load(&self, elapsed: Duration) {
        tracing::info!(load_ms = elapsed.as_millis() as u64, "Page load time");
    }

    /// Batched scroll/resize updates run so far
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn preloaded(&self) -> usize {
        self.preloaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_dom::{DocumentSpec, MemoryDocument};
    use dashboard_timers::{ms, TimerQueue};
    use serde_json::json;

    #[test]
    fn test_preload_links() {
        let spec = DocumentSpec::from_value(json!({
            "body": [
                { "tag": "img", "attributes": { "src": "/img/hero.png", "data-preload": "" } },
                { "tag": "img", "attributes": { "src": "/img/lazy.png" } },
                { "tag": "img", "attributes": { "data-preload": "" } }
            ]
        }))
        .unwrap();
        let mut doc = MemoryDocument::from_spec(&spec);

        let perf = Performance::install(&mut doc, ms(100)).unwrap();
        assert_eq!(perf.preloaded(), 1);

        let links = doc.descendants_by_tag(doc.head(), "link");
        assert_eq!(links.len(), 1);
        assert_eq!(doc.attribute(links[0], "rel").as_deref(), Some("preload"));
        assert_eq!(doc.attribute(links[0], "as").as_deref(), Some("image"));
        assert_eq!(doc.attribute(links[0], "href").as_deref(), Some("/img/hero.png"));
    }

    #[test]
    fn test_scroll_coalesced_per_frame() {
        let mut doc = MemoryDocument::new();
        let mut timers: TimerQueue<PerfTask> = TimerQueue::new();
        let mut perf = Performance::install(&mut doc, ms(100)).unwrap();

        assert!(perf.on_scroll(&mut timers));
        assert!(!perf.on_scroll(&mut timers));
        assert!(!perf.on_scroll(&mut timers));
        assert_eq!(timers.pending(), 1);

        timers.advance(ms(16), |_, task| perf.handle_task(task));
        assert_eq!(perf.updates(), 1);
        assert!(perf.on_scroll(&mut timers));
    }

    #[test]
    fn test_resize_debounced() {
        let mut doc = MemoryDocument::new();
        let mut timers: TimerQueue<PerfTask> = TimerQueue::new();
        let mut perf = Performance::install(&mut doc, ms(100)).unwrap();

        perf.on_resize(&mut timers);
        timers.advance(ms(50), |_, task| perf.handle_task(task));
        perf.on_resize(&mut timers);
        timers.advance(ms(99), |_, task| perf.handle_task(task));
        assert_eq!(perf.updates(), 0);

        timers.advance(ms(1), |_, task| perf.handle_task(task));
        assert_eq!(perf.updates(), 1);
    }
}
