//! Lazy observation engine
//!
//! Owns the elements that still wait for their upgrade and decides when each
//! one is upgraded. Every element moves from pending to upgraded exactly
//! once; there is no way back.
//!
//! Two strategies:
//!
//! - **Intersection**: one shared observer with a root margin around the
//!   viewport. A reported element is unobserved and removed from the pending
//!   set before it is upgraded, so a second report for the same element finds
//!   nothing to do. A resize observer on the document element re-registers
//!   pending elements when the viewport size changes, because observers do not
//!   recompute their margin box on resize.
//! - **Polling**: passive scroll, resize, orientation and visibility
//!   listeners request at most one scan per frame. A scan upgrades every
//!   pending element within the buffered viewport. Once nothing is pending
//!   the listeners are removed.

use super::descriptor::{ElementKind, PLACEHOLDER_ATTRIBUTES};
use super::upgrade::UpgradeDispatcher;
use crate::config::EngineSettings;
use crate::dom::{Document, NodeId, Viewport};
use crate::page::PageContext;
use crate::platform::{
    Capabilities, EventType, IntersectionEntry, IntersectionObserver, IntersectionObserverInit,
    ListenerId, ListenerOptions, ResizeEntry, ResizeObserver, Resume, Subscriber, Task,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Events the polling strategy listens to
const FALLBACK_EVENTS: [EventType; 4] = [
    EventType::Scroll,
    EventType::Resize,
    EventType::OrientationChange,
    EventType::VisibilityChange,
];

/// Ordered set of elements waiting for their upgrade
#[derive(Debug, Default, Clone)]
pub struct PendingSet {
    order: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element. Returns false if it was already pending.
    pub fn insert(&mut self, node: NodeId) -> bool {
        if !self.members.insert(node) {
            return false;
        }
        self.order.push(node);
        true
    }

    /// Remove an element. Returns true only for the call that removed it.
    pub fn take(&mut self, node: NodeId) -> bool {
        if !self.members.remove(&node) {
            return false;
        }
        self.order.retain(|n| *n != node);
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// Pending elements in document order at the time they were collected
    pub fn snapshot(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Which observation strategy the engine picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Intersection,
    Polling,
}

#[derive(Debug)]
struct IntersectionState {
    observer: IntersectionObserver,
    resize: Option<ResizeObserver>,
}

#[derive(Debug)]
struct PollingState {
    listeners: Vec<(EventType, ListenerId)>,
    frame_requested: bool,
}

#[derive(Debug)]
enum Strategy {
    Intersection(IntersectionState),
    Polling(PollingState),
}

/// Counters describing what the engine has done so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Elements collected at setup
    pub collected: usize,
    pub upgraded: usize,
    pub upgraded_by_kind: BTreeMap<&'static str, usize>,
    /// Elements dropped because they left the document while pending
    pub dropped: usize,
    /// Polling scans run
    pub scans: usize,
    /// Re-registrations after viewport size changes
    pub reobserved: usize,
}

/// The lazy observation engine
#[derive(Debug)]
pub struct LazyEngine {
    settings: EngineSettings,
    dispatcher: UpgradeDispatcher,
    pending: PendingSet,
    strategy: Option<Strategy>,
    stats: EngineStats,
}

impl LazyEngine {
    pub fn new(settings: EngineSettings, capabilities: Capabilities) -> Self {
        Self {
            settings,
            dispatcher: UpgradeDispatcher::new(capabilities),
            pending: PendingSet::new(),
            strategy: None,
            stats: EngineStats::default(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn strategy(&self) -> Option<StrategyKind> {
        self.strategy.as_ref().map(|s| match s {
            Strategy::Intersection(_) => StrategyKind::Intersection,
            Strategy::Polling(_) => StrategyKind::Polling,
        })
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, node: NodeId) -> bool {
        self.pending.contains(node)
    }

    /// Whether the shared intersection observer currently watches `node`
    pub fn is_observing(&self, node: NodeId) -> bool {
        match &self.strategy {
            Some(Strategy::Intersection(state)) => state.observer.is_observing(node),
            _ => false,
        }
    }

    /// Set up has run and nothing is pending any more
    pub fn is_complete(&self) -> bool {
        self.strategy.is_some() && self.pending.is_empty()
    }

    /// Collect candidates and start the strategy the platform supports.
    /// Only the first call has an effect.
    pub fn setup(&mut self, ctx: &mut PageContext<'_>) {
        if self.strategy.is_some() {
            return;
        }

        for node in collect_candidates(ctx.document) {
            self.pending.insert(node);
        }
        self.stats.collected = self.pending.len();

        if ctx.capabilities.intersection_observer {
            let mut observer = IntersectionObserver::new(IntersectionObserverInit {
                root_margin: self.settings.root_margin,
                threshold: self.settings.threshold,
            });
            for node in self.pending.snapshot() {
                observer.observe(node);
            }
            let resize = if ctx.capabilities.resize_observer {
                ctx.document
                    .document_element()
                    .map(|root| ResizeObserver::observe(root, ctx.viewport.size()))
            } else {
                None
            };
            log::debug!(
                "observing {} elements with a {}px root margin",
                self.pending.len(),
                self.settings.root_margin
            );
            self.strategy = Some(Strategy::Intersection(IntersectionState { observer, resize }));
        } else {
            let listeners = FALLBACK_EVENTS
                .iter()
                .map(|event| {
                    let id = ctx.listeners.add_listener(
                        *event,
                        Subscriber::LazyFallback,
                        ListenerOptions::passive(),
                    );
                    (*event, id)
                })
                .collect();
            log::debug!(
                "polling {} elements with a {}px buffer",
                self.pending.len(),
                self.settings.scan_buffer
            );
            self.strategy = Some(Strategy::Polling(PollingState {
                listeners,
                frame_requested: false,
            }));
            // Some elements are in view before anything scrolls
            self.scan(ctx);
        }
    }

    /// Reports the shared observer has for the current layout and viewport
    pub fn take_intersection_records(
        &mut self,
        document: &Document,
        viewport: &Viewport,
    ) -> Vec<IntersectionEntry> {
        match &mut self.strategy {
            Some(Strategy::Intersection(state)) => state.observer.take_records(document, viewport),
            _ => Vec::new(),
        }
    }

    /// Upgrade every reported element that intersects the margin box
    pub fn handle_intersections(&mut self, ctx: &mut PageContext<'_>, entries: &[IntersectionEntry]) {
        let Some(Strategy::Intersection(state)) = &mut self.strategy else {
            return;
        };

        let mut due = Vec::new();
        for entry in entries {
            if !entry.is_intersecting && entry.intersection_ratio <= 0.0 {
                continue;
            }
            // Unobserve first: a later batch may report this element again
            state.observer.unobserve(entry.target);
            due.push(entry.target);
        }

        for node in due {
            self.trigger(ctx, node);
        }
        self.finish_if_done();
    }

    /// A size report for the document element, if its size changed
    pub fn take_resize_record(&mut self, viewport: &Viewport) -> Option<ResizeEntry> {
        match &mut self.strategy {
            Some(Strategy::Intersection(IntersectionState {
                resize: Some(resize),
                ..
            })) => resize.take_record(viewport.size()),
            _ => None,
        }
    }

    /// Re-register every pending element so the observer recomputes its
    /// margin box against the new viewport size
    pub fn handle_resize(&mut self, ctx: &mut PageContext<'_>, entry: &ResizeEntry) {
        let Some(Strategy::Intersection(state)) = &mut self.strategy else {
            return;
        };

        log::debug!("viewport resized to {}x{}, re-observing", entry.width, entry.height);
        for node in self.pending.snapshot() {
            state.observer.unobserve(node);
            if ctx.document.is_connected(node) {
                state.observer.observe(node);
                self.stats.reobserved += 1;
            } else if self.pending.take(node) {
                self.stats.dropped += 1;
            }
        }
        self.finish_if_done();
    }

    /// A page notification reached the polling listeners
    pub fn handle_event(&mut self, ctx: &mut PageContext<'_>, event: EventType) {
        let Some(Strategy::Polling(state)) = &mut self.strategy else {
            return;
        };
        if state.frame_requested {
            return;
        }
        log::trace!("{} requested a scan", event.as_str());
        state.frame_requested = true;
        ctx.scheduler.schedule(Task::FallbackScan, Resume::NextFrame);
    }

    /// The frame-coalesced scan requested by [`LazyEngine::handle_event`]
    pub fn run_scheduled_scan(&mut self, ctx: &mut PageContext<'_>) {
        if let Some(Strategy::Polling(state)) = &mut self.strategy {
            state.frame_requested = false;
            self.scan(ctx);
        }
    }

    /// Upgrade every pending element within the buffered viewport
    fn scan(&mut self, ctx: &mut PageContext<'_>) {
        self.stats.scans += 1;
        let area = ctx.viewport.rect().expand(self.settings.scan_buffer);

        for node in self.pending.snapshot() {
            if !ctx.document.is_connected(node) {
                if self.pending.take(node) {
                    self.stats.dropped += 1;
                }
                continue;
            }
            let in_range = ctx
                .document
                .bounding_rect(node)
                .is_some_and(|rect| rect.touches(&area));
            if in_range {
                self.trigger(ctx, node);
            }
        }

        if self.pending.is_empty() {
            self.teardown_polling(ctx);
        }
    }

    fn teardown_polling(&mut self, ctx: &mut PageContext<'_>) {
        if let Some(Strategy::Polling(state)) = &mut self.strategy {
            for (event, id) in state.listeners.drain(..) {
                ctx.listeners.remove_listener(event, id);
            }
            log::debug!("all lazy elements upgraded, polling listeners removed");
        }
    }

    fn finish_if_done(&mut self) {
        if !self.pending.is_empty() {
            return;
        }
        if let Some(Strategy::Intersection(state)) = &mut self.strategy {
            if state.observer.is_empty() && state.resize.is_none() {
                return;
            }
            state.observer.disconnect();
            state.resize = None;
            log::debug!("all lazy elements upgraded, observers released");
        }
    }

    /// Leave the pending set, then upgrade. The removal is the single gate
    /// that keeps an element from being upgraded twice.
    fn trigger(&mut self, ctx: &mut PageContext<'_>, node: NodeId) {
        if !self.pending.take(node) {
            return;
        }
        let kind = self.dispatcher.upgrade(ctx.document, ctx.media, node);
        self.stats.upgraded += 1;
        *self.stats.upgraded_by_kind.entry(kind.as_str()).or_default() += 1;
    }
}

/// Elements the engine will manage, in tree order.
///
/// `source` elements and images inside a `picture` are upgraded through
/// their container and are never collected on their own.
pub fn collect_candidates(document: &Document) -> Vec<NodeId> {
    document
        .elements()
        .into_iter()
        .filter(|node| is_candidate(document, *node))
        .collect()
}

fn is_candidate(document: &Document, node: NodeId) -> bool {
    let has_placeholder = |n: NodeId| PLACEHOLDER_ATTRIBUTES.iter().any(|a| document.has_attribute(n, a));
    match ElementKind::classify(document, node) {
        ElementKind::Picture | ElementKind::Video => {
            has_placeholder(node) || document.descendants(node).into_iter().any(has_placeholder)
        }
        ElementKind::Image => {
            let in_picture = document
                .parent(node)
                .is_some_and(|p| document.tag_name(p) == Some("picture"));
            !in_picture && has_placeholder(node)
        }
        _ if document.tag_name(node) == Some("source") => false,
        _ => ["data-src", "data-srcset", "data-bg"]
            .iter()
            .any(|a| document.has_attribute(node, a)),
    }
}
