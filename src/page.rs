//! Page host and event loop
//!
//! A [`Page`] owns the document and every platform primitive the loading
//! engine talks to. It plays the browser's part: it delivers idle periods,
//! timer expiry, frames and page notifications, and hands each one to the
//! component that asked for it.

use crate::config::LazyConfig;
use crate::dom::{serialize, Document, HtmlParser, LayoutEngine, Viewport};
use crate::lazy::{BootOutcome, BootSequencer, LazyEngine, NetworkProfile};
use crate::platform::{
    Capabilities, Environment, EventType, ListenerRegistry, MediaHost, RecordingMediaHost,
    Scheduler, Subscriber, Task,
};
use crate::utils::Result;

/// Borrowed view of the host handed to the loading components
pub struct PageContext<'a> {
    pub document: &'a mut Document,
    pub viewport: Viewport,
    pub listeners: &'a mut ListenerRegistry,
    pub scheduler: &'a mut Scheduler,
    pub media: &'a mut dyn MediaHost,
    pub capabilities: Capabilities,
}

/// A loaded page with the lazy loader attached
pub struct Page<M: MediaHost = RecordingMediaHost> {
    document: Document,
    viewport: Viewport,
    environment: Environment,
    config: LazyConfig,
    listeners: ListenerRegistry,
    scheduler: Scheduler,
    media: M,
    boot: BootSequencer,
    profile: Option<NetworkProfile>,
    engine: Option<LazyEngine>,
    /// Re-run flow layout when the viewport changes size
    auto_layout: bool,
    visible: bool,
    frames: u64,
}

impl Page {
    /// Create a page that records media requests
    pub fn new(
        document: Document,
        viewport: Viewport,
        environment: Environment,
        config: LazyConfig,
    ) -> Self {
        Self::with_media_host(document, viewport, environment, config, RecordingMediaHost::new())
    }

    /// Parse `html` and lay it out for `viewport`
    pub fn from_html(
        html: &str,
        viewport: Viewport,
        environment: Environment,
        config: LazyConfig,
    ) -> Result<Self> {
        let document = HtmlParser::new().parse(html)?;
        let mut page = Self::new(document, viewport, environment, config);
        page.layout();
        Ok(page)
    }
}

impl<M: MediaHost> Page<M> {
    pub fn with_media_host(
        document: Document,
        viewport: Viewport,
        environment: Environment,
        config: LazyConfig,
        media: M,
    ) -> Self {
        let boot = BootSequencer::new(config.clone());
        Self {
            document,
            viewport,
            environment,
            config,
            listeners: ListenerRegistry::new(),
            scheduler: Scheduler::new(),
            media,
            boot,
            profile: None,
            engine: None,
            auto_layout: false,
            visible: true,
            frames: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &LazyConfig {
        &self.config
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// The loading engine, once boot has created it
    pub fn engine(&self) -> Option<&LazyEngine> {
        self.engine.as_ref()
    }

    /// The profile classified at boot
    pub fn profile(&self) -> Option<&NetworkProfile> {
        self.profile.as_ref()
    }

    pub fn is_booted(&self) -> bool {
        self.boot.is_booted()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Serialize the current document
    pub fn to_html(&self) -> String {
        serialize::to_html(&self.document)
    }

    /// Run flow layout now and again after every viewport size change.
    /// Returns the document height.
    pub fn layout(&mut self) -> f32 {
        self.auto_layout = true;
        LayoutEngine::new(self.viewport.width).compute(&mut self.document)
    }

    fn parts(&mut self) -> (PageContext<'_>, &mut Option<LazyEngine>, &mut BootSequencer) {
        (
            PageContext {
                document: &mut self.document,
                viewport: self.viewport,
                listeners: &mut self.listeners,
                scheduler: &mut self.scheduler,
                media: &mut self.media,
                capabilities: self.environment.capabilities,
            },
            &mut self.engine,
            &mut self.boot,
        )
    }

    /// Run the boot sequence. A page boots once; later calls are refused.
    pub fn boot(&mut self) -> BootOutcome {
        let environment = self.environment.clone();
        let capabilities = environment.capabilities;
        let (mut ctx, _, boot) = self.parts();
        let outcome = boot.boot(&mut ctx, &environment);

        if let BootOutcome::Booted(report) = outcome {
            self.profile = Some(report.profile);
            self.engine = Some(LazyEngine::new(report.settings, capabilities));
        }
        outcome
    }

    /// The host is idle: run idle tasks
    pub fn run_idle(&mut self) {
        for task in self.scheduler.take_idle() {
            self.run_task(task);
        }
    }

    /// Move the clock forward, running timed tasks that become due
    pub fn advance(&mut self, ms: u64) {
        for task in self.scheduler.advance(ms) {
            self.run_task(task);
        }
    }

    /// Render one frame: the clock moves one frame interval, frame tasks
    /// run, then resize and intersection observations are delivered.
    pub fn render_frame(&mut self) {
        self.frames += 1;
        self.advance(self.config.frame_interval_ms);
        for task in self.scheduler.take_frame() {
            self.run_task(task);
        }
        self.deliver_observations();
    }

    /// Bring a freshly booted page to the point where the engine is set up
    /// and has seen the first frame
    pub fn settle(&mut self) {
        self.run_idle();
        if self.scheduler.is_scheduled(Task::EngineSetup) {
            self.advance(self.config.fallback_delay_ms);
        }
        self.render_frame();
    }

    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.viewport.scroll_x = x.max(0.0);
        self.viewport.scroll_y = y.max(0.0);
        self.dispatch(EventType::Scroll);
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_to(self.viewport.scroll_x, self.viewport.scroll_y + dy);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.relayout();
        self.dispatch(EventType::Resize);
    }

    /// Swap the viewport axes, as a device rotation does
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.viewport.width, &mut self.viewport.height);
        self.relayout();
        self.dispatch(EventType::OrientationChange);
        self.dispatch(EventType::Resize);
    }

    pub fn set_visibility(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.dispatch(EventType::VisibilityChange);
    }

    fn relayout(&mut self) {
        if self.auto_layout {
            LayoutEngine::new(self.viewport.width).compute(&mut self.document);
        }
    }

    /// Deliver a page notification to its listeners
    fn dispatch(&mut self, event: EventType) {
        for listener in self.listeners.listeners(event) {
            match listener.subscriber {
                Subscriber::LazyFallback => {
                    let (mut ctx, engine, _) = self.parts();
                    if let Some(engine) = engine {
                        engine.handle_event(&mut ctx, event);
                    }
                }
            }
        }
    }

    fn run_task(&mut self, task: Task) {
        let (mut ctx, engine, _) = self.parts();
        let Some(engine) = engine else {
            log::warn!("{:?} ran before boot created the engine", task);
            return;
        };
        match task {
            Task::EngineSetup => {
                engine.setup(&mut ctx);
                log::info!(
                    "lazy engine ready: {:?}, {} pending",
                    engine.strategy(),
                    engine.pending_len()
                );
            }
            Task::FallbackScan => engine.run_scheduled_scan(&mut ctx),
        }
    }

    fn deliver_observations(&mut self) {
        let (mut ctx, engine, _) = self.parts();
        let Some(engine) = engine else {
            return;
        };
        if let Some(entry) = engine.take_resize_record(&ctx.viewport) {
            engine.handle_resize(&mut ctx, &entry);
        }
        let records = engine.take_intersection_records(ctx.document, &ctx.viewport);
        if !records.is_empty() {
            engine.handle_intersections(&mut ctx, &records);
        }
    }
}
