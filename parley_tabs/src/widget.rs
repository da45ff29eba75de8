// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A widget instance: document, stops, and coalesced layout scheduling.

use embed_text::{ChangeSource, Document};

use crate::editing::{EditContext, Handled, KeyEvent, Keymap};
use crate::{
    LayoutSurface, RulerEdit, TabAlignment, TabLayoutConfig, TabLayoutEngine, TabStop,
    TabStopRegistry,
};

/// Distance in pixels within which a ruler click hits an existing stop.
pub const RULER_HIT_TOLERANCE: f32 = 4.0;

/// Identifies a frame callback requested from a [`FrameHost`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Identifies a resize listener registered with a [`FrameHost`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Services of the hosting UI framework.
pub trait FrameHost {
    /// Ask for a callback at the next frame boundary. The host later calls
    /// [`TabEditor::on_frame`] with the returned id.
    fn request_frame(&mut self) -> FrameId;

    /// Cancel a frame callback that has not fired yet.
    fn cancel_frame(&mut self, id: FrameId);

    /// Start delivering viewport resizes through [`TabEditor::on_resize`].
    fn add_resize_listener(&mut self) -> ListenerId;

    /// Stop delivering viewport resizes.
    fn remove_resize_listener(&mut self, id: ListenerId);
}

/// What asked for a layout pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutTrigger {
    /// The document changed.
    Content(ChangeSource),
    /// The viewport was resized.
    Resize,
    /// The tab stop registry changed.
    Stops,
}

/// Collapses layout triggers into at most one pending frame.
#[derive(Debug, Default)]
pub struct LayoutScheduler {
    pending: Option<FrameId>,
    listener: Option<ListenerId>,
    coalesced: u64,
    torn_down: bool,
}

impl LayoutScheduler {
    /// A scheduler with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register for resizes, once.
    pub fn attach(&mut self, host: &mut (impl FrameHost + ?Sized)) {
        if self.torn_down || self.listener.is_some() {
            return;
        }
        self.listener = Some(host.add_resize_listener());
    }

    /// Ask for a layout pass at the next frame.
    ///
    /// Returns `true` if a frame was requested, or `false` if the trigger was
    /// merged into an already pending frame or the scheduler is torn down.
    pub fn request(
        &mut self,
        host: &mut (impl FrameHost + ?Sized),
        trigger: LayoutTrigger,
    ) -> bool {
        if self.torn_down {
            return false;
        }
        if let Some(pending) = self.pending {
            self.coalesced += 1;
            tracing::trace!(?trigger, frame = pending.0, "coalesced layout request");
            return false;
        }
        let frame = host.request_frame();
        tracing::trace!(?trigger, frame = frame.0, "requested layout frame");
        self.pending = Some(frame);
        true
    }

    /// Consume the pending frame if `id` is it. Stale ids return `false`.
    pub fn take_frame(&mut self, id: FrameId) -> bool {
        if self.torn_down || self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        true
    }

    /// The frame that will run the next pass, if any.
    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// The registered resize listener, if any.
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    /// Number of requests merged into an already pending frame.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Returns `true` after [`teardown`](Self::teardown).
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Cancel the pending frame and remove the resize listener. Later
    /// requests are ignored.
    pub fn teardown(&mut self, host: &mut (impl FrameHost + ?Sized)) {
        if let Some(frame) = self.pending.take() {
            host.cancel_frame(frame);
        }
        if let Some(listener) = self.listener.take() {
            host.remove_resize_listener(listener);
        }
        self.torn_down = true;
    }
}

/// One editing surface with word processor style tab stops.
///
/// Edits, stop changes, and resizes each request a layout pass from the
/// [`FrameHost`]; all of them before the next frame share one pass.
#[derive(Debug)]
pub struct TabEditor<S> {
    doc: Document,
    stops: TabStopRegistry,
    engine: TabLayoutEngine,
    surface: S,
    keymap: Keymap,
    scheduler: LayoutScheduler,
}

impl<S: LayoutSurface> TabEditor<S> {
    /// Create an editor with the default configuration and key bindings.
    pub fn new(doc: Document, surface: S) -> Self {
        Self::with_config(doc, surface, TabLayoutConfig::default())
    }

    /// Create an editor with the given engine configuration.
    pub fn with_config(doc: Document, surface: S, config: TabLayoutConfig) -> Self {
        Self {
            doc,
            stops: TabStopRegistry::new(),
            engine: TabLayoutEngine::new(config),
            surface,
            keymap: Keymap::with_tab_bindings(),
            scheduler: LayoutScheduler::new(),
        }
    }

    /// Register with the host and request the first layout pass.
    pub fn attach(&mut self, host: &mut (impl FrameHost + ?Sized)) {
        self.scheduler.attach(host);
        self.scheduler
            .request(host, LayoutTrigger::Content(ChangeSource::Api));
    }

    /// The document.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for programmatic edits. Call
    /// [`notify_changes`](Self::notify_changes) afterwards; use
    /// [`set_document`](Self::set_document) to replace the document.
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// The tab stops.
    pub fn stops(&self) -> &TabStopRegistry {
        &self.stops
    }

    /// The layout surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, for example to change its width before
    /// calling [`on_resize`](Self::on_resize).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The layout engine.
    pub fn engine(&self) -> &TabLayoutEngine {
        &self.engine
    }

    /// The key bindings, for adding host bindings.
    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &LayoutScheduler {
        &self.scheduler
    }

    // --- MARK: Input ---
    /// Dispatch a key press through the keymap.
    pub fn handle_key(
        &mut self,
        event: KeyEvent,
        host: &mut (impl FrameHost + ?Sized),
    ) -> Handled {
        if self.scheduler.is_torn_down() {
            return Handled::No;
        }
        let mut cx = EditContext::new(&mut self.doc, &self.stops, &mut self.surface);
        let handled = self.keymap.dispatch(event, &mut cx);
        if cx.needs_relayout() {
            self.notify_changes(host);
        }
        handled
    }

    /// Replace the whole document, for example after loading it from storage,
    /// and request a layout pass for it. Changes recorded in the new document
    /// are discarded.
    pub fn set_document(&mut self, doc: Document, host: &mut (impl FrameHost + ?Sized)) {
        self.doc = doc;
        self.doc.drain_changes().for_each(drop);
        tracing::debug!(blocks = self.doc.blocks().len(), "replaced document");
        self.scheduler
            .request(host, LayoutTrigger::Content(ChangeSource::Api));
    }

    /// Collect document changes and request a layout pass if there were any.
    pub fn notify_changes(&mut self, host: &mut (impl FrameHost + ?Sized)) {
        let mut trigger = None;
        for change in self.doc.drain_changes() {
            tracing::trace!(
                at = change.at,
                removed = change.removed,
                inserted = change.inserted,
                source = ?change.source,
                "document changed"
            );
            trigger = Some(LayoutTrigger::Content(change.source));
        }
        if let Some(trigger) = trigger {
            self.scheduler.request(host, trigger);
        }
    }

    /// The viewport was resized. Cached measurements are kept.
    pub fn on_resize(&mut self, host: &mut (impl FrameHost + ?Sized)) {
        self.scheduler.request(host, LayoutTrigger::Resize);
    }

    // --- MARK: Tab stops ---
    /// Add `stop`. See [`TabStopRegistry::add_stop`].
    pub fn add_stop(
        &mut self,
        stop: TabStop,
        host: &mut (impl FrameHost + ?Sized),
    ) -> Option<usize> {
        self.edit_stops(host, |stops| stops.add_stop(stop))
    }

    /// See [`TabStopRegistry::cycle`].
    pub fn cycle_stop(
        &mut self,
        index: usize,
        host: &mut (impl FrameHost + ?Sized),
    ) -> Option<TabAlignment> {
        self.edit_stops(host, |stops| stops.cycle(index))
    }

    /// See [`TabStopRegistry::remove`].
    pub fn remove_stop(
        &mut self,
        index: usize,
        host: &mut (impl FrameHost + ?Sized),
    ) -> Option<TabStop> {
        self.edit_stops(host, |stops| stops.remove(index))
    }

    /// Remove every stop.
    pub fn clear_stops(&mut self, host: &mut (impl FrameHost + ?Sized)) {
        self.edit_stops(host, TabStopRegistry::clear);
    }

    /// A click on the ruler at `x`.
    pub fn ruler_click(&mut self, x: f32, host: &mut (impl FrameHost + ?Sized)) -> RulerEdit {
        self.edit_stops(host, |stops| stops.click(x, RULER_HIT_TOLERANCE))
    }

    /// Replace the registry, for example with one loaded from storage.
    /// Loading the stops already in use requests nothing.
    pub fn load_stops(
        &mut self,
        stops: TabStopRegistry,
        host: &mut (impl FrameHost + ?Sized),
    ) {
        if self.stops.stops() == stops.stops() {
            return;
        }
        self.stops = stops;
        self.scheduler.request(host, LayoutTrigger::Stops);
    }

    fn edit_stops<R>(
        &mut self,
        host: &mut (impl FrameHost + ?Sized),
        edit: impl FnOnce(&mut TabStopRegistry) -> R,
    ) -> R {
        let generation = self.stops.generation();
        let result = edit(&mut self.stops);
        if self.stops.generation() != generation {
            self.scheduler.request(host, LayoutTrigger::Stops);
        }
        result
    }

    // --- MARK: Layout ---
    /// A frame requested from the host fired. Runs the pending pass, or does
    /// nothing for a stale or cancelled frame. Returns `true` if a pass ran.
    pub fn on_frame(&mut self, id: FrameId) -> bool {
        if !self.scheduler.take_frame(id) {
            tracing::trace!(frame = id.0, "ignored stale frame");
            return false;
        }
        self.recompute_layout();
        true
    }

    /// Run a layout pass now. Idempotent; a no-op after teardown.
    pub fn recompute_layout(&mut self) {
        if self.scheduler.is_torn_down() {
            return;
        }
        self.engine
            .recompute_layout(&self.doc, &self.stops, &mut self.surface);
    }

    /// Release host resources and cached measurements. The editor ignores
    /// all later triggers.
    pub fn teardown(&mut self, host: &mut (impl FrameHost + ?Sized)) {
        let cached = self.engine.cache().len();
        self.scheduler.teardown(host);
        self.engine.clear_cache();
        tracing::debug!(cached, "tore down tab editor");
    }
}
