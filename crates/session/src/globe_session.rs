use formats::{EventRecord, OrderedEventSequence, parse_records};
use foundation::math::Vec3;
use foundation::time::Clock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::event_bus::{Event, EventBus, FallbackReason, HostEvent};
use runtime::frame::{Frame, FrameClock};
use runtime::lifecycle::{LifecyclePauser, LifecycleTransition};
use runtime::metrics::{Counter, Metrics};
use runtime::quality::{QualityController, QualityEvent, QualitySettings, QualityTier};
use runtime::resize::{RESIZE_DEBOUNCE_S, ResizeDebouncer, ViewportSize};
use scene::animator::{ArcAnimator, SpawnOutcome, SpawnSkip, SpikeAnimator};
use scene::globe::{GlobeParams, container_scale};
use scene::picking::{
    PickBackend, PickCandidates, PickController, PickOutcome, PickResult, Pointer, PointerKind,
};
use scene::shapes::{build_arcs, build_spikes};
use scene::window::SlidingWindow;
use scene::EntityKind;

use crate::config::GlobeConfig;
use crate::loading::{LoadError, LoadInput, LoadState, transition};
use crate::popup::{PopupInfo, record_popup};

/// Everything that exists once a dataset is loaded.
#[derive(Debug)]
pub struct LoadedGlobe {
    pub sequence: OrderedEventSequence,
    pub window: SlidingWindow,
    pub arcs: ArcAnimator,
    pub spikes: SpikeAnimator,
}

/// Owns the whole animated globe for one page lifetime.
///
/// The host drives it: one `tick` per animation frame, pointer and
/// visibility events as they arrive, and `drain_events` to learn about
/// tier changes and terminal fallbacks. `H` supplies the clock and
/// renderer-side hit testing.
pub struct GlobeSession<H> {
    config: GlobeConfig,
    host: H,
    load: LoadState,
    globe: Option<LoadedGlobe>,
    rng: StdRng,
    frames: FrameClock,
    quality: QualityController,
    lifecycle: LifecyclePauser,
    picker: PickController,
    candidates: PickCandidates,
    resize: ResizeDebouncer,
    viewport: Option<ViewportSize>,
    globe_params: GlobeParams,
    pointer: Pointer,
    dragging: bool,
    pick: Option<PickResult>,
    landmark_highlighted: bool,
    events: EventBus,
    metrics: Metrics,
    disposed: bool,
}

impl<H: PickBackend + Clock> GlobeSession<H> {
    pub fn new(config: GlobeConfig, host: H) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let quality = QualityController::new(config.quality);
        let picker = PickController::new(config.pick, quality.settings().pick_frequency);
        Self {
            globe_params: GlobeParams::new(config.radius),
            config,
            host,
            load: LoadState::Idle,
            globe: None,
            rng,
            frames: FrameClock::new(),
            quality,
            lifecycle: LifecyclePauser::new(),
            picker,
            candidates: PickCandidates::default(),
            resize: ResizeDebouncer::new(RESIZE_DEBOUNCE_S),
            viewport: None,
            pointer: Pointer::OFF_SCREEN,
            dragging: false,
            pick: None,
            landmark_highlighted: false,
            events: EventBus::new(),
            metrics: Metrics::new(),
            disposed: false,
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn loaded(&self) -> Option<&LoadedGlobe> {
        self.globe.as_ref()
    }

    pub fn window(&self) -> Option<&SlidingWindow> {
        self.globe.as_ref().map(|g| &g.window)
    }

    pub fn arcs(&self) -> Option<&ArcAnimator> {
        self.globe.as_ref().map(|g| &g.arcs)
    }

    pub fn spikes(&self) -> Option<&SpikeAnimator> {
        self.globe.as_ref().map(|g| &g.spikes)
    }

    pub fn tier(&self) -> QualityTier {
        self.quality.tier()
    }

    pub fn settings(&self) -> QualitySettings {
        self.quality.settings()
    }

    pub fn globe_params(&self) -> &GlobeParams {
        &self.globe_params
    }

    pub fn globe_params_mut(&mut self) -> &mut GlobeParams {
        &mut self.globe_params
    }

    pub fn viewport(&self) -> Option<ViewportSize> {
        self.viewport
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle.is_paused()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn landmark_highlighted(&self) -> bool {
        self.landmark_highlighted
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // Loading

    pub fn start(&mut self) -> Result<LoadState, LoadError> {
        self.apply_load(LoadInput::Start)
    }

    pub fn assets_loaded(&mut self) -> Result<LoadState, LoadError> {
        self.apply_load(LoadInput::AssetsLoaded)
    }

    pub fn assets_failed(&mut self, reason: &str) -> Result<LoadState, LoadError> {
        tracing::warn!(reason, "globe assets failed to load");
        let state = self.apply_load(LoadInput::AssetsFailed)?;
        self.fail(FallbackReason::DataUnavailable(reason.to_string()));
        Ok(state)
    }

    /// Feeds the payload for the source requested by `load_state`.
    pub fn data_loaded(&mut self, payload: &str) -> Result<LoadState, LoadError> {
        match parse_records(payload) {
            Ok(parsed) => {
                if parsed.dropped > 0 {
                    tracing::debug!(dropped = parsed.dropped, "records dropped while loading");
                }
                self.load_records(parsed.records)
            }
            Err(e) => self.data_failed(&e.to_string()),
        }
    }

    /// Loads already-validated records.
    pub fn load_records(&mut self, records: Vec<EventRecord>) -> Result<LoadState, LoadError> {
        if records.is_empty() {
            return self.data_failed("dataset is empty");
        }
        let state = self.apply_load(LoadInput::DataLoaded)?;
        self.build(records);
        Ok(state)
    }

    pub fn data_failed(&mut self, reason: &str) -> Result<LoadState, LoadError> {
        tracing::warn!(reason, source = ?self.load.requested_source(), "dataset unavailable");
        let state = self.apply_load(LoadInput::DataFailed)?;
        if state == LoadState::Failed {
            self.fail(FallbackReason::DataUnavailable(reason.to_string()));
        }
        Ok(state)
    }

    fn apply_load(&mut self, input: LoadInput) -> Result<LoadState, LoadError> {
        if self.disposed {
            return Err(LoadError::Disposed);
        }
        self.load = transition(self.load, input)?;
        Ok(self.load)
    }

    fn build(&mut self, records: Vec<EventRecord>) {
        let sequence = OrderedEventSequence::build(records, self.config.padding, &mut self.rng);
        let radius = self.config.radius;
        let arcs = ArcAnimator::new(build_arcs(&sequence.pairs(), radius), self.config.animation.arcs);
        let spikes =
            SpikeAnimator::new(build_spikes(&sequence.opens(), radius), self.config.animation.spikes);
        let window = SlidingWindow::from_config(
            sequence.len(),
            &self.config.window,
            self.quality.settings().advance_speed,
        );

        let mut globe = LoadedGlobe {
            sequence,
            window,
            arcs,
            spikes,
        };
        if self.config.animation.prime_on_load {
            let range = globe.window.visible_range();
            let primed = globe.arcs.prime(range.clone()) + globe.spikes.prime(range);
            self.metrics.add(Counter::Spawned, primed as u64);
        }

        let records = globe.sequence.len();
        tracing::info!(records, padding = globe.sequence.padding(), "globe ready");
        self.globe = Some(globe);
        self.events.emit(self.frames.next_index(), HostEvent::Ready { records });
    }

    // Frame loop

    /// Runs one frame. Returns `None` when nothing ran (paused or disposed).
    ///
    /// Order: quality sample, window advance, spawns, arc and spike ticks,
    /// pick, highlight.
    pub fn tick(&mut self, delta_s: f64) -> Option<Frame> {
        if self.disposed || self.lifecycle.is_paused() {
            return None;
        }
        let now = self.host.now();
        if let Some(size) = self.resize.poll(now) {
            self.apply_resize(size);
        }

        let frame = self.frames.advance(delta_s)?;
        self.metrics.inc(Counter::Frames);
        if frame.dt_s > 0.0 {
            self.metrics.record_fps((1.0 / frame.dt_s).round());
        }

        if let Some(event) = self.quality.sample(now) {
            self.on_quality_event(frame.index, event);
            if self.disposed {
                return Some(frame);
            }
        }

        let Some(globe) = self.globe.as_mut() else {
            return Some(frame);
        };

        let step = globe.window.advance(frame.dt_s);
        for index in step.crossed {
            record_spawn(&mut self.metrics, globe.arcs.on_window_advance(index));
            record_spawn(&mut self.metrics, globe.spikes.on_window_advance(index));
        }

        let retired = globe.arcs.tick(frame.dt_s) + globe.spikes.tick(frame.dt_s);
        self.metrics.add(Counter::Retired, retired as u64);

        if self.picker.is_pick_frame(frame.index) {
            self.candidates.clear();
            self.candidates.arcs.extend(globe.arcs.pickable());
            self.candidates.spikes.extend(globe.spikes.pickable());
            self.candidates.landmark = self.picker.config().landmark_enabled;
        }
        let outcome = self.picker.maybe_pick(
            frame.index,
            &self.pointer,
            &globe.window,
            &self.candidates,
            &self.host,
        );

        match outcome {
            PickOutcome::Skipped => self.metrics.inc(Counter::PicksThrottled),
            PickOutcome::Resolved(result) => {
                self.metrics.inc(Counter::PicksCast);
                self.pick = result;
                let (arc, spike, landmark) = match result.map(|r| (r.kind, r.data_index)) {
                    Some((EntityKind::Arc, index)) => (index, None, false),
                    Some((EntityKind::Spike, index)) => (None, index, false),
                    Some((EntityKind::Landmark, _)) => (None, None, true),
                    None => (None, None, false),
                };
                globe.arcs.set_highlight(arc);
                globe.spikes.set_highlight(spike);
                self.landmark_highlighted = landmark;
                if result.is_some() {
                    self.metrics.inc(Counter::PickHits);
                } else if self.pointer.kind == PointerKind::Touch {
                    // Taps must not keep picking once they miss.
                    self.pointer = Pointer::OFF_SCREEN;
                }
            }
        }

        if self.dragging {
            globe.arcs.set_highlight(None);
            globe.spikes.set_highlight(None);
            self.landmark_highlighted = false;
            self.pick = None;
        }

        Some(frame)
    }

    fn on_quality_event(&mut self, frame_index: u64, event: QualityEvent) {
        match event {
            QualityEvent::StepDown { to, settings, .. } => {
                self.metrics.inc(Counter::QualityStepDowns);
                if let Some(globe) = self.globe.as_mut() {
                    globe.window.set_advance_speed(settings.advance_speed);
                }
                self.picker.set_frequency(settings.pick_frequency);
                self.events
                    .emit(frame_index, HostEvent::QualityChanged { tier: to, settings });
            }
            QualityEvent::Emergency { average_fps } => {
                self.fail(FallbackReason::LowFrameRate { average_fps });
            }
        }
    }

    fn apply_resize(&mut self, size: ViewportSize) {
        let scale = container_scale(size.height);
        self.globe_params.layout(Vec3::ZERO, self.config.radius, scale);
        self.viewport = Some(size);
        tracing::debug!(width = size.width, height = size.height, scale, "viewport resized");
    }

    // Host input

    pub fn set_pointer(&mut self, x: f64, y: f64, kind: PointerKind) {
        if self.disposed || !self.lifecycle.pointer_listeners_attached() {
            return;
        }
        self.pointer = Pointer::new(x, y, kind);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = Pointer::OFF_SCREEN;
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn pick_result(&self) -> Option<PickResult> {
        self.pick
    }

    pub fn popup(&self) -> Option<PopupInfo> {
        let pick = self.pick?;
        if pick.kind == EntityKind::Landmark {
            return Some(self.config.landmark.popup());
        }
        let record = self.globe.as_ref()?.sequence.get(pick.data_index?)?;
        Some(record_popup(record, pick.kind))
    }

    /// Visibility gate. Hidden sessions neither tick nor sample frame rate.
    pub fn set_paused(&mut self, paused: bool) {
        if self.disposed {
            return;
        }
        let frame_index = self.frames.next_index();
        match self.lifecycle.on_visibility_change(!paused) {
            Some(LifecycleTransition::Paused) => {
                self.frames.stop();
                self.pointer = Pointer::OFF_SCREEN;
                tracing::info!("globe paused");
                self.events.emit(frame_index, HostEvent::Paused);
            }
            Some(LifecycleTransition::Resumed) => {
                self.frames.start();
                self.quality.suspend();
                tracing::info!("globe resumed");
                self.events.emit(frame_index, HostEvent::Resumed);
            }
            None => {}
        }
    }

    pub fn on_resize(&mut self, width: f64, height: f64) {
        if self.disposed {
            return;
        }
        self.resize.signal(self.host.now(), ViewportSize::new(width, height));
    }

    pub fn on_context_lost(&mut self) {
        self.fail(FallbackReason::ContextLost);
    }

    fn fail(&mut self, reason: FallbackReason) {
        if self.disposed {
            return;
        }
        tracing::error!(%reason, "globe falling back");
        self.events
            .emit(self.frames.next_index(), HostEvent::Fallback(reason));
        self.dispose();
    }

    /// Tears everything down. Safe to call repeatedly and mid-animation.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(mut globe) = self.globe.take() {
            globe.arcs.clear();
            globe.spikes.clear();
        }
        self.frames.stop();
        self.lifecycle.shutdown();
        self.pointer = Pointer::OFF_SCREEN;
        self.pick = None;
        self.landmark_highlighted = false;
        self.candidates.clear();
        self.events.emit(self.frames.next_index(), HostEvent::Disposed);
        tracing::debug!("globe session disposed");
    }
}

fn record_spawn(metrics: &mut Metrics, outcome: SpawnOutcome) {
    let counter = match outcome {
        SpawnOutcome::Spawned(_) => Counter::Spawned,
        SpawnOutcome::Skipped(SpawnSkip::NoVisual) => Counter::SpawnSkippedNoVisual,
        SpawnOutcome::Skipped(SpawnSkip::Busy) => Counter::SpawnSkippedBusy,
        SpawnOutcome::Skipped(SpawnSkip::PoolFull) => Counter::SpawnSkippedPoolFull,
        SpawnOutcome::Skipped(SpawnSkip::Stride) => return,
    };
    metrics.inc(counter);
}

#[cfg(test)]
mod tests {
    use super::GlobeSession;
    use crate::config::GlobeConfig;
    use crate::loading::{DataSource, LoadError, LoadState};
    use crate::popup::PopupKind;
    use foundation::math::Vec3;
    use foundation::time::{Clock, ManualClock, Time};
    use runtime::event_bus::{FallbackReason, HostEvent};
    use runtime::metrics::Counter;
    use runtime::quality::{QualityConfig, QualityTier};
    use scene::animator::{AnimationConfig, AnimatorConfig, Phase};
    use scene::picking::{
        Intersection, PickBackend, PickCandidates, PickTarget, Pointer, PointerKind, Ray,
    };
    use scene::window::WindowConfig;
    use scene::EntityKind;
    use pretty_assertions::assert_eq;

    const FRAME: f64 = 1.0 / 60.0;

    #[derive(Default)]
    struct TestHost {
        clock: ManualClock,
        hits: Vec<(PickTarget, f64)>,
    }

    impl Clock for TestHost {
        fn now(&self) -> Time {
            self.clock.now()
        }
    }

    impl PickBackend for TestHost {
        fn screen_ray(&self, pointer: &Pointer) -> Option<Ray> {
            Some(Ray::new(
                Vec3::new(pointer.x, pointer.y, 200.0),
                Vec3::new(0.0, 0.0, -1.0),
            ))
        }

        fn intersect(&self, ray: &Ray, candidates: &PickCandidates, out: &mut Vec<Intersection>) {
            let hittable = |t: &PickTarget| match t {
                PickTarget::Arc(i) => candidates.arcs.contains(i),
                PickTarget::Spike(i) => candidates.spikes.contains(i),
                PickTarget::Landmark => candidates.landmark,
                PickTarget::Globe => true,
            };
            out.extend(
                self.hits
                    .iter()
                    .filter(|(t, _)| hittable(t))
                    .map(|&(target, distance)| Intersection {
                        target,
                        distance,
                        point: ray.at(distance),
                    }),
            );
        }
    }

    // Three records at one spot (spikes, no arcs) and one out of range.
    const PAYLOAD: &str = r#"[
        {"gop": {"lat": 10, "lon": 10}, "nwo": "octo/a", "pr": 1, "oa": "t", "l": "Rust", "uol": "Oslo"},
        {"gop": {"lat": 20, "lon": 20}, "nwo": "octo/b", "pr": 2, "oa": "t"},
        {"gop": {"lat": 30, "lon": 30}, "nwo": "octo/c", "pr": 3, "ma": "t"},
        {"gop": {"lat": 999, "lon": 0}, "nwo": "octo/d", "pr": 4, "oa": "t"}
    ]"#;

    fn small_config() -> GlobeConfig {
        GlobeConfig {
            padding: 2,
            shuffle_seed: Some(3),
            window: WindowConfig {
                half_width: 2,
                start_center: Some(0.0),
            },
            quality: QualityConfig {
                base_advance_speed: 1.0,
                base_pick_frequency: 2,
                ..QualityConfig::default()
            },
            animation: AnimationConfig {
                arcs: AnimatorConfig {
                    spawn_stride: 1,
                    ..AnimatorConfig::arcs()
                },
                spikes: AnimatorConfig::spikes(),
                prime_on_load: false,
            },
            ..GlobeConfig::default()
        }
    }

    fn ready_session(config: GlobeConfig) -> GlobeSession<TestHost> {
        let mut s = GlobeSession::new(config, TestHost::default());
        s.start().expect("start");
        s.assets_loaded().expect("assets");
        assert_eq!(s.data_loaded(PAYLOAD), Ok(LoadState::Ready));
        s
    }

    /// Host clock runs at a steady 60 fps; the animation delta is chosen per test.
    fn run(s: &mut GlobeSession<TestHost>, delta_s: f64, frames: usize) {
        for _ in 0..frames {
            s.host_mut().clock.advance(FRAME);
            s.tick(delta_s);
        }
    }

    #[test]
    fn invalid_record_is_dropped_and_crossings_spawn() {
        let mut s = ready_session(small_config());
        let events = s.drain_events();
        assert_eq!(events[0].event, HostEvent::Ready { records: 7 });

        let window = s.window().expect("window");
        assert_eq!(window.max_index(), 7);
        assert_eq!(window.half_width(), 2);

        // center 0 -> 2: the leading edge crosses indices 3 and 4.
        run(&mut s, 0.5, 4);
        assert_eq!(s.window().map(|w| w.center()), Some(2.0));

        let spikes = s.spikes().expect("spikes");
        assert_eq!(spikes.active_count(), 2);
        assert_ne!(spikes.phase(3), Phase::Inactive);
        assert_ne!(spikes.phase(4), Phase::Inactive);
        assert_eq!(s.arcs().map(|a| a.active_count()), Some(0));
        assert_eq!(s.metrics().counter(Counter::Spawned), 2);
        assert_eq!(s.metrics().counter(Counter::SpawnSkippedNoVisual), 2);
    }

    #[test]
    fn window_wraps_back_to_half_width() {
        let mut s = ready_session(small_config());
        run(&mut s, 0.5, 10);
        let center = s.window().map(|w| w.center()).expect("window");
        assert!((2.0..2.0 + 1e-9).contains(&center));
    }

    #[test]
    fn pick_highlights_and_builds_popup() {
        let mut s = ready_session(small_config());
        s.host_mut().hits = vec![(PickTarget::Spike(3), 5.0), (PickTarget::Globe, 10.0)];
        s.set_pointer(40.0, 50.0, PointerKind::Mouse);

        // Spike 3 spawns on frame 1 and is picked on frames 2 and 4.
        run(&mut s, 0.5, 5);
        let pick = s.pick_result().expect("pick");
        assert_eq!((pick.kind, pick.data_index), (EntityKind::Spike, Some(3)));
        assert_eq!((pick.screen_anchor.x, pick.screen_anchor.y), (40.0, 50.0));
        assert_eq!(s.spikes().and_then(|a| a.highlighted()), Some(3));
        assert_eq!(s.arcs().and_then(|a| a.highlighted()), None);

        let record = s.loaded().and_then(|g| g.sequence.get(3)).cloned().expect("record");
        let popup = s.popup().expect("popup");
        assert_eq!(popup.kind, PopupKind::PrOpened);
        assert_eq!(popup.header, format!("#{} {}", record.pr, record.repo));

        s.set_dragging(true);
        run(&mut s, 0.5, 1);
        assert_eq!(s.pick_result(), None);
        assert_eq!(s.spikes().and_then(|a| a.highlighted()), None);
    }

    #[test]
    fn landmark_popup_uses_the_card() {
        let mut s = ready_session(small_config());
        s.host_mut().hits = vec![(PickTarget::Landmark, 3.0)];
        s.set_pointer(1.0, 1.0, PointerKind::Mouse);
        run(&mut s, 0.5, 1);
        assert!(s.landmark_highlighted());
        let popup = s.popup().expect("popup");
        assert_eq!(popup.kind, PopupKind::Custom);
        assert_eq!(popup.header, "Arctic Code Vault");
    }

    #[test]
    fn missed_tap_does_not_persist() {
        let mut s = ready_session(small_config());
        s.set_pointer(10.0, 10.0, PointerKind::Touch);
        run(&mut s, 0.5, 1);
        assert_eq!(s.pick_result(), None);
        assert!(s.pointer().is_off_screen());
    }

    #[test]
    fn sustained_slow_frames_step_quality_down() {
        let config = GlobeConfig {
            quality: QualityConfig {
                warning_threshold: 5,
                ..QualityConfig::default()
            },
            ..small_config()
        };
        let mut s = ready_session(config);
        s.drain_events();
        // One arming call, nine to fill the window, five for the streak.
        for _ in 0..15 {
            s.host_mut().clock.advance(1.0 / 40.0);
            s.tick(0.01);
        }
        assert_eq!(s.tier(), QualityTier::Medium);
        let events = s.drain_events();
        assert!(matches!(
            events.as_slice(),
            [e] if matches!(e.event, HostEvent::QualityChanged { tier: QualityTier::Medium, .. })
        ));
        assert_eq!(s.window().map(|w| w.advance_speed()), Some(s.settings().advance_speed));
        assert_eq!(s.metrics().counter(Counter::QualityStepDowns), 1);
    }

    #[test]
    fn collapsed_frame_rate_disposes() {
        let mut s = ready_session(small_config());
        s.drain_events();
        for _ in 0..11 {
            s.host_mut().clock.advance(0.2);
            s.tick(0.2);
        }
        assert!(s.is_disposed());
        let events: Vec<_> = s.drain_events().into_iter().map(|e| e.event).collect();
        assert!(matches!(
            events.as_slice(),
            [HostEvent::Fallback(FallbackReason::LowFrameRate { .. }), HostEvent::Disposed]
        ));
        assert_eq!(s.tick(FRAME), None);
        assert!(s.window().is_none());
    }

    #[test]
    fn pause_gap_is_not_a_slow_frame() {
        let mut s = ready_session(small_config());
        run(&mut s, FRAME, 12);
        s.set_paused(true);
        s.set_paused(true);
        assert_eq!(s.tick(FRAME), None);
        s.host_mut().clock.advance(120.0);
        s.set_paused(false);

        let frame = s.tick(FRAME).expect("frame after resume");
        assert_eq!(frame.dt_s, 0.0);
        run(&mut s, FRAME, 12);
        assert_eq!(s.tier(), QualityTier::Regular);
        assert!(!s.is_disposed());

        let events: Vec<_> = s.drain_events().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events[1..],
            [HostEvent::Paused, HostEvent::Resumed]
        );
    }

    #[test]
    fn pointer_is_ignored_while_paused() {
        let mut s = ready_session(small_config());
        s.set_paused(true);
        s.set_pointer(5.0, 5.0, PointerKind::Mouse);
        assert!(s.pointer().is_off_screen());
    }

    #[test]
    fn fallback_data_gets_one_retry() {
        let mut s = GlobeSession::new(small_config(), TestHost::default());
        s.start().expect("start");
        s.assets_loaded().expect("assets");
        assert_eq!(
            s.data_loaded("not json"),
            Ok(LoadState::LoadingData {
                source: DataSource::Fallback
            })
        );
        assert_eq!(s.data_loaded("[]"), Ok(LoadState::Failed));
        assert!(s.is_disposed());

        let events: Vec<_> = s.drain_events().into_iter().map(|e| e.event).collect();
        assert!(matches!(
            events.as_slice(),
            [HostEvent::Fallback(FallbackReason::DataUnavailable(_)), HostEvent::Disposed]
        ));
        assert_eq!(s.start(), Err(LoadError::Disposed));
    }

    #[test]
    fn fallback_source_can_still_succeed() {
        let mut s = GlobeSession::new(small_config(), TestHost::default());
        s.start().expect("start");
        s.assets_loaded().expect("assets");
        s.data_failed("HTTP 503").expect("retry");
        assert_eq!(s.data_loaded(PAYLOAD), Ok(LoadState::Ready));
        assert!(!s.is_disposed());
    }

    #[test]
    fn resize_is_debounced() {
        let mut s = ready_session(small_config());
        s.on_resize(1200.0, 600.0);
        s.on_resize(1200.0, 425.0);
        run(&mut s, FRAME, 2);
        assert_eq!(s.viewport(), None);
        run(&mut s, FRAME, 8);
        assert_eq!(s.viewport().map(|v| v.height), Some(425.0));
        assert_eq!(s.globe_params().front_point(), Vec3::new(0.0, 0.0, 50.0));
    }

    #[test]
    fn context_loss_and_dispose_are_idempotent() {
        let mut s = ready_session(small_config());
        run(&mut s, 0.5, 3);
        s.drain_events();
        s.on_context_lost();
        s.on_context_lost();
        s.dispose();
        let events: Vec<_> = s.drain_events().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                HostEvent::Fallback(FallbackReason::ContextLost),
                HostEvent::Disposed
            ]
        );
        assert!(s.spikes().is_none());
        assert_eq!(s.popup(), None);
    }

    #[test]
    fn priming_fills_the_initial_window() {
        let config = GlobeConfig {
            animation: AnimationConfig {
                prime_on_load: true,
                ..small_config().animation
            },
            ..small_config()
        };
        let s = ready_session(config);
        // center 0, hw 2: indices 0..=2 are visible.
        assert_eq!(s.spikes().map(|a| a.active_count()), Some(3));
    }
}
