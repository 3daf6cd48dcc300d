//! Pooled enter/hold/exit animation for arcs and spikes.

mod entity;

pub use entity::*;

use std::ops::Range;

use foundation::{Handle, Pool};
use serde::{Deserialize, Serialize};

use crate::EntityKind;
use crate::shapes::{ArcShape, EntityShape, SpikeShape};

pub type ArcAnimator = EntityAnimator<ArcShape>;
pub type SpikeAnimator = EntityAnimator<SpikeShape>;

/// Timing and capacity for one animator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorConfig {
    /// Primary pool size; the fade pool gets the same.
    pub capacity: usize,
    /// Only every Nth index spawns.
    pub spawn_stride: usize,
    /// Draw units revealed per second while entering and retracted while reversing.
    pub draw_rate: f64,
    pub hold_factor: f64,
    pub min_hold_s: f64,
    pub fade_s: f64,
}

impl AnimatorConfig {
    pub fn arcs() -> Self {
        Self {
            capacity: 40,
            spawn_stride: 10,
            // Tube segments per second.
            draw_rate: 33.0,
            hold_factor: 2.0,
            min_hold_s: 5.0,
            fade_s: 0.4,
        }
    }

    pub fn spikes() -> Self {
        Self {
            capacity: 80,
            spawn_stride: 1,
            draw_rate: 2.0,
            hold_factor: 2.0,
            min_hold_s: 3.0,
            fade_s: 0.25,
        }
    }

    pub fn enter_seconds(&self, draw_units: f64) -> f64 {
        if self.draw_rate > 0.0 && draw_units.is_finite() {
            (draw_units / self.draw_rate).max(0.0)
        } else {
            0.0
        }
    }

    pub fn hold_seconds(&self, enter_s: f64) -> f64 {
        (enter_s * (self.hold_factor - 1.0) + self.min_hold_s).max(0.0)
    }
}

/// Deserialized from a partial section: absent keys keep the per-kind defaults.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AnimationSection")]
pub struct AnimationConfig {
    pub arcs: AnimatorConfig,
    pub spikes: AnimatorConfig,
    /// Spawn the initial visible window on load so the globe starts populated.
    pub prime_on_load: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            arcs: AnimatorConfig::arcs(),
            spikes: AnimatorConfig::spikes(),
            prime_on_load: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnimatorSection {
    capacity: Option<usize>,
    spawn_stride: Option<usize>,
    draw_rate: Option<f64>,
    hold_factor: Option<f64>,
    min_hold_s: Option<f64>,
    fade_s: Option<f64>,
}

impl AnimatorSection {
    fn merge(self, base: AnimatorConfig) -> AnimatorConfig {
        AnimatorConfig {
            capacity: self.capacity.unwrap_or(base.capacity),
            spawn_stride: self.spawn_stride.unwrap_or(base.spawn_stride),
            draw_rate: self.draw_rate.unwrap_or(base.draw_rate),
            hold_factor: self.hold_factor.unwrap_or(base.hold_factor),
            min_hold_s: self.min_hold_s.unwrap_or(base.min_hold_s),
            fade_s: self.fade_s.unwrap_or(base.fade_s),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnimationSection {
    arcs: AnimatorSection,
    spikes: AnimatorSection,
    prime_on_load: Option<bool>,
}

impl From<AnimationSection> for AnimationConfig {
    fn from(section: AnimationSection) -> Self {
        let defaults = AnimationConfig::default();
        Self {
            arcs: section.arcs.merge(defaults.arcs),
            spikes: section.spikes.merge(defaults.spikes),
            prime_on_load: section.prime_on_load.unwrap_or(defaults.prime_on_load),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpawnSkip {
    /// Index is not on the spawn stride.
    Stride,
    /// No shape for this index.
    NoVisual,
    /// Entity is still animating from an earlier pass.
    Busy,
    PoolFull,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(Handle),
    Skipped(SpawnSkip),
}

/// Drives every entity of one kind through its phases.
///
/// Entities are stored densely by dataset index; `active` lists the ones
/// that are not `Inactive`, in spawn order.
#[derive(Debug)]
pub struct EntityAnimator<S: EntityShape> {
    config: AnimatorConfig,
    shapes: Vec<Option<S>>,
    entities: Vec<AnimatedEntity>,
    active: Vec<usize>,
    primary: Pool<usize>,
    fades: Pool<usize>,
    highlighted: Option<usize>,
}

impl<S: EntityShape> EntityAnimator<S> {
    pub fn new(shapes: Vec<Option<S>>, config: AnimatorConfig) -> Self {
        let mut entities = Vec::with_capacity(shapes.len());
        entities.resize_with(shapes.len(), AnimatedEntity::default);
        Self {
            primary: Pool::with_capacity(config.capacity),
            fades: Pool::with_capacity(config.capacity),
            active: Vec::with_capacity(config.capacity * 2),
            config,
            shapes,
            entities,
            highlighted: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        S::KIND
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Dataset length this animator was built for.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shape(&self, index: usize) -> Option<&S> {
        self.shapes.get(index).and_then(Option::as_ref)
    }

    pub fn entity(&self, index: usize) -> Option<&AnimatedEntity> {
        self.entities.get(index)
    }

    pub fn phase(&self, index: usize) -> Phase {
        self.entities.get(index).map(|e| e.phase).unwrap_or_default()
    }

    /// Entities holding a primary slot.
    pub fn active_count(&self) -> usize {
        self.primary.len()
    }

    pub fn retiring_count(&self) -> usize {
        self.fades.len()
    }

    pub fn capacity(&self) -> usize {
        self.primary.capacity()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// At most one highlighted entity; `None` clears.
    pub fn set_highlight(&mut self, index: Option<usize>) {
        self.highlighted = index;
    }

    /// Called for each index the window's leading edge crosses.
    pub fn on_window_advance(&mut self, index: usize) -> SpawnOutcome {
        if index % self.config.spawn_stride.max(1) != 0 {
            return SpawnOutcome::Skipped(SpawnSkip::Stride);
        }
        let Some(shape) = self.shapes.get(index).and_then(Option::as_ref) else {
            return SpawnOutcome::Skipped(SpawnSkip::NoVisual);
        };
        let draw_units = shape.draw_units();
        if !self.entities[index].is_inactive() {
            return SpawnOutcome::Skipped(SpawnSkip::Busy);
        }
        let Some(handle) = self.primary.checkout(index) else {
            tracing::warn!(
                kind = ?S::KIND,
                index,
                capacity = self.primary.capacity(),
                "entity pool exhausted, spawn skipped"
            );
            return SpawnOutcome::Skipped(SpawnSkip::PoolFull);
        };

        let enter_s = self.config.enter_seconds(draw_units);
        self.entities[index] = AnimatedEntity {
            phase: Phase::Entering,
            progress: 0.0,
            hold_remaining: 0.0,
            fade_elapsed: 0.0,
            enter_s,
            hold_s: self.config.hold_seconds(enter_s),
            handle: Some(handle),
        };
        self.active.push(index);
        SpawnOutcome::Spawned(handle)
    }

    /// Spawns every stride index in `range`; returns how many spawned.
    pub fn prime(&mut self, range: Range<usize>) -> usize {
        range
            .filter(|&index| matches!(self.on_window_advance(index), SpawnOutcome::Spawned(_)))
            .count()
    }

    /// Advances every in-flight entity; returns how many went back to `Inactive`.
    pub fn tick(&mut self, delta_s: f64) -> usize {
        let dt = if delta_s.is_finite() && delta_s > 0.0 {
            delta_s
        } else {
            0.0
        };
        let mut active = std::mem::take(&mut self.active);
        let before = active.len();
        active.retain(|&index| self.step(index, dt));
        let retired = before - active.len();
        self.active = active;
        retired
    }

    /// Advances one entity; `false` once it is back to `Inactive`.
    fn step(&mut self, index: usize, dt: f64) -> bool {
        let frozen = self.highlighted == Some(index);
        let Some(entity) = self.entities.get_mut(index) else {
            return false;
        };

        match entity.phase {
            Phase::Inactive => false,
            Phase::Entering => {
                entity.progress = if entity.enter_s > 0.0 {
                    entity.progress + dt / entity.enter_s
                } else {
                    1.0
                };
                if entity.progress >= 1.0 {
                    entity.progress = 1.0;
                    entity.hold_remaining = entity.hold_s;
                    entity.phase = Phase::Holding;
                }
                true
            }
            Phase::Holding => {
                if !frozen {
                    entity.hold_remaining -= dt;
                    if entity.hold_remaining <= 0.0 {
                        entity.hold_remaining = 0.0;
                        entity.phase = Phase::Reversing;
                    }
                }
                true
            }
            Phase::Reversing => {
                if !frozen {
                    entity.progress = if entity.enter_s > 0.0 {
                        entity.progress - dt / entity.enter_s
                    } else {
                        0.0
                    };
                    if entity.progress <= 0.0 {
                        entity.progress = 0.0;
                        entity.phase = Phase::Exiting;
                    }
                }
                true
            }
            Phase::Exiting => {
                if let Some(handle) = entity.handle.take() {
                    self.primary.checkin(handle);
                }
                match self.fades.checkout(index) {
                    Some(fade) => {
                        entity.handle = Some(fade);
                        entity.fade_elapsed = 0.0;
                        entity.phase = Phase::Retiring;
                        true
                    }
                    None => {
                        *entity = AnimatedEntity::default();
                        false
                    }
                }
            }
            Phase::Retiring => {
                entity.fade_elapsed += dt;
                if entity.fade_elapsed < self.config.fade_s {
                    return true;
                }
                if let Some(fade) = entity.handle.take() {
                    self.fades.checkin(fade);
                }
                *entity = AnimatedEntity::default();
                false
            }
        }
    }

    /// Instances backed by the primary pool, in spawn order.
    pub fn renderables(&self) -> impl Iterator<Item = Renderable> + '_ {
        self.active.iter().filter_map(move |&index| {
            let entity = self.entities.get(index)?;
            if !entity.phase.holds_primary() {
                return None;
            }
            let (draw_start, draw_end) = entity.draw_span();
            Some(Renderable {
                handle: entity.handle?,
                data_index: index,
                draw_start,
                draw_end,
                variant: if self.highlighted == Some(index) {
                    RenderVariant::Highlight
                } else {
                    RenderVariant::Normal
                },
            })
        })
    }

    pub fn fade_rings(&self) -> impl Iterator<Item = FadeRing> + '_ {
        self.active.iter().filter_map(move |&index| {
            let entity = self.entities.get(index)?;
            if entity.phase != Phase::Retiring {
                return None;
            }
            let scale = if self.config.fade_s > 0.0 {
                (1.0 - entity.fade_elapsed / self.config.fade_s).clamp(0.0, 1.0)
            } else {
                0.0
            };
            Some(FadeRing {
                handle: entity.handle?,
                data_index: index,
                scale,
            })
        })
    }

    /// Dataset indices a pick may hit.
    pub fn pickable(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .copied()
            .filter(move |&index| self.phase(index).holds_primary())
    }

    /// Drops all in-flight state. Outstanding handles become stale.
    pub fn clear(&mut self) {
        for index in self.active.drain(..) {
            if let Some(entity) = self.entities.get_mut(index) {
                *entity = AnimatedEntity::default();
            }
        }
        self.primary.clear();
        self.fades.clear();
        self.highlighted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimatorConfig, EntityAnimator, Phase, RenderVariant, SpawnOutcome, SpawnSkip};
    use crate::EntityKind;
    use crate::shapes::EntityShape;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Copy, Clone)]
    struct Unit;

    impl EntityShape for Unit {
        const KIND: EntityKind = EntityKind::Spike;

        fn draw_units(&self) -> f64 {
            1.0
        }
    }

    fn config(capacity: usize) -> AnimatorConfig {
        // enter 1 s, hold 2 s, reverse 1 s
        AnimatorConfig {
            capacity,
            spawn_stride: 1,
            draw_rate: 1.0,
            hold_factor: 2.0,
            min_hold_s: 1.0,
            fade_s: 0.5,
        }
    }

    fn animator(n: usize, capacity: usize) -> EntityAnimator<Unit> {
        EntityAnimator::new(vec![Some(Unit); n], config(capacity))
    }

    #[test]
    fn walks_every_phase_and_releases_once() {
        let mut a = animator(3, 2);
        let SpawnOutcome::Spawned(handle) = a.on_window_advance(0) else {
            panic!("expected spawn");
        };
        assert_eq!(a.phase(0), Phase::Entering);
        assert_eq!(a.active_count(), 1);

        a.tick(0.5);
        assert_eq!(a.phase(0), Phase::Entering);
        a.tick(0.5);
        assert_eq!(a.phase(0), Phase::Holding);
        assert_eq!(a.entity(0).map(|e| e.hold_remaining), Some(2.0));

        a.tick(2.0);
        assert_eq!(a.phase(0), Phase::Reversing);
        a.tick(0.5);
        let r = a.renderables().next().expect("renderable");
        assert_eq!((r.draw_start, r.draw_end), (0.5, 1.0));

        a.tick(0.5);
        assert_eq!(a.phase(0), Phase::Exiting);
        assert_eq!(a.active_count(), 1);

        a.tick(0.1);
        assert_eq!(a.phase(0), Phase::Retiring);
        assert_eq!((a.active_count(), a.retiring_count()), (0, 1));
        assert_eq!(a.renderables().count(), 0);
        assert_eq!(a.fade_rings().count(), 1);

        assert_eq!(a.tick(0.5), 1);
        assert_eq!(a.phase(0), Phase::Inactive);
        assert_eq!((a.active_count(), a.retiring_count()), (0, 0));

        // The spawn handle was already returned; a second check-in is rejected.
        assert!(a.primary.checkin(handle).is_none());
        assert_eq!(a.primary.available(), 2);
        assert!(matches!(a.on_window_advance(0), SpawnOutcome::Spawned(_)));
    }

    #[test]
    fn spawn_skips_are_classified() {
        let mut a = EntityAnimator::new(vec![Some(Unit), None, Some(Unit), Some(Unit)], config(2));
        assert!(matches!(a.on_window_advance(0), SpawnOutcome::Spawned(_)));
        assert_eq!(a.on_window_advance(0), SpawnOutcome::Skipped(SpawnSkip::Busy));
        assert_eq!(a.on_window_advance(1), SpawnOutcome::Skipped(SpawnSkip::NoVisual));
        assert_eq!(a.on_window_advance(9), SpawnOutcome::Skipped(SpawnSkip::NoVisual));
        assert!(matches!(a.on_window_advance(2), SpawnOutcome::Spawned(_)));
        assert_eq!(a.on_window_advance(3), SpawnOutcome::Skipped(SpawnSkip::PoolFull));
        assert_eq!(a.active_count(), a.capacity());
        assert_eq!(a.phase(3), Phase::Inactive);
    }

    #[test]
    fn stride_limits_spawns() {
        let mut a = EntityAnimator::new(vec![Some(Unit); 30], AnimatorConfig {
            spawn_stride: 10,
            ..config(10)
        });
        assert_eq!(a.on_window_advance(5), SpawnOutcome::Skipped(SpawnSkip::Stride));
        assert_eq!(a.prime(0..30), 3);
    }

    #[test]
    fn full_fade_pool_retires_straight_to_inactive() {
        let mut a = EntityAnimator::new(vec![Some(Unit); 2], AnimatorConfig {
            fade_s: 100.0,
            ..config(1)
        });
        a.on_window_advance(0);
        a.tick(1.0);
        a.tick(2.0);
        a.tick(1.0);
        a.tick(0.0);
        assert_eq!(a.phase(0), Phase::Retiring);

        assert!(matches!(a.on_window_advance(1), SpawnOutcome::Spawned(_)));
        a.tick(1.0);
        a.tick(2.0);
        a.tick(1.0);
        assert_eq!(a.phase(1), Phase::Exiting);
        a.tick(0.0);
        assert_eq!(a.phase(1), Phase::Inactive);
        assert_eq!(a.phase(0), Phase::Retiring);
        assert_eq!((a.active_count(), a.retiring_count()), (0, 1));
    }

    #[test]
    fn highlight_suspends_hold_and_retract() {
        let mut a = animator(2, 4);
        a.on_window_advance(0);
        a.on_window_advance(1);
        a.tick(1.0);
        a.set_highlight(Some(0));

        a.tick(5.0);
        assert_eq!(a.phase(0), Phase::Holding);
        assert_eq!(a.entity(0).map(|e| e.hold_remaining), Some(2.0));
        assert_eq!(a.phase(1), Phase::Reversing);

        a.set_highlight(Some(1));
        a.tick(0.5);
        assert_eq!(a.entity(1).map(|e| e.progress), Some(1.0));
        assert_eq!(a.entity(0).map(|e| e.hold_remaining), Some(1.5));

        let variants: Vec<_> = a.renderables().map(|r| (r.data_index, r.variant)).collect();
        assert_eq!(
            variants,
            vec![(0, RenderVariant::Normal), (1, RenderVariant::Highlight)]
        );

        a.set_highlight(None);
        a.tick(0.5);
        assert_eq!(a.entity(1).map(|e| e.progress), Some(0.5));
    }

    #[test]
    fn clear_drops_in_flight_state() {
        let mut a = animator(4, 4);
        assert_eq!(a.prime(0..4), 4);
        a.set_highlight(Some(2));
        a.tick(1.5);
        a.clear();
        assert_eq!(a.active_count(), 0);
        assert_eq!(a.highlighted(), None);
        assert!((0..4).all(|i| a.phase(i) == Phase::Inactive));
        assert_eq!(a.pickable().count(), 0);
        assert!(matches!(a.on_window_advance(0), SpawnOutcome::Spawned(_)));
    }

    #[test]
    fn handles_stay_unique_under_churn() {
        let mut a = animator(50, 8);
        let mut saw_full_pool = false;
        for frame in 0..600 {
            if let SpawnOutcome::Skipped(SpawnSkip::PoolFull) = a.on_window_advance(frame % 50) {
                saw_full_pool = true;
            }
            a.tick(0.1);

            let mut primary: Vec<_> = a.renderables().map(|r| r.handle).collect();
            let mut fades: Vec<_> = a.fade_rings().map(|r| r.handle).collect();
            let (np, nf) = (primary.len(), fades.len());
            primary.sort();
            primary.dedup();
            fades.sort();
            fades.dedup();
            assert_eq!(primary.len(), np, "frame {frame}: primary handle shared");
            assert_eq!(fades.len(), nf, "frame {frame}: fade handle shared");
            assert!(a.active_count() <= a.capacity());
            assert!(a.retiring_count() <= a.capacity());
            assert_eq!(a.active_count(), np);
        }
        assert!(saw_full_pool);
    }
}
