use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{Surface, SurfaceId};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{Clock, DeadlineTimer, TimePoint};
use crate::render::{ApplyOptions, ChartEngine, EngineAction, InitOptions};
use crate::spec::{Fingerprint, Specification, fingerprint, should_apply};

use super::HostConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
    Disposed,
}

/// Reference to one live engine instance.
///
/// The generation distinguishes successive instances on the same surface, so
/// a handle kept past `dispose` never reaches a newer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceHandle {
    surface: SurfaceId,
    generation: u64,
}

impl InstanceHandle {
    #[must_use]
    pub fn surface(self) -> SurfaceId {
        self.surface
    }

    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The fingerprint matched the last applied specification.
    Skipped,
}

#[derive(Debug)]
struct InstanceSlot<I> {
    generation: u64,
    state: LifecycleState,
    instance: Option<I>,
    last_fingerprint: Option<Fingerprint>,
    resize_timer: DeadlineTimer,
}

impl<I> InstanceSlot<I> {
    fn uninitialized() -> Self {
        Self {
            generation: 0,
            state: LifecycleState::Uninitialized,
            instance: None,
            last_fingerprint: None,
            resize_timer: DeadlineTimer::default(),
        }
    }
}

/// Owns exactly one engine instance per drawing surface.
pub struct InstanceManager<E: ChartEngine, C: Clock> {
    engine: E,
    clock: C,
    init_options: InitOptions,
    resize_debounce: TimePoint,
    slots: IndexMap<SurfaceId, InstanceSlot<E::Instance>>,
    next_generation: u64,
}

impl<E: ChartEngine, C: Clock> InstanceManager<E, C> {
    #[must_use]
    pub fn new(engine: E, clock: C) -> Self {
        Self::from_config(engine, clock, &HostConfig::default())
    }

    #[must_use]
    pub fn from_config(engine: E, clock: C, config: &HostConfig) -> Self {
        Self {
            engine,
            clock,
            init_options: config.init.clone(),
            resize_debounce: config.resize_debounce,
            slots: IndexMap::new(),
            next_generation: 0,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn resize_debounce(&self) -> TimePoint {
        self.resize_debounce
    }

    #[must_use]
    pub fn state(&self, surface: SurfaceId) -> LifecycleState {
        self.slots
            .get(&surface)
            .map_or(LifecycleState::Uninitialized, |slot| slot.state)
    }

    /// Number of surfaces with a slot. Disposed slots are pruned on the next acquire.
    #[must_use]
    pub fn tracked_surfaces(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_ready(&self, handle: InstanceHandle) -> bool {
        self.slots.get(&handle.surface).is_some_and(|slot| {
            slot.generation == handle.generation && slot.state == LifecycleState::Ready
        })
    }

    #[must_use]
    pub fn last_fingerprint(&self, handle: InstanceHandle) -> Option<&Fingerprint> {
        self.slots
            .get(&handle.surface)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.last_fingerprint.as_ref())
    }

    #[must_use]
    pub fn has_pending_resize(&self, handle: InstanceHandle) -> bool {
        self.slots
            .get(&handle.surface)
            .is_some_and(|slot| {
                slot.generation == handle.generation && slot.resize_timer.is_armed()
            })
    }

    /// Returns the live instance for `surface`, creating one when none is ready.
    ///
    /// A failed creation leaves the surface `Uninitialized` so the next layout
    /// pass can retry.
    pub fn acquire(&mut self, surface: &Surface) -> ChartResult<InstanceHandle> {
        if let Some(slot) = self.slots.get(&surface.id) {
            if slot.state == LifecycleState::Ready {
                trace!(surface = %surface.id, "reusing live instance");
                return Ok(InstanceHandle {
                    surface: surface.id,
                    generation: slot.generation,
                });
            }
        }

        self.prune_disposed();

        if !surface.viewport.is_valid() {
            self.slots.insert(surface.id, InstanceSlot::uninitialized());
            return Err(ChartError::InitializationFailure {
                surface: surface.id,
                reason: format!(
                    "surface has no usable area ({}x{})",
                    surface.viewport.width, surface.viewport.height
                ),
            });
        }
        self.init_options.validate()?;

        let instance = match self.engine.create(surface, &self.init_options) {
            Ok(instance) => instance,
            Err(err) => {
                warn!(surface = %surface.id, error = %err, "engine instance creation failed");
                self.slots.insert(surface.id, InstanceSlot::uninitialized());
                return Err(ChartError::InitializationFailure {
                    surface: surface.id,
                    reason: err.to_string(),
                });
            }
        };

        self.next_generation += 1;
        let generation = self.next_generation;
        self.slots.insert(
            surface.id,
            InstanceSlot {
                generation,
                state: LifecycleState::Ready,
                instance: Some(instance),
                last_fingerprint: None,
                resize_timer: DeadlineTimer::default(),
            },
        );
        debug!(
            surface = %surface.id,
            generation,
            width = surface.viewport.width,
            height = surface.viewport.height,
            "engine instance ready"
        );
        Ok(InstanceHandle {
            surface: surface.id,
            generation,
        })
    }

    /// Applies `specification` unless its fingerprint matches the last applied one.
    ///
    /// `options.force` bypasses the fingerprint gate. The stored fingerprint
    /// only advances when the engine accepts the specification.
    pub fn apply(
        &mut self,
        handle: InstanceHandle,
        specification: &Specification,
        options: ApplyOptions,
    ) -> ChartResult<ApplyOutcome> {
        let slot = ready_slot(&mut self.slots, handle)?;
        let candidate = fingerprint(specification);
        if !options.force && !should_apply(slot.last_fingerprint.as_ref(), &candidate) {
            trace!(surface = %handle.surface, "specification unchanged; skipping apply");
            return Ok(ApplyOutcome::Skipped);
        }

        let Some(instance) = slot.instance.as_mut() else {
            return Err(ChartError::StaleHandle {
                surface: handle.surface,
            });
        };
        self.engine
            .apply(instance, specification, options)
            .map_err(|err| {
                warn!(surface = %handle.surface, error = %err, "engine rejected specification");
                ChartError::UpdateFailure {
                    top_level_keys: specification.top_level_keys(),
                    reason: err.to_string(),
                }
            })?;

        slot.last_fingerprint = Some(candidate);
        debug!(
            surface = %handle.surface,
            full_replace = options.full_replace,
            defer_visual_update = options.defer_visual_update,
            forced = options.force,
            "applied specification"
        );
        Ok(ApplyOutcome::Applied)
    }

    /// Schedules a trailing-edge resize. Returns `false` for handles that are not ready.
    pub fn request_resize(&mut self, handle: InstanceHandle) -> bool {
        let now = self.clock.now();
        let Ok(slot) = ready_slot(&mut self.slots, handle) else {
            trace!(surface = %handle.surface, "ignoring resize request for inactive handle");
            return false;
        };
        slot.resize_timer.schedule(now, self.resize_debounce);
        true
    }

    /// Issues every resize whose debounce window has elapsed.
    ///
    /// Failures are logged and swallowed; the next layout pass retries.
    /// Returns the number of resize calls made.
    pub fn poll_resizes(&mut self) -> usize {
        let now = self.clock.now();
        let mut issued = 0;
        for (surface, slot) in &mut self.slots {
            if slot.state != LifecycleState::Ready || !slot.resize_timer.fire_if_due(now) {
                continue;
            }
            let Some(instance) = slot.instance.as_mut() else {
                continue;
            };
            issued += 1;
            if let Err(err) = self.engine.resize(instance) {
                let failure = ChartError::ResizeFailure {
                    surface: *surface,
                    reason: err.to_string(),
                };
                warn!(error = %failure, "skipping failed resize until next layout pass");
            }
        }
        issued
    }

    pub fn dispatch_action(
        &mut self,
        handle: InstanceHandle,
        action: &EngineAction,
    ) -> ChartResult<()> {
        let slot = ready_slot(&mut self.slots, handle)?;
        let Some(instance) = slot.instance.as_mut() else {
            return Err(ChartError::StaleHandle {
                surface: handle.surface,
            });
        };
        self.engine
            .dispatch_action(instance, action)
            .map_err(|err| ChartError::UpdateFailure {
                top_level_keys: Vec::new(),
                reason: format!("action {action:?} failed: {err}"),
            })
    }

    /// Cancels pending work and releases the instance.
    ///
    /// Returns `false`, doing nothing, when the handle was already disposed or
    /// never became ready.
    pub fn dispose(&mut self, handle: InstanceHandle) -> bool {
        let Some(slot) = self.slots.get_mut(&handle.surface) else {
            return false;
        };
        if slot.generation != handle.generation || slot.state != LifecycleState::Ready {
            trace!(surface = %handle.surface, "dispose on inactive handle is a no-op");
            return false;
        }

        slot.resize_timer.cancel();
        slot.state = LifecycleState::Disposed;
        slot.last_fingerprint = None;
        if let Some(instance) = slot.instance.take() {
            self.engine.dispose(instance);
        }
        debug!(surface = %handle.surface, generation = handle.generation, "disposed instance");
        true
    }

    /// Disposes every live instance. Returns how many were released.
    pub fn dispose_all(&mut self) -> usize {
        let live: Vec<InstanceHandle> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.state == LifecycleState::Ready)
            .map(|(surface, slot)| InstanceHandle {
                surface: *surface,
                generation: slot.generation,
            })
            .collect();
        live.into_iter().filter(|handle| self.dispose(*handle)).count()
    }

    fn prune_disposed(&mut self) {
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.state != LifecycleState::Disposed);
        let pruned = before - self.slots.len();
        if pruned > 0 {
            trace!(pruned, "pruned disposed instance slots");
        }
    }
}

fn ready_slot<I>(
    slots: &mut IndexMap<SurfaceId, InstanceSlot<I>>,
    handle: InstanceHandle,
) -> ChartResult<&mut InstanceSlot<I>> {
    slots
        .get_mut(&handle.surface)
        .filter(|slot| slot.generation == handle.generation && slot.state == LifecycleState::Ready)
        .ok_or(ChartError::StaleHandle {
            surface: handle.surface,
        })
}
