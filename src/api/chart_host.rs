use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{
    Alignment, DataSource, FieldMapping, NormalizeWarning, Normalized, Normalizer, SeriesSource,
    Surface, SurfaceId, align,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    ClickDisambiguator, ClickIntent, ClickTarget, Clock, SelectionState, SystemClock, TargetKind,
};
use crate::render::{ApplyOptions, ChartEngine, EngineEvent};
use crate::spec::{Specification, assemble_specification};

use super::{ApplyOutcome, HostConfig, InstanceHandle, InstanceManager, LifecycleState};

type SingleClickCallback = Box<dyn FnMut(&ClickTarget)>;
type DoubleClickCallback = Box<dyn FnMut(&str, InstanceHandle)>;

/// Work performed by one [`ChartHost::poll_timers`] pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimerReport {
    pub resizes: usize,
    pub intents: Vec<(InstanceHandle, ClickIntent)>,
}

struct BoundInteraction<C: Clock> {
    handle: InstanceHandle,
    disambiguator: ClickDisambiguator<C>,
}

/// Host-facing entry point tying data preparation, instance lifecycle and
/// click interaction together for any number of surfaces.
pub struct ChartHost<E: ChartEngine, C: Clock + Clone = SystemClock> {
    config: HostConfig,
    normalizer: Normalizer,
    manager: InstanceManager<E, C>,
    clock: C,
    interactions: IndexMap<SurfaceId, BoundInteraction<C>>,
    on_single_click: Option<SingleClickCallback>,
    on_legend_double_click: Option<DoubleClickCallback>,
    on_series_double_click: Option<DoubleClickCallback>,
}

impl<E: ChartEngine> ChartHost<E, SystemClock> {
    pub fn with_system_clock(engine: E, config: HostConfig) -> ChartResult<Self> {
        Self::new(engine, SystemClock::new(), config)
    }
}

impl<E: ChartEngine, C: Clock + Clone> ChartHost<E, C> {
    pub fn new(engine: E, clock: C, config: HostConfig) -> ChartResult<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(config.normalizer),
            manager: InstanceManager::from_config(engine, clock.clone(), &config),
            clock,
            config,
            interactions: IndexMap::new(),
            on_single_click: None,
            on_legend_double_click: None,
            on_series_double_click: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    #[must_use]
    pub fn manager(&self) -> &InstanceManager<E, C> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut InstanceManager<E, C> {
        &mut self.manager
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        self.manager.engine()
    }

    pub fn normalize(&self, data: &DataSource, mapping: &FieldMapping) -> ChartResult<Normalized> {
        self.normalizer.normalize(data, mapping)
    }

    pub fn build_aligned_series(&self, sources: &[SeriesSource]) -> ChartResult<Alignment> {
        align(sources)
    }

    /// Normalizes, aligns and assembles a specification of series type `kind`.
    pub fn build_specification(
        &self,
        data: &DataSource,
        mapping: &FieldMapping,
        kind: &str,
    ) -> ChartResult<(Specification, Vec<NormalizeWarning>)> {
        let normalized = self.normalize(data, mapping)?;
        let alignment = align(&normalized.series)?;
        let spec = assemble_specification(&alignment, kind, &normalized.series);
        Ok((spec, normalized.warnings))
    }

    /// Acquires the instance for `surface` and binds click handling to it.
    ///
    /// Binding a different instance than before resets selection state.
    pub fn acquire_instance(&mut self, surface: &Surface) -> ChartResult<InstanceHandle> {
        let handle = self.manager.acquire(surface)?;
        match self.interactions.get_mut(&surface.id) {
            Some(bound) if bound.handle == handle => {}
            Some(bound) => {
                debug!(surface = %surface.id, "instance switched; resetting selection");
                bound.disambiguator.reset();
                bound.handle = handle;
            }
            None => {
                self.interactions.insert(
                    surface.id,
                    BoundInteraction {
                        handle,
                        disambiguator: ClickDisambiguator::new(
                            self.clock.clone(),
                            self.config.click,
                        ),
                    },
                );
            }
        }
        Ok(handle)
    }

    pub fn apply_specification(
        &mut self,
        handle: InstanceHandle,
        specification: &Specification,
    ) -> ChartResult<ApplyOutcome> {
        self.apply_specification_with(handle, specification, self.config.apply)
    }

    pub fn apply_specification_with(
        &mut self,
        handle: InstanceHandle,
        specification: &Specification,
        options: ApplyOptions,
    ) -> ChartResult<ApplyOutcome> {
        let outcome = self.manager.apply(handle, specification, options)?;
        if outcome == ApplyOutcome::Applied {
            let names = specification.series_names();
            if !names.is_empty() {
                if let Some(bound) = self.bound_mut(handle) {
                    bound.disambiguator.set_series_names(names);
                }
            }
        }
        Ok(outcome)
    }

    pub fn request_resize(&mut self, handle: InstanceHandle) -> bool {
        self.manager.request_resize(handle)
    }

    /// Cancels the surface's click and resize timers, then disposes the instance.
    pub fn dispose_instance(&mut self, handle: InstanceHandle) -> bool {
        if self
            .interactions
            .get(&handle.surface())
            .is_some_and(|bound| bound.handle == handle)
        {
            if let Some(mut bound) = self.interactions.shift_remove(&handle.surface()) {
                bound.disambiguator.reset();
            }
        }
        self.manager.dispose(handle)
    }

    #[must_use]
    pub fn state(&self, surface: SurfaceId) -> LifecycleState {
        self.manager.state(surface)
    }

    #[must_use]
    pub fn selection(&self, handle: InstanceHandle) -> Option<&SelectionState> {
        self.interactions
            .get(&handle.surface())
            .filter(|bound| bound.handle == handle)
            .map(|bound| bound.disambiguator.selection())
    }

    /// Overrides the legend names used when isolating or restoring series.
    pub fn set_series_names(&mut self, handle: InstanceHandle, names: Vec<String>) {
        if let Some(bound) = self.bound_mut(handle) {
            bound.disambiguator.set_series_names(names);
        }
    }

    pub fn on_single_click(&mut self, callback: impl FnMut(&ClickTarget) + 'static) {
        self.on_single_click = Some(Box::new(callback));
    }

    pub fn on_legend_double_click(
        &mut self,
        callback: impl FnMut(&str, InstanceHandle) + 'static,
    ) {
        self.on_legend_double_click = Some(Box::new(callback));
    }

    pub fn on_series_double_click(
        &mut self,
        callback: impl FnMut(&str, InstanceHandle) + 'static,
    ) {
        self.on_series_double_click = Some(Box::new(callback));
    }

    /// Feeds an engine event through the click disambiguator and dispatches
    /// the resolved intent, if any.
    pub fn handle_engine_event(
        &mut self,
        handle: InstanceHandle,
        event: &EngineEvent,
    ) -> ChartResult<Option<ClickIntent>> {
        if !self.manager.is_ready(handle) {
            return Err(ChartError::StaleHandle {
                surface: handle.surface(),
            });
        }
        let Some(bound) = self.bound_mut(handle) else {
            return Err(ChartError::StaleHandle {
                surface: handle.surface(),
            });
        };
        let intent = bound.disambiguator.handle_click(event.click_event());
        if let Some(intent) = &intent {
            self.dispatch_intent(handle, intent)?;
        }
        Ok(intent)
    }

    /// Runs due resize and click timers against the injected clock.
    ///
    /// Bindings whose instance is no longer ready, for example after a dispose
    /// through [`Self::manager_mut`], are cancelled and dropped first.
    pub fn poll_timers(&mut self) -> ChartResult<TimerReport> {
        let resizes = self.manager.poll_resizes();
        self.drop_inactive_bindings();
        let mut intents = Vec::new();
        for bound in self.interactions.values_mut() {
            if let Some(intent) = bound.disambiguator.poll() {
                intents.push((bound.handle, intent));
            }
        }
        for (handle, intent) in &intents {
            self.dispatch_intent(*handle, intent)?;
        }
        Ok(TimerReport { resizes, intents })
    }

    fn bound_mut(&mut self, handle: InstanceHandle) -> Option<&mut BoundInteraction<C>> {
        self.interactions
            .get_mut(&handle.surface())
            .filter(|bound| bound.handle == handle)
    }

    fn drop_inactive_bindings(&mut self) {
        let manager = &self.manager;
        self.interactions.retain(|surface, bound| {
            if manager.is_ready(bound.handle) {
                return true;
            }
            debug!(surface = %surface, "dropping click binding of inactive instance");
            bound.disambiguator.cancel_pending();
            false
        });
    }

    fn dispatch_intent(&mut self, handle: InstanceHandle, intent: &ClickIntent) -> ChartResult<()> {
        if !self.manager.is_ready(handle) {
            return Err(ChartError::StaleHandle {
                surface: handle.surface(),
            });
        }
        for action in intent.actions() {
            self.manager.dispatch_action(handle, action)?;
        }
        trace!(surface = %handle.surface(), ?intent, "dispatching click intent");

        match intent {
            ClickIntent::SingleClick(target) => {
                if let Some(callback) = self.on_single_click.as_mut() {
                    callback(target);
                }
            }
            ClickIntent::DoubleClick { target, .. } => {
                let callback = match target.kind {
                    TargetKind::Legend => self.on_legend_double_click.as_mut(),
                    TargetKind::Series => self.on_series_double_click.as_mut(),
                };
                if let Some(callback) = callback {
                    callback(&target.name, handle);
                }
            }
            ClickIntent::MultiSelect { .. } => {}
        }
        Ok(())
    }
}
