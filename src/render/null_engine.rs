use crate::core::{Surface, SurfaceId};
use crate::error::EngineError;
use crate::render::{ApplyOptions, ChartEngine, EngineAction, InitOptions};
use crate::spec::Specification;

/// Instance handed out by [`NullEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullInstance {
    pub id: u64,
    pub surface: SurfaceId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedSpecification {
    pub instance_id: u64,
    pub specification: Specification,
    pub options: ApplyOptions,
}

/// Headless engine used by tests and hosts without a drawing backend.
///
/// It records every call and still rejects specifications that are not JSON
/// objects, so apply failures can be exercised without a real engine.
#[derive(Debug, Default)]
pub struct NullEngine {
    pub created: usize,
    pub disposed: Vec<u64>,
    pub resized: usize,
    pub applied: Vec<AppliedSpecification>,
    pub actions: Vec<EngineAction>,
    pub fail_create: Option<String>,
    pub fail_resize: Option<String>,
    next_instance_id: u64,
}

impl NullEngine {
    #[must_use]
    pub fn apply_count(&self) -> usize {
        self.applied.len()
    }

    #[must_use]
    pub fn last_applied(&self) -> Option<&AppliedSpecification> {
        self.applied.last()
    }
}

impl ChartEngine for NullEngine {
    type Instance = NullInstance;

    fn create(
        &mut self,
        surface: &Surface,
        _options: &InitOptions,
    ) -> Result<NullInstance, EngineError> {
        if let Some(reason) = &self.fail_create {
            return Err(EngineError::new(reason.clone()));
        }
        self.next_instance_id += 1;
        self.created += 1;
        Ok(NullInstance {
            id: self.next_instance_id,
            surface: surface.id,
        })
    }

    fn apply(
        &mut self,
        instance: &mut NullInstance,
        specification: &Specification,
        options: ApplyOptions,
    ) -> Result<(), EngineError> {
        if !specification.as_value().is_object() {
            return Err(EngineError::new("specification root must be an object"));
        }
        self.applied.push(AppliedSpecification {
            instance_id: instance.id,
            specification: specification.clone(),
            options,
        });
        Ok(())
    }

    fn resize(&mut self, _instance: &mut NullInstance) -> Result<(), EngineError> {
        if let Some(reason) = &self.fail_resize {
            return Err(EngineError::new(reason.clone()));
        }
        self.resized += 1;
        Ok(())
    }

    fn dispose(&mut self, instance: NullInstance) {
        self.disposed.push(instance.id);
    }

    fn dispatch_action(
        &mut self,
        _instance: &mut NullInstance,
        action: &EngineAction,
    ) -> Result<(), EngineError> {
        self.actions.push(action.clone());
        Ok(())
    }
}
