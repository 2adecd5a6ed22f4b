mod events;
mod null_engine;
mod options;

pub use events::{EngineAction, EngineEvent};
pub use null_engine::{AppliedSpecification, NullEngine, NullInstance};
pub use options::{ApplyOptions, InitOptions, RendererKind};

use crate::core::Surface;
use crate::error::EngineError;
use crate::spec::Specification;

/// Contract implemented by the external rendering engine.
///
/// The engine owns layout and painting; this crate only drives an instance's
/// lifecycle and hands it fully assembled specifications.
pub trait ChartEngine {
    type Instance;

    fn create(
        &mut self,
        surface: &Surface,
        options: &InitOptions,
    ) -> Result<Self::Instance, EngineError>;

    fn apply(
        &mut self,
        instance: &mut Self::Instance,
        specification: &Specification,
        options: ApplyOptions,
    ) -> Result<(), EngineError>;

    fn resize(&mut self, instance: &mut Self::Instance) -> Result<(), EngineError>;

    fn dispose(&mut self, instance: Self::Instance);

    fn dispatch_action(
        &mut self,
        instance: &mut Self::Instance,
        action: &EngineAction,
    ) -> Result<(), EngineError>;
}
