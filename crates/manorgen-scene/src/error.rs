use thiserror::Error;

use manorgen_logic::constants::ConstantsError;
use manorgen_logic::layout::LayoutError;

use crate::scene::SceneError;

/// Why a generate or dispose request failed.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The scene cannot accept changes. Nothing was torn down.
    #[error("scene context is not available")]
    MissingContext,
    /// A previous generate never finished.
    #[error("a building is already being generated")]
    Busy,
    #[error("invalid build constants: {0}")]
    Constants(#[from] ConstantsError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}
