//! Culling options with TOML preset support.
//!
//! Kernel constants, backend selection, and the demo camera/scene are
//! consolidated here. Options serialize to/from TOML so a run can be
//! reproduced from a single file.

mod backend;
mod camera;
mod kernel;
mod scene;

use std::path::Path;

pub use backend::{BackendKind, BackendOptions};
pub use camera::CameraOptions;
pub use kernel::KernelOptions;
pub use scene::SceneOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CullError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[kernel]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Cull kernel constants.
    pub kernel: KernelOptions,
    /// Backend selection.
    pub backend: BackendOptions,
    /// Camera used to derive the frustum.
    pub camera: CameraOptions,
    /// Demo scene layout.
    pub scene: SceneOptions,
}

impl Options {
    /// Generate JSON Schema describing the exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CullError::Io`] if the file cannot be read and
    /// [`CullError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, CullError> {
        let content = std::fs::read_to_string(path).map_err(CullError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CullError::OptionsParse`] on malformed input.
    pub fn from_toml(content: &str) -> Result<Self, CullError> {
        toml::from_str(content)
            .map_err(|e| CullError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`CullError::OptionsParse`] if serialization fails and
    /// [`CullError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CullError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CullError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(CullError::Io)?;
        }
        std::fs::write(path, content).map_err(CullError::Io)
    }
}
