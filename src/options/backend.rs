use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which culler runs the kernel.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Rayon thread pool.
    Cpu,
    /// wgpu compute dispatch.
    Gpu,
    /// GPU when an adapter is available, CPU otherwise.
    #[default]
    Auto,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[schemars(title = "Backend", inline)]
#[serde(default)]
/// Backend selection.
pub struct BackendOptions {
    /// Culler to use.
    #[schemars(title = "Backend")]
    pub kind: BackendKind,
    /// Ask for a low-power (usually integrated) adapter.
    #[schemars(skip)]
    pub low_power: bool,
}
