use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Scene", inline)]
#[serde(default)]
/// Demo scene: a center instance plus two rings.
pub struct SceneOptions {
    /// Instances on the inner ring.
    #[schemars(title = "Inner Count", range(min = 0, max = 4096))]
    pub inner_count: u32,
    /// Inner ring radius.
    #[schemars(title = "Inner Radius", range(min = 0.0, max = 100.0))]
    pub inner_radius: f32,
    /// Instances on the outer ring.
    #[schemars(title = "Outer Count", range(min = 0, max = 4096))]
    pub outer_count: u32,
    /// Outer ring radius.
    #[schemars(title = "Outer Radius", range(min = 0.0, max = 100.0))]
    pub outer_radius: f32,
    /// Uniform scale baked into every model matrix.
    #[schemars(skip)]
    pub scale: f32,
    /// Frames to simulate.
    #[schemars(skip)]
    pub frames: u32,
    /// Y rotation added per frame, in radians.
    #[schemars(skip)]
    pub spin_per_frame: f32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            inner_count: 10,
            inner_radius: 4.0,
            outer_count: 12,
            outer_radius: 9.5,
            scale: 0.5,
            frames: 1,
            spin_per_frame: 0.01,
        }
    }
}
