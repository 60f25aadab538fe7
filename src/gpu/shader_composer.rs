use std::borrow::Cow;
use std::collections::HashMap;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderDefValue,
    ShaderLanguage, ShaderType,
};

use crate::cull::{DrawIndexedIndirectArgs, PLANE_COUNT, WORKGROUP_SIZE};
use crate::error::CullError;

/// Compute shader running one lane per instance.
pub const FRUSTUM_CULL_SHADER: &str =
    include_str!("../../assets/shaders/compute/frustum_cull.wgsl");
/// Entry point of [`FRUSTUM_CULL_SHADER`].
pub const FRUSTUM_CULL_ENTRY: &str = "cull_instances";

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads all shared WGSL modules at construction time. Consuming shaders
/// use `#import cullpass::module_name` to pull in shared code. Kernel
/// constants are injected as shader defs (`#{WORKGROUP_SIZE}`,
/// `#{PLANE_COUNT}`, `#{COUNTER_WORD}`), keeping the WGSL in lockstep with
/// the Rust side.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition: (source, file_path)
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

impl ShaderComposer {
    /// Composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`CullError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, CullError> {
        let mut composer = Composer::default();

        let modules: &[ModuleDef] = &[ModuleDef {
            source: include_str!("../../assets/shaders/modules/frustum.wgsl"),
            file_path: "modules/frustum.wgsl",
        }];

        for m in modules {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    CullError::Shader(format!(
                        "failed to register shader module '{}': {e}",
                        m.file_path
                    ))
                })?;
        }

        Ok(Self { composer })
    }

    fn shader_defs() -> HashMap<String, ShaderDefValue> {
        HashMap::from([
            (
                "WORKGROUP_SIZE".to_owned(),
                ShaderDefValue::UInt(WORKGROUP_SIZE),
            ),
            (
                "PLANE_COUNT".to_owned(),
                ShaderDefValue::UInt(PLANE_COUNT as u32),
            ),
            (
                "COUNTER_WORD".to_owned(),
                ShaderDefValue::UInt(DrawIndexedIndirectArgs::COUNTER_WORD as u32),
            ),
        ])
    }

    /// Compose a shader source string (which may contain `#import`
    /// directives) into a `wgpu::ShaderModule` ready for pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`CullError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
        file_path: &str,
    ) -> Result<wgpu::ShaderModule, CullError> {
        let naga_module = self.compose_naga(source, file_path)?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader source into a `naga::Module` without creating a wgpu
    /// shader module. Useful for testing shader composition without a GPU
    /// device.
    ///
    /// # Errors
    ///
    /// Returns [`CullError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, CullError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                shader_defs: Self::shader_defs(),
                ..Default::default()
            })
            .map_err(|e| {
                CullError::Shader(format!(
                    "failed to compose shader '{file_path}': {e}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose_cull_shader() -> naga::Module {
        let mut composer = ShaderComposer::new().unwrap();
        composer
            .compose_naga(FRUSTUM_CULL_SHADER, "compute/frustum_cull.wgsl")
            .unwrap_or_else(|e| panic!("cull shader failed to compose: {e}"))
    }

    #[test]
    fn cull_shader_composes_and_validates() {
        let module = compose_cull_shader();
        let _ = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .unwrap();
    }

    #[test]
    fn workgroup_size_comes_from_rust_constant() {
        let module = compose_cull_shader();
        let entry = module
            .entry_points
            .iter()
            .find(|ep| ep.name == FRUSTUM_CULL_ENTRY)
            .unwrap();
        assert_eq!(entry.stage, naga::ShaderStage::Compute);
        assert_eq!(entry.workgroup_size, [WORKGROUP_SIZE, 1, 1]);
    }

    #[test]
    fn uniform_block_sized_from_plane_count() {
        let module = compose_cull_shader();
        let (_, uniforms) = module
            .types
            .iter()
            .find(|(_, ty)| {
                ty.name
                    .as_deref()
                    .is_some_and(|name| name.contains("CullUniforms"))
            })
            .unwrap();
        let naga::TypeInner::Struct { members, span } = &uniforms.inner else {
            panic!("CullUniforms is not a struct");
        };
        assert_eq!(
            *span as usize,
            size_of::<crate::gpu::CullUniforms>()
        );
        let planes = &module.types[members[0].ty];
        let naga::TypeInner::Array { size, .. } = &planes.inner else {
            panic!("planes is not an array");
        };
        assert!(matches!(
            size,
            naga::ArraySize::Constant(n) if n.get() == PLANE_COUNT as u32
        ));
    }

    #[test]
    fn counter_word_is_injected() {
        let module = compose_cull_shader();
        let counter = module
            .constants
            .iter()
            .find(|(_, c)| {
                c.name
                    .as_deref()
                    .is_some_and(|name| name.contains("COUNTER_WORD"))
            })
            .map(|(_, c)| c.init)
            .unwrap();
        assert!(matches!(
            module.global_expressions[counter],
            naga::Expression::Literal(naga::Literal::U32(word))
                if word == DrawIndexedIndirectArgs::COUNTER_WORD as u32
        ));
    }
}
