//! Backend selection from options.

use crate::cull::{CpuCuller, Culler};
use crate::error::CullError;
use crate::gpu::{ComputeContext, GpuCuller};
use crate::options::{BackendKind, Options};

/// Build the culler the options ask for.
///
/// [`BackendKind::Auto`] tries the GPU first and falls back to the CPU
/// kernel when no usable adapter exists.
///
/// # Errors
///
/// Returns [`CullError`] when [`BackendKind::Gpu`] is requested and the GPU
/// cannot be initialized.
pub async fn create_culler(
    options: &Options,
) -> Result<Box<dyn Culler>, CullError> {
    let capacity = options.kernel.initial_capacity;
    match options.backend.kind {
        BackendKind::Cpu => Ok(Box::new(CpuCuller::new(capacity))),
        BackendKind::Gpu => Ok(Box::new(gpu_culler(options).await?)),
        BackendKind::Auto => match gpu_culler(options).await {
            Ok(culler) => Ok(Box::new(culler)),
            Err(e) => {
                log::warn!("GPU culling unavailable ({e}), using CPU");
                Ok(Box::new(CpuCuller::new(capacity)))
            }
        },
    }
}

async fn gpu_culler(options: &Options) -> Result<GpuCuller, CullError> {
    let context = ComputeContext::new(options.backend.low_power).await?;
    GpuCuller::new(context, options.kernel.initial_capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_backend_needs_no_device() {
        let mut options = Options::default();
        options.backend.kind = BackendKind::Cpu;
        let culler = pollster::block_on(create_culler(&options)).unwrap();
        assert_eq!(culler.name(), "cpu");
    }

    #[test]
    fn auto_backend_prefers_a_usable_gpu() {
        let has_gpu = pollster::block_on(ComputeContext::new(false)).is_ok();
        let culler =
            pollster::block_on(create_culler(&Options::default())).unwrap();
        let expected = if has_gpu { "gpu" } else { "cpu" };
        assert_eq!(culler.name(), expected);
    }

    #[test]
    fn gpu_backend_builds_when_an_adapter_exists() {
        if pollster::block_on(ComputeContext::new(false)).is_err() {
            return;
        }
        let mut options = Options::default();
        options.backend.kind = BackendKind::Gpu;
        let culler = pollster::block_on(create_culler(&options))
            .unwrap_or_else(|e| panic!("GPU culler failed to build: {e}"));
        assert_eq!(culler.name(), "gpu");
    }
}
