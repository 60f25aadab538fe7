//! Headless culling demo: lays out the ring scene, derives the frustum
//! from the configured camera, and culls it for the configured number of
//! frames. Pass an options TOML path as the only argument to override the
//! defaults.

use std::path::Path;
use std::time::Instant;

use cullpass::backend::create_culler;
use cullpass::camera::Camera;
use cullpass::error::CullError;
use cullpass::options::Options;
use cullpass::scene::{ring_layout, spin_y};

fn load_options() -> Result<Options, CullError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading options from {path}");
            Options::load(Path::new(&path))
        }
        None => Ok(Options::default()),
    }
}

fn run() -> Result<(), CullError> {
    let options = load_options()?;
    let mut culler = pollster::block_on(create_culler(&options))?;
    log::info!("culling on the {} backend", culler.name());

    let frustum = Camera::from_options(&options.camera).frustum();
    let mut records = ring_layout(&options.scene);
    let count = u32::try_from(records.len()).unwrap_or(u32::MAX);
    let params = options.kernel.params(count);

    let mut angle = 0.0_f32;
    for frame in 0..options.scene.frames.max(1) {
        spin_y(&mut records, angle, options.scene.scale);
        angle += options.scene.spin_per_frame;

        let start = Instant::now();
        let result = culler.cull(&frustum, &records, &params)?;
        log::info!(
            "frame {frame}: {}/{count} visible in {:.3} ms",
            result.visible_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        log::debug!("visible: {:?}", result.sorted());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
