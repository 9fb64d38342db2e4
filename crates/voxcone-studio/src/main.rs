mod cornell;

use voxcone_engine::device::GpuInit;
use voxcone_engine::logging::{init_logging, LoggingConfig};
use voxcone_engine::scene::{SceneConfig, SceneHost};
use voxcone_engine::window::{Runtime, RuntimeConfig};

use cornell::CornellScene;

fn main() {
    init_logging(LoggingConfig::default());

    let host = SceneHost::new(|ctx| CornellScene::new(ctx, SceneConfig::default()));
    if let Err(e) = Runtime::run(RuntimeConfig::default(), GpuInit::default(), host) {
        // reported, not propagated; exit status stays 0
        log::error!("[FATAL] {e:#}");
    }
}
