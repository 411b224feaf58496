use std::sync::Arc;
use tokio::sync::Notify;

use debug_file_server::config::{self, AppState, Config};
use debug_file_server::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config file path as the only argument
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;
    logger::log_config_source(&config_path);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    // 0 means one worker per core, same as leaving it unset
    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let root_dir = cfg.resolve_root_dir()?;
    if !root_dir.is_dir() {
        logger::log_warning(&format!(
            "Root directory {} does not exist, every file request will 404",
            root_dir.display()
        ));
    }

    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(AppState::new(cfg, root_dir));
    logger::log_server_start(&addr, &state);

    let shutdown = Arc::new(Notify::new());
    server::spawn_shutdown_listener(Arc::clone(&shutdown));
    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}
