use cors_static_server::{bootstrap, logger, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging).map_err(|e| e as Box<dyn std::error::Error>)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers.get());
        tracing::debug!(workers = workers.get(), "using configured worker threads");
    }

    let runtime = runtime_builder.build()?;

    let result = runtime.block_on(bootstrap::run(cfg));
    bootstrap::shutdown_runtime(runtime);
    result?;
    Ok(())
}
