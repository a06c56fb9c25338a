use {
    churnscope::{
        config::Config,
        dashboard::Dashboard,
        dataset, profile,
        simulation::{HttpScorer, SimulationHandle, SimulationMachine, SimulationSettings},
        ui,
    },
    std::sync::Arc,
};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Logs go to stderr; the UI draws on the alternate screen
    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    } else {
        let mut quiet = env_logger::Builder::new();
        quiet.filter_level(log::LevelFilter::Warn);
        quiet
    };
    builder.target(env_logger::Target::Stderr).init();

    log::info!("🚀 Starting churnscope...");
    log::info!("📊 Configuration:");
    log::info!("   SCORING_URL: {}", config.scoring_url);
    log::info!("   DATASET_PATH: {}", config.dataset_path);
    log::info!("   DEBOUNCE_MS: {}", config.debounce_ms);
    log::info!("   SCORING_TIMEOUT_SECS: {}", config.scoring_timeout_secs);
    log::info!("   TOP_FACTORS: {}", config.top_factors);

    let records = match dataset::load_records(&config.dataset_path) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("⚠️  Could not load dataset {}: {} (continuing without it)", config.dataset_path, e);
            Vec::new()
        }
    };
    let dashboard = Dashboard::new(records);

    let scorer = HttpScorer::new(&config.scoring_url, config.scoring_timeout(), config.top_factors)?;
    log::info!("✅ Scoring endpoint: {}", scorer.endpoint());

    let settings = SimulationSettings {
        quiet_period: config.quiet_period(),
        required_attributes: profile::required_attributes(),
    };
    let (machine, inbox) = SimulationMachine::new(profile::default_profile(), Arc::new(scorer), settings);
    let (handle, join) = SimulationHandle::spawn(machine, inbox, config.command_channel_buffer);

    let ui_result = ui::run_ui(handle.clone(), dashboard).await;

    handle.shutdown().await;
    if let Err(e) = join.await {
        log::error!("❌ Simulation task failed: {}", e);
    }

    if let Err(e) = ui_result {
        log::error!("❌ UI error: {}", e);
        return Err(e);
    }

    log::info!("👋 churnscope stopped");
    Ok(())
}
