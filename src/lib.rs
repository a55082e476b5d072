pub mod error;
pub mod models;
pub mod modules;
pub mod utils;

use std::sync::Arc;

use error::{AppError, AppResult};
use models::{AppConfig, GenerationOutcome, GenerationRequest};
use modules::{logger, FileStore, GenerationController, LifecycleHub, QuotaMonitor, QuotaStore};
use tracing::{error, info};
use utils::clock::SystemClock;

pub use models::QuotaState;

const TOKEN_ENV: &str = "MEAL_PLANNER_TOKEN";

/// Generate one meal from the description given on the command line
pub fn run() -> AppResult<()> {
    let data_dir = modules::storage::get_data_dir()?;
    logger::init_logger(&data_dir);

    let config = match modules::config::load_app_config_from(&data_dir) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config, using defaults: {}", e);
            AppConfig::new()
        }
    };

    let description = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let mut request = GenerationRequest::new(description);
    let token = match resolve_token(&request, std::env::var(TOKEN_ENV).ok())? {
        Some(token) => token,
        None => {
            eprintln!("Describe the meal you'd like to eat.");
            println!(
                "{}",
                serde_json::to_string_pretty(&GenerationOutcome::InvalidInput)?
            );
            return Ok(());
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let storage = Arc::new(FileStore::in_dir(&data_dir));
        let quota = Arc::new(QuotaStore::new(storage, Arc::new(SystemClock)));
        let lifecycle = LifecycleHub::new();
        let monitor = QuotaMonitor::start(quota.clone(), &lifecycle, config.recheck_interval());

        if quota.is_limited() {
            info!("Generation skipped, daily limit already reached");
            print_limit_notice(&quota);
            monitor.shutdown();
            return Ok(());
        }

        let controller = GenerationController::from_config(&config, quota.clone());
        let outcome = controller.generate(&mut request, &token).await;

        match &outcome {
            GenerationOutcome::LimitExceeded => print_limit_notice(&quota),
            GenerationOutcome::InvalidInput => eprintln!("Describe the meal you'd like to eat."),
            GenerationOutcome::Failed { .. } => {
                eprintln!("Something went wrong generating your meal. Please try again.")
            }
            GenerationOutcome::Succeeded { .. } => {}
        }
        println!("{}", serde_json::to_string_pretty(&outcome)?);

        monitor.shutdown();
        Ok::<(), AppError>(())
    })
}

/// The token is only required once the request is worth sending
fn resolve_token(request: &GenerationRequest, token: Option<String>) -> AppResult<Option<String>> {
    if !request.is_valid() {
        return Ok(None);
    }
    token
        .filter(|t| !t.trim().is_empty())
        .map(Some)
        .ok_or_else(|| AppError::Config(format!("{} is not set", TOKEN_ENV)))
}

fn print_limit_notice(quota: &QuotaStore) {
    if quota.should_show_alert() {
        eprintln!("Daily limit reached. You've reached your limit for today. You can use this again tomorrow.");
        quota.acknowledge_alert();
    } else {
        eprintln!("Daily limit reached.");
    }
}
