use chef_overseas_backend::{
    config::{get_config, init_config, LogFormat},
    database::pool::{create_pool, run_migrations},
    error::Result,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Registers the recurring auto-archive run. The scheduler is returned so it
/// stays alive for the lifetime of the server.
async fn schedule_auto_archive(state: &AppState, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let archive_service = state.archive_service.clone();
    let job = Job::new_async(cron, move |_id, _scheduler| {
        let archive_service = archive_service.clone();
        Box::pin(async move {
            match archive_service
                .run_auto_archive(None, chef_overseas_backend::utils::time::now())
                .await
            {
                Ok(report) if !report.errors.is_empty() => {
                    tracing::warn!(errors = ?report.errors, "scheduled auto-archive finished with errors");
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "scheduled auto-archive failed"),
            }
        })
    })?;
    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("Auto-archive scheduled: {}", cron);
    Ok(scheduler)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let app_state = AppState::new(pool);

    if let Some((email, password)) = &config.bootstrap_admin {
        if let Err(e) = app_state.user_service.ensure_admin(email, password).await {
            tracing::warn!("Could not create bootstrap admin: {:?}", e);
        }
    }

    let _scheduler = match config.auto_archive_cron.as_deref() {
        Some(cron) => Some(schedule_auto_archive(&app_state, cron).await?),
        None => None,
    };

    let app = routes::router(app_state, config);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
