use katakosa::api::{app_router, ApiState};
use katakosa::app::App;
use katakosa::config::Config;
use katakosa::persistence::JsonFileStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = App::load(JsonFileStorage::new(&config.data_path))?;
    let counts = app.store().category_counts(chrono::Utc::now());
    log::info!(
        "{} words loaded, {} due for review",
        counts.total,
        counts.due
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app_router(ApiState::new(app))).await?;

    Ok(())
}
