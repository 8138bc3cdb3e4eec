//! Participants service entry point.

use survey_common::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    survey_server::init_tracing();
    info!("Starting participants service...");

    let config = Config::load()?;
    let db = survey_server::connect_database(&config).await?;

    let app = survey_server::participants_app(&config, &db);
    survey_server::serve(app, &config.server.host, config.server.participants_port).await
}
