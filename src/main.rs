use anyhow::Context;
use staybnb_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Staybnb settings")?;
    staybnb_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        address = %settings.server.bind_address(),
        "staybnb-app starting"
    );

    staybnb_app::run(settings).await
}
