mod app;
mod config;
mod error;
mod local_state;
mod logging;
mod ui;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    logging::init(&config)?;
    tracing::info!(base_url = %config.base_url, role = ?config.role, "starting console");

    let captcha = engine::CaptchaMode::resolve(
        config.recaptcha_enabled,
        config.recaptcha_site_key.as_deref(),
    )?;
    let mut app = app::App::new(config, captcha)?;
    app.run().await?;
    Ok(())
}
