use triage_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = triage_api::setup::initialize_app(config.clone()).await?;

    triage_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
