use anyhow::Context;
use tracing_subscriber::EnvFilter;

use heart_risk::{config::AppConfig, pipeline, server, Model, PatientInput};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::resolve()?;

    let mdl = Model::load(&cfg.model_path)
        .with_context(|| format!("cannot serve without a valid model at {}", cfg.model_path.display()))?;
    tracing::info!(
        "loaded {} model; feature_names[{}]: {:?}",
        mdl.backend_name(),
        mdl.feature_names().len(),
        mdl.feature_names()
    );

    // Warmup on the form's starting values
    let warm = pipeline::assess(&mdl, &PatientInput::default()).context("warmup prediction failed")?;
    tracing::info!("warmup ok: {}", warm.risk);

    let app = server::router(server::AppState::new(mdl));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    tracing::info!("listening on http://{}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
