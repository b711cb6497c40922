use anyhow::Result;
use pack_server::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env()?;
    if settings.jwt_secret.is_none() {
        tracing::warn!("AUTH_JWT_SECRET is not set, every content request will be rejected with 401");
    }

    let ax = pack_server::build(settings)?;

    let host = ax
        .app()
        .get("http.host")
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = ax
        .app()
        .get("http.port")
        .unwrap_or_else(|| "1337".to_string());

    ax.listen(format!("{host}:{port}")).await?;

    Ok(())
}
