use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;

const STATUS_TEXT: &str = "Discord Music Bot is running!";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { STATUS_TEXT }))
}

/// Servidor HTTP de health check para el orquestador
pub async fn serve(config: &Config) -> Result<()> {
    let address = format!("{}:{}", config.health_host, config.health_port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("no se pudo abrir {}", address))?;

    info!("🩺 Health check escuchando en http://{}", address);
    axum::serve(listener, router()).await?;
    Ok(())
}

/// Consulta el health check de una instancia en marcha (`--health-check`)
pub async fn check(config: &Config) -> Result<()> {
    let host = if config.health_host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        config.health_host.as_str()
    };
    let url = format!("http://{}:{}/", host, config.health_port);

    let body = reqwest::get(&url)
        .await
        .context("el health check no responde")?
        .error_for_status()?
        .text()
        .await?;

    if body.contains(STATUS_TEXT) {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("Respuesta inesperada del health check");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(port: u16) -> Config {
        Config {
            health_host: "127.0.0.1".to_string(),
            health_port: port,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn check_accepts_a_running_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move { axum::serve(listener, router()).await });

        check(&local(port)).await.unwrap();
    }

    #[tokio::test]
    async fn check_rejects_an_error_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let failing = Router::new().route(
            "/",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, STATUS_TEXT) }),
        );
        tokio::spawn(async move { axum::serve(listener, failing).await });

        assert!(check(&local(port)).await.is_err());
    }

    #[tokio::test]
    async fn check_fails_without_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(check(&local(port)).await.is_err());
    }
}
