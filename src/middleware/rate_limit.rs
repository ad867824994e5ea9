//! Middleware de Rate Limiting
//!
//! Ventana fija por IP de cliente para prevenir abuso de la API.
//!
//! La IP es la del socket. `X-Forwarded-For` solo se usa con
//! `TRUST_PROXY_HEADERS=true`, cuando un proxy propio reescribe el header;
//! de lo contrario cualquier cliente podría rotarlo para evadir el límite.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::EnvironmentConfig;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[derive(Debug, Clone, Copy)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

/// Estado compartido del rate limiting
#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<Mutex<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
    trust_forwarded: bool,
}

impl RateLimitState {
    pub fn new(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window_duration,
            trust_forwarded: false,
        }
    }

    /// Tomar la IP del cliente de `X-Forwarded-For`
    pub fn trusting_forwarded_header(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window),
        )
        .trusting_forwarded_header(config.trust_proxy_headers)
    }

    /// Registrar una request de `client` y verificar el límite
    pub async fn check_rate_limit(&self, client: &str) -> Result<(), AppError> {
        let mut requests = self.requests.lock().await;
        let now = Instant::now();

        // Limpiar entradas expiradas
        requests.retain(|_, info| now.duration_since(info.window_start) < self.window_duration);

        let info = requests.entry(client.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        if info.requests >= self.max_requests {
            return Err(AppError::RateLimitExceeded);
        }

        info.requests += 1;
        Ok(())
    }
}

/// IP del cliente: primer valor de X-Forwarded-For si se confía en el proxy,
/// si no la dirección del socket
fn client_key(request: &Request, trust_forwarded: bool) -> String {
    if let Some(forwarded) = trust_forwarded
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return forwarded.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware de rate limiting
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request, state.rate_limit.trust_forwarded);
    if let Err(e) = state.rate_limit.check_rate_limit(&client).await {
        log::warn!("⏱️ Rate limit excedido para {}", client);
        return Err(e);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_per_client() {
        let state = RateLimitState::new(2, Duration::from_secs(60));

        assert!(state.check_rate_limit("10.0.0.1").await.is_ok());
        assert!(state.check_rate_limit("10.0.0.1").await.is_ok());
        assert!(matches!(
            state.check_rate_limit("10.0.0.1").await,
            Err(AppError::RateLimitExceeded)
        ));
        assert!(state.check_rate_limit("10.0.0.2").await.is_ok());
    }

    fn request(forwarded: Option<&str>, peer: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/compliance");
        if let Some(ip) = forwarded {
            builder = builder.header("x-forwarded-for", ip);
        }
        let mut request = builder.body(axum::body::Body::empty()).unwrap();
        if let Some(peer) = peer {
            let addr: SocketAddr = peer.parse().unwrap();
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[test]
    fn test_client_key_ignores_forwarded_header_by_default() {
        let req = request(Some("203.0.113.7, 10.0.0.1"), Some("192.168.1.20:51000"));
        assert_eq!(client_key(&req, false), "192.168.1.20");

        let req = request(Some("203.0.113.7"), None);
        assert_eq!(client_key(&req, false), "unknown");
    }

    #[test]
    fn test_client_key_behind_trusted_proxy() {
        let req = request(Some("203.0.113.7, 10.0.0.1"), Some("192.168.1.20:51000"));
        assert_eq!(client_key(&req, true), "203.0.113.7");

        let req = request(Some("  "), Some("192.168.1.20:51000"));
        assert_eq!(client_key(&req, true), "192.168.1.20");
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let state = RateLimitState::new(1, Duration::from_secs(1));
        assert!(state.check_rate_limit("10.0.0.1").await.is_ok());
        assert!(state.check_rate_limit("10.0.0.1").await.is_err());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(state.check_rate_limit("10.0.0.1").await.is_ok());
    }
}
