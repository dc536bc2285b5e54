//! # Application State
//!
//! Shared state for the axum application: backend repositories, the
//! gateway client, geolocation/FX services, and the checkout flow.

use crate::backend::RestBackend;
use crate::checkout::CheckoutFlow;
use crate::email::EmailClient;
use std::sync::Arc;
use store_core::{
    SharedOrderRepository, SharedPaymentRepository, SharedProductRepository,
    SharedPromoRepository,
};
use store_gateway::GatewayClient;
use store_geo::{CountryResolver, FxClient};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Relational backend base URL
    pub backend_url: String,
    /// Backend API key
    pub backend_api_key: String,
    /// Geolocation collaborator URL
    pub geo_url: String,
    /// FX rate collaborator URL
    pub fx_url: String,
    /// Email microservice URL
    pub email_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321/rest/v1".to_string()),
            backend_api_key: std::env::var("BACKEND_API_KEY").unwrap_or_default(),
            geo_url: std::env::var("GEO_URL")
                .unwrap_or_else(|_| "https://geo.example/json".to_string()),
            fx_url: std::env::var("FX_URL")
                .unwrap_or_else(|_| "https://fx.example/latest/USD".to_string()),
            email_url: std::env::var("EMAIL_URL")
                .unwrap_or_else(|_| "http://localhost:8090/send".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout orchestrator
    pub flow: Arc<CheckoutFlow>,
    /// Promo code lookups
    pub promos: SharedPromoRepository,
    /// Country resolver (single-flight)
    pub resolver: Arc<CountryResolver>,
    /// FX display conversion
    pub fx: Arc<FxClient>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let backend = Arc::new(RestBackend::new(
            &config.backend_url,
            &config.backend_api_key,
        ));
        let orders: SharedOrderRepository = backend.clone();
        let payments: SharedPaymentRepository = backend.clone();
        let products: SharedProductRepository = backend.clone();
        let promos: SharedPromoRepository = backend;

        let gateway = Arc::new(
            GatewayClient::from_env()
                .map_err(|e| anyhow::anyhow!("Failed to initialize gateway: {e}"))?,
        );
        let email = Arc::new(EmailClient::new(&config.email_url));

        let resolver = Arc::new(CountryResolver::new(&config.geo_url));
        // Resolution starts at process init, not on first consumer call
        Arc::clone(&resolver).spawn_prefetch();

        let fx = Arc::new(FxClient::new(&config.fx_url));

        let flow = Arc::new(CheckoutFlow::new(orders, payments, products, gateway, email));

        Ok(Self {
            flow,
            promos,
            resolver,
            fx,
            config,
        })
    }
}
