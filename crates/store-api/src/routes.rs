//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - POST /api/v1/checkout - Cart checkout (order + gateway intent)
/// - POST /api/v1/checkout/buy-now - Single-product direct purchase
/// - POST /api/v1/payments/verify - Payment signature verification
/// - GET  /api/v1/promos/{code} - Promo code validation
/// - GET  /api/v1/geo - Resolved country + shopping supportedness
/// - GET  /api/v1/price - Display-currency quote for a USD amount
pub fn create_router(state: AppState) -> Router {
    // Storefront origins vary per deployment; kept permissive here
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/checkout", post(handlers::create_checkout))
        .route("/checkout/buy-now", post(handlers::buy_now))
        .route("/payments/verify", post(handlers::verify_payment))
        .route("/promos/{code}", get(handlers::get_promo))
        .route("/geo", get(handlers::get_geo))
        .route("/price", get(handlers::get_price));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutFlow;
    use crate::email::EmailClient;
    use crate::state::AppConfig;
    use axum_test::TestServer;
    use std::sync::Arc;
    use store_core::{
        MemoryOrderRepository, MemoryPaymentRepository, MemoryProductRepository,
        MemoryPromoRepository,
    };
    use store_gateway::{GatewayClient, GatewayConfig};
    use store_geo::{CountryResolver, FxClient};

    fn test_state() -> AppState {
        let flow = Arc::new(CheckoutFlow::new(
            Arc::new(MemoryOrderRepository::new()),
            Arc::new(MemoryPaymentRepository::new()),
            Arc::new(MemoryProductRepository::new(vec![])),
            Arc::new(GatewayClient::new(GatewayConfig::new(
                "gwk_test_abc",
                "gws_secret",
            ))),
            Arc::new(EmailClient::new("http://127.0.0.1:1/email")),
        ));

        AppState {
            flow,
            promos: Arc::new(MemoryPromoRepository::new(vec![])),
            // Unreachable collaborators: endpoints must still answer via fallbacks
            resolver: Arc::new(CountryResolver::new("http://127.0.0.1:1/geo")),
            fx: Arc::new(FxClient::new("http://127.0.0.1:1/fx")),
            config: AppConfig::from_env(),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = TestServer::new(create_router(test_state())).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_promo_is_404() {
        let server = TestServer::new(create_router(test_state())).unwrap();

        let response = server.get("/api/v1/promos/BOGUS").await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_geo_falls_back_when_resolver_unreachable() {
        let server = TestServer::new(create_router(test_state())).unwrap();

        let response = server.get("/api/v1/geo").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["country_code"], "US");
        assert_eq!(body["supported"], true);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_is_rejected() {
        let server = TestServer::new(create_router(test_state())).unwrap();

        let response = server
            .post("/api/v1/checkout")
            .json(&serde_json::json!({
                "cart": { "lines": [] },
                "address": {
                    "line1": "12 Kiln Lane",
                    "city": "Asheville",
                    "state": "NC",
                    "postal_code": "28801",
                    "country": "US"
                },
                "customer": {
                    "name": "Maya Ortiz",
                    "email": "maya@example.com",
                    "phone": "+1-555-0100"
                }
            }))
            .await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Cart is empty");
    }
}
