//! # Request Handlers
//!
//! Axum request handlers for the storefront API: checkout initiation,
//! payment verification, promo lookup, and the geo/price display helpers.

use crate::checkout::CartSnapshot;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use store_core::{Customer, Price, ShippingAddress, StoreError};
use store_gateway::{CheckoutPrompt, PaymentConfirmation, PaymentEvent};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout request
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Cart snapshot taken at checkout time
    pub cart: CartSnapshot,
    /// Shipping address (all fields required)
    pub address: ShippingAddress,
    /// Customer identity for the gateway prefill
    pub customer: Customer,
}

/// Buy-now request (single product, skips the cart)
#[derive(Debug, Deserialize)]
pub struct BuyNowRequest {
    pub product_id: String,
    pub size: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub address: ShippingAddress,
    pub customer: Customer,
}

fn default_quantity() -> u32 {
    1
}

/// Checkout response: the order id plus the gateway modal prompt
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub prompt: CheckoutPrompt,
}

/// Payment verification request, as posted by the client after capture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// Gateway-side order/intent id
    pub order_creation_id: String,
    /// Gateway-side payment id
    pub payment_id: String,
    /// Our order id
    pub order_id: String,
    /// Gateway-supplied signature
    pub signature: String,
    /// Customer email for the post-payment notification
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.user_message(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "artisan-storefront",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a checkout: order record + gateway intent + modal prompt
#[instrument(skip(state, request), fields(items = request.cart.lines.len()))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let country = state.resolver.resolve().await;

    let begun = state
        .flow
        .begin(&request.cart, &request.address, &request.customer, &country)
        .await
        .map_err(|e| {
            error!("checkout rejected: {}", e);
            store_error_to_response(e)
        })?;

    info!("checkout begun: order={}", begun.order_id);
    Ok(Json(CheckoutResponse {
        order_id: begun.order_id,
        prompt: begun.prompt,
    }))
}

/// Single-product buy-now checkout (order enters at `pending`)
#[instrument(skip(state, request), fields(product_id = %request.product_id))]
pub async fn buy_now(
    State(state): State<AppState>,
    Json(request): Json<BuyNowRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let country = state.resolver.resolve().await;

    let begun = state
        .flow
        .begin_buy_now(
            &request.product_id,
            &request.size,
            request.quantity,
            &request.address,
            &request.customer,
            &country,
        )
        .await
        .map_err(|e| {
            error!("buy-now rejected: {}", e);
            store_error_to_response(e)
        })?;

    Ok(Json(CheckoutResponse {
        order_id: begun.order_id,
        prompt: begun.prompt,
    }))
}

/// Verify a gateway payment confirmation and finalize the order
#[instrument(skip(state, request), fields(order_id = %request.order_id))]
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> (StatusCode, Json<VerifyPaymentResponse>) {
    let event = PaymentEvent::Completed(PaymentConfirmation {
        gateway_order_id: request.order_creation_id,
        gateway_payment_id: request.payment_id,
        signature: request.signature,
    });

    match state
        .flow
        .handle_event(&request.order_id, event, &request.email)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(VerifyPaymentResponse {
                success: true,
                error: None,
            }),
        ),
        Err(e) => {
            error!("payment verification failed: {}", e);
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(VerifyPaymentResponse {
                    success: false,
                    error: Some(e.user_message()),
                }),
            )
        }
    }
}

/// Validate a promo code (used by the cart's apply-promo operation)
pub async fn get_promo(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let promo = state
        .promos
        .find_active(&code)
        .await
        .map_err(store_error_to_response)?
        .ok_or_else(|| store_error_to_response(StoreError::InvalidPromoCode { code }))?;

    Ok(Json(promo))
}

/// Resolved country and shopping supportedness for this session
pub async fn get_geo(State(state): State<AppState>) -> impl IntoResponse {
    let resolution = state.resolver.resolve().await;
    Json(serde_json::json!({
        "country_code": resolution.country_code,
        "supported": resolution.supported,
    }))
}

/// Query params for the price quote endpoint
#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    /// USD decimal amount
    pub usd: f64,
    /// Country to display for; defaults to the resolved country
    #[serde(default)]
    pub country: Option<String>,
}

/// Display-currency quote for a USD amount
pub async fn get_price(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> impl IntoResponse {
    let country = match query.country {
        Some(country) => country,
        None => state.resolver.resolve().await.country_code,
    };

    let quote = state.fx.convert(Price::usd(query.usd), &country).await;
    Json(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_store_error_conversion() {
        let err = StoreError::StockExceeded { available: 3 };
        let (status, json) = store_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json.error, "Only 3 items available in stock");
    }

    #[test]
    fn test_verification_error_stays_generic() {
        let (status, json) = store_error_to_response(StoreError::VerificationFailed);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!json.error.to_lowercase().contains("hmac"));
    }

    #[test]
    fn test_verify_request_field_names() {
        let request: VerifyPaymentRequest = serde_json::from_value(serde_json::json!({
            "orderCreationId": "order_GW1",
            "paymentId": "pay_GW2",
            "orderId": "ord-1",
            "signature": "abc"
        }))
        .unwrap();

        assert_eq!(request.order_creation_id, "order_GW1");
        assert_eq!(request.payment_id, "pay_GW2");
        assert_eq!(request.order_id, "ord-1");
    }
}
