//! # store-geo
//!
//! Geolocation and currency display services for the artisan storefront.
//!
//! - `CountryResolver` — single-flight country resolution with a safe
//!   default, kicked off once at startup
//! - `FxClient` — cached USD-base exchange rate lookup with silent USD
//!   fallback; conversion never errors and never blocks rendering

pub mod country;
pub mod rates;

pub use country::{CountryResolution, CountryResolver, DEFAULT_COUNTRY};
pub use rates::{FxClient, RATE_TTL};
