//! [`FactsProvider`](screener_core::FactsProvider) implementations.

pub mod alpha_vantage;
pub mod static_provider;

pub use alpha_vantage::{AlphaVantageClient, CompanyOverview};
pub use static_provider::StaticFactsProvider;
