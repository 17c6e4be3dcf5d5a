use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use ratio_engine::annualize_payments;
use screener_core::{
    normalize_ticker, DividendPayment, FactsProvider, FinancialFacts, ScreenerError, MAX_PERIODS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;

const BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Subset of the `OVERVIEW` response used for screening. Alpha Vantage
/// sends every value as a string.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CompanyOverview {
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    #[serde(rename = "BookValue")]
    pub book_value: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "DividendPerShare")]
    pub dividend_per_share: Option<String>,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: Option<String>,
}

impl CompanyOverview {
    pub fn eps(&self) -> Option<f64> {
        parse_number(self.eps.as_deref())
    }

    pub fn book_value(&self) -> Option<f64> {
        parse_number(self.book_value.as_deref())
    }

    /// A P/E of zero is how Alpha Vantage reports "not meaningful".
    pub fn pe_ratio(&self) -> Option<f64> {
        parse_number(self.pe_ratio.as_deref()).filter(|pe| *pe != 0.0)
    }

    pub fn dividend_per_share(&self) -> Option<f64> {
        parse_number(self.dividend_per_share.as_deref())
    }

    pub fn dividend_yield(&self) -> Option<f64> {
        parse_number(self.dividend_yield.as_deref())
    }

    /// Dividend per share over EPS; undefined unless EPS is positive.
    pub fn payout_ratio(&self) -> Option<f64> {
        match (self.dividend_per_share(), self.eps()) {
            (Some(dps), Some(eps)) if eps > 0.0 => Some(dps / eps),
            _ => None,
        }
    }
}

/// Parse an Alpha Vantage numeric string. `"None"`, `"-"` and blanks mean
/// the value is unavailable.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    match raw {
        "" | "-" | "None" | "N/A" => None,
        s => s.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Turn the error payloads Alpha Vantage returns with HTTP 200 into errors.
pub fn check_error(json: &Value) -> Result<(), ScreenerError> {
    if let Some(error) = json.get("Error Message") {
        return Err(ScreenerError::Provider(format!("Alpha Vantage error: {}", error)));
    }
    if let Some(note) = json.get("Note") {
        return Err(ScreenerError::Provider(format!("Alpha Vantage rate limit: {}", note)));
    }
    if let Some(info) = json.get("Information") {
        return Err(ScreenerError::Provider(format!("Alpha Vantage: {}", info)));
    }
    Ok(())
}

pub fn parse_overview(json: Value) -> Result<CompanyOverview, ScreenerError> {
    check_error(&json)?;
    if json.as_object().map(|o| o.is_empty()).unwrap_or(true) {
        return Err(ScreenerError::Provider("No overview data found".to_string()));
    }
    serde_json::from_value(json)
        .map_err(|e| ScreenerError::Provider(format!("Malformed overview: {}", e)))
}

pub fn parse_global_quote(json: &Value) -> Result<f64, ScreenerError> {
    check_error(json)?;
    let price = json
        .get("Global Quote")
        .and_then(|q| q.get("05. price"))
        .and_then(|p| p.as_str());
    parse_number(price)
        .filter(|p| *p > 0.0)
        .ok_or_else(|| ScreenerError::Provider("No price found in global quote".to_string()))
}

/// Dividend payments keyed by ex-dividend date, falling back to the
/// payment date. Entries without a usable date or amount are skipped.
pub fn parse_dividends(json: &Value) -> Result<Vec<DividendPayment>, ScreenerError> {
    check_error(json)?;
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| ScreenerError::Provider("No dividend data found".to_string()))?;

    let mut payments = Vec::new();
    for entry in data {
        let date = ["ex_dividend_date", "payment_date"]
            .iter()
            .filter_map(|key| entry.get(*key).and_then(|v| v.as_str()))
            .find_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
        let amount = parse_number(entry.get("amount").and_then(|v| v.as_str()));

        if let (Some(date), Some(amount)) = (date, amount) {
            payments.push(DividendPayment { date, amount });
        }
    }

    payments.sort_by_key(|p| p.date);
    Ok(payments)
}

fn fiscal_date(report: &Value) -> &str {
    report
        .get("fiscalDateEnding")
        .and_then(|d| d.as_str())
        .unwrap_or("")
}

/// Total liabilities over shareholder equity from the latest annual report.
pub fn parse_debt_to_equity(json: &Value) -> Result<Option<f64>, ScreenerError> {
    check_error(json)?;
    let latest = json
        .get("annualReports")
        .and_then(|r| r.as_array())
        .and_then(|reports| {
            reports
                .iter()
                .max_by(|a, b| fiscal_date(a).cmp(fiscal_date(b)))
        });

    let Some(report) = latest else {
        return Ok(None);
    };
    let liabilities = parse_number(report.get("totalLiabilities").and_then(|v| v.as_str()));
    let equity = parse_number(report.get("totalShareholderEquity").and_then(|v| v.as_str()));

    Ok(match (liabilities, equity) {
        (Some(l), Some(e)) if e > 0.0 => Some(l / e),
        _ => None,
    })
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads `ALPHA_VANTAGE_API_KEY` and the optional `ALPHA_VANTAGE_BASE_URL`.
    pub fn from_env() -> Result<Self, ScreenerError> {
        let api_key = env::var("ALPHA_VANTAGE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ScreenerError::Config("ALPHA_VANTAGE_API_KEY must be set".to_string()))?;

        let client = Self::new(api_key);
        Ok(match env::var("ALPHA_VANTAGE_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(url.trim()),
            _ => client,
        })
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value, ScreenerError> {
        tracing::debug!("Alpha Vantage {} {}", function, symbol);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("function", function), ("symbol", symbol), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ScreenerError::Provider(format!("{} request failed: {}", function, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScreenerError::Provider(format!("{} returned HTTP {}", function, status)));
        }

        response
            .json()
            .await
            .map_err(|e| ScreenerError::Provider(format!("{} response is not JSON: {}", function, e)))
    }

    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview, ScreenerError> {
        parse_overview(self.query("OVERVIEW", symbol).await?)
    }

    pub async fn get_price(&self, symbol: &str) -> Result<f64, ScreenerError> {
        parse_global_quote(&self.query("GLOBAL_QUOTE", symbol).await?)
    }

    pub async fn get_dividends(&self, symbol: &str) -> Result<Vec<DividendPayment>, ScreenerError> {
        parse_dividends(&self.query("DIVIDENDS", symbol).await?)
    }

    pub async fn get_debt_to_equity(&self, symbol: &str) -> Result<Option<f64>, ScreenerError> {
        parse_debt_to_equity(&self.query("BALANCE_SHEET", symbol).await?)
    }
}

#[async_trait]
impl FactsProvider for AlphaVantageClient {
    async fn fetch_facts(&self, ticker: &str, periods: u32) -> Result<FinancialFacts, ScreenerError> {
        let symbol = normalize_ticker(ticker);
        if symbol.is_empty() {
            return Err(ScreenerError::InvalidFacts("ticker is empty".to_string()));
        }
        if periods == 0 || periods > MAX_PERIODS {
            return Err(ScreenerError::InvalidFacts(format!(
                "periods must be between 1 and {}, got {}",
                MAX_PERIODS, periods
            )));
        }

        let overview = self.get_company_overview(&symbol).await?;
        let price = self.get_price(&symbol).await?;
        let payments = self.get_dividends(&symbol).await?;
        // Debt-to-equity only feeds one criterion, so a failed balance sheet
        // leaves it unavailable.
        let debt_to_equity = match self.get_debt_to_equity(&symbol).await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("{}: debt-to-equity unavailable: {}", symbol, e);
                None
            }
        };

        let mut facts = FinancialFacts::new(&symbol, price, periods);
        facts.earnings_per_share = overview.eps();
        facts.book_value_per_share = overview.book_value();
        facts.price_to_earnings_ratio = overview.pe_ratio();
        facts.dividend_payout_ratio = overview.payout_ratio();
        facts.dividend_yield = overview.dividend_yield();
        facts.debt_to_equity = debt_to_equity;
        facts.annualized_dividends = annualize_payments(&payments, periods, Utc::now().year())?;
        facts.name = overview.name;
        facts.industry = overview.industry;
        facts.description = overview.description;

        tracing::info!(
            "Fetched {} from Alpha Vantage: price {}, {} dividend payments",
            symbol,
            price,
            payments.len()
        );
        Ok(facts)
    }

    fn name(&self) -> &'static str {
        "alpha_vantage"
    }
}
