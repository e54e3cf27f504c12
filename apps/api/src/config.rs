use anyhow::{anyhow, Context, Result};

use crate::layout::{DateStyle, ThemeName};
use crate::payments::paystack::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub paystack_secret_key: String,
    pub paystack_base_url: String,
    pub payment_currency: String,
    /// Price of one export, in major currency units.
    pub export_fee: f64,
    pub default_theme: ThemeName,
    pub date_style: DateStyle,
    /// Caption printed at the foot of the final page. Unset means no footer.
    pub footer_caption: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            paystack_secret_key: require_env("PAYSTACK_SECRET_KEY")?,
            paystack_base_url: optional_env("PAYSTACK_BASE_URL", DEFAULT_BASE_URL),
            payment_currency: optional_env("PAYMENT_CURRENCY", "GHS"),
            export_fee: parse_fee(&optional_env("EXPORT_FEE", "3.99"))?,
            default_theme: optional_env("DEFAULT_THEME", "banded")
                .parse::<ThemeName>()
                .map_err(|e| anyhow!(e))
                .context("DEFAULT_THEME must be one of plain, banded, chips")?,
            date_style: optional_env("DATE_STYLE", "month_year")
                .parse::<DateStyle>()
                .map_err(|e| anyhow!(e))
                .context("DATE_STYLE must be month_year or as_entered")?,
            footer_caption: std::env::var("FOOTER_CAPTION")
                .ok()
                .filter(|c| !c.trim().is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_fee(raw: &str) -> Result<f64> {
    let fee = raw
        .trim()
        .parse::<f64>()
        .with_context(|| format!("EXPORT_FEE '{raw}' is not a number"))?;
    if !fee.is_finite() || fee <= 0.0 {
        return Err(anyhow!("EXPORT_FEE must be a positive amount, got {fee}"));
    }
    Ok(fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fee() {
        assert_eq!(parse_fee("3.99").unwrap(), 3.99);
        assert_eq!(parse_fee(" 10 ").unwrap(), 10.0);
        assert!(parse_fee("free").is_err());
        assert!(parse_fee("0").is_err());
        assert!(parse_fee("-1").is_err());
        assert!(parse_fee("NaN").is_err());
    }
}
