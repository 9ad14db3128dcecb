use std::{env, str::FromStr};

use anyhow::{Context, bail};
use chrono::Duration;
use rust_decimal::Decimal;

use crate::{money::Money, services::pricing::PricingPolicy};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_token_duration: Duration,
    pub pricing: PricingPolicy,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = parse_var("APP_PORT", "3000")?;

        let duration_secs: i64 = parse_var("SESSION_TOKEN_DURATION_SECS", "86400")?;
        if duration_secs <= 0 {
            bail!("SESSION_TOKEN_DURATION_SECS must be greater than 0");
        }

        let shipping_fee: Money = parse_var("SHIPPING_FEE", "5.00")?;
        if shipping_fee.is_negative() {
            bail!("SHIPPING_FEE must not be negative");
        }

        let tax_rate: Decimal = parse_var("TAX_RATE", "0.10")?;
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
            bail!("TAX_RATE must be between 0 and 1");
        }

        let cookie_secure = parse_var("COOKIE_SECURE", "false")?;

        Ok(Self {
            database_url,
            host,
            port,
            session_token_duration: Duration::seconds(duration_secs),
            pricing: PricingPolicy::new(shipping_fee, tax_rate),
            cookie_secure,
        })
    }
}

fn parse_var<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("invalid value for {key}: `{raw}`"))
}
