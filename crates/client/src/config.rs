//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `IRONMONGER_API_URL` - API base URL (default: http://localhost:8080/api)
//! - `IRONMONGER_TAX_RATE` - tax fraction for local cart totals (default: 0.12)
//! - `IRONMONGER_SHIPPING_FEE` - flat shipping fee for a non-empty cart (default: 25.00)
//! - `IRONMONGER_FALLBACK_TAX_PERCENT` - whole percentage used to open the server
//!   cart when the local summary rounds to zero (default: 12)
//! - `IRONMONGER_COMPANY_NAME`, `_NIT`, `_ADDRESS`, `_PHONE`, `_EMAIL` - issuer
//!   details printed on receipts (default: no company block)
//! - `IRONMONGER_STORAGE` - `memory`, or a path to a SQLite file
//!   (default: `{data_dir}/ironmonger/storage.db`)

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use ironmonger_documents::CompanyInfo;
use ironmonger_sales::{DEFAULT_SEED_TAX_PERCENT, PricingPolicy};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
    #[error("could not resolve a data directory for local storage")]
    NoDataDir,
}

/// Where the token, cart and catalog snapshots are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Memory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub pricing: PricingPolicy,
    pub fallback_tax_percent: Decimal,
    pub company: Option<CompanyInfo>,
    pub storage: StorageLocation,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv()` first so a `.env` file in the working
    /// directory is honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("IRONMONGER_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let tax_rate = parse_or(&lookup, "IRONMONGER_TAX_RATE", PricingPolicy::DEFAULT_TAX_RATE)?;
        let shipping_fee =
            parse_or(&lookup, "IRONMONGER_SHIPPING_FEE", PricingPolicy::DEFAULT_SHIPPING_FEE)?;
        let fallback_tax_percent = parse_or(
            &lookup,
            "IRONMONGER_FALLBACK_TAX_PERCENT",
            DEFAULT_SEED_TAX_PERCENT,
        )?;

        for (key, value) in [
            ("IRONMONGER_TAX_RATE", tax_rate),
            ("IRONMONGER_SHIPPING_FEE", shipping_fee),
            ("IRONMONGER_FALLBACK_TAX_PERCENT", fallback_tax_percent),
        ] {
            if value.is_sign_negative() {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        let storage = match lookup("IRONMONGER_STORAGE").map(|v| v.trim().to_string()) {
            Some(v) if v.eq_ignore_ascii_case("memory") => StorageLocation::Memory,
            Some(v) if !v.is_empty() => StorageLocation::Sqlite(PathBuf::from(v)),
            _ => StorageLocation::Sqlite(default_storage_path()?),
        };

        Ok(Self {
            api_url,
            pricing: PricingPolicy::new(tax_rate, shipping_fee),
            fallback_tax_percent,
            company: company_from(&lookup),
            storage,
        })
    }

    /// In-memory storage against `api_url`, default pricing.
    pub fn in_memory(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            pricing: PricingPolicy::default(),
            fallback_tax_percent: DEFAULT_SEED_TAX_PERCENT,
            company: None,
            storage: StorageLocation::Memory,
        }
    }
}

/// A company block only exists when a name is configured.
fn company_from(lookup: &impl Fn(&str) -> Option<String>) -> Option<CompanyInfo> {
    let field = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let name = field("IRONMONGER_COMPANY_NAME")?;
    Some(CompanyInfo {
        name,
        nit: field("IRONMONGER_COMPANY_NIT"),
        address: field("IRONMONGER_COMPANY_ADDRESS"),
        phone: field("IRONMONGER_COMPANY_PHONE"),
        email: field("IRONMONGER_COMPANY_EMAIL"),
    })
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// `{app_data_dir}/ironmonger/storage.db`.
fn default_storage_path() -> Result<PathBuf, ConfigError> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoDataDir)?;
    dir.push("ironmonger");
    dir.push("storage.db");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[("IRONMONGER_STORAGE", "memory")]).unwrap();

        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.pricing, PricingPolicy::default());
        assert_eq!(cfg.fallback_tax_percent, dec!(12));
        assert_eq!(cfg.company, None);
        assert_eq!(cfg.storage, StorageLocation::Memory);
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let cfg = config(&[
            ("IRONMONGER_API_URL", "https://api.ferreteria.gt/api/"),
            ("IRONMONGER_TAX_RATE", " 0.05 "),
            ("IRONMONGER_SHIPPING_FEE", "0"),
            ("IRONMONGER_FALLBACK_TAX_PERCENT", "7"),
            ("IRONMONGER_STORAGE", "/tmp/im.db"),
        ])
        .unwrap();

        assert_eq!(cfg.api_url, "https://api.ferreteria.gt/api");
        assert_eq!(cfg.pricing, PricingPolicy::new(dec!(0.05), dec!(0)));
        assert_eq!(cfg.fallback_tax_percent, dec!(7));
        assert_eq!(cfg.storage, StorageLocation::Sqlite(PathBuf::from("/tmp/im.db")));
    }

    #[test]
    fn company_block_needs_a_name() {
        let cfg = config(&[
            ("IRONMONGER_STORAGE", "memory"),
            ("IRONMONGER_COMPANY_NIT", "1234567-8"),
        ])
        .unwrap();
        assert_eq!(cfg.company, None);

        let cfg = config(&[
            ("IRONMONGER_STORAGE", "memory"),
            ("IRONMONGER_COMPANY_NAME", " Ferreteria El Martillo "),
            ("IRONMONGER_COMPANY_NIT", "1234567-8"),
            ("IRONMONGER_COMPANY_PHONE", " "),
        ])
        .unwrap();
        let company = cfg.company.unwrap();
        assert_eq!(company.name, "Ferreteria El Martillo");
        assert_eq!(company.nit.as_deref(), Some("1234567-8"));
        assert_eq!(company.phone, None);
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let err = config(&[("IRONMONGER_TAX_RATE", "doce"), ("IRONMONGER_STORAGE", "memory")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "IRONMONGER_TAX_RATE".into(),
                value: "doce".into()
            }
        );
    }

    #[test]
    fn negative_fee_is_rejected() {
        let err = config(&[("IRONMONGER_SHIPPING_FEE", "-1"), ("IRONMONGER_STORAGE", "memory")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "IRONMONGER_SHIPPING_FEE"));
    }
}
