use crate::service::budget::FFE_BUDGET_LIMIT;
use crate::service::store::ItemDefaults;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pricing: PricingConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 定价默认值与预算上限
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub ffe_budget_limit: f64,
    pub default_markup_percent: f64,
    pub default_unit: String,
}

/// 支付请求中的回跳/回调地址
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub currency: String,
    pub redirect_url: String,
    pub webhook_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            ffe_budget_limit: FFE_BUDGET_LIMIT,
            default_markup_percent: 25.0,
            default_unit: "Stk".to_string(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            redirect_url: "http://localhost:8080/thank-you".to_string(),
            webhook_url: "http://localhost:8080/api/payment-webhook".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            pricing: PricingConfig::default(),
            payment: PaymentConfig::default(),
        }
    }
}

impl PricingConfig {
    /// 新条目默认值
    pub fn item_defaults(&self) -> ItemDefaults {
        ItemDefaults {
            markup_percent: self.default_markup_percent,
            unit: self.default_unit.clone(),
            ..ItemDefaults::default()
        }
    }
}

impl AppConfig {
    /// 默认值 + 环境变量 (HOAI_SERVER__PORT=9000, HOAI_PRICING__FFE_BUDGET_LIMIT=25000 ...)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_with(Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("HOAI")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::environment().source(Some(source))
    }

    #[test]
    fn defaults_without_overrides() {
        let config = AppConfig::load_with(env_from(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pricing.ffe_budget_limit, 20_000.0);
        assert_eq!(config.pricing.default_markup_percent, 25.0);
        assert_eq!(config.payment.currency, "EUR");
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let config = AppConfig::load_with(env_from(&[
            ("HOAI_SERVER__PORT", "9000"),
            ("HOAI_PRICING__FFE_BUDGET_LIMIT", "25000"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pricing.ffe_budget_limit, 25_000.0);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn item_defaults_follow_pricing_config() {
        let pricing = PricingConfig {
            default_markup_percent: 30.0,
            ..PricingConfig::default()
        };
        let defaults = pricing.item_defaults();
        assert_eq!(defaults.markup_percent, 30.0);
        assert_eq!(defaults.quantity, 1.0);
    }
}
