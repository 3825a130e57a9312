use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::{BinanceExchange, CoinbaseExchange};
use crate::clients::{BinanceRestClient, CoinbaseRestClient};
use crate::exchange::Exchange;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{ChartError, ExchangeId};

/// Exchange lookup table keyed by [`ExchangeId`].
#[derive(Clone, Default)]
pub struct ExchangeRegistry {
    exchanges: HashMap<ExchangeId, Arc<dyn Exchange>>,
}

impl ExchangeRegistry {
    pub fn new(exchanges: Vec<Arc<dyn Exchange>>) -> Self {
        let exchanges = exchanges
            .into_iter()
            .map(|exchange| (exchange.id(), exchange))
            .collect();
        Self { exchanges }
    }

    pub fn get(&self, id: ExchangeId) -> Result<Arc<dyn Exchange>, ChartError> {
        self.exchanges
            .get(&id)
            .cloned()
            .ok_or_else(|| ChartError::unsupported_exchange(id))
    }

    pub fn registered(&self) -> Vec<ExchangeId> {
        let mut ids: Vec<ExchangeId> = self.exchanges.keys().copied().collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }
}

/// Builder wiring the REST clients for every supported exchange.
///
/// # Example
///
/// ```rust,ignore
/// use candlegate_core::ExchangeRegistryBuilder;
///
/// let registry = ExchangeRegistryBuilder::new()
///     .with_binance_url("https://api.binance.com")
///     .with_upstream_timeout_ms(Some(10_000))
///     .build();
/// ```
pub struct ExchangeRegistryBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    binance_url: String,
    coinbase_url: String,
    upstream_timeout_ms: Option<u64>,
}

impl Default for ExchangeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeRegistryBuilder {
    pub fn new() -> Self {
        Self {
            http_client: None,
            binance_url: String::from(BinanceRestClient::DEFAULT_BASE_URL),
            coinbase_url: String::from(CoinbaseRestClient::DEFAULT_BASE_URL),
            upstream_timeout_ms: None,
        }
    }

    /// Shares one transport between both exchanges. Defaults to reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_binance_url(mut self, url: impl Into<String>) -> Self {
        self.binance_url = url.into();
        self
    }

    pub fn with_coinbase_url(mut self, url: impl Into<String>) -> Self {
        self.coinbase_url = url.into();
        self
    }

    pub fn with_upstream_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.upstream_timeout_ms = timeout_ms;
        self
    }

    pub fn build(self) -> ExchangeRegistry {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        let binance = BinanceRestClient::new(http_client.clone(), self.binance_url)
            .with_timeout_ms(self.upstream_timeout_ms);
        let coinbase = CoinbaseRestClient::new(http_client, self.coinbase_url)
            .with_timeout_ms(self.upstream_timeout_ms);

        ExchangeRegistry::new(vec![
            Arc::new(BinanceExchange::new(Arc::new(binance))),
            Arc::new(CoinbaseExchange::new(Arc::new(coinbase))),
        ])
    }
}
