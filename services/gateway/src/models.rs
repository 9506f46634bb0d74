use serde::{Deserialize, Serialize};

/// Body returned by `/price` when the upstream call fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch market data";

/// Query string of `/price`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceQuery {
    pub symbol: Option<String>,
}

impl PriceQuery {
    /// Build from raw pairs. A repeated `symbol` keeps its last value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let symbol = pairs
            .into_iter()
            .rev()
            .find(|(key, _)| key == "symbol")
            .map(|(_, value)| value);
        Self { symbol }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DegradedResponse {
    pub error: String,
}

impl DegradedResponse {
    pub fn fetch_failed() -> Self {
        Self {
            error: FETCH_FAILED_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_symbol_keeps_last() {
        let pairs = vec![
            ("symbol".to_string(), "A".to_string()),
            ("symbol".to_string(), "B".to_string()),
        ];
        assert_eq!(PriceQuery::from_pairs(pairs).symbol.as_deref(), Some("B"));
        assert_eq!(PriceQuery::from_pairs(Vec::new()), PriceQuery::default());
    }
}
