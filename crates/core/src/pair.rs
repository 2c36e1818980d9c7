//! Trading pair parsing and normalization.

use crate::error::ValidationError;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Quote currencies recognized when splitting delimiter-free tickers
/// (e.g. `BTCUSDT`). Tickers that do not end in exactly one of these
/// fail closed rather than being guessed at.
const KNOWN_QUOTES: [&str; 7] = ["USDT", "USDC", "BUSD", "USD", "BTC", "ETH", "KRW"];

/// Canonical `BASE/QUOTE` trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    /// Base symbol (e.g., "BTC")
    pub base: CompactString,
    /// Quote symbol (e.g., "USDT")
    pub quote: CompactString,
}

impl TradingPair {
    /// Parse and normalize a pair string.
    ///
    /// Accepts `BASE/QUOTE`, `BASE-QUOTE`, and `BASE_QUOTE` in any case.
    /// A delimiter-free ticker is split only when exactly one known quote
    /// suffix yields a well-formed base; zero viable splits is
    /// `MalformedPair`, more than one is `AmbiguousPair`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let raw = input.trim().to_uppercase();
        if raw.is_empty() {
            return Err(ValidationError::MissingField("pair"));
        }
        for delim in ['/', '-', '_'] {
            if let Some((base, quote)) = raw.split_once(delim) {
                return Self::from_parts(base, quote, input);
            }
        }
        Self::split_known_quote(&raw, input)
    }

    fn from_parts(base: &str, quote: &str, original: &str) -> Result<Self, ValidationError> {
        if !symbol_ok(base, 2, 10) || !symbol_ok(quote, 2, 6) {
            return Err(ValidationError::MalformedPair(original.to_string()));
        }
        Ok(Self {
            base: CompactString::new(base),
            quote: CompactString::new(quote),
        })
    }

    fn split_known_quote(raw: &str, original: &str) -> Result<Self, ValidationError> {
        let mut splits: Vec<(&str, &str)> = Vec::new();
        for quote in KNOWN_QUOTES {
            if let Some(base) = raw.strip_suffix(quote) {
                if symbol_ok(base, 2, 10) {
                    splits.push((base, quote));
                }
            }
        }
        match splits.as_slice() {
            [] => Err(ValidationError::MalformedPair(original.to_string())),
            [(base, quote)] => Ok(Self {
                base: CompactString::new(base),
                quote: CompactString::new(quote),
            }),
            _ => Err(ValidationError::AmbiguousPair(original.to_string())),
        }
    }
}

impl std::fmt::Display for TradingPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

fn symbol_ok(s: &str, min: usize, max: usize) -> bool {
    s.len() >= min && s.len() <= max && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(base: &str, quote: &str) -> TradingPair {
        TradingPair {
            base: CompactString::new(base),
            quote: CompactString::new(quote),
        }
    }

    #[test]
    fn test_canonical_form_unchanged() {
        assert_eq!(TradingPair::parse("BTC/USDT").unwrap(), pair("BTC", "USDT"));
    }

    #[test]
    fn test_delimiters_recovered() {
        assert_eq!(TradingPair::parse("btc-usdt").unwrap(), pair("BTC", "USDT"));
        assert_eq!(TradingPair::parse("eth_usd").unwrap(), pair("ETH", "USD"));
        assert_eq!(TradingPair::parse(" sol/usdc ").unwrap(), pair("SOL", "USDC"));
    }

    #[test]
    fn test_known_quote_suffix() {
        assert_eq!(TradingPair::parse("BTCUSDT").unwrap(), pair("BTC", "USDT"));
        assert_eq!(TradingPair::parse("xrpkrw").unwrap(), pair("XRP", "KRW"));
    }

    #[test]
    fn test_ambiguous_ticker_fails_closed() {
        // Both "ETH"/"BUSD" and "ETHB"/"USD" are viable splits.
        assert!(matches!(
            TradingPair::parse("ETHBUSD"),
            Err(ValidationError::AmbiguousPair(_))
        ));
    }

    #[test]
    fn test_unknown_suffix_rejected() {
        assert!(matches!(
            TradingPair::parse("BTCDOGE"),
            Err(ValidationError::MalformedPair(_))
        ));
    }

    #[test]
    fn test_malformed() {
        assert!(TradingPair::parse("BTC/").is_err());
        assert!(TradingPair::parse("/USDT").is_err());
        assert!(TradingPair::parse("B TC/USDT").is_err());
        assert!(TradingPair::parse("BTC/VERYLONGQUOTE").is_err());
        assert!(matches!(
            TradingPair::parse(""),
            Err(ValidationError::MissingField("pair"))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(TradingPair::parse("btcusdt").unwrap().to_string(), "BTC/USDT");
    }
}
