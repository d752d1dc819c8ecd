//! Asset classification
//!
//! Maps a holding to its tax-relevant asset class. Resolution order, first
//! match wins: explicit type string, interest-rate indexer, external
//! quote-type lookup, ticker-shape heuristic, Unknown. The same resolved
//! class is reused by every downstream evaluator in a computation pass, so
//! classification happens once per holding, ahead of evaluation.

use once_cell::sync::Lazy;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::model::{AssetClass, HoldingMetadata, QuoteType};

/// External classification lookup by ticker, best effort. A failed or
/// absent lookup degrades to the ticker-shape heuristic; it never blocks
/// or aborts the batch.
pub trait QuoteLookup {
    fn quote_type(&self, ticker: &str) -> Option<QuoteType>;
}

/// Lookup that always misses; used when no quote collaborator is wired up
pub struct NoLookup;

impl QuoteLookup for NoLookup {
    fn quote_type(&self, _ticker: &str) -> Option<QuoteType> {
        None
    }
}

static FIXED_INCOME_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "renda fixa", "tesouro", "cdb", "lci", "lca", "debenture", "cri", "cra",
    ]
});

static FIXED_INCOME_INDEXERS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["CDI", "IPCA", "SELIC", "PREFIXADO", "CDI+", "IPCA+"]);

/// Lowercase and strip accents so "Debênture" matches "debenture"
fn normalize(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Map an explicit type string to a class, if it matches a known keyword
/// set. Crypto is tested before the fixed-income keywords because "cri"
/// is a substring of "criptomoeda".
pub fn class_from_explicit(explicit_type: &str) -> Option<AssetClass> {
    let t = normalize(explicit_type);
    if t.is_empty() {
        return None;
    }

    if t.contains("fii") || t.contains("fundo imobiliario") || t.contains("fundos imobiliarios") {
        return Some(AssetClass::RealEstateFund);
    }
    if t.contains("bdr") {
        return Some(AssetClass::DepositaryReceipt);
    }
    if t.contains("etf") {
        return Some(AssetClass::ExchangeTradedFund);
    }
    if t.contains("cripto") || t.contains("crypto") {
        return Some(AssetClass::Crypto);
    }
    if t.contains("acao") || t.contains("acoes") || t == "stock" {
        return Some(AssetClass::Stock);
    }
    if FIXED_INCOME_KEYWORDS.iter().any(|kw| t.contains(kw)) {
        return Some(AssetClass::FixedIncome);
    }

    None
}

/// `true` when the indexer names an interest-rate family (CDI, IPCA,
/// SELIC, PREFIXADO), which marks the holding as fixed income
pub fn is_fixed_income_indexer(indexer: &str) -> bool {
    let upper = indexer.trim().to_ascii_uppercase();
    FIXED_INCOME_INDEXERS.iter().any(|ix| upper == *ix)
}

/// Map external quote-type metadata to a class. ETF quote types cover
/// both real-estate funds and plain ETFs on B3; the "11" suffix decides.
fn class_from_quote_type(ticker: &str, quote_type: QuoteType) -> AssetClass {
    match quote_type {
        QuoteType::Equity => AssetClass::Stock,
        QuoteType::Etf => {
            let upper = ticker.to_ascii_uppercase();
            if upper.ends_with("11") || upper.ends_with("11.SA") {
                AssetClass::RealEstateFund
            } else {
                AssetClass::ExchangeTradedFund
            }
        }
        QuoteType::Cryptocurrency | QuoteType::Currency => AssetClass::Crypto,
    }
}

/// Ticker-shape heuristic: B3 stock tickers end in a digit (PETR4, VALE3)
/// while the "11" suffix is reserved for funds/units
pub fn ticker_looks_like_stock(ticker: &str) -> bool {
    let upper = ticker.trim().to_ascii_uppercase();
    upper.chars().last().is_some_and(|c| c.is_ascii_digit())
        && !upper.ends_with("11")
        && !upper.contains("ETF")
}

/// Resolve the asset class for one holding. Deterministic and idempotent
/// for given inputs; the external lookup is consulted at most once, and
/// only when the earlier tiers fail.
pub fn classify(
    ticker: &str,
    metadata: Option<&HoldingMetadata>,
    lookup: &dyn QuoteLookup,
) -> AssetClass {
    if let Some(meta) = metadata {
        if let Some(explicit) = meta.explicit_type.as_deref() {
            if let Some(class) = class_from_explicit(explicit) {
                return class;
            }
        }
        if let Some(indexer) = meta.indexer.as_deref() {
            if is_fixed_income_indexer(indexer) {
                return AssetClass::FixedIncome;
            }
        }
    }

    if let Some(quote_type) = lookup.quote_type(ticker) {
        return class_from_quote_type(ticker, quote_type);
    }

    if ticker_looks_like_stock(ticker) {
        return AssetClass::Stock;
    }

    AssetClass::Unknown
}
