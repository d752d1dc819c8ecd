use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tax-relevant asset classes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Stock,             // Brazilian stocks (ações)
    RealEstateFund,    // Real estate investment funds (FII)
    DepositaryReceipt, // Brazilian depositary receipts (BDR)
    ExchangeTradedFund,
    FixedIncome, // CDB, LCI/LCA, Tesouro, debêntures, CRI/CRA
    Crypto,
    Unknown,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::RealEstateFund => "FII",
            AssetClass::DepositaryReceipt => "BDR",
            AssetClass::ExchangeTradedFund => "ETF",
            AssetClass::FixedIncome => "FIXED_INCOME",
            AssetClass::Crypto => "CRYPTO",
            AssetClass::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STOCK" | "ACAO" | "AÇÃO" | "ACOES" | "AÇÕES" => Ok(AssetClass::Stock),
            "FII" | "FUNDO_IMOBILIARIO" => Ok(AssetClass::RealEstateFund),
            "BDR" => Ok(AssetClass::DepositaryReceipt),
            "ETF" => Ok(AssetClass::ExchangeTradedFund),
            "FIXED_INCOME" | "RENDA_FIXA" | "RENDA FIXA" => Ok(AssetClass::FixedIncome),
            "CRYPTO" | "CRIPTO" | "CRIPTOMOEDA" => Ok(AssetClass::Crypto),
            "UNKNOWN" | "DESCONHECIDO" => Ok(AssetClass::Unknown),
            _ => Err(()),
        }
    }
}

/// Movement direction (buy or sell)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" | "COMPRA" | "C" => Ok(Direction::Buy),
            "SELL" | "VENDA" | "V" => Ok(Direction::Sell),
            _ => Err(()),
        }
    }
}

/// An executed buy or sell. Immutable once recorded; supplied externally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    pub holding: String,
    pub direction: Direction,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub date: NaiveDate,
}

impl Movement {
    pub fn gross(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    pub fn is_buy(&self) -> bool {
        self.direction == Direction::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.direction == Direction::Sell
    }
}

/// An income distribution (dividend, interest) received for a holding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Distribution {
    pub holding: String,
    pub date: NaiveDate,
    pub gross_amount: Decimal,
}

/// Per-holding classification hints supplied by the portfolio collaborator.
/// All fields optional; absent metadata falls through to ticker heuristics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldingMetadata {
    /// Free-form type string ("FII", "Renda Fixa", "Criptomoeda", ...)
    pub explicit_type: Option<String>,
    /// Interest-rate indexer for fixed income ("CDI", "IPCA+", "SELIC", ...)
    pub indexer: Option<String>,
    /// Last known average acquisition cost, used as a cost-basis fallback
    pub average_cost: Option<Decimal>,
}

/// Quote-type metadata returned by the external classification lookup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuoteType {
    Equity,
    Etf,
    Cryptocurrency,
    Currency,
}

impl FromStr for QuoteType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUITY" => Ok(QuoteType::Equity),
            "ETF" => Ok(QuoteType::Etf),
            "CRYPTOCURRENCY" => Ok(QuoteType::Cryptocurrency),
            "CURRENCY" => Ok(QuoteType::Currency),
            _ => Err(()),
        }
    }
}
