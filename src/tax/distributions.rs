//! Income distribution taxation
//!
//! A simpler, non-FIFO regime table keyed by asset class. Stock, FII and
//! ETF distributions are exempt; BDR distributions are taxed progressively
//! by the gross amount of each single distribution; anything unclassified
//! defaults to exempt, the conservative reading.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{AssetClass, Distribution};
use crate::tax::regime::ExemptionReason;

/// Tax outcome for one income distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionTaxRecord {
    pub holding: String,
    pub date: chrono::NaiveDate,
    pub asset_class: AssetClass,
    pub gross: Decimal,
    pub rate: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
    pub exempt: bool,
    pub reason: Option<ExemptionReason>,
}

/// BDR distribution rate, progressive by the distribution's gross amount
pub fn bdr_distribution_rate(gross: Decimal) -> Decimal {
    if gross <= Decimal::new(2_284_776, 2) {
        Decimal::new(75, 3) // 7.5%
    } else if gross <= Decimal::new(3_391_980, 2) {
        Decimal::new(15, 2) // 15%
    } else if gross <= Decimal::new(4_501_260, 2) {
        Decimal::new(225, 3) // 22.5%
    } else {
        Decimal::new(275, 3) // 27.5%
    }
}

/// Apply the distribution regime table for the holding's class
pub fn evaluate(distribution: &Distribution, class: AssetClass) -> DistributionTaxRecord {
    let gross = distribution.gross_amount;

    let (rate, exempt, reason) = match class {
        AssetClass::Stock => (Decimal::ZERO, true, Some(ExemptionReason::StockDistribution)),
        AssetClass::RealEstateFund => (
            Decimal::ZERO,
            true,
            Some(ExemptionReason::RealEstateFundDistribution),
        ),
        AssetClass::ExchangeTradedFund => {
            (Decimal::ZERO, true, Some(ExemptionReason::EtfDistribution))
        }
        AssetClass::DepositaryReceipt => (bdr_distribution_rate(gross), false, None),
        // FixedIncome, Crypto and Unknown all take the conservative default
        _ => (
            Decimal::ZERO,
            true,
            Some(ExemptionReason::UnclassifiedDistribution),
        ),
    };

    let tax = gross * rate;

    DistributionTaxRecord {
        holding: distribution.holding.clone(),
        date: distribution.date,
        asset_class: class,
        gross,
        rate,
        tax,
        net: gross - tax,
        exempt,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn dist(gross: Decimal) -> Distribution {
        Distribution {
            holding: "AAPL34".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            gross_amount: gross,
        }
    }

    #[test]
    fn test_exempt_classes() {
        for class in [
            AssetClass::Stock,
            AssetClass::RealEstateFund,
            AssetClass::ExchangeTradedFund,
        ] {
            let record = evaluate(&dist(dec!(1000)), class);
            assert!(record.exempt, "{class} should be exempt");
            assert_eq!(record.tax, dec!(0));
            assert_eq!(record.net, dec!(1000));
            assert!(record.reason.is_some());
        }
    }

    #[test]
    fn test_bdr_progressive_brackets() {
        assert_eq!(bdr_distribution_rate(dec!(22847.76)), dec!(0.075));
        assert_eq!(bdr_distribution_rate(dec!(22847.77)), dec!(0.15));
        assert_eq!(bdr_distribution_rate(dec!(33919.80)), dec!(0.15));
        assert_eq!(bdr_distribution_rate(dec!(33919.81)), dec!(0.225));
        assert_eq!(bdr_distribution_rate(dec!(45012.60)), dec!(0.225));
        assert_eq!(bdr_distribution_rate(dec!(45012.61)), dec!(0.275));
    }

    #[test]
    fn test_bdr_tax_and_net() {
        let record = evaluate(&dist(dec!(10000)), AssetClass::DepositaryReceipt);
        assert!(!record.exempt);
        assert_eq!(record.rate, dec!(0.075));
        assert_eq!(record.tax, dec!(750.000));
        assert_eq!(record.net, dec!(10000) - dec!(750.000));
    }

    #[test]
    fn test_unknown_defaults_to_exempt() {
        let record = evaluate(&dist(dec!(500)), AssetClass::Unknown);
        assert!(record.exempt);
        assert_eq!(record.reason, Some(ExemptionReason::UnclassifiedDistribution));

        // Fixed income and crypto distributions take the same default
        assert!(evaluate(&dist(dec!(500)), AssetClass::FixedIncome).exempt);
        assert!(evaluate(&dist(dec!(500)), AssetClass::Crypto).exempt);
    }
}
