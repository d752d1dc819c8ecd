//! End-to-end engine scenarios through the public API

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use apura::model::{AssetClass, Direction, Distribution, HoldingMetadata, Movement};
use apura::tax::{assess, BasisSource, ExemptionReason, NoLookup};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn buy(holding: &str, qty: Decimal, price: Decimal, date: NaiveDate) -> Movement {
    Movement {
        holding: holding.to_string(),
        direction: Direction::Buy,
        quantity: qty,
        unit_price: price,
        date,
    }
}

fn sell(holding: &str, qty: Decimal, price: Decimal, date: NaiveDate) -> Movement {
    Movement {
        holding: holding.to_string(),
        direction: Direction::Sell,
        quantity: qty,
        unit_price: price,
        date,
    }
}

fn no_metadata() -> HashMap<String, HoldingMetadata> {
    HashMap::new()
}

fn fixed_income_metadata(holding: &str) -> HashMap<String, HoldingMetadata> {
    let mut metadata = HashMap::new();
    metadata.insert(
        holding.to_string(),
        HoldingMetadata {
            explicit_type: Some("Renda Fixa".to_string()),
            indexer: Some("CDI".to_string()),
            average_cost: None,
        },
    );
    metadata
}

#[test]
fn scenario_a_zero_profit_stock_sale_is_exempt() {
    let movements = vec![
        buy("PETR4", dec!(100), dec!(10.00), d(2025, 1, 1)),
        sell("PETR4", dec!(100), dec!(10.00), d(2025, 1, 30)),
    ];
    let assessment = assess(&movements, &[], &no_metadata(), &NoLookup);

    let record = &assessment.records[0];
    assert_eq!(record.disposal.profit, Some(dec!(0)));
    assert!(record.exempt);
    assert_eq!(record.tax, dec!(0));
    assert!(assessment.obligations.is_empty());
}

#[test]
fn scenario_b_profit_over_monthly_threshold_taxed_at_15() {
    let movements = vec![
        buy("PETR4", dec!(100), dec!(10.00), d(2025, 1, 1)),
        sell("PETR4", dec!(100), dec!(215.00), d(2025, 1, 2)),
    ];
    let assessment = assess(&movements, &[], &no_metadata(), &NoLookup);

    let record = &assessment.records[0];
    assert_eq!(record.disposal.profit, Some(dec!(20500.00)));
    assert!(!record.exempt);
    assert_eq!(record.rate, dec!(0.15));
    assert_eq!(record.tax, dec!(3075.00));
}

#[test]
fn scenario_c_day_trade_taxed_at_20_regardless_of_bucket() {
    let movements = vec![
        buy("VALE3", dec!(50), dec!(60.00), d(2025, 2, 14)),
        sell("VALE3", dec!(50), dec!(80.00), d(2025, 2, 14)),
    ];
    let assessment = assess(&movements, &[], &no_metadata(), &NoLookup);

    let record = &assessment.records[0];
    assert!(record.disposal.day_trade);
    assert_eq!(record.disposal.profit, Some(dec!(1000.00)));
    // Monthly profit is far below 20k, but day trades have no exemption
    assert!(!record.exempt);
    assert_eq!(record.rate, dec!(0.20));
    assert_eq!(record.tax, dec!(200.00));
}

#[test]
fn scenario_d_fixed_income_tier_boundary() {
    // 2023-01-01 -> 2023-06-30 is exactly 180 days: 22.5%
    let movements = vec![
        buy("CDB-2026", dec!(100), dec!(10.00), d(2023, 1, 1)),
        sell("CDB-2026", dec!(100), dec!(20.00), d(2023, 6, 30)),
    ];
    let assessment = assess(&movements, &[], &fixed_income_metadata("CDB-2026"), &NoLookup);
    let record = &assessment.records[0];
    assert_eq!(record.disposal.asset_class, AssetClass::FixedIncome);
    assert_eq!(record.rate, dec!(0.225));
    assert_eq!(record.tax, dec!(225.000));

    // One day later (181 days) drops to the 20% tier
    let movements = vec![
        buy("CDB-2026", dec!(100), dec!(10.00), d(2023, 1, 1)),
        sell("CDB-2026", dec!(100), dec!(20.00), d(2023, 7, 1)),
    ];
    let assessment = assess(&movements, &[], &fixed_income_metadata("CDB-2026"), &NoLookup);
    let record = &assessment.records[0];
    assert_eq!(record.rate, dec!(0.20));
    assert_eq!(record.tax, dec!(200.00));
}

#[test]
fn scenario_e_sale_without_history_reports_unknown_basis() {
    let movements = vec![sell("GHOST3", dec!(100), dec!(55.00), d(2025, 3, 10))];
    let assessment = assess(&movements, &[], &no_metadata(), &NoLookup);

    let record = &assessment.records[0];
    assert_eq!(record.disposal.basis_source, BasisSource::NotFound);
    assert_eq!(record.disposal.profit, None);
    assert_eq!(record.reason, Some(ExemptionReason::CostBasisNotFound));
    assert_eq!(record.tax, dec!(0));
    // Never taxed on gross proceeds
    assert!(assessment.obligations.is_empty());
}

#[test]
fn fifo_invariant_consumed_never_exceeds_bought() {
    let movements = vec![
        buy("ITSA4", dec!(100), dec!(8.00), d(2025, 1, 5)),
        sell("ITSA4", dec!(60), dec!(9.00), d(2025, 1, 10)),
        buy("ITSA4", dec!(50), dec!(10.00), d(2025, 2, 5)),
        sell("ITSA4", dec!(120), dec!(11.00), d(2025, 3, 5)),
        sell("ITSA4", dec!(40), dec!(12.00), d(2025, 4, 5)),
    ];
    let assessment = assess(&movements, &[], &no_metadata(), &NoLookup);

    let mut consumed_total = Decimal::ZERO;
    for record in &assessment.records {
        let consumed: Decimal = record.disposal.consumed.iter().map(|f| f.quantity).sum();
        consumed_total += consumed;

        let bought_before: Decimal = movements
            .iter()
            .filter(|m| m.is_buy() && m.date <= record.disposal.date)
            .map(|m| m.quantity)
            .sum();
        assert!(consumed_total <= bought_before);
    }

    // 150 bought in total; the oversold remainder fell back, it was not
    // conjured from lots
    assert!(consumed_total <= dec!(150));
}

#[test]
fn exemption_cliff_flips_whole_month() {
    // Two ordinary stock sales in the same month: 12,000 + 8,000 = 20,000
    // profit, exactly at the threshold
    let at_threshold = vec![
        buy("PETR4", dec!(100), dec!(10.00), d(2025, 1, 2)),
        sell("PETR4", dec!(100), dec!(130.00), d(2025, 3, 5)),
        buy("VALE3", dec!(100), dec!(10.00), d(2025, 1, 2)),
        sell("VALE3", dec!(100), dec!(90.00), d(2025, 3, 20)),
    ];
    let assessment = assess(&at_threshold, &[], &no_metadata(), &NoLookup);
    assert!(assessment.records.iter().all(|r| r.exempt));
    assert_eq!(assessment.records.iter().map(|r| r.tax).sum::<Decimal>(), dec!(0));

    // A single extra cent of profit taxes both disposals
    let over_threshold = vec![
        buy("PETR4", dec!(100), dec!(10.00), d(2025, 1, 2)),
        sell("PETR4", dec!(100), dec!(130.00), d(2025, 3, 5)),
        buy("VALE3", dec!(100), dec!(10.00), d(2025, 1, 2)),
        sell("VALE3", dec!(100), dec!(90.0001), d(2025, 3, 20)),
    ];
    let assessment = assess(&over_threshold, &[], &no_metadata(), &NoLookup);
    assert!(assessment.records.iter().all(|r| !r.exempt));
    let total: Decimal = assessment.records.iter().map(|r| r.tax).sum();
    assert_eq!(total, dec!(20000.01) * dec!(0.15));
}

#[test]
fn class_isolation_between_stock_and_crypto() {
    let mut metadata = HashMap::new();
    metadata.insert(
        "BTC".to_string(),
        HoldingMetadata {
            explicit_type: Some("Criptomoeda".to_string()),
            indexer: None,
            average_cost: None,
        },
    );

    // 19k stock profit + 30k crypto profit in the same month; a shared
    // bucket would cross both thresholds, isolated buckets cross neither
    let movements = vec![
        buy("PETR4", dec!(100), dec!(10.00), d(2025, 5, 2)),
        sell("PETR4", dec!(100), dec!(200.00), d(2025, 5, 10)),
        buy("BTC", dec!(1), dec!(100000.00), d(2025, 5, 3)),
        sell("BTC", dec!(1), dec!(130000.00), d(2025, 5, 11)),
    ];
    let assessment = assess(&movements, &[], &metadata, &NoLookup);

    for record in &assessment.records {
        assert!(record.exempt, "{} should be exempt", record.disposal.holding);
    }
}

#[test]
fn losses_do_not_offset_other_gains() {
    // A 5k loss and a 21k gain in the same month: the gain alone crosses
    // the threshold and is taxed in full, the loss is not banked
    let movements = vec![
        buy("PETR4", dec!(100), dec!(10.00), d(2025, 6, 2)),
        sell("PETR4", dec!(100), dec!(220.00), d(2025, 6, 10)),
        buy("MGLU3", dec!(100), dec!(60.00), d(2025, 6, 3)),
        sell("MGLU3", dec!(100), dec!(10.00), d(2025, 6, 11)),
    ];
    let assessment = assess(&movements, &[], &no_metadata(), &NoLookup);

    let gain = assessment
        .records
        .iter()
        .find(|r| r.disposal.holding == "PETR4")
        .unwrap();
    let loss = assessment
        .records
        .iter()
        .find(|r| r.disposal.holding == "MGLU3")
        .unwrap();

    assert_eq!(gain.tax, dec!(21000.00) * dec!(0.15));
    assert_eq!(loss.tax, dec!(0));
    assert!(loss.tax >= dec!(0), "losses never generate negative tax");
}

#[test]
fn crypto_monthly_threshold_and_progressive_rates() {
    let mut metadata = HashMap::new();
    metadata.insert(
        "ETH".to_string(),
        HoldingMetadata {
            explicit_type: Some("Criptomoeda".to_string()),
            indexer: None,
            average_cost: None,
        },
    );

    // 36k profit in one month crosses the 35k threshold; the single
    // disposal's profit lands in the top bracket
    let movements = vec![
        buy("ETH", dec!(10), dec!(10000.00), d(2025, 8, 1)),
        sell("ETH", dec!(10), dec!(13600.00), d(2025, 8, 20)),
    ];
    let assessment = assess(&movements, &[], &metadata, &NoLookup);
    let record = &assessment.records[0];
    assert_eq!(record.disposal.asset_class, AssetClass::Crypto);
    assert!(!record.exempt);
    assert_eq!(record.rate, dec!(0.225));

    // 30k profit stays under the crypto threshold
    let movements = vec![
        buy("ETH", dec!(10), dec!(10000.00), d(2025, 8, 1)),
        sell("ETH", dec!(10), dec!(13000.00), d(2025, 8, 20)),
    ];
    let assessment = assess(&movements, &[], &metadata, &NoLookup);
    assert!(assessment.records[0].exempt);
    assert_eq!(
        assessment.records[0].reason,
        Some(ExemptionReason::CryptoMonthlyThreshold)
    );
}

#[test]
fn real_estate_fund_has_no_exemption() {
    let mut metadata = HashMap::new();
    metadata.insert(
        "MXRF11".to_string(),
        HoldingMetadata {
            explicit_type: Some("FII".to_string()),
            indexer: None,
            average_cost: None,
        },
    );

    let movements = vec![
        buy("MXRF11", dec!(100), dec!(10.00), d(2025, 4, 1)),
        sell("MXRF11", dec!(100), dec!(11.00), d(2025, 4, 20)),
    ];
    let assessment = assess(&movements, &[], &metadata, &NoLookup);
    let record = &assessment.records[0];
    // 100 profit, way under 20k, still taxed: FIIs have no monthly exemption
    assert!(!record.exempt);
    assert_eq!(record.rate, dec!(0.20));
    assert_eq!(record.tax, dec!(20.00));
}

#[test]
fn obligations_carry_due_dates_and_statuses() {
    let movements = vec![
        buy("MXRF11", dec!(100), dec!(10.00), d(2024, 1, 5)),
        sell("MXRF11", dec!(100), dec!(20.00), d(2024, 1, 20)),
        buy("HGLG11", dec!(100), dec!(100.00), d(2024, 2, 5)),
        sell("HGLG11", dec!(100), dec!(110.00), d(2024, 2, 20)),
    ];
    let mut metadata = HashMap::new();
    for ticker in ["MXRF11", "HGLG11"] {
        metadata.insert(
            ticker.to_string(),
            HoldingMetadata {
                explicit_type: Some("FII".to_string()),
                indexer: None,
                average_cost: None,
            },
        );
    }

    let assessment = assess(&movements, &[], &metadata, &NoLookup);
    assert_eq!(assessment.obligations.len(), 2);

    // January sale settles on the last business day of February 2024
    assert_eq!(assessment.obligations[0].due_date, d(2024, 2, 29));
    assert_eq!(assessment.obligations[0].total, dec!(1000.00) * dec!(0.20));
    // February sale: 2024-03-31 is a Sunday, so Friday the 29th
    assert_eq!(assessment.obligations[1].due_date, d(2024, 3, 29));
}

#[test]
fn distributions_flow_through_classification() {
    let mut metadata = HashMap::new();
    metadata.insert(
        "AAPL34".to_string(),
        HoldingMetadata {
            explicit_type: Some("BDR".to_string()),
            indexer: None,
            average_cost: None,
        },
    );
    metadata.insert(
        "MXRF11".to_string(),
        HoldingMetadata {
            explicit_type: Some("FII".to_string()),
            indexer: None,
            average_cost: None,
        },
    );

    let distributions = vec![
        Distribution {
            holding: "AAPL34".to_string(),
            date: d(2025, 2, 10),
            gross_amount: dec!(10000.00),
        },
        Distribution {
            holding: "MXRF11".to_string(),
            date: d(2025, 2, 12),
            gross_amount: dec!(500.00),
        },
    ];

    let assessment = assess(&[], &distributions, &metadata, &NoLookup);
    assert_eq!(assessment.distribution_records.len(), 2);

    let bdr = &assessment.distribution_records[0];
    assert_eq!(bdr.rate, dec!(0.075));
    assert_eq!(bdr.tax, dec!(750.0000));
    assert_eq!(bdr.net, dec!(9250.0000));

    let fii = &assessment.distribution_records[1];
    assert!(fii.exempt);
    assert_eq!(fii.net, dec!(500.00));
}

#[test]
fn bdr_disposal_stays_flat_while_distribution_is_progressive() {
    let mut metadata = HashMap::new();
    metadata.insert(
        "AAPL34".to_string(),
        HoldingMetadata {
            explicit_type: Some("BDR".to_string()),
            indexer: None,
            average_cost: None,
        },
    );

    // A very large disposal profit keeps the flat 15%...
    let movements = vec![
        buy("AAPL34", dec!(1000), dec!(10.00), d(2025, 1, 5)),
        sell("AAPL34", dec!(1000), dec!(110.00), d(2025, 2, 5)),
    ];
    let assessment = assess(&movements, &[], &metadata, &NoLookup);
    assert_eq!(assessment.records[0].rate, dec!(0.15));

    // ...while a distribution of the same size climbs the brackets
    let distributions = vec![Distribution {
        holding: "AAPL34".to_string(),
        date: d(2025, 2, 10),
        gross_amount: dec!(100000.00),
    }];
    let assessment = assess(&[], &distributions, &metadata, &NoLookup);
    assert_eq!(assessment.distribution_records[0].rate, dec!(0.275));
}

#[test]
fn day_trade_gains_do_not_fill_the_ordinary_bucket() {
    // 19k day-trade gain plus 5k ordinary gain in the same month: the
    // ordinary bucket holds only 5k, so the ordinary sale stays exempt
    let movements = vec![
        buy("PETR4", dec!(100), dec!(10.00), d(2025, 9, 10)),
        sell("PETR4", dec!(100), dec!(200.00), d(2025, 9, 10)),
        buy("VALE3", dec!(100), dec!(10.00), d(2025, 9, 1)),
        sell("VALE3", dec!(100), dec!(60.00), d(2025, 9, 15)),
    ];
    let assessment = assess(&movements, &[], &no_metadata(), &NoLookup);

    let day_trade = assessment
        .records
        .iter()
        .find(|r| r.disposal.holding == "PETR4")
        .unwrap();
    let ordinary = assessment
        .records
        .iter()
        .find(|r| r.disposal.holding == "VALE3")
        .unwrap();

    assert!(day_trade.disposal.day_trade);
    assert_eq!(day_trade.rate, dec!(0.20));
    assert!(ordinary.exempt);
}
