use cashflow_core::config::{EngineConfig, DEFAULT_BASELINE_EXPENSE};
use cashflow_core::forecast::ForecastInput;
use cashflow_core::{
    CashFlowEngine, CashFlowError, CashFlowProjection, Invoice, InvoiceStatus, Matter, Payment,
    PeriodType,
};
use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn empty_input(as_of: NaiveDate, period: PeriodType) -> ForecastInput {
    ForecastInput {
        as_of,
        period,
        invoices: vec![],
        matters: vec![],
        time_entries: vec![],
        payments: vec![],
        starting_balance: Decimal::ZERO,
        horizon: None,
    }
}

/// A mid-sized litigation practice: a year of payment history and a mix of
/// current, aging and settled invoices.
fn sample_practice(as_of: NaiveDate) -> ForecastInput {
    let mut invoices = Vec::new();
    let mut payments = Vec::new();

    for i in 0..14i64 {
        let issued = as_of - Duration::days(400 - i * 28);
        let id = format!("PAID-{i}");
        let amount = Decimal::from(60_000 + i * 2_500);
        invoices.push(Invoice {
            id: id.clone(),
            matter_id: format!("M-{}", i % 4),
            issue_date: issued,
            due_date: issued + Duration::days(30),
            amount,
            status: InvoiceStatus::Paid,
        });
        payments.push(Payment {
            id: format!("PAY-{i}"),
            invoice_id: id,
            amount,
            payment_date: issued + Duration::days(40),
        });
    }

    let open = [
        ("OPEN-1", -50, dec!(45_000), InvoiceStatus::Unpaid),
        ("OPEN-2", -10, dec!(80_000), InvoiceStatus::Sent),
        ("OPEN-3", 20, dec!(120_000), InvoiceStatus::Sent),
        ("OPEN-4", 75, dec!(65_000), InvoiceStatus::Sent),
        ("LATE-1", -120, dec!(30_000), InvoiceStatus::Overdue),
    ];
    for (id, due_offset, amount, status) in open {
        let due = as_of + Duration::days(due_offset);
        invoices.push(Invoice {
            id: id.into(),
            matter_id: "M-9".into(),
            issue_date: due - Duration::days(30),
            due_date: due,
            amount,
            status,
        });
    }

    ForecastInput {
        as_of,
        period: PeriodType::Monthly,
        invoices,
        matters: vec![
            Matter {
                id: "M-1".into(),
                name: Some("Harbor v. Lane".into()),
                wip_value: dec!(85_000),
            },
            Matter { id: "M-2".into(), name: None, wip_value: dec!(40_000) },
        ],
        time_entries: vec![],
        payments,
        starting_balance: dec!(250_000),
        horizon: None,
    }
}

fn assert_ledger_consistent(projections: &[CashFlowProjection], starting_balance: Decimal) {
    let mut previous = starting_balance;
    for p in projections {
        assert_eq!(p.net_cash_flow, p.expected_inflow - p.expected_outflow);
        assert_eq!(p.cumulative_balance, previous + p.net_cash_flow);
        previous = p.cumulative_balance;
    }
}

// ===========================================================================
// Worked examples
// ===========================================================================

#[test]
fn test_empty_book_twelve_month_forecast() {
    let engine = CashFlowEngine::default();
    let forecast = engine
        .generate_forecast(&empty_input(date(2024, 1, 15), PeriodType::Monthly))
        .unwrap();

    assert_eq!(forecast.projections.len(), 12);
    for p in &forecast.projections {
        assert_eq!(p.expected_inflow, Decimal::ZERO);
        assert_eq!(p.net_cash_flow, -DEFAULT_BASELINE_EXPENSE);
    }
    for pair in forecast.projections.windows(2) {
        assert!(pair[1].cumulative_balance < pair[0].cumulative_balance);
    }
    assert_ledger_consistent(&forecast.projections, Decimal::ZERO);
}

#[test]
fn test_single_aged_invoice_contributes_seventy_percent() {
    // April has a neutral seasonal multiplier, isolating the aging discount.
    let as_of = date(2024, 4, 20);
    let mut input = empty_input(as_of, PeriodType::Monthly);
    input.invoices.push(Invoice {
        id: "INV-45K".into(),
        matter_id: "M-1".into(),
        issue_date: as_of - Duration::days(40),
        due_date: as_of - Duration::days(35),
        amount: dec!(45_000),
        status: InvoiceStatus::Unpaid,
    });

    let forecast = CashFlowEngine::default().generate_forecast(&input).unwrap();
    assert_eq!(forecast.projections[0].expected_inflow, dec!(31_500));
    let rest: Decimal = forecast.projections[1..]
        .iter()
        .map(|p| p.expected_inflow)
        .sum();
    assert_eq!(rest, Decimal::ZERO);
}

#[test]
fn test_scenario_probabilities_fixed() {
    let forecast = CashFlowEngine::default()
        .generate_forecast(&sample_practice(date(2024, 6, 3)))
        .unwrap();
    let probabilities: Vec<Decimal> = forecast.scenarios.iter().map(|s| s.probability).collect();
    assert_eq!(probabilities, vec![dec!(0.6), dec!(0.2), dec!(0.2)]);
}

// ===========================================================================
// End-to-end behaviour
// ===========================================================================

#[test]
fn test_sample_practice_forecast() {
    let input = sample_practice(date(2024, 6, 3));
    let engine = CashFlowEngine::default();
    let forecast = engine.generate_forecast(&input).unwrap();

    assert_eq!(forecast.projections.len(), 12);
    assert_ledger_consistent(&forecast.projections, input.starting_balance);
    for scenario in &forecast.scenarios {
        assert_ledger_consistent(&scenario.projections, input.starting_balance);
    }

    // 19 invoices and modest volatility: no penalties.
    assert_eq!(forecast.overall_confidence, dec!(0.8));
    assert_eq!(forecast.unbilled_wip, dec!(125_000));
    assert!(forecast.historical.seasonality_detected);

    // Optimistic closes above likely, pessimistic below.
    let closing: Vec<Decimal> = forecast
        .scenarios
        .iter()
        .map(|s| s.projections.last().unwrap().cumulative_balance)
        .collect();
    assert!(closing[1] > closing[0]);
    assert!(closing[2] < closing[0]);
}

#[test]
fn test_open_invoice_inflow_before_seasonality() {
    // June multiplier is 1.0 so the first period shows the raw aging sum:
    // OPEN-1 (50 days late) at 0.7, OPEN-2 (10 days late) at 0.8 and
    // OPEN-3 (due in 20 days, same window) at 0.9. LATE-1 is not open.
    let forecast = CashFlowEngine::default()
        .generate_forecast(&sample_practice(date(2024, 6, 3)))
        .unwrap();
    assert_eq!(
        forecast.projections[0].expected_inflow,
        dec!(45_000) * dec!(0.7) + dec!(80_000) * dec!(0.8) + dec!(120_000) * dec!(0.9)
    );
    // OPEN-4 is due 17 Aug, inside the 3 Aug - 3 Sep window.
    assert_eq!(forecast.projections[1].expected_inflow, Decimal::ZERO);
    // August multiplier 0.8.
    assert_eq!(
        forecast.projections[2].expected_inflow,
        dec!(65_000) * dec!(0.9) * dec!(0.8)
    );
}

#[test]
fn test_weekly_and_quarterly_horizons() {
    let engine = CashFlowEngine::default();
    let weekly = engine
        .generate_forecast(&empty_input(date(2024, 3, 4), PeriodType::Weekly))
        .unwrap();
    assert_eq!(weekly.projections.len(), 12);
    assert_eq!(weekly.projections[11].date, date(2024, 5, 20));

    let quarterly = engine
        .generate_forecast(&empty_input(date(2024, 3, 4), PeriodType::Quarterly))
        .unwrap();
    assert_eq!(quarterly.projections.len(), 4);
    assert_eq!(quarterly.projections[3].date, date(2024, 12, 4));
}

#[test]
fn test_recalibrated_seasonal_table() {
    let mut config = EngineConfig::default();
    config.seasonal_patterns.clear();
    let engine = CashFlowEngine::new(config).unwrap();

    let as_of = date(2024, 12, 2);
    let mut input = empty_input(as_of, PeriodType::Monthly);
    input.invoices.push(Invoice {
        id: "DEC".into(),
        matter_id: "M-1".into(),
        issue_date: as_of - Duration::days(10),
        due_date: as_of + Duration::days(5),
        amount: dec!(10_000),
        status: InvoiceStatus::Sent,
    });
    let forecast = engine.generate_forecast(&input).unwrap();
    // Without the December 0.6 multiplier the inflow is the plain 90%.
    assert_eq!(forecast.projections[0].expected_inflow, dec!(9_000));
    assert_eq!(forecast.projections[0].confidence, dec!(0.8));
}

#[test]
fn test_december_slowdown_applied() {
    let as_of = date(2024, 12, 2);
    let mut input = empty_input(as_of, PeriodType::Monthly);
    input.invoices.push(Invoice {
        id: "DEC".into(),
        matter_id: "M-1".into(),
        issue_date: as_of - Duration::days(10),
        due_date: as_of + Duration::days(5),
        amount: dec!(10_000),
        status: InvoiceStatus::Sent,
    });
    let forecast = CashFlowEngine::default().generate_forecast(&input).unwrap();
    assert_eq!(forecast.projections[0].expected_inflow, dec!(5_400));
    assert_eq!(forecast.projections[0].confidence, dec!(0.8) * dec!(0.7));
}

#[test]
fn test_horizon_zero_is_wrapped_error() {
    let mut input = empty_input(date(2024, 1, 1), PeriodType::Monthly);
    input.horizon = Some(0);
    let err = CashFlowEngine::default().generate_forecast(&input).unwrap_err();
    match err {
        CashFlowError::ForecastFailed(inner) => {
            assert!(matches!(*inner, CashFlowError::InvalidInput { .. }))
        }
        other => panic!("expected ForecastFailed, got {other:?}"),
    }
}

#[test]
fn test_history_beyond_decimal_range_is_wrapped_error() {
    let mut input = empty_input(date(2024, 3, 1), PeriodType::Monthly);
    input.payments = vec![
        Payment {
            id: "P-JAN".into(),
            invoice_id: "INV-1".into(),
            amount: dec!(0),
            payment_date: date(2024, 1, 15),
        },
        Payment {
            id: "P-FEB".into(),
            invoice_id: "INV-2".into(),
            amount: dec!(600_000_000_000_000),
            payment_date: date(2024, 2, 15),
        },
    ];
    let err = CashFlowEngine::default().generate_forecast(&input).unwrap_err();
    match err {
        CashFlowError::ForecastFailed(inner) => match *inner {
            CashFlowError::InvalidInput { ref field, .. } => assert_eq!(field, "payments"),
            ref other => panic!("expected InvalidInput, got {other:?}"),
        },
        other => panic!("expected ForecastFailed, got {other:?}"),
    }
}

#[test]
fn test_forecast_input_from_json_uses_defaults() {
    let input: ForecastInput = serde_json::from_str(
        r#"{
            "as_of": "2024-02-01",
            "invoices": [{
                "id": "A", "matter_id": "M", "issue_date": "2024-01-01",
                "due_date": "2024-01-31", "amount": "1000", "status": "sent"
            }]
        }"#,
    )
    .unwrap();
    assert_eq!(input.period, PeriodType::Monthly);
    assert_eq!(input.starting_balance, Decimal::ZERO);
    let forecast = CashFlowEngine::default().generate_forecast(&input).unwrap();
    assert_eq!(forecast.projections.len(), 12);
}

// ===========================================================================
// Properties
// ===========================================================================

fn open_status() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Sent),
        Just(InvoiceStatus::Unpaid),
        Just(InvoiceStatus::Overdue),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Draft),
    ]
}

fn period_type() -> impl Strategy<Value = PeriodType> {
    prop_oneof![
        Just(PeriodType::Weekly),
        Just(PeriodType::Monthly),
        Just(PeriodType::Quarterly),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Property: cumulative balances chain from the starting balance and
    /// net = inflow - outflow, for the forecast and every scenario.
    #[test]
    fn cumulative_balance_chains(
        invoices in prop::collection::vec(
            (1i64..2_000_000i64, -200i64..500i64, open_status()),
            0..25,
        ),
        starting in -500_000i64..2_000_000i64,
        day_of_year in 0i64..365i64,
        period in period_type(),
    ) {
        let as_of = date(2024, 1, 1) + Duration::days(day_of_year);
        let mut input = empty_input(as_of, period);
        input.starting_balance = Decimal::from(starting);
        for (i, (amount, due_offset, status)) in invoices.into_iter().enumerate() {
            let due = as_of + Duration::days(due_offset);
            input.invoices.push(Invoice {
                id: format!("INV-{i}"),
                matter_id: "M".into(),
                issue_date: due - Duration::days(30),
                due_date: due,
                amount: Decimal::from(amount),
                status,
            });
        }

        let forecast = CashFlowEngine::default().generate_forecast(&input).unwrap();
        prop_assert_eq!(forecast.projections.len() as u32, period.default_horizon());

        let mut previous = input.starting_balance;
        for p in &forecast.projections {
            prop_assert_eq!(p.net_cash_flow, p.expected_inflow - p.expected_outflow);
            prop_assert_eq!(p.cumulative_balance, previous + p.net_cash_flow);
            prop_assert!(p.confidence >= Decimal::ZERO && p.confidence <= Decimal::ONE);
            previous = p.cumulative_balance;
        }
        for scenario in &forecast.scenarios {
            let mut previous = input.starting_balance;
            for p in &scenario.projections {
                prop_assert_eq!(p.net_cash_flow, p.expected_inflow - p.expected_outflow);
                prop_assert_eq!(p.cumulative_balance, previous + p.net_cash_flow);
                previous = p.cumulative_balance;
            }
        }
    }

    /// Property: overall confidence stays within [0.3, 0.95] for any volume
    /// of invoices and any payment volatility.
    #[test]
    fn overall_confidence_clamped(
        invoice_count in 0usize..40,
        payment_amounts in prop::collection::vec(0i64..5_000_000i64, 0..30),
    ) {
        let as_of = date(2024, 6, 1);
        let mut input = empty_input(as_of, PeriodType::Monthly);
        for i in 0..invoice_count {
            input.invoices.push(Invoice {
                id: format!("P-{i}"),
                matter_id: "M".into(),
                issue_date: date(2023, 1, 1),
                due_date: date(2023, 1, 31),
                amount: dec!(1_000),
                status: InvoiceStatus::Paid,
            });
        }
        for (i, amount) in payment_amounts.into_iter().enumerate() {
            input.payments.push(Payment {
                id: format!("PAY-{i}"),
                invoice_id: "P-0".into(),
                amount: Decimal::from(amount),
                payment_date: date(2022, 1, 15) + Duration::days(31 * i as i64),
            });
        }
        let forecast = CashFlowEngine::default().generate_forecast(&input).unwrap();
        prop_assert!(forecast.overall_confidence >= dec!(0.3));
        prop_assert!(forecast.overall_confidence <= dec!(0.95));
    }
}
