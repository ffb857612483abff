// ═══════════════════════════════════════════════════════════════════
// Service Tests — PositionLedger, ValuationService,
// PriceSeriesGenerator, SeriesCache
// ═══════════════════════════════════════════════════════════════════

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use paper_brokerage_core::errors::CoreError;
use paper_brokerage_core::models::catalog::Catalog;
use paper_brokerage_core::models::holding::Holding;
use paper_brokerage_core::models::instrument::Instrument;
use paper_brokerage_core::models::range::RangeKey;
use paper_brokerage_core::models::trade::TradeSide;
use paper_brokerage_core::services::ledger_service::{round_money, PositionLedger};
use paper_brokerage_core::services::series_cache::SeriesCache;
use paper_brokerage_core::services::series_generator::{PriceSeriesGenerator, PRICE_FLOOR};
use paper_brokerage_core::services::valuation_service::ValuationService;

fn test_catalog() -> Catalog {
    Catalog::from_instruments(vec![
        Instrument::stock("A", "Alpha Industries", "ALPHA", "AL", 120.0),
        Instrument::stock("B", "Beta Motors", "BETA", "BE", 40.0),
        Instrument::fund("F", "Flexi Cap Fund", "FND", 10.0),
    ])
    .unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// PositionLedger — buys
// ═══════════════════════════════════════════════════════════════════

mod ledger_buy {
    use super::*;

    #[test]
    fn first_buy_sets_average_to_price() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 10.0, 100.0).unwrap();

        let h = ledger.holding("A").unwrap();
        assert_eq!(h.quantity, 10.0);
        assert_eq!(h.average_cost, 100.0);
    }

    #[test]
    fn weighted_average_over_several_buys() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let buys = [(10.0, 100.0), (5.0, 130.0), (5.0, 90.0)];
        for (q, p) in buys {
            ledger.buy(&catalog, "A", q, p).unwrap();
        }

        let expected: f64 =
            buys.iter().map(|(q, p)| q * p).sum::<f64>() / buys.iter().map(|(q, _)| q).sum::<f64>();
        let h = ledger.holding("A").unwrap();
        assert_eq!(h.quantity, 20.0);
        assert!((h.average_cost - expected).abs() < 0.01);
        assert_eq!(h.average_cost, 105.0);
    }

    #[test]
    fn reordered_buys_agree_within_rounding() {
        let catalog = test_catalog();
        let buys = [(3.0, 101.37), (7.0, 99.91), (2.0, 120.05), (11.0, 87.33)];

        let mut forward = PositionLedger::new();
        for (q, p) in buys {
            forward.buy(&catalog, "A", q, p).unwrap();
        }
        let mut backward = PositionLedger::new();
        for (q, p) in buys.iter().rev() {
            backward.buy(&catalog, "A", *q, *p).unwrap();
        }

        let a = forward.holding("A").unwrap().average_cost;
        let b = backward.holding("A").unwrap().average_cost;
        assert!((a - b).abs() <= 0.02, "{a} vs {b}");
    }

    #[test]
    fn average_is_rounded_to_cents() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 1.0, 10.0).unwrap();
        ledger.buy(&catalog, "A", 2.0, 10.01).unwrap();

        // (10 + 20.02) / 3 = 10.00666…
        assert_eq!(ledger.holding("A").unwrap().average_cost, 10.01);
    }

    #[test]
    fn positive_apply_is_a_buy() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let trade = ledger.apply(&catalog, "B", 3.0, 50.0).unwrap();

        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.quantity, 3.0);
        assert_eq!(trade.realized_pl, None);
        assert_eq!(ledger.quantity_of("B"), 3.0);
    }

    #[test]
    fn zero_price_buy_is_allowed() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 2.0, 0.0).unwrap();
        assert_eq!(ledger.holding("A").unwrap().average_cost, 0.0);
    }

    #[test]
    fn fund_accepts_fractional_units() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "F", 2.5, 10.0).unwrap();
        ledger.buy(&catalog, "F", 0.25, 12.0).unwrap();

        let h = ledger.holding("F").unwrap();
        assert_eq!(h.quantity, 2.75);
        // (25 + 3) / 2.75 = 10.1818…
        assert_eq!(h.average_cost, 10.18);
    }

    #[test]
    fn accumulate_buys_at_catalog_price() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let trade = ledger.accumulate(&catalog, "F", 1.0).unwrap();

        assert_eq!(trade.side, TradeSide::Accumulate);
        assert_eq!(trade.unit_price, 10.0);
        assert_eq!(ledger.holding("F").unwrap().average_cost, 10.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PositionLedger — sells
// ═══════════════════════════════════════════════════════════════════

mod ledger_sell {
    use super::*;

    #[test]
    fn sell_preserves_average() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 10.0, 100.0).unwrap();
        ledger.sell(&catalog, "A", 4.0, 150.0).unwrap();

        let h = ledger.holding("A").unwrap();
        assert_eq!(h.quantity, 6.0);
        assert_eq!(h.average_cost, 100.0);
    }

    #[test]
    fn negative_apply_is_a_sell() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.apply(&catalog, "A", 10.0, 100.0).unwrap();
        let trade = ledger.apply(&catalog, "A", -4.0, 120.0).unwrap();

        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.quantity, 4.0);
        assert_eq!(trade.realized_pl, Some(80.0));
        assert_eq!(ledger.quantity_of("A"), 6.0);
    }

    #[test]
    fn full_close_removes_holding() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 5.0, 200.0).unwrap();
        ledger.sell(&catalog, "A", 5.0, 200.0).unwrap();

        assert!(ledger.holding("A").is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn buy_after_full_close_starts_fresh() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 5.0, 200.0).unwrap();
        ledger.sell(&catalog, "A", 5.0, 200.0).unwrap();
        ledger.buy(&catalog, "A", 3.0, 50.0).unwrap();

        let h = ledger.holding("A").unwrap();
        assert_eq!(h.quantity, 3.0);
        assert_eq!(h.average_cost, 50.0);
    }

    #[test]
    fn fractional_fund_full_close() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "F", 0.1, 10.0).unwrap();
        ledger.buy(&catalog, "F", 0.2, 10.0).unwrap();
        ledger.sell(&catalog, "F", 0.3, 10.0).unwrap();

        assert!(ledger.holding("F").is_none());
    }

    #[test]
    fn oversell_rejected_and_state_unchanged() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 10.0, 100.0).unwrap();
        let before = ledger.holding("A").cloned();

        let err = ledger.sell(&catalog, "A", 11.0, 100.0).unwrap_err();
        match err {
            CoreError::InsufficientQuantity {
                instrument_id,
                requested,
                held,
            } => {
                assert_eq!(instrument_id, "A");
                assert_eq!(requested, 11.0);
                assert_eq!(held, 10.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ledger.holding("A").cloned(), before);
        assert_eq!(ledger.trades().len(), 1);
    }

    #[test]
    fn sell_without_holding_rejected() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let err = ledger.apply(&catalog, "B", -1.0, 40.0).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientQuantity { held, .. } if held == 0.0));
    }

    #[test]
    fn realized_loss_is_negative() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "B", 3.0, 50.0).unwrap();
        let trade = ledger.sell(&catalog, "B", 2.0, 40.0).unwrap();
        assert_eq!(trade.realized_pl, Some(-20.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// PositionLedger — validation
// ═══════════════════════════════════════════════════════════════════

mod ledger_validation {
    use super::*;

    #[test]
    fn zero_quantity_rejected() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let err = ledger.apply(&catalog, "A", 0.0, 100.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity(_)));
    }

    #[test]
    fn negative_buy_quantity_rejected() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let err = ledger.buy(&catalog, "A", -2.0, 100.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity(_)));
    }

    #[test]
    fn non_finite_quantity_rejected() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        assert!(matches!(
            ledger.apply(&catalog, "A", f64::NAN, 100.0),
            Err(CoreError::InvalidQuantity(_))
        ));
        assert!(matches!(
            ledger.apply(&catalog, "A", f64::INFINITY, 100.0),
            Err(CoreError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn fractional_stock_quantity_rejected() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let err = ledger.buy(&catalog, "A", 1.5, 100.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn negative_price_rejected() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let err = ledger.buy(&catalog, "A", 1.0, -5.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPrice(_)));
    }

    #[test]
    fn unknown_instrument_rejected() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        let err = ledger.buy(&catalog, "ZZZ", 1.0, 5.0).unwrap_err();
        assert!(matches!(err, CoreError::UnknownInstrument(id) if id == "ZZZ"));
        assert!(ledger.trades().is_empty());
    }

    #[test]
    fn failed_operations_leave_journal_untouched() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 1.0, 100.0).unwrap();
        let _ = ledger.sell(&catalog, "A", 2.0, 100.0);
        let _ = ledger.buy(&catalog, "A", 0.0, 100.0);
        ledger.sell(&catalog, "A", 1.0, 100.0).unwrap();

        let sides: Vec<TradeSide> = ledger.trades().iter().map(|t| t.side).collect();
        assert_eq!(sides, vec![TradeSide::Buy, TradeSide::Sell]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PositionLedger — queries
// ═══════════════════════════════════════════════════════════════════

mod ledger_queries {
    use super::*;

    #[test]
    fn counts() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 2.0, 100.0).unwrap();
        ledger.buy(&catalog, "B", 3.0, 50.0).unwrap();
        ledger.buy(&catalog, "F", 0.5, 10.0).unwrap();

        assert_eq!(ledger.position_count(), 3);
        assert_eq!(ledger.unit_count(), 5.5);
    }

    #[test]
    fn holdings_sorted_by_id() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "F", 1.0, 10.0).unwrap();
        ledger.buy(&catalog, "A", 1.0, 100.0).unwrap();
        ledger.buy(&catalog, "B", 1.0, 50.0).unwrap();

        let ids: Vec<&str> = ledger.holdings().iter().map(|h| h.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "F"]);
    }

    #[test]
    fn from_holdings_drops_empty_rows() {
        let ledger = PositionLedger::from_holdings(vec![
            Holding::new("A", 2.0, 100.0),
            Holding::new("B", 0.0, 50.0),
        ]);
        assert_eq!(ledger.position_count(), 1);
        assert!(ledger.holding("B").is_none());
    }

    #[test]
    fn round_money_half_cents() {
        assert_eq!(round_money(10.006), 10.01);
        assert_eq!(round_money(10.004), 10.0);
        assert_eq!(round_money(-3.336), -3.34);
    }
}

// ═══════════════════════════════════════════════════════════════════
// ValuationService
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    fn two_position_ledger(catalog: &Catalog) -> PositionLedger {
        let mut ledger = PositionLedger::new();
        ledger.buy(catalog, "A", 2.0, 100.0).unwrap();
        ledger.buy(catalog, "B", 3.0, 50.0).unwrap();
        ledger
    }

    #[test]
    fn totals_match_expected() {
        let catalog = test_catalog();
        let ledger = two_position_ledger(&catalog);
        let service = ValuationService::new();

        let summary = service.summarize(&ledger, &catalog);
        assert_eq!(summary.total_value, 360.0);
        assert_eq!(summary.total_invested, 350.0);
        assert_eq!(summary.unrealized_pl, 10.0);
        assert!((summary.unrealized_pl_pct - 10.0 / 350.0 * 100.0).abs() < 1e-9);
        assert_eq!(service.portfolio_total(&ledger, &catalog), 360.0);
    }

    #[test]
    fn count_is_summed_units() {
        let catalog = test_catalog();
        let ledger = two_position_ledger(&catalog);
        let service = ValuationService::new();

        let summary = service.summarize(&ledger, &catalog);
        assert_eq!(summary.unit_count, 5.0);
        assert_eq!(summary.position_count, 2);
        assert_eq!(service.portfolio_count(&ledger), 5.0);
    }

    #[test]
    fn per_holding_figures() {
        let catalog = test_catalog();
        let ledger = two_position_ledger(&catalog);
        let service = ValuationService::new();

        let a = service.value_holding(ledger.holding("A").unwrap(), catalog.get("A").unwrap());
        assert_eq!(a.current_value, 240.0);
        assert_eq!(a.unrealized_pl, 40.0);
        assert_eq!(a.unrealized_pl_pct, 20.0);
        assert_eq!(a.symbol, "ALPHA");

        let b = service.value_holding(ledger.holding("B").unwrap(), catalog.get("B").unwrap());
        assert_eq!(b.current_value, 120.0);
        assert_eq!(b.unrealized_pl, -30.0);
        assert_eq!(b.unrealized_pl_pct, -20.0);
    }

    #[test]
    fn holdings_sorted_by_allocation() {
        let catalog = test_catalog();
        let ledger = two_position_ledger(&catalog);
        let summary = ValuationService::new().summarize(&ledger, &catalog);

        assert_eq!(summary.holdings[0].instrument_id, "A");
        assert!((summary.holdings[0].allocation_pct - 240.0 / 360.0 * 100.0).abs() < 1e-9);
        let total: f64 = summary.holdings.iter().map(|h| h.allocation_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_cost_basis_gives_zero_percent() {
        let catalog = test_catalog();
        let mut ledger = PositionLedger::new();
        ledger.buy(&catalog, "A", 1.0, 0.0).unwrap();
        let service = ValuationService::new();

        let h = ledger.holding("A").unwrap();
        let i = catalog.get("A").unwrap();
        assert_eq!(service.unrealized_pl(h, i), 120.0);
        assert_eq!(service.unrealized_pl_pct(h, i), 0.0);
        assert_eq!(service.summarize(&ledger, &catalog).unrealized_pl_pct, 0.0);
    }

    #[test]
    fn empty_ledger_summary() {
        let catalog = test_catalog();
        let summary = ValuationService::new().summarize(&PositionLedger::new(), &catalog);
        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.unrealized_pl_pct, 0.0);
        assert_eq!(summary.position_count, 0);
        assert!(summary.holdings.is_empty());
    }

    #[test]
    fn holding_missing_from_catalog_is_skipped() {
        let catalog = test_catalog();
        let ledger = PositionLedger::from_holdings(vec![
            Holding::new("A", 1.0, 100.0),
            Holding::new("GONE", 4.0, 10.0),
        ]);
        let summary = ValuationService::new().summarize(&ledger, &catalog);
        assert_eq!(summary.position_count, 1);
        assert_eq!(summary.total_value, 120.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PriceSeriesGenerator
// ═══════════════════════════════════════════════════════════════════

mod generator {
    use super::*;

    #[test]
    fn length_matches_point_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = PriceSeriesGenerator::new().generate(&mut rng, 100.0, 250, 0.05);
        assert_eq!(series.len(), 250);
    }

    #[test]
    fn too_few_points_coerced_to_two() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = PriceSeriesGenerator::new().generate(&mut rng, 100.0, 0, 0.05);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn steps_are_bounded_by_volatility() {
        let mut rng = StdRng::seed_from_u64(11);
        let base = 500.0;
        let vol = 0.06;
        let series = PriceSeriesGenerator::new().generate(&mut rng, base, 400, vol);

        let bound = vol * base / 2.0 + 0.01;
        for pair in series.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= bound, "{pair:?}");
        }
        let first_bound = base * 0.005 + vol * base / 2.0 + 0.01;
        assert!((series[0] - base).abs() <= first_bound);
    }

    #[test]
    fn never_below_floor() {
        let mut rng = StdRng::seed_from_u64(3);
        // Huge volatility on a cheap instrument drives the walk into the floor
        let series = PriceSeriesGenerator::new().generate(&mut rng, 2.0, 500, 5.0);
        assert!(series.iter().all(|&p| p >= PRICE_FLOOR));
    }

    #[test]
    fn sub_unit_base_floors_at_base() {
        let mut rng = StdRng::seed_from_u64(3);
        let series = PriceSeriesGenerator::new().generate(&mut rng, 0.5, 300, 2.0);
        assert!(series.iter().all(|&p| p >= 0.5 && p > 0.0));
    }

    #[test]
    fn non_positive_base_still_positive() {
        let mut rng = StdRng::seed_from_u64(5);
        let series = PriceSeriesGenerator::new().generate(&mut rng, 0.0, 50, 0.1);
        assert!(series.iter().all(|&p| p >= PRICE_FLOOR));
    }

    #[test]
    fn points_are_rounded_to_cents() {
        let mut rng = StdRng::seed_from_u64(9);
        let series = PriceSeriesGenerator::new().generate(&mut rng, 1234.56, 100, 0.02);
        for p in series {
            assert!((p * 100.0 - (p * 100.0).round()).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_same_series() {
        let g = PriceSeriesGenerator::new();
        let a = g.generate_for(&mut StdRng::seed_from_u64(42), 100.0, RangeKey::Month.profile());
        let b = g.generate_for(&mut StdRng::seed_from_u64(42), 100.0, RangeKey::Month.profile());
        assert_eq!(a, b);
    }

    #[test]
    fn zero_volatility_is_flat_after_opening() {
        let mut rng = StdRng::seed_from_u64(1);
        let series = PriceSeriesGenerator::new().generate(&mut rng, 100.0, 20, 0.0);
        assert!(series.windows(2).all(|w| w[0] == w[1]));
    }
}

// ═══════════════════════════════════════════════════════════════════
// SeriesCache
// ═══════════════════════════════════════════════════════════════════

mod series_cache {
    use super::*;

    #[test]
    fn repeated_get_returns_same_series() {
        let catalog = test_catalog();
        let mut cache = SeriesCache::with_seed(1);
        let a = catalog.get("A").unwrap();

        let first = cache.get(a, "1M".parse().unwrap());
        let second = cache.get(a, "1M".parse().unwrap());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn length_follows_range_profile() {
        let catalog = test_catalog();
        let mut cache = SeriesCache::with_seed(1);
        let a = catalog.get("A").unwrap();

        for range in RangeKey::ALL {
            assert_eq!(cache.get(a, range).len(), range.profile().point_count);
        }
        assert_eq!(cache.len(), RangeKey::ALL.len());
    }

    #[test]
    fn keyed_by_instrument_and_range() {
        let catalog = test_catalog();
        let mut cache = SeriesCache::with_seed(1);

        let a_day = cache.get(catalog.get("A").unwrap(), RangeKey::Day);
        let b_day = cache.get(catalog.get("B").unwrap(), RangeKey::Day);
        assert!(!Arc::ptr_eq(&a_day, &b_day));
        assert!(cache.contains("A", RangeKey::Day));
        assert!(!cache.contains("A", RangeKey::Week));
    }

    #[test]
    fn peek_does_not_generate() {
        let catalog = test_catalog();
        let mut cache = SeriesCache::with_seed(1);
        assert!(cache.peek("A", RangeKey::Day).is_none());
        assert!(cache.is_empty());

        let generated = cache.get(catalog.get("A").unwrap(), RangeKey::Day);
        let peeked = cache.peek("A", RangeKey::Day).unwrap();
        assert!(Arc::ptr_eq(&generated, &peeked));
    }

    #[test]
    fn price_change_does_not_regenerate() {
        let mut catalog = test_catalog();
        let mut cache = SeriesCache::with_seed(1);
        let before = cache.get(catalog.get("A").unwrap(), RangeKey::Week);

        catalog.set_price("A", 999.0).unwrap();
        let after = cache.get(catalog.get("A").unwrap(), RangeKey::Week);
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn same_seed_same_session() {
        let catalog = test_catalog();
        let mut one = SeriesCache::with_seed(99);
        let mut two = SeriesCache::with_seed(99);
        let a = catalog.get("A").unwrap();
        assert_eq!(one.get(a, RangeKey::Year), two.get(a, RangeKey::Year));
    }

    #[test]
    fn clear_forgets_everything() {
        let catalog = test_catalog();
        let mut cache = SeriesCache::with_seed(1);
        cache.get(catalog.get("A").unwrap(), RangeKey::Day);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn entropy_seeded_cache_is_stable_too() {
        let catalog = test_catalog();
        let mut cache = SeriesCache::new();
        let f = catalog.get("F").unwrap();
        let first = cache.get(f, RangeKey::HalfYear);
        assert_eq!(first, cache.get(f, RangeKey::HalfYear));
    }
}
