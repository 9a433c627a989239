// ═══════════════════════════════════════════════════════════════════
// Dividend Transform Tests — forward apply, exact-sum allocation,
// revert, idempotence, cash handling
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use uuid::Uuid;

use equity_ledger_core::book::LedgerBook;
use equity_ledger_core::errors::LedgerError;
use equity_ledger_core::models::dividend::{DividendEvent, DividendKind, DividendScope};
use equity_ledger_core::models::fees::FeeSchedule;
use equity_ledger_core::models::order::{LongTermOrder, TradeDirection};
use equity_ledger_core::services::dividend_service::DividendService;
use equity_ledger_core::services::ledger_service::LedgerService;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn record(
    book: &mut LedgerBook,
    owner: &str,
    direction: TradeDirection,
    quantity: i64,
    price: i64,
    date: NaiveDate,
) -> Uuid {
    let mut order = LongTermOrder::new(
        "005930", "kiwoom", owner, direction, quantity, price, date,
    );
    LedgerService::new()
        .price_order(book, &mut order, &FeeSchedule::free())
        .unwrap();
    let id = order.id;
    book.insert_order(order);
    id
}

fn stock_dividend(book: &mut LedgerBook, owner: &str, date: NaiveDate, pct: f64) -> Uuid {
    let event = DividendEvent::new("005930", owner, date, DividendKind::Stock, pct);
    let id = event.id;
    book.insert_dividend(event);
    id
}

// ═══════════════════════════════════════════════════════════════════
//  Forward transform — stock
// ═══════════════════════════════════════════════════════════════════

mod forward_stock {
    use super::*;

    #[test]
    fn ten_percent_on_three_buys_fixture() {
        // 300/400/300 before the split date → new total 1100,
        // proportional shares 330/440/330 with no remainder correction.
        let mut book = LedgerBook::new();
        let a = record(&mut book, "alice", TradeDirection::Buy, 300, 50_000, d(2025, 1, 10));
        let b = record(&mut book, "alice", TradeDirection::Buy, 400, 50_000, d(2025, 2, 10));
        let c = record(&mut book, "alice", TradeDirection::Buy, 300, 50_000, d(2025, 3, 10));
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let outcome = DividendService::new()
            .apply(&mut book, div, DividendScope::Owner)
            .unwrap();
        assert_eq!(outcome.adjusted, 3);

        assert_eq!(book.order(a).unwrap().quantity, 330);
        assert_eq!(book.order(b).unwrap().quantity, 440);
        assert_eq!(book.order(c).unwrap().quantity, 330);

        // price = floor(50,000 / 1.1) = 45,454
        for id in [a, b, c] {
            assert_eq!(book.order(id).unwrap().price, 45_454);
        }

        assert!(book.dividend(div).unwrap().is_used);
    }

    #[test]
    fn sum_invariant_holds_with_remainder_correction() {
        let mut book = LedgerBook::new();
        let ids: Vec<Uuid> = [1, 1, 1]
            .iter()
            .enumerate()
            .map(|(i, &q)| {
                record(&mut book, "alice", TradeDirection::Buy, q, 10_000, d(2025, 1, 1 + i as u32))
            })
            .collect();
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 50.0);

        DividendService::new()
            .apply(&mut book, div, DividendScope::Owner)
            .unwrap();

        // new total = round(3 × 1.5) = 5, exactly.
        let total: i64 = ids.iter().map(|&id| book.order(id).unwrap().quantity).sum();
        assert_eq!(total, 5);
        let mut quantities: Vec<i64> =
            ids.iter().map(|&id| book.order(id).unwrap().quantity).collect();
        quantities.sort_unstable();
        assert_eq!(quantities, vec![1, 2, 2]);
    }

    #[test]
    fn only_orders_before_the_dividend_date_are_touched() {
        let mut book = LedgerBook::new();
        let before = record(&mut book, "alice", TradeDirection::Buy, 100, 10_000, d(2025, 1, 10));
        let on_date = record(&mut book, "alice", TradeDirection::Buy, 100, 10_000, d(2025, 4, 1));
        let after = record(&mut book, "alice", TradeDirection::Buy, 100, 10_000, d(2025, 5, 1));
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let outcome = DividendService::new()
            .apply(&mut book, div, DividendScope::Owner)
            .unwrap();
        assert_eq!(outcome.adjusted, 1);

        assert_eq!(book.order(before).unwrap().quantity, 110);
        assert_eq!(book.order(on_date).unwrap().quantity, 100);
        assert_eq!(book.order(after).unwrap().quantity, 100);
    }

    #[test]
    fn sell_cost_basis_scales_up_with_the_ratio() {
        let mut book = LedgerBook::new();
        record(&mut book, "alice", TradeDirection::Buy, 1000, 10_000, d(2025, 1, 10));
        let sell = record(&mut book, "alice", TradeDirection::Sell, 500, 12_000, d(2025, 2, 10));
        let original_cost = book.order(sell).unwrap().cost_basis;
        assert_eq!(original_cost, 500 * 10_000);

        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);
        DividendService::new()
            .apply(&mut book, div, DividendScope::Owner)
            .unwrap();

        // floor(5,000,000 × 1.1) = 5,500,000 (exact here)
        assert_eq!(book.order(sell).unwrap().cost_basis, 5_500_000);
    }

    #[test]
    fn empty_affected_set_is_zero_count_success() {
        let mut book = LedgerBook::new();
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let outcome = DividendService::new()
            .apply(&mut book, div, DividendScope::Owner)
            .unwrap();
        assert_eq!(outcome.adjusted, 0);
        assert!(book.dividend(div).unwrap().is_used);
    }

    #[test]
    fn reapplying_a_used_dividend_is_rejected() {
        let mut book = LedgerBook::new();
        record(&mut book, "alice", TradeDirection::Buy, 100, 10_000, d(2025, 1, 10));
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let svc = DividendService::new();
        svc.apply(&mut book, div, DividendScope::Owner).unwrap();
        let err = svc.apply(&mut book, div, DividendScope::Owner).unwrap_err();
        assert!(matches!(err, LedgerError::DividendAlreadyApplied(_)));

        // No double adjustment happened.
        let total: i64 = book.orders().iter().map(|o| o.quantity).sum();
        assert_eq!(total, 110);
    }

    #[test]
    fn owner_scope_skips_other_owners() {
        let mut book = LedgerBook::new();
        let mine = record(&mut book, "alice", TradeDirection::Buy, 100, 10_000, d(2025, 1, 10));
        let theirs = record(&mut book, "bob", TradeDirection::Buy, 100, 10_000, d(2025, 1, 10));
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let outcome = DividendService::new()
            .apply(&mut book, div, DividendScope::Owner)
            .unwrap();
        assert_eq!(outcome.adjusted, 1);
        assert_eq!(book.order(mine).unwrap().quantity, 110);
        assert_eq!(book.order(theirs).unwrap().quantity, 100);
    }

    #[test]
    fn all_owners_scope_touches_everyone() {
        let mut book = LedgerBook::new();
        let mine = record(&mut book, "alice", TradeDirection::Buy, 100, 10_000, d(2025, 1, 10));
        let theirs = record(&mut book, "bob", TradeDirection::Buy, 100, 10_000, d(2025, 1, 10));
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let outcome = DividendService::new()
            .apply(&mut book, div, DividendScope::AllOwners)
            .unwrap();
        assert_eq!(outcome.adjusted, 2);
        assert_eq!(book.order(mine).unwrap().quantity, 110);
        assert_eq!(book.order(theirs).unwrap().quantity, 110);
    }

    #[test]
    fn unknown_dividend_is_an_error() {
        let mut book = LedgerBook::new();
        let err = DividendService::new()
            .apply(&mut book, Uuid::new_v4(), DividendScope::Owner)
            .unwrap_err();
        assert!(matches!(err, LedgerError::DividendNotFound(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Forward transform — cash
// ═══════════════════════════════════════════════════════════════════

mod forward_cash {
    use super::*;

    #[test]
    fn cash_forward_is_a_record_noop() {
        let mut book = LedgerBook::new();
        let id = record(&mut book, "alice", TradeDirection::Buy, 100, 10_000, d(2025, 1, 10));
        let event = DividendEvent::new("005930", "alice", d(2025, 4, 1), DividendKind::Cash, 10.0);
        let div = event.id;
        book.insert_dividend(event);

        let outcome = DividendService::new()
            .apply(&mut book, div, DividendScope::Owner)
            .unwrap();
        assert_eq!(outcome.adjusted, 0);
        assert!(book.dividend(div).unwrap().is_used);
        assert_eq!(book.order(id).unwrap().quantity, 100);
        assert_eq!(book.order(id).unwrap().price, 10_000);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Revert transform
// ═══════════════════════════════════════════════════════════════════

mod revert {
    use super::*;

    #[test]
    fn stock_round_trip_restores_quantities_within_tolerance() {
        // Awkward proportions on purpose: 333/333/334 at 15%.
        let mut book = LedgerBook::new();
        let ids: Vec<Uuid> = [333i64, 333, 334]
            .iter()
            .enumerate()
            .map(|(i, &q)| {
                record(&mut book, "alice", TradeDirection::Buy, q, 50_000, d(2025, 1, 1 + i as u32))
            })
            .collect();
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 15.0);

        let svc = DividendService::new();
        svc.apply(&mut book, div, DividendScope::Owner).unwrap();

        let split_total: i64 = ids.iter().map(|&id| book.order(id).unwrap().quantity).sum();
        assert_eq!(split_total, 1150); // round(1000 × 1.15), exact

        svc.revert(&mut book, div, DividendScope::Owner).unwrap();
        assert!(!book.dividend(div).unwrap().is_used);

        // Per-record quantities restored to within the ≤1-share
        // allocation error; the total to within 1 of the original.
        let restored: Vec<i64> = ids.iter().map(|&id| book.order(id).unwrap().quantity).collect();
        for (&orig, &back) in [333i64, 333, 334].iter().zip(restored.iter()) {
            assert!((orig - back).abs() <= 1, "restored {back} from {orig}");
        }
        let total: i64 = restored.iter().sum();
        assert!((total - 1000).abs() <= 1);
    }

    #[test]
    fn price_revert_loses_at_most_a_floor_step() {
        let mut book = LedgerBook::new();
        let id = record(&mut book, "alice", TradeDirection::Buy, 1000, 50_000, d(2025, 1, 10));
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 15.0);

        let svc = DividendService::new();
        svc.apply(&mut book, div, DividendScope::Owner).unwrap();
        // floor(50,000 / 1.15) = 43,478
        assert_eq!(book.order(id).unwrap().price, 43_478);

        svc.revert(&mut book, div, DividendScope::Owner).unwrap();
        // floor(43,478 × 1.15) = 49,999 — floor/round asymmetry, documented.
        assert_eq!(book.order(id).unwrap().price, 49_999);
    }

    #[test]
    fn sell_cost_basis_scales_back_down() {
        let mut book = LedgerBook::new();
        record(&mut book, "alice", TradeDirection::Buy, 1000, 10_000, d(2025, 1, 10));
        let sell = record(&mut book, "alice", TradeDirection::Sell, 500, 12_000, d(2025, 2, 10));
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let svc = DividendService::new();
        svc.apply(&mut book, div, DividendScope::Owner).unwrap();
        assert_eq!(book.order(sell).unwrap().cost_basis, 5_500_000);

        svc.revert(&mut book, div, DividendScope::Owner).unwrap();
        // floor(5,500,000 / 1.1) = 5,000,000 (exact here)
        assert_eq!(book.order(sell).unwrap().cost_basis, 5_000_000);
    }

    #[test]
    fn cash_revert_rewrites_prices_only() {
        let mut book = LedgerBook::new();
        let id = record(&mut book, "alice", TradeDirection::Buy, 100, 9_000, d(2025, 1, 10));
        let event = DividendEvent::new("005930", "alice", d(2025, 4, 1), DividendKind::Cash, 10.0);
        let div = event.id;
        book.insert_dividend(event);

        let svc = DividendService::new();
        svc.apply(&mut book, div, DividendScope::Owner).unwrap();
        let outcome = svc.revert(&mut book, div, DividendScope::Owner).unwrap();
        assert_eq!(outcome.adjusted, 1);

        let order = book.order(id).unwrap();
        assert_eq!(order.quantity, 100);
        // floor(9,000 × 1/(1 − 0.10)) = floor(10,000.0…) = 10,000
        assert_eq!(order.price, 10_000);
    }

    #[test]
    fn cash_revert_at_or_above_hundred_percent_fails() {
        let mut book = LedgerBook::new();
        record(&mut book, "alice", TradeDirection::Buy, 100, 9_000, d(2025, 1, 10));
        let event = DividendEvent::new("005930", "alice", d(2025, 4, 1), DividendKind::Cash, 100.0);
        let div = event.id;
        book.insert_dividend(event);

        let err = DividendService::new()
            .revert(&mut book, div, DividendScope::Owner)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ValidationError(_)));
    }

    #[test]
    fn empty_affected_set_reverts_zero() {
        let mut book = LedgerBook::new();
        let div = stock_dividend(&mut book, "alice", d(2025, 4, 1), 10.0);

        let outcome = DividendService::new()
            .revert(&mut book, div, DividendScope::Owner)
            .unwrap();
        assert_eq!(outcome.adjusted, 0);
    }
}
