mod support;

use std::sync::Arc;
use std::thread;

use support::temp_db::TempDb;
use stockex::domain::listing::LIVE_LISTING_THRESHOLD;
use stockex::domain::page::PageRequest;
use stockex::error::ErrorKind;
use stockex::testkit::domain::{seed_exchange, seed_stocks, services};

#[test]
fn exchange_goes_live_at_tenth_listing_and_back_at_ninth() {
    let db = TempDb::create();
    let services = db.services();
    let stocks = seed_stocks(&services, 10);

    let exchange = seed_exchange(&services, "NYSE", &stocks[..9]);
    assert!(!exchange.live_in_market);
    assert_eq!(services.listings.count(exchange.id).unwrap(), 9);

    let summary = services.listings.add(exchange.id, stocks[9].id).unwrap();
    assert!(summary.exchange.live_in_market);
    assert_eq!(summary.stock.id, stocks[9].id);

    let after = services.listings.remove(exchange.id, stocks[0].id).unwrap();
    assert!(!after.live_in_market);
    assert!(after.version > summary.exchange.version);
}

#[test]
fn recompute_is_idempotent() {
    let db = TempDb::create();
    let services = db.services();
    let stocks = seed_stocks(&services, 10);
    let exchange = seed_exchange(&services, "LSE", &stocks);

    let first = services.listings.recompute(exchange.id).unwrap();
    let second = services.listings.recompute(exchange.id).unwrap();
    assert!(first.live_in_market);
    assert_eq!(first, second);
    assert_eq!(first, exchange);
}

#[test]
fn duplicate_listing_is_rejected_without_side_effects() {
    let db = TempDb::create();
    let services = db.services();
    let stocks = seed_stocks(&services, 1);
    let exchange = seed_exchange(&services, "TSX", &stocks);

    let err = services.listings.add(exchange.id, stocks[0].id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
    assert_eq!(services.listings.count(exchange.id).unwrap(), 1);
    assert_eq!(services.exchanges.get(exchange.id).unwrap(), exchange);
}

#[test]
fn listing_unknown_parents_is_not_found() {
    let db = TempDb::create();
    let services = db.services();
    let stocks = seed_stocks(&services, 1);
    let exchange = seed_exchange(&services, "ASX", &[]);

    let missing_stock = stockex::domain::id::StockId::new(999);
    let err = services.listings.add(exchange.id, missing_stock).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let missing_exchange = stockex::domain::id::ExchangeId::new(999);
    let err = services.listings.add(missing_exchange, stocks[0].id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = services.listings.remove(exchange.id, stocks[0].id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn concurrent_listings_leave_flag_consistent_with_count() {
    let db = TempDb::create();
    let setup = db.services();
    let stocks = seed_stocks(&setup, 12);
    let exchange = seed_exchange(&setup, "NASDAQ", &stocks[..8]);

    // Separate pools so the writers really contend for the database lock.
    let handles: Vec<_> = stocks[8..]
        .iter()
        .map(|stock| {
            let services = services(Arc::new(db.store(2)));
            let (exchange_id, stock_id) = (exchange.id, stock.id);
            thread::spawn(move || services.listings.add(exchange_id, stock_id))
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread").expect("add listing");
    }

    let count = setup.listings.count(exchange.id).unwrap();
    assert_eq!(count, 12);
    let stored = setup.exchanges.get(exchange.id).unwrap();
    assert_eq!(stored.live_in_market, count >= LIVE_LISTING_THRESHOLD);

    let listed = setup
        .exchanges
        .stocks_listed(exchange.id, &PageRequest::first(50).unwrap())
        .unwrap();
    assert_eq!(listed.total, 12);
}
