use chrono::{TimeZone, Utc};
use load_import::{DomTree, ProcessedSet, StaticPage, SnapshotSource, Scanner, extract, locate, locate_new};

/// Two cards rendered the way the board does it: generated class names,
/// several wrapper levels, one "Call" link per card.
const BOARD: &str = r#"
<html><body>
<main class="sc-1a2b">
<section class="sc-board">
  <ul class="sc-list">
    <li class="sc-row">
      <div class="sc-9f card-shell">
        <div class="sc-x1">
          <section class="sc-dispatchInfo">
            <h4>Dispatch Info</h4>
            <div class="sc-shipperName"><a href="/shipper/42">Acme  Auto Group</a> 4.8★</div>
          </section>
          <section class="sc-loadInfo">
            <h4>Load Info</h4>
            <p>$1,250.00 <small>fee $35.00</small></p>
            <div><span>2019 Honda Accord | LOT-4821</span></div>
            <div class="sc-originBlock">Origin: Chicago, IL, 60601</div>
            <div class="sc-destinationBlock">Destination: Dallas, TX, 75201</div>
          </section>
          <p class="sc-actions"><span><a href="tel:+15550100">Call Acme</a></span></p>
        </div>
      </div>
    </li>
    <li class="sc-row">
      <div class="sc-9f card-shell">
        <div class="sc-x1">
          <section class="sc-dispatchInfo">
            <h4>Dispatch   Info</h4>
            <div class="sc-shipperName">Direct Shipper LLC</div>
          </section>
          <section class="sc-loadInfo">
            <h4>Load Info</h4>
            <p>Price on request</p>
            <div><span>assorted parts</span></div>
            <div class="sc-originBlock">Reno</div>
          </section>
          <p class="sc-actions"><span><a href="tel:+15550199">Call Direct</a></span></p>
        </div>
      </div>
    </li>
  </ul>
</section>
</main>
</body></html>
"#;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()
}

#[test]
fn test_each_card_located_once() {
    let tree = DomTree::from_html(BOARD);
    let cards = locate(&tree, tree.root());

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].identifier, "Call Acme");
    assert_eq!(cards[1].identifier, "Call Direct");

    // The climb stops below the board section, which holds both contact links
    for card in &cards {
        assert!(tree.is_tag(card.node, "li"));
        assert!(!tree.contains(cards[0].node, cards[1].node));
        assert!(!tree.contains(cards[1].node, cards[0].node));
    }
}

#[test]
fn test_full_record() {
    let tree = DomTree::from_html(BOARD);
    let cards = locate(&tree, tree.root());
    let record = extract(&tree, cards[0].node, "https://board.example/loads", now());

    assert_eq!(record.source, "central_dispatch");
    assert_eq!(record.source_url, "https://board.example/loads");
    assert_eq!(record.dispatch_id, "Call Acme");
    assert_eq!(record.shipper_name, "Acme Auto Group");
    assert_eq!(record.price_usd, "1250.00");
    assert_eq!(record.vehicle.raw, "2019 Honda Accord | LOT-4821");
    assert_eq!(record.vehicle.year, "2019");
    assert_eq!(record.vehicle.make_model, "Honda Accord");
    assert_eq!(record.vehicle.lot_or_vin, "LOT-4821");
    assert_eq!(record.origin.location, "Origin: Chicago, IL, 60601");
    assert_eq!(record.origin.state, "IL");
    assert_eq!(record.origin.zip, "60601");
    assert_eq!(record.destination.state, "TX");
    assert_eq!(record.destination.zip, "75201");
    assert_eq!(record.imported_at, "2026-10-19T08:30:00.000Z");
}

#[test]
fn test_sparse_record_keeps_every_field() {
    let tree = DomTree::from_html(BOARD);
    let cards = locate(&tree, tree.root());
    let record = extract(&tree, cards[1].node, "https://board.example/loads", now());

    assert_eq!(record.shipper_name, "Direct Shipper LLC");
    assert_eq!(record.price_usd, "");
    assert_eq!(record.vehicle.raw, "");
    assert_eq!(record.vehicle.make_model, "");
    assert_eq!(record.origin.location, "Reno");
    assert_eq!(record.origin.state, "");
    assert_eq!(record.destination.location, "");

    let value = serde_json::to_value(&record).unwrap();
    for key in [
        "source",
        "sourceUrl",
        "dispatchId",
        "shipperName",
        "priceUsd",
        "vehicle",
        "origin",
        "destination",
        "importedAt",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn test_relocating_after_marking_finds_nothing() {
    let tree = DomTree::from_html(BOARD);
    let mut processed = ProcessedSet::new();

    for card in locate_new(&tree, tree.root(), &processed) {
        processed.mark(card.key);
    }

    assert_eq!(processed.len(), 2);
    assert!(locate_new(&tree, tree.root(), &processed).is_empty());
}

#[test]
fn test_scanner_imports_each_card_once() {
    let mut scanner = Scanner::new();
    let page = StaticPage::from_html("https://board.example/loads", BOARD);
    let snapshot = page.snapshot().unwrap();

    assert_eq!(scanner.scan(&snapshot, now()).len(), 2);
    assert!(scanner.scan(&snapshot, now()).is_empty());
}

#[test]
fn test_page_without_listings() {
    let tree = DomTree::from_html("<html><body><p>Loading…</p><a href='/help'>Call us</a></body></html>");
    assert!(locate(&tree, tree.root()).is_empty());
}
