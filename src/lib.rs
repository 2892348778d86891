//! # load-import
//!
//! Pulls structured freight-load records out of a load board's rendered DOM.
//! The board offers no API and no stable selectors, so cards are found by
//! their text: every card shows "Dispatch Info", "Load Info" and exactly one
//! "Call…" contact link.
//!
//! ## Features
//!
//! - **Card Locator**: climbs from each contact link to the widest container
//!   that still holds a single card
//! - **Field Extractor**: route, price, vehicle and identifier grammars that
//!   degrade to empty fields instead of failing
//! - **Scan Loop**: channel-driven re-scans with a processed side table, so
//!   a card is imported once however often the page re-renders
//! - **Live Pages**: DOM snapshots from Chrome over CDP, or saved HTML files
//!
//! ## Library Usage
//!
//! ### Extracting from saved HTML
//!
//! ```rust
//! use load_import::{DomTree, extract, locate};
//!
//! let html = r#"<html><body><div>
//!     <p>Dispatch Info</p>
//!     <div class="loadInfo">Load Info $1,250.00</div>
//!     <div class="origin">Origin: Chicago, IL, 60601</div>
//!     <a href="tel:5550100">Call Acme</a>
//! </div></body></html>"#;
//!
//! let tree = DomTree::from_html(html);
//! let cards = locate(&tree, tree.root());
//! assert_eq!(cards.len(), 1);
//!
//! let record = extract(&tree, cards[0].node, "https://board.example", chrono::Utc::now());
//! assert_eq!(record.price_usd, "1250.00");
//! assert_eq!(record.origin.state, "IL");
//! ```
//!
//! ### Watching a live page
//!
//! ```rust,no_run
//! use load_import::{BrowserSession, LaunchOptions, JsonLinesDelivery, ScanTrigger, run_scan_loop};
//!
//! # async fn run() -> load_import::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::new().headless(false))?;
//! session.navigate("https://board.example/loads")?;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(16);
//! tx.send(ScanTrigger::Ready).await.ok();
//! drop(tx);
//!
//! let report = run_scan_loop(rx, &session, &JsonLinesDelivery::stdout()).await;
//! println!("{} record(s)", report.records);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: DOM snapshots, text normalisation, processed side table
//! - [`extract`]: card locator, field parsers, record shape
//! - [`scan`]: scan triggers, snapshot sources, the scan loop
//! - [`delivery`]: where records go
//! - [`browser`]: Chrome session management and configuration
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod delivery;
pub mod dom;
pub mod error;
pub mod extract;
pub mod scan;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use delivery::{Delivery, JsonLinesDelivery};
pub use dom::{DomTree, ElementNode, NodeId, NodeKey, ProcessedSet, clean_text};
pub use error::{ImportError, Result};
pub use extract::{
    Card, LoadRecord, RoutePoint, Vehicle, extract, locate, locate_new, parse_price, parse_route, parse_vehicle,
};
pub use scan::{PageSnapshot, ScanOptions, ScanReport, ScanTrigger, Scanner, SnapshotSource, StaticPage, run_scan_loop};
