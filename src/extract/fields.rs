//! Field extraction for one located card.
//!
//! Sub-elements are found with loose class-substring matching because the
//! page's class names are generated; their text is then run through small
//! grammars. Nothing here fails: a miss leaves the field empty (or raw).

use crate::dom::{DomTree, NodeId, clean_text};
use crate::extract::record::{LoadRecord, RoutePoint, SOURCE_TAG, Vehicle};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Text of a contact link: begins with "Call"
static CONTACT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^call[0-9A-Za-z_]*").expect("valid contact regex"));

/// A dollar sign, then digits, commas and points with at least one digit
static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?([0-9,.]*[0-9][0-9,.]*)").expect("valid price regex"));

static VEHICLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})\s+([^|]+?)(?:\s*\|\s*(.*))?$").expect("valid vehicle regex")
});

/// A line that starts with a model year
static VEHICLE_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}\s+.+").expect("valid vehicle line regex"));

/// Tags whose text is scanned for the vehicle line
const VEHICLE_LINE_TAGS: [&str; 3] = ["div", "span", "p"];

pub(crate) fn is_link(tree: &DomTree, id: NodeId) -> bool {
    tree.is_tag(id, "a") || tree.attribute(id, "role").is_some_and(|role| role.eq_ignore_ascii_case("link"))
}

pub(crate) fn is_contact_text(text: &str) -> bool {
    CONTACT_PATTERN.is_match(text)
}

/// Link element whose cleaned text begins with "Call"
pub fn is_contact_anchor(tree: &DomTree, id: NodeId) -> bool {
    is_link(tree, id) && is_contact_text(&tree.clean_text(id))
}

/// Best-effort identifier of a card.
///
/// The contact link's text wins; otherwise the first link pointing at a
/// dispatch page, otherwise the first link at all.
pub fn identifier(tree: &DomTree, card: NodeId) -> String {
    let links: Vec<NodeId> = tree.descendants(card).filter(|&id| is_link(tree, id)).collect();

    if let Some(text) = links
        .iter()
        .map(|&id| tree.clean_text(id))
        .find(|text| is_contact_text(text))
    {
        return text;
    }

    links
        .iter()
        .copied()
        .find(|&id| tree.attribute(id, "href").is_some_and(|href| href.contains("dispatch")))
        .or_else(|| links.first().copied())
        .map(|id| tree.clean_text(id))
        .unwrap_or_default()
}

/// Split `"Origin: City, ST, ZIP"`-like text.
///
/// `location` always keeps the whole cleaned input. After the first colon,
/// a leading city segment is skipped when three or more comma segments are
/// present; the next two segments are state and zip.
pub fn parse_route(text: &str) -> RoutePoint {
    let clean = clean_text(text);

    let (state, zip) = match clean.split_once(':') {
        None => (String::new(), String::new()),
        Some((_, remainder)) => {
            let mut segments: Vec<&str> = remainder.split(',').map(str::trim).collect();
            if segments.len() >= 3 {
                segments.remove(0);
            }
            (
                segments.first().copied().unwrap_or_default().to_string(),
                segments.get(1).copied().unwrap_or_default().to_string(),
            )
        }
    };

    RoutePoint {
        location: clean,
        state,
        zip,
    }
}

/// First dollar amount in the text, without thousands separators.
/// Later amounts are ignored.
pub fn parse_price(text: &str) -> String {
    let clean = clean_text(text);
    PRICE_PATTERN
        .captures(&clean)
        .and_then(|caps| caps.get(1))
        .map(|amount| amount.as_str().replace(',', ""))
        .unwrap_or_default()
}

/// Parse `"<year> <make model>[ | <lot or VIN>]"`.
pub fn parse_vehicle(line: &str) -> Vehicle {
    let clean = clean_text(line);

    let (year, make_model, lot_or_vin) = match VEHICLE_PATTERN.captures(&clean) {
        Some(caps) => (
            caps[1].to_string(),
            clean_text(&caps[2]),
            caps.get(3).map(|m| clean_text(m.as_str())).unwrap_or_default(),
        ),
        None => (String::new(), clean.clone(), String::new()),
    };

    Vehicle {
        raw: clean,
        year,
        make_model,
        lot_or_vin,
    }
}

/// First `div`/`span`/`p` below the card whose text starts with a year
fn find_vehicle_line(tree: &DomTree, card: NodeId) -> String {
    tree.descendants(card)
        .filter(|&id| VEHICLE_LINE_TAGS.iter().any(|tag| tree.is_tag(id, tag)))
        .map(|id| tree.clean_text(id))
        .find(|line| VEHICLE_LINE_PATTERN.is_match(line))
        .unwrap_or_default()
}

fn first_with_class(tree: &DomTree, card: NodeId, needle: &str) -> Option<NodeId> {
    tree.descendants(card).find(|&id| tree.class_contains(id, needle))
}

fn block_text(tree: &DomTree, card: NodeId, needle: &str) -> String {
    first_with_class(tree, card, needle)
        .map(|id| tree.clean_text(id))
        .unwrap_or_default()
}

fn shipper_name(tree: &DomTree, card: NodeId) -> String {
    let Some(block) = first_with_class(tree, card, "shipper") else {
        return String::new();
    };

    tree.descendants(block)
        .find(|&id| tree.is_tag(id, "a"))
        .map(|link| tree.clean_text(link))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| tree.clean_text(block))
}

/// Format a timestamp the way `Date.prototype.toISOString` does
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the record for one card
pub fn extract(tree: &DomTree, card: NodeId, page_url: &str, now: DateTime<Utc>) -> LoadRecord {
    let vehicle_line = find_vehicle_line(tree, card);
    let vehicle = if vehicle_line.is_empty() {
        Vehicle::default()
    } else {
        parse_vehicle(&vehicle_line)
    };

    LoadRecord {
        source: SOURCE_TAG.to_string(),
        source_url: page_url.to_string(),
        dispatch_id: identifier(tree, card),
        shipper_name: shipper_name(tree, card),
        price_usd: parse_price(&block_text(tree, card, "load")),
        vehicle,
        origin: parse_route(&block_text(tree, card, "origin")),
        destination: parse_route(&block_text(tree, card, "destination")),
        imported_at: iso_timestamp(now),
    }
}
