use serde::{Deserialize, Serialize};

/// Origin tag stamped on every record
pub const SOURCE_TAG: &str = "central_dispatch";

/// One extracted load, in the JSON shape the ingestion endpoint expects.
///
/// Every field is always serialised; text that could not be found is an
/// empty string, never a missing key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadRecord {
    pub source: String,
    pub source_url: String,
    pub dispatch_id: String,
    pub shipper_name: String,
    /// Decimal string without thousands separators, or empty
    pub price_usd: String,
    pub vehicle: Vehicle,
    pub origin: RoutePoint,
    pub destination: RoutePoint,
    /// ISO-8601 UTC with milliseconds, e.g. `2026-10-19T08:30:00.000Z`
    pub imported_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Cleaned source line, kept verbatim whether or not it parsed
    pub raw: String,
    pub year: String,
    pub make_model: String,
    pub lot_or_vin: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutePoint {
    /// Full cleaned route text, label included
    pub location: String,
    pub state: String,
    pub zip: String,
}
