/// Source and sentinel constants shared across the ingestion pipeline.

// Upstream source identifiers
pub const JSEARCH_API: &str = "jsearch";
pub const JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";

// Sentinel values substituted for missing or malformed optional fields
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

// Fixed timestamp format emitted by the upstream source, e.g.
// 2024-03-01T08:30:00.000000Z
pub const SOURCE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

// Geographic bounds for coordinate validation
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
