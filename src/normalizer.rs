use crate::constants::{
    DEFAULT_DESCRIPTION, LATITUDE_RANGE, LONGITUDE_RANGE, NOT_AVAILABLE, SOURCE_DATETIME_FORMAT,
    UNKNOWN,
};
use crate::types::{NormalizedJobListing, RawRecord};
use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

static APPLY_LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://\S+$").expect("apply link pattern is valid"));

/// Why a raw record was refused admission. Rejection is a per-record
/// outcome, not a batch error: the coordinator records it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectionReason {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
}

/// Convert one untyped source record into a validated listing.
///
/// `job_id` and `title` are hard requirements; every other field falls back
/// to its documented default instead of failing the record. Pure function,
/// no I/O.
pub fn normalize(raw: &RawRecord) -> Result<NormalizedJobListing, RejectionReason> {
    let job_id = required_string(raw, "job_id")?;
    let title = required_string(raw, "job_title")?;

    Ok(NormalizedJobListing {
        job_id,
        title,
        description: string_or(raw, "job_description", DEFAULT_DESCRIPTION),
        employment_type: string_or(raw, "job_employment_type", UNKNOWN),
        city: string_or(raw, "job_city", UNKNOWN),
        state: string_or(raw, "job_state", UNKNOWN),
        is_remote: raw
            .get("job_is_remote")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        apply_link: apply_link(raw),
        company_type: string_or(raw, "employer_company_type", UNKNOWN),
        employer_name: string_or(raw, "employer_name", UNKNOWN),
        publisher: string_or(raw, "job_publisher", UNKNOWN),
        posted_at: source_datetime(raw, "job_posted_at_datetime_utc"),
        offer_expiration: source_datetime(raw, "job_offer_expiration_datetime_utc"),
        required_experience_in_months: experience_months(raw),
        latitude: bounded_coordinate(raw, "job_latitude", LATITUDE_RANGE),
        longitude: bounded_coordinate(raw, "job_longitude", LONGITUDE_RANGE),
    })
}

fn required_string(raw: &RawRecord, field: &'static str) -> Result<String, RejectionReason> {
    match raw.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => {
            warn!(field, "rejecting record: required field missing or not a string");
            Err(RejectionReason::MissingRequiredField(field))
        }
    }
}

fn string_or(raw: &RawRecord, field: &str, default: &str) -> String {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

/// Apply links must be absolute http(s) URLs; anything else is replaced by
/// the `N/A` sentinel rather than rejecting the record.
fn apply_link(raw: &RawRecord) -> String {
    match raw.get("job_apply_link").and_then(Value::as_str) {
        Some(link) if APPLY_LINK_PATTERN.is_match(link) => link.to_string(),
        Some(link) => {
            debug!(link, "apply link is not an absolute http(s) URL, using sentinel");
            NOT_AVAILABLE.to_string()
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Parse the source's fixed UTC timestamp format. Unparsable values yield
/// `None` — timestamp accuracy is not required for admission.
fn source_datetime(raw: &RawRecord, field: &str) -> Option<DateTime<Utc>> {
    let text = raw.get(field).and_then(Value::as_str)?;
    match NaiveDateTime::parse_from_str(text, SOURCE_DATETIME_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            warn!(field, value = text, "unparsable datetime, storing as absent: {e}");
            None
        }
    }
}

/// Experience lives in a nested sub-mapping; a missing parent is treated
/// the same as a missing field.
fn experience_months(raw: &RawRecord) -> Option<i64> {
    let value = raw
        .get("job_required_experience")?
        .get("required_experience_in_months")?;
    let months = coerce_i64(value);
    if months.is_none() {
        debug!("required_experience_in_months is not an integer, storing as absent");
    }
    months
}

fn bounded_coordinate(raw: &RawRecord, field: &str, range: (f64, f64)) -> Option<f64> {
    let value = raw.get(field)?;
    match coerce_f64(value) {
        Some(v) if v >= range.0 && v <= range.1 => Some(v),
        Some(v) => {
            warn!(field, value = v, "coordinate out of range, storing as absent");
            None
        }
        None => {
            warn!(field, "coordinate is not numeric, storing as absent");
            None
        }
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn coerce_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
