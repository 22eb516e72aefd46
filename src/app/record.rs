// ABOUTME: Defines ApplicationRecord and AppPatch, plus the pure merge that
// ABOUTME: overlays a partial update onto the last known record.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Version;

/// Frame name suffix used when an application has not reported a version.
const UNKNOWN_VERSION: &str = "unknown";

/// Last known state of one embedded application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Stable identifier, unique within a coordinator.
    pub id: String,

    /// Display name. Only used for logs and notices.
    #[serde(default)]
    pub title: String,

    /// Base address the frame is loaded from.
    #[serde(default)]
    pub url: String,

    /// Version the application last reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    /// When this record was last merged.
    pub updated: DateTime<Utc>,

    /// Any other fields the application reports about itself.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationRecord {
    /// Name the frame carries while showing this record's version.
    pub fn frame_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{}", self.id, version),
            None => format!("{}-{}", self.id, UNKNOWN_VERSION),
        }
    }

    /// Address that reloads this record's frame, cache-busted by `updated`.
    pub fn reload_url(&self) -> String {
        reload_url(&self.url, self.updated)
    }
}

/// A point in time as reported by an embedded application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Milliseconds since the Unix epoch with a fractional part.
    FractionalMillis(f64),
    /// An RFC 3339 date-time string.
    Text(String),
}

impl Timestamp {
    /// Interpret the timestamp, or `None` if it does not name a valid instant.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Timestamp::FractionalMillis(ms) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms.trunc() as i64).single()
            }
            Timestamp::FractionalMillis(_) => None,
            Timestamp::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Millis(dt.timestamp_millis())
    }
}

/// A partial application record.
///
/// Every field is optional. Present fields win over the existing record
/// when merged, absent fields (including JSON `null`) are inherited.
///
/// Decoding is lenient: any JSON object is a valid patch. A known field
/// of the wrong type is dropped rather than failing the whole patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct AppPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppPatch {
    /// Create a patch addressed to the given application.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the base address.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the reported version.
    pub fn version(mut self, version: impl Into<Version>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the update time.
    pub fn updated(mut self, updated: impl Into<Timestamp>) -> Self {
        self.updated = Some(updated.into());
        self
    }

    /// Add an extra field.
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.extra.insert(key.into(), v);
        }
        self
    }
}

impl From<Map<String, Value>> for AppPatch {
    fn from(mut fields: Map<String, Value>) -> Self {
        fn take<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str) -> Option<T> {
            let value = fields.remove(key)?;
            serde_json::from_value(value).ok()
        }

        let id = take(&mut fields, "id");
        let title = take(&mut fields, "title");
        let url = take(&mut fields, "url");
        let version = take(&mut fields, "version");
        let updated = take(&mut fields, "updated");
        fields.retain(|_, value| !value.is_null());

        Self {
            id,
            title,
            url,
            version,
            updated,
            extra: fields,
        }
    }
}

/// Overlay `patch` onto `old`.
///
/// Absent patch fields keep their old values, except `updated`: it is the
/// patch's timestamp when present and parseable, and `now` otherwise.
/// Extra fields set to `null` count as absent.
/// With no `old` record the patch seeds a new one, which requires an `id`.
/// The old record's `id` is kept even if the patch names another.
pub fn merge(
    old: Option<&ApplicationRecord>,
    patch: AppPatch,
    now: DateTime<Utc>,
) -> Option<ApplicationRecord> {
    let AppPatch {
        id,
        title,
        url,
        version,
        updated,
        extra,
    } = patch;
    let updated = updated.as_ref().and_then(Timestamp::to_datetime);
    let extra = extra.into_iter().filter(|(_, value)| !value.is_null());

    match old {
        Some(old) => {
            let mut merged = old.clone();
            if let Some(title) = title {
                merged.title = title;
            }
            if let Some(url) = url {
                merged.url = url;
            }
            if version.is_some() {
                merged.version = version;
            }
            merged.updated = updated.unwrap_or(now);
            merged.extra.extend(extra);
            Some(merged)
        }
        None => Some(ApplicationRecord {
            id: id?,
            title: title.unwrap_or_default(),
            url: url.unwrap_or_default(),
            version,
            updated: updated.unwrap_or(now),
            extra: extra.collect(),
        }),
    }
}

/// Strip any query from `base` and append a `ts` cache-buster in epoch millis.
pub fn reload_url(base: &str, at: DateTime<Utc>) -> String {
    let base = base.split('?').next().unwrap_or(base);
    format!("{}?ts={}", base, at.timestamp_millis())
}
