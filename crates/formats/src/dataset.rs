//! Pull-request event payloads: parsing, validation and window padding.

use std::collections::BTreeMap;

use foundation::math::LatLon;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

/// Records duplicated at each end so the window wraps seamlessly.
pub const VISIBLE_COUNT: usize = 60;

/// Number that the upstream feed sometimes sends as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn value(&self) -> f64 {
        match self {
            Scalar::Number(v) => *v,
            Scalar::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawLocation {
    lat: Option<Scalar>,
    lon: Option<Scalar>,
}

impl RawLocation {
    fn lat_lon(&self) -> LatLon {
        let read = |s: &Option<Scalar>| s.as_ref().map(Scalar::value).unwrap_or(f64::NAN);
        LatLon::new(read(&self.lat), read(&self.lon))
    }
}

/// One element of the feed, keys as sent upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEventRecord {
    #[serde(default)]
    gop: Option<RawLocation>,
    #[serde(default)]
    gm: Option<RawLocation>,
    #[serde(default)]
    uol: Option<String>,
    #[serde(default)]
    uml: Option<String>,
    #[serde(default)]
    l: Option<String>,
    #[serde(default)]
    nwo: Option<String>,
    #[serde(default)]
    pr: Option<Scalar>,
    #[serde(default)]
    oa: Option<String>,
    #[serde(default)]
    ma: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub open: LatLon,
    pub merge: LatLon,
    pub opened_at: Option<String>,
    pub merged_at: Option<String>,
    pub language: Option<String>,
    /// Name with owner, e.g. `rust-lang/rust`.
    pub repo: String,
    pub pr: u64,
    pub open_place: Option<String>,
    pub merge_place: Option<String>,
}

impl EventRecord {
    /// Arc-less records merged where they were opened.
    pub fn is_same_location(&self) -> bool {
        self.open == self.merge
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DropReason {
    Malformed,
    MissingLocation,
    InvalidCoordinates,
    MissingTimestamp,
    MissingIdentity,
}

impl DropReason {
    /// Record has a usable position but lacks the text its popup needs.
    ///
    /// Stricter than a plain coordinate check; kept so every drawn record can
    /// link to its pull request.
    pub fn is_incomplete_metadata(self) -> bool {
        matches!(self, DropReason::MissingTimestamp | DropReason::MissingIdentity)
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DropReason::Malformed => "malformed record",
            DropReason::MissingLocation => "no location",
            DropReason::InvalidCoordinates => "coordinates out of range",
            DropReason::MissingTimestamp => "no opened or merged timestamp",
            DropReason::MissingIdentity => "no repository or pull request number",
        };
        f.write_str(s)
    }
}

impl TryFrom<RawEventRecord> for EventRecord {
    type Error = DropReason;

    fn try_from(raw: RawEventRecord) -> Result<Self, Self::Error> {
        let (open, merge) = match (&raw.gop, &raw.gm) {
            (Some(o), Some(m)) => (o.lat_lon(), m.lat_lon()),
            (Some(o), None) => (o.lat_lon(), o.lat_lon()),
            (None, Some(m)) => (m.lat_lon(), m.lat_lon()),
            (None, None) => return Err(DropReason::MissingLocation),
        };
        if !open.is_valid() || !merge.is_valid() {
            return Err(DropReason::InvalidCoordinates);
        }
        if raw.oa.is_none() && raw.ma.is_none() {
            return Err(DropReason::MissingTimestamp);
        }
        let pr = raw
            .pr
            .as_ref()
            .map(Scalar::value)
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
            .ok_or(DropReason::MissingIdentity)? as u64;
        let repo = raw
            .nwo
            .filter(|s| !s.is_empty())
            .ok_or(DropReason::MissingIdentity)?;

        let (open_place, merge_place) = match (raw.uol, raw.uml) {
            (Some(o), None) => (Some(o.clone()), Some(o)),
            (None, Some(m)) => (Some(m.clone()), Some(m)),
            pair => pair,
        };

        Ok(EventRecord {
            open,
            merge,
            opened_at: raw.oa,
            merged_at: raw.ma,
            language: raw.l.filter(|s| !s.is_empty()),
            repo,
            pr,
            open_place,
            merge_place,
        })
    }
}

#[derive(Debug)]
pub enum DatasetError {
    Json(serde_json::Error),
    NotAnArray,
    /// Every record was dropped.
    Empty { dropped: usize },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Json(e) => write!(f, "invalid dataset JSON: {e}"),
            DatasetError::NotAnArray => write!(f, "expected a JSON array of records"),
            DatasetError::Empty { dropped } => {
                write!(f, "dataset has no usable records ({dropped} dropped)")
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        DatasetError::Json(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecords {
    pub records: Vec<EventRecord>,
    pub dropped: usize,
    pub drops: BTreeMap<DropReason, usize>,
}

/// Parses a feed payload, dropping records that fail validation.
///
/// Fails only when the payload is not a JSON array or nothing survives.
pub fn parse_records(payload: &str) -> Result<ParsedRecords, DatasetError> {
    let Value::Array(items) = serde_json::from_str::<Value>(payload)? else {
        return Err(DatasetError::NotAnArray);
    };

    let mut records = Vec::with_capacity(items.len());
    let mut dropped = 0;
    let mut drops = BTreeMap::new();
    for (index, item) in items.into_iter().enumerate() {
        let record = serde_json::from_value::<RawEventRecord>(item)
            .map_err(|_| DropReason::Malformed)
            .and_then(EventRecord::try_from);
        match record {
            Ok(r) => records.push(r),
            Err(reason) => {
                if reason.is_incomplete_metadata() {
                    tracing::debug!(index, %reason, "dropping record without popup metadata");
                } else {
                    tracing::debug!(index, %reason, "dropping record");
                }
                *drops.entry(reason).or_insert(0) += 1;
                dropped += 1;
            }
        }
    }

    let incomplete: usize = drops
        .iter()
        .filter(|(reason, _)| reason.is_incomplete_metadata())
        .map(|(_, n)| n)
        .sum();
    if incomplete > 0 {
        tracing::info!(incomplete, "records with valid coordinates dropped for missing metadata");
    }
    if records.is_empty() {
        return Err(DatasetError::Empty { dropped });
    }
    Ok(ParsedRecords {
        records,
        dropped,
        drops,
    })
}

/// Validated records in randomized order, padded at both ends.
///
/// Layout: `[last p][shuffled n][first p]` with `p = min(pad, n)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedEventSequence {
    items: Vec<EventRecord>,
    padding: usize,
}

impl OrderedEventSequence {
    pub fn build<R: Rng + ?Sized>(records: Vec<EventRecord>, pad: usize, rng: &mut R) -> Self {
        // Each record lands at a random position so neighbours in the window
        // are unrelated in time and place.
        let mut shuffled: Vec<EventRecord> = Vec::with_capacity(records.len());
        for record in records {
            let at = rng.gen_range(0..=shuffled.len());
            shuffled.insert(at, record);
        }

        let n = shuffled.len();
        let p = pad.min(n);
        let mut items = Vec::with_capacity(n + 2 * p);
        items.extend_from_slice(&shuffled[n - p..]);
        items.extend_from_slice(&shuffled);
        items.extend_from_slice(&shuffled[..p]);
        Self { items, padding: p }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn get(&self, index: usize) -> Option<&EventRecord> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.items.iter()
    }

    pub fn opens(&self) -> Vec<LatLon> {
        self.items.iter().map(|r| r.open).collect()
    }

    pub fn pairs(&self) -> Vec<(LatLon, LatLon)> {
        self.items.iter().map(|r| (r.open, r.merge)).collect()
    }
}
