//! Card content for whatever the pointer is over.

use formats::EventRecord;
use foundation::math::LatLon;
use scene::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PopupKind {
    PrOpened,
    PrMerged,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupInfo {
    pub kind: PopupKind,
    pub header: String,
    pub body: String,
    pub url: Option<String>,
}

/// Fixed card shown for the landmark marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkCard {
    pub header: String,
    pub body: String,
    pub url: String,
    pub lat: f64,
    pub lon: f64,
}

impl Default for LandmarkCard {
    fn default() -> Self {
        Self {
            header: "Arctic Code Vault".into(),
            body: "Svalbard • Cold storage of the work of 3,466,573 open source developers. \
                   For safe keeping.\nLearn more →"
                .into(),
            url: "https://archiveprogram.github.com".into(),
            lat: 78.14,
            lon: 15.26,
        }
    }
}

impl LandmarkCard {
    pub fn location(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    pub fn popup(&self) -> PopupInfo {
        PopupInfo {
            kind: PopupKind::Custom,
            header: self.header.clone(),
            body: self.body.clone(),
            url: Some(self.url.clone()),
        }
    }
}

pub fn pull_request_url(record: &EventRecord) -> String {
    format!("https://github.com/{}/pull/{}", record.repo, record.pr)
}

/// Popup for a picked arc (merged) or spike (opened).
pub fn record_popup(record: &EventRecord, kind: EntityKind) -> PopupInfo {
    let place = |p: &Option<String>| p.clone().unwrap_or_else(|| "an unknown location".into());
    let (kind, body) = match kind {
        EntityKind::Arc => (
            PopupKind::PrMerged,
            format!(
                "Opened in {}, merged in {}",
                place(&record.open_place),
                place(&record.merge_place)
            ),
        ),
        _ => (
            PopupKind::PrOpened,
            format!("Opened in {}", place(&record.open_place)),
        ),
    };
    let body = match &record.language {
        Some(language) => format!("{language} • {body}"),
        None => body,
    };
    PopupInfo {
        kind,
        header: format!("#{} {}", record.pr, record.repo),
        body,
        url: Some(pull_request_url(record)),
    }
}

#[cfg(test)]
mod tests {
    use super::{LandmarkCard, PopupKind, record_popup};
    use formats::EventRecord;
    use foundation::math::LatLon;
    use pretty_assertions::assert_eq;
    use scene::EntityKind;

    fn record() -> EventRecord {
        EventRecord {
            open: LatLon::new(52.5, 13.4),
            merge: LatLon::new(-33.9, 151.2),
            opened_at: None,
            merged_at: Some("2020-06-01T10:00:00Z".into()),
            language: Some("Rust".into()),
            repo: "octo/globe".into(),
            pr: 1234,
            open_place: Some("Berlin".into()),
            merge_place: None,
        }
    }

    #[test]
    fn arc_popup_names_both_places() {
        let p = record_popup(&record(), EntityKind::Arc);
        assert_eq!(p.kind, PopupKind::PrMerged);
        assert_eq!(p.header, "#1234 octo/globe");
        assert_eq!(p.body, "Rust • Opened in Berlin, merged in an unknown location");
        assert_eq!(p.url.as_deref(), Some("https://github.com/octo/globe/pull/1234"));
    }

    #[test]
    fn spike_popup_without_language() {
        let mut r = record();
        r.language = None;
        let p = record_popup(&r, EntityKind::Spike);
        assert_eq!(p.kind, PopupKind::PrOpened);
        assert_eq!(p.body, "Opened in Berlin");
    }

    #[test]
    fn landmark_card_is_custom() {
        let card = LandmarkCard::default();
        let p = card.popup();
        assert_eq!(p.kind, PopupKind::Custom);
        assert_eq!(p.header, "Arctic Code Vault");
        assert_eq!(card.location(), LatLon::new(78.14, 15.26));
    }
}
