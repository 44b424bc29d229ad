use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Base36 creation time in milliseconds followed by four random base36 digits.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis().max(0) as u64;
        let random = uuid::Uuid::new_v4().as_u128() as u64;
        let mut suffix = to_base36(random % 36u64.pow(4));
        while suffix.len() < 4 {
            suffix.insert(0, '0');
        }
        Self(format!("{}{}", to_base36(millis), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    pub category: String,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub date: DateTime<Utc>,
}

impl Record {
    pub fn player_name(&self) -> &str {
        self.player.as_deref().unwrap_or("")
    }
}

/// Stored and remote shape of a record collection: `{"records": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecordsDocument {
    #[serde(default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinId(String);

impl BinId {
    /// Trims the value; blank ids are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewRecordRequest {
    pub category: String,
    pub count: u32,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub player: Option<String>,
}

/// Add-record form fields arrive as raw text and are validated by the controller.
#[derive(Debug, Deserialize, Default)]
pub struct RecordForm {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub count: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub player: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct DeleteForm {
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct IndexQuery {
    pub category: Option<String>,
    pub modal: Option<String>,
    pub player: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub player: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Gold => "\u{1F947}",
            Self::Silver => "\u{1F948}",
            Self::Bronze => "\u{1F949}",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub medal: Option<Medal>,
    pub record: Record,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub category: String,
    pub mode: LeaderboardMode,
    pub entries: Vec<RankedEntry>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub player: String,
    pub category: String,
    pub personal_best: Option<Record>,
    pub records: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub storage: String,
    pub bin_id: Option<String>,
    pub share_url: Option<String>,
}

/// Which ranking the leaderboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardMode {
    /// Every record ranked on its own; records are anonymous to the device.
    AllRecords,
    /// One entry per player, their highest count.
    PersonalBests,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn generated_ids_have_time_prefix_and_random_suffix() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let id = RecordId::generate(now);
        let prefix = to_base36(1_700_000_000_000);
        assert!(id.as_str().starts_with(&prefix));
        assert_eq!(id.as_str().len(), prefix.len() + 4);
    }

    #[test]
    fn generated_ids_differ_within_same_millisecond() {
        let now = Utc::now();
        let ids: std::collections::HashSet<_> = (0..20).map(|_| RecordId::generate(now)).collect();
        assert!(ids.len() > 1);
    }

    #[test]
    fn document_without_records_key_is_empty() {
        let doc: RecordsDocument = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert!(doc.records.is_empty());
    }

    #[test]
    fn device_variant_record_omits_player_and_duration() {
        let record = Record {
            id: "k1abcd".into(),
            player: None,
            category: "volley".to_string(),
            count: 12,
            duration: None,
            date: Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("player").is_none());
        assert!(json.get("duration").is_none());
        assert_eq!(json["date"], "2026-01-05T09:30:00Z");
    }

    #[test]
    fn bin_id_rejects_blank() {
        assert!(BinId::parse("   ").is_none());
        assert_eq!(BinId::parse(" abc ").unwrap().as_str(), "abc");
    }
}
