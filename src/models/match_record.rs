use serde::{Deserialize, Deserializer, Serialize};

/// Match record as served by the SportsPlex backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Backend identifier
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,

    /// Scheduled start (ISO-8601)
    #[serde(default, deserialize_with = "lenient_text")]
    pub match_date: Option<String>,

    /// Free-text sport name (e.g. "Cricket", "Football")
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sport: String,

    /// Legacy flat duration in minutes
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<i64>,

    /// Sport-specific configuration
    #[serde(default)]
    pub match_config: Option<MatchConfig>,

    /// Status stored by the backend, possibly a manual override
    #[serde(default)]
    pub status: Option<String>,
}

impl MatchRecord {
    /// Persisted status, ignoring blank values
    pub fn persisted_status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Short label for log lines
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{} ({})", id, self.sport),
            None => format!("<no id> ({})", self.sport),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    #[serde(default)]
    pub cricket_config: Option<CricketConfig>,
    #[serde(default)]
    pub football_config: Option<FootballConfig>,
    #[serde(default)]
    pub basketball_config: Option<BasketballConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CricketConfig {
    /// T20, T10, ODI or Test
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootballConfig {
    /// Total match length in minutes
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketballConfig {
    /// Length of one quarter in minutes
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub quarter_duration: Option<i64>,
}

/// Keeps non-string values as their JSON text so a malformed date surfaces at derivation
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Accepts minutes as a JSON number or a numeric string; anything else is treated as unset
/// Floats beyond the `i64` range saturate and are rejected when the phase is derived
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "_id": "m1",
            "matchDate": "2026-03-01T10:00:00Z",
            "sport": "Cricket",
            "matchConfig": { "cricketConfig": { "format": "ODI" } },
            "status": "upcoming"
        }"#;

        let record: MatchRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id.as_deref(), Some("m1"));
        assert_eq!(record.sport, "Cricket");
        assert_eq!(record.persisted_status(), Some("upcoming"));
        let format = record
            .match_config
            .and_then(|c| c.cricket_config)
            .and_then(|c| c.format);
        assert_eq!(format.as_deref(), Some("ODI"));
    }

    #[test]
    fn test_minutes_accept_strings_and_numbers() {
        let json = r#"{
            "sport": "Basketball",
            "duration": "75",
            "matchConfig": {
                "footballConfig": { "duration": 120 },
                "basketballConfig": { "quarterDuration": "ten" }
            }
        }"#;

        let record: MatchRecord = serde_json::from_str(json).unwrap();
        let config = record.match_config.unwrap();

        assert_eq!(record.duration, Some(75));
        assert_eq!(config.football_config.unwrap().duration, Some(120));
        assert_eq!(config.basketball_config.unwrap().quarter_duration, None);
    }

    #[test]
    fn test_non_string_date_is_kept_as_text() {
        let record: MatchRecord = serde_json::from_str(r#"{ "matchDate": 1700000000 }"#).unwrap();

        assert_eq!(record.match_date.as_deref(), Some("1700000000"));
    }

    #[test]
    fn test_missing_fields_default() {
        let record: MatchRecord = serde_json::from_str("{}").unwrap();

        assert!(record.id.is_none());
        assert!(record.match_date.is_none());
        assert!(record.sport.is_empty());
        assert!(record.persisted_status().is_none());
    }

    #[test]
    fn test_blank_status_is_absent() {
        let record = MatchRecord {
            status: Some("  ".to_string()),
            ..Default::default()
        };

        assert!(record.persisted_status().is_none());
    }
}
