use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields;
use crate::api::RawRecord;
use crate::error::{DataError, Result};

pub const SHIPS_TABLE: &str = "ships";

/// Review state of a ship. Unknown upstream values are carried through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShipStatus {
    Shipped,
    Staged,
    Deleted,
    Other(String),
}

impl From<String> for ShipStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "shipped" => ShipStatus::Shipped,
            "staged" => ShipStatus::Staged,
            "deleted" => ShipStatus::Deleted,
            _ => ShipStatus::Other(s),
        }
    }
}

impl From<ShipStatus> for String {
    fn from(status: ShipStatus) -> Self {
        status.to_string()
    }
}

impl std::fmt::Display for ShipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShipStatus::Shipped => write!(f, "shipped"),
            ShipStatus::Staged => write!(f, "staged"),
            ShipStatus::Deleted => write!(f, "deleted"),
            ShipStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShipType {
    Project,
    Update,
    Other(String),
}

impl From<String> for ShipType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "project" => ShipType::Project,
            "update" => ShipType::Update,
            _ => ShipType::Other(s),
        }
    }
}

impl From<ShipType> for String {
    fn from(kind: ShipType) -> Self {
        match kind {
            ShipType::Project => "project".to_string(),
            ShipType::Update => "update".to_string(),
            ShipType::Other(s) => s,
        }
    }
}

/// A single submission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Ship {
    pub id: String,
    pub title: Option<String>,
    pub repo_url: Option<String>,
    pub deployment_url: Option<String>,
    pub readme_url: Option<String>,
    pub screenshot_url: Option<String>,
    pub matchups_count: Option<i64>,
    pub hours: Option<f64>,
    pub credited_hours: f64,
    pub total_hours: Option<f64>,
    pub doubloon_payout: f64,
    pub vote_requirement_met: bool,
    pub paid_out: bool,
    pub is_in_ysws_base: bool,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub ship_status: ShipStatus,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub ship_type: ShipType,
    pub ysws_type: Option<String>,
    pub wakatime_project_names: Vec<String>,
    pub created_time: DateTime<Utc>,
    pub update_description: Option<String>,
    pub feedback: Option<String>,
    pub reshipped_from_id: Option<String>,
    pub reshipped_to_id: Option<String>,
}

impl Ship {
    /// Map a raw `ships` record. Fails when `id` or `createdTime` is missing
    /// or unusable.
    pub fn from_record(record: &RawRecord) -> Result<Self> {
        if record.id.trim().is_empty() {
            return Err(DataError::malformed(SHIPS_TABLE, "<none>", "id", "is empty"));
        }
        let created_raw = record
            .created_time
            .as_deref()
            .ok_or_else(|| {
                DataError::malformed(SHIPS_TABLE, &record.id, "createdTime", "is missing")
            })?;
        let created_time = fields::timestamp(created_raw).ok_or_else(|| {
            DataError::malformed(
                SHIPS_TABLE,
                &record.id,
                "createdTime",
                format!("is not a timestamp: {:?}", created_raw),
            )
        })?;

        let f = &record.fields;
        Ok(Ship {
            id: record.id.clone(),
            title: fields::string(f, "title"),
            repo_url: fields::string(f, "repo_url"),
            deployment_url: fields::string(f, "deploy_url"),
            readme_url: fields::string(f, "readme_url"),
            screenshot_url: fields::string(f, "screenshot_url"),
            matchups_count: fields::integer(f, "matchups_count"),
            hours: fields::number(f, "hours"),
            credited_hours: fields::number(f, "credited_hours").unwrap_or(0.0),
            total_hours: fields::number(f, "total_hours"),
            doubloon_payout: fields::number(f, "doubloon_payout").unwrap_or(0.0),
            vote_requirement_met: fields::flag(f, "vote_requirement_met"),
            paid_out: fields::flag(f, "paid_out"),
            is_in_ysws_base: fields::flag(f, "has_ysws_submission_id"),
            ship_status: fields::string(f, "ship_status")
                .map(ShipStatus::from)
                .unwrap_or(ShipStatus::Other(String::new())),
            ship_type: fields::string(f, "ship_type")
                .map(ShipType::from)
                .unwrap_or(ShipType::Other(String::new())),
            ysws_type: fields::string(f, "yswsType"),
            wakatime_project_names: fields::joined_list(f, "wakatime_project_name"),
            created_time,
            update_description: fields::string(f, "update_description"),
            feedback: fields::string(f, "ai_feedback_summary"),
            reshipped_from_id: fields::first_link(f, "reshipped_from"),
            reshipped_to_id: fields::first_link(f, "reshipped_to"),
        })
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled ship")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).expect("record parses")
    }

    #[test]
    fn test_ship_from_record() {
        let ship = Ship::from_record(&record(json!({
            "id": "recShip1",
            "createdTime": "2024-11-03T09:30:00.000Z",
            "fields": {
                "title": "Sailboat",
                "credited_hours": 4.5,
                "doubloon_payout": 80,
                "has_ysws_submission_id": "rec999",
                "ship_status": "shipped",
                "ship_type": "update",
                "reshipped_from": ["recShip0"],
                "wakatime_project_name": "boat$$xXseparatorXx$$boat-web"
            }
        })))
        .expect("ship maps");

        assert_eq!(ship.id, "recShip1");
        assert_eq!(ship.credited_hours, 4.5);
        assert_eq!(ship.doubloon_payout, 80.0);
        assert!(ship.is_in_ysws_base);
        assert!(!ship.paid_out);
        assert_eq!(ship.ship_status, ShipStatus::Shipped);
        assert_eq!(ship.ship_type, ShipType::Update);
        assert_eq!(ship.reshipped_from_id.as_deref(), Some("recShip0"));
        assert_eq!(ship.reshipped_to_id, None);
        assert_eq!(ship.wakatime_project_names, vec!["boat", "boat-web"]);
    }

    #[test]
    fn test_missing_payout_and_hours_default_to_zero() {
        let ship = Ship::from_record(&record(json!({
            "id": "recShip2",
            "createdTime": "2024-11-03T09:30:00Z",
            "fields": {}
        })))
        .expect("ship maps");
        assert_eq!(ship.credited_hours, 0.0);
        assert_eq!(ship.doubloon_payout, 0.0);
        assert_eq!(ship.hours, None);
        assert_eq!(ship.title_or_default(), "Untitled ship");
    }

    #[test]
    fn test_non_finite_hours_default_to_zero() {
        let ship = Ship::from_record(&record(json!({
            "id": "recShip3",
            "createdTime": "2024-11-03T09:30:00Z",
            "fields": { "credited_hours": "NaN", "doubloon_payout": "inf" }
        })))
        .expect("ship maps");
        assert_eq!(ship.credited_hours, 0.0);
        assert_eq!(ship.doubloon_payout, 0.0);
    }

    #[test]
    fn test_unknown_enum_values_pass_through() {
        let ship = Ship::from_record(&record(json!({
            "id": "recShip3",
            "createdTime": "2024-11-03T09:30:00Z",
            "fields": { "ship_status": "awaiting-review", "ship_type": "remix" }
        })))
        .expect("ship maps");
        assert_eq!(ship.ship_status, ShipStatus::Other("awaiting-review".into()));
        assert_eq!(ship.ship_type, ShipType::Other("remix".into()));
    }

    #[test]
    fn test_missing_created_time_is_malformed() {
        let err = Ship::from_record(&record(json!({ "id": "recShip4", "fields": {} })))
            .expect_err("must fail");
        assert!(matches!(
            err,
            DataError::MalformedRecord { field: "createdTime", ref id, .. } if id == "recShip4"
        ));
    }

    #[test]
    fn test_bad_created_time_is_malformed() {
        let err = Ship::from_record(&record(json!({
            "id": "recShip5",
            "createdTime": "yesterday",
            "fields": {}
        })))
        .expect_err("must fail");
        assert!(err.to_string().contains("not a timestamp"));
    }

    #[test]
    fn test_empty_id_is_malformed() {
        let err = Ship::from_record(&record(json!({
            "id": "",
            "createdTime": "2024-11-03T09:30:00Z"
        })))
        .expect_err("must fail");
        assert!(matches!(err, DataError::MalformedRecord { field: "id", .. }));
    }

    #[test]
    fn test_status_serializes_as_string() {
        let json = serde_json::to_string(&ShipStatus::Staged).expect("serializes");
        assert_eq!(json, "\"staged\"");
        let back: ShipStatus = serde_json::from_str("\"weird\"").expect("parses");
        assert_eq!(back, ShipStatus::Other("weird".into()));
    }
}
