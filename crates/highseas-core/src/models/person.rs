use serde::{Deserialize, Serialize};

use super::fields;
use crate::api::RawRecord;

/// Profile snapshot from the `people` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Person {
    pub record_id: String,
    pub autonumber: Option<i64>,
    pub slack_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub vote_balance: Option<f64>,
    pub doubloons_balance: Option<f64>,
    pub doubloons_received: Option<f64>,
    pub doubloons_paid: Option<f64>,
    pub total_hours_logged: Option<f64>,
    pub votes_cast: Option<i64>,
    pub preexisting_user: bool,
    pub verification_status: Option<String>,
}

impl Person {
    pub fn from_record(record: &RawRecord) -> Self {
        let f = &record.fields;
        Person {
            record_id: record.id.clone(),
            autonumber: fields::integer(f, "autonumber"),
            slack_id: fields::string(f, "slack_id"),
            full_name: fields::string(f, "full_name"),
            email: fields::string(f, "email"),
            vote_balance: fields::number(f, "vote_balance"),
            doubloons_balance: fields::number(f, "doubloons_balance"),
            doubloons_received: fields::number(f, "doubloons_received"),
            doubloons_paid: fields::number(f, "doubloons_paid"),
            total_hours_logged: fields::number(f, "total_hours_logged"),
            votes_cast: fields::integer(f, "votes_cast"),
            preexisting_user: fields::flag(f, "preexisting_user"),
            verification_status: fields::string(f, "verification_status"),
        }
    }
}
