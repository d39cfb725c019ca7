use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::user_count::TimeWindow;

/// User account as stored in the MongoDB "users" collection.
///
/// Only the fields that decide whether an account is active are modelled;
/// everything else in the document is ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(
        rename = "lastLoginAt",
        default,
        skip_serializing_if = "Option::is_none",
        with = "bson_datetime_as_chrono_option"
    )]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub suspended: bool,
}

impl UserAccount {
    pub fn new(last_login_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: None,
            last_login_at,
            deleted: false,
            suspended: false,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// True when the account logged in within `window` and is neither
    /// deleted nor suspended.
    pub fn is_active_in(&self, window: &TimeWindow) -> bool {
        if self.deleted || self.suspended {
            return false;
        }
        self.last_login_at.is_some_and(|login| window.contains(&login))
    }
}

// Serde converter for Option<chrono::DateTime> <-> Option<mongodb::bson::DateTime>
pub(super) mod bson_datetime_as_chrono_option {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => {
                let bson_dt = bson::DateTime::from_millis(d.timestamp_millis());
                serializer.serialize_some(&bson_dt)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt_bson_dt: Option<bson::DateTime> = Option::deserialize(deserializer)?;
        opt_bson_dt
            .map(|bson_dt| {
                DateTime::from_timestamp_millis(bson_dt.timestamp_millis())
                    .ok_or_else(|| D::Error::custom("lastLoginAt out of range"))
            })
            .transpose()
    }
}
