//! Resource shapes returned by the API and inputs for card operations.
//!
//! # Design
//! Response records are flat pass-through shapes: every field except `id` may
//! be missing from a given endpoint's payload, so they decode as `Option` and
//! unknown fields are ignored. Timestamps decode into `DateTime<Utc>`, which
//! normalizes the several RFC 3339 spellings the service may echo back.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::request::Field;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct List {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "idBoard")]
    pub board_id: Option<String>,
    #[serde(default)]
    pub closed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "desc")]
    pub description: Option<String>,
    #[serde(default, rename = "idList")]
    pub list_id: Option<String>,
    #[serde(default, rename = "idBoard")]
    pub board_id: Option<String>,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub badges: Option<Badges>,
}

/// Summary flags the service derives from a card's own fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Badges {
    #[serde(default, rename = "description")]
    pub has_description: Option<bool>,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
}

/// Input for creating a card.
///
/// A missing description is sent as an empty string; a missing due date is
/// not sent at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due: Option<DateTime<Utc>>,
}

impl NewCard {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Input for a full card update. Every field is transmitted; `None` is sent
/// as an empty value and overwrites whatever the server holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due: Option<DateTime<Utc>>,
}

/// Input for a partial card update. Only fields that are not
/// `Field::Unchanged` are transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub name: Field<String>,
    pub description: Field<String>,
    pub due: Field<DateTime<Utc>>,
}

/// Wire format for timestamps: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
