//! Inspector document schema
//!
//! Inspector documents are created by an external process; this tool only
//! reads them and sets the `uid` field. Writes are always partial `$set`
//! updates, so fields not modeled here survive untouched.

use serde::{Deserialize, Serialize};

/// Collection name for inspectors
pub const INSPECTOR_COLLECTION: &str = "inspectors";

/// Inspector document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct InspectorDoc {
    /// Document id (opaque string assigned by the record source)
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_no: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Identity account id, absent until reconciliation succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl InspectorDoc {
    /// Whether the document already links an identity account
    pub fn has_uid(&self) -> bool {
        self.uid
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false)
    }
}
