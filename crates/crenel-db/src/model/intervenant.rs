use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::schema;

/// A temporary collaborator with a personal calendar access key.
///
/// `availability` holds the raw availability document exactly as it was
/// last saved; interpreting it is the service layer's job.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::intervenant)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Intervenant {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub key: String,
    pub creationdate: DateTime<Utc>,
    pub enddate: DateTime<Utc>,
    pub availability: serde_json::Value,
}

impl Intervenant {
    /// Whether the access key has passed its expiry date.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.enddate < now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = schema::intervenant)]
pub struct NewIntervenant<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub key: &'a str,
    pub creationdate: DateTime<Utc>,
    pub enddate: DateTime<Utc>,
    pub availability: &'a serde_json::Value,
}

/// Partial update of an intervenant's profile. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::intervenant)]
pub struct IntervenantChanges<'a> {
    pub email: Option<&'a str>,
    pub firstname: Option<&'a str>,
    pub lastname: Option<&'a str>,
    pub enddate: Option<DateTime<Utc>>,
}

impl IntervenantChanges<'_> {
    /// Whether the changeset would touch any column at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.firstname.is_none()
            && self.lastname.is_none()
            && self.enddate.is_none()
    }
}
