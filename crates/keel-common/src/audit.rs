//! Audit metadata carried by every persisted deployment config row

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Created/updated actor and timestamp pair
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub created_on: NaiveDateTime,
    pub created_by: i32,
    pub updated_on: NaiveDateTime,
    pub updated_by: i32,
}

impl AuditLog {
    /// Stamp a fresh "created" entry. The updated pair mirrors the created one.
    pub fn create(&mut self, user_id: i32) {
        let now = Local::now().naive_local();
        self.created_on = now;
        self.created_by = user_id;
        self.updated_on = now;
        self.updated_by = user_id;
    }

    /// Stamp an "updated" entry, leaving the created pair untouched
    pub fn update(&mut self, user_id: i32) {
        self.updated_on = Local::now().naive_local();
        self.updated_by = user_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_stamps_both_pairs() {
        let mut audit = AuditLog::default();
        audit.create(7);
        assert_eq!(audit.created_by, 7);
        assert_eq!(audit.updated_by, 7);
        assert_eq!(audit.created_on, audit.updated_on);
    }

    #[test]
    fn test_update_preserves_created() {
        let mut audit = AuditLog::default();
        audit.create(1);
        let created_on = audit.created_on;
        audit.update(42);
        assert_eq!(audit.created_by, 1);
        assert_eq!(audit.created_on, created_on);
        assert_eq!(audit.updated_by, 42);
        assert!(audit.updated_on >= created_on);
    }
}
