use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidstock_core::{BoundedName, ChildId, GroupId};

/// A child belonging to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Child {
    pub fn new(group_id: GroupId, name: BoundedName, now: DateTime<Utc>) -> Self {
        Self {
            id: ChildId::new(),
            name: name.into_inner(),
            group_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: BoundedName, now: DateTime<Utc>) {
        self.name = name.into_inner();
        self.updated_at = now;
    }
}
