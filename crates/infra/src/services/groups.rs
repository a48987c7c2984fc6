use chrono::Utc;

use kidstock_core::{BoundedName, ChildId, DomainError};
use kidstock_inventory::{Child, ClothingCategory, Group, GroupWithChildren, ShareToken};

use crate::store::EntityStore;

use super::{ServiceError, ServiceResult};

/// How many fresh share tokens to try before giving up on a collision streak.
const SHARE_TOKEN_ATTEMPTS: usize = 5;

/// Group/child management: share-token groups and the children under them.
#[derive(Debug, Clone)]
pub struct GroupService<S> {
    store: S,
}

impl<S> GroupService<S>
where
    S: EntityStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a group with a fresh, unique share token and no children.
    pub async fn create_group(&self, name: &str) -> ServiceResult<GroupWithChildren> {
        let name = BoundedName::parse("name", name)?;
        let mut group = Group::new(name, Utc::now());

        for attempt in 1..=SHARE_TOKEN_ATTEMPTS {
            match self.store.insert_group(group.clone()).await.map_err(ServiceError::from) {
                Ok(stored) => {
                    tracing::info!(group_id = %stored.id, "group created");
                    return Ok(GroupWithChildren {
                        group: stored,
                        children: Vec::new(),
                    });
                }
                Err(ServiceError::Domain(DomainError::Conflict(_))) => {
                    tracing::warn!(attempt, "share token collision; regenerating");
                    group.regenerate_token();
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::conflict("could not allocate a unique share token").into())
    }

    /// Look a group up by its share token, children included.
    pub async fn group_by_token(&self, token: &str) -> ServiceResult<GroupWithChildren> {
        let group = self.resolve(token).await?;
        let children = self.store.children_of_group(group.id).await?;
        Ok(GroupWithChildren { group, children })
    }

    pub async fn children_by_token(&self, token: &str) -> ServiceResult<Vec<Child>> {
        let group = self.resolve(token).await?;
        Ok(self.store.children_of_group(group.id).await?)
    }

    /// Add a child to the group behind `token`.
    ///
    /// The group is resolved before the name is validated, so an unknown token
    /// reports `GroupNotFound` even for a bad name.
    pub async fn add_child(&self, token: &str, name: &str) -> ServiceResult<Child> {
        let group = self.resolve(token).await?;
        let name = BoundedName::parse("name", name)?;
        let child = self
            .store
            .insert_child(Child::new(group.id, name, Utc::now()))
            .await?;
        tracing::info!(group_id = %group.id, child_id = %child.id, "child added");
        Ok(child)
    }

    pub async fn child(&self, child_id: ChildId) -> ServiceResult<Child> {
        self.store
            .child(child_id)
            .await?
            .ok_or_else(|| DomainError::ChildNotFound.into())
    }

    pub async fn update_child(&self, child_id: ChildId, name: &str) -> ServiceResult<Child> {
        let mut child = self.child(child_id).await?;
        let name = BoundedName::parse("name", name)?;
        child.rename(name, Utc::now());
        let child = self.store.update_child(child).await?;
        tracing::info!(child_id = %child.id, "child renamed");
        Ok(child)
    }

    /// Delete a child; its stock items are deleted with it.
    pub async fn delete_child(&self, child_id: ChildId) -> ServiceResult<()> {
        self.store.delete_child(child_id).await?;
        tracing::info!(child_id = %child_id, "child deleted");
        Ok(())
    }

    pub async fn categories(&self) -> ServiceResult<Vec<ClothingCategory>> {
        Ok(self.store.categories().await?)
    }

    /// Upsert every category of `catalog` (startup seeding; safe to repeat).
    pub async fn seed_categories(&self, catalog: Vec<ClothingCategory>) -> ServiceResult<usize> {
        let count = catalog.len();
        for category in catalog {
            self.store.upsert_category(category).await?;
        }
        tracing::info!(count, "clothing categories seeded");
        Ok(count)
    }

    async fn resolve(&self, token: &str) -> ServiceResult<Group> {
        self.store
            .group_by_token(&ShareToken::from_raw(token))
            .await?
            .ok_or_else(|| DomainError::GroupNotFound.into())
    }
}
