use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kidstock_core::{ChildId, DomainError, GroupId};
use kidstock_inventory::{
    Child, ClothingCategory, ClothingCategoryId, Group, ShareToken, StockAdjustment, StockEntry,
    StockItem, sort_categories, sort_entries,
};

use super::{EntityStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    groups: HashMap<GroupId, Group>,
    groups_by_token: HashMap<String, GroupId>,
    children: HashMap<ChildId, Child>,
    categories: BTreeMap<ClothingCategoryId, ClothingCategory>,
    stock: HashMap<(ChildId, ClothingCategoryId), StockItem>,
}

impl Tables {
    fn entry_for(&self, item: &StockItem) -> Option<StockEntry> {
        self.categories
            .get(&item.clothing_category_id)
            .map(|category| StockEntry {
                item: item.clone(),
                clothing_category: category.clone(),
            })
    }
}

/// In-memory entity store for tests/dev.
///
/// Every write runs under a single `RwLock` write guard, which is what makes
/// `adjust_stock` atomic. The guard is never held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    inner: RwLock<Tables>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn insert_group(&self, group: Group) -> StoreResult<Group> {
        let mut t = self.write()?;
        if t.groups_by_token.contains_key(group.share_token.as_str()) {
            return Err(DomainError::conflict("share token already in use").into());
        }
        t.groups_by_token
            .insert(group.share_token.as_str().to_string(), group.id);
        t.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn group_by_token(&self, token: &ShareToken) -> StoreResult<Option<Group>> {
        let t = self.read()?;
        Ok(t.groups_by_token
            .get(token.as_str())
            .and_then(|id| t.groups.get(id))
            .cloned())
    }

    async fn children_of_group(&self, group_id: GroupId) -> StoreResult<Vec<Child>> {
        let t = self.read()?;
        let mut children: Vec<Child> = t
            .children
            .values()
            .filter(|c| c.group_id == group_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(children)
    }

    async fn insert_child(&self, child: Child) -> StoreResult<Child> {
        let mut t = self.write()?;
        if !t.groups.contains_key(&child.group_id) {
            return Err(DomainError::GroupNotFound.into());
        }
        t.children.insert(child.id, child.clone());
        Ok(child)
    }

    async fn child(&self, child_id: ChildId) -> StoreResult<Option<Child>> {
        Ok(self.read()?.children.get(&child_id).cloned())
    }

    async fn update_child(&self, child: Child) -> StoreResult<Child> {
        let mut t = self.write()?;
        let existing = t
            .children
            .get_mut(&child.id)
            .ok_or(DomainError::ChildNotFound)?;
        existing.name = child.name;
        existing.updated_at = child.updated_at;
        Ok(existing.clone())
    }

    async fn delete_child(&self, child_id: ChildId) -> StoreResult<()> {
        let mut t = self.write()?;
        if t.children.remove(&child_id).is_none() {
            return Err(DomainError::ChildNotFound.into());
        }
        t.stock.retain(|(c, _), _| *c != child_id);
        Ok(())
    }

    async fn categories(&self) -> StoreResult<Vec<ClothingCategory>> {
        let mut all: Vec<ClothingCategory> = self.read()?.categories.values().cloned().collect();
        sort_categories(&mut all);
        Ok(all)
    }

    async fn category(&self, id: ClothingCategoryId) -> StoreResult<Option<ClothingCategory>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn upsert_category(&self, category: ClothingCategory) -> StoreResult<()> {
        self.write()?.categories.insert(category.id, category);
        Ok(())
    }

    async fn stock_for_child(&self, child_id: ChildId) -> StoreResult<Vec<StockEntry>> {
        let t = self.read()?;
        if !t.children.contains_key(&child_id) {
            return Err(DomainError::ChildNotFound.into());
        }
        let mut entries: Vec<StockEntry> = t
            .stock
            .values()
            .filter(|item| item.child_id == child_id)
            .filter_map(|item| t.entry_for(item))
            .collect();
        sort_entries(&mut entries);
        Ok(entries)
    }

    async fn adjust_stock(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        adjustment: StockAdjustment,
        now: DateTime<Utc>,
    ) -> StoreResult<StockEntry> {
        let mut t = self.write()?;
        if !t.children.contains_key(&child_id) {
            return Err(DomainError::ChildNotFound.into());
        }
        let category = t
            .categories
            .get(&category_id)
            .cloned()
            .ok_or(DomainError::InvalidCategory(category_id.0))?;

        // Work on a copy so a rejected adjustment leaves the table untouched.
        let mut item = t
            .stock
            .get(&(child_id, category_id))
            .cloned()
            .unwrap_or_else(|| StockItem::empty(child_id, category_id, now));
        item.adjust(adjustment, now)?;
        t.stock.insert((child_id, category_id), item.clone());

        Ok(StockEntry {
            item,
            clothing_category: category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kidstock_core::BoundedName;
    use kidstock_inventory::default_catalog;

    async fn seeded() -> InMemoryEntityStore {
        let store = InMemoryEntityStore::new();
        for c in default_catalog() {
            store.upsert_category(c).await.unwrap();
        }
        store
    }

    async fn group_with_child(store: &InMemoryEntityStore) -> (Group, Child) {
        let now = Utc::now();
        let group = store
            .insert_group(Group::new(BoundedName::parse("name", "Tanaka").unwrap(), now))
            .await
            .unwrap();
        let child = store
            .insert_child(Child::new(group.id, BoundedName::parse("name", "Hana").unwrap(), now))
            .await
            .unwrap();
        (group, child)
    }

    #[tokio::test]
    async fn duplicate_share_token_is_a_conflict() {
        let store = InMemoryEntityStore::new();
        let group = Group::new(BoundedName::parse("name", "A").unwrap(), Utc::now());
        let mut twin = Group::new(BoundedName::parse("name", "B").unwrap(), Utc::now());
        twin.share_token = group.share_token.clone();

        store.insert_group(group).await.unwrap();
        let err = store.insert_group(twin).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn child_requires_existing_group() {
        let store = InMemoryEntityStore::new();
        let orphan = Child::new(GroupId::new(), BoundedName::parse("name", "Ken").unwrap(), Utc::now());
        let err = store.insert_child(orphan).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::GroupNotFound)));
    }

    #[tokio::test]
    async fn first_increment_creates_the_item() {
        let store = seeded().await;
        let (_, child) = group_with_child(&store).await;

        let entry = store
            .adjust_stock(
                child.id,
                ClothingCategoryId(1),
                StockAdjustment::increment(3).unwrap(),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(entry.item.current_count, 3);
        assert_eq!(entry.clothing_category.name, "T-shirts");
    }

    #[tokio::test]
    async fn decrementing_a_missing_item_fails_and_creates_nothing() {
        let store = seeded().await;
        let (_, child) = group_with_child(&store).await;

        let err = store
            .adjust_stock(
                child.id,
                ClothingCategoryId(2),
                StockAdjustment::decrement(1).unwrap(),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::InsufficientStock { available: 0, requested: 1 })
        ));
        assert!(store.stock_for_child(child.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_category_and_child_are_rejected() {
        let store = seeded().await;
        let (_, child) = group_with_child(&store).await;
        let inc = StockAdjustment::increment(1).unwrap();

        let err = store
            .adjust_stock(child.id, ClothingCategoryId(999), inc, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::InvalidCategory(999))));

        let err = store
            .adjust_stock(ChildId::new(), ClothingCategoryId(1), inc, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::ChildNotFound)));
    }

    #[tokio::test]
    async fn deleting_a_child_cascades_to_stock() {
        let store = seeded().await;
        let (group, child) = group_with_child(&store).await;
        store
            .adjust_stock(
                child.id,
                ClothingCategoryId(1),
                StockAdjustment::increment(2).unwrap(),
                Utc::now(),
            )
            .await
            .unwrap();

        store.delete_child(child.id).await.unwrap();

        assert!(store.child(child.id).await.unwrap().is_none());
        assert!(store.children_of_group(group.id).await.unwrap().is_empty());
        assert!(store.read().unwrap().stock.is_empty());
        assert!(matches!(
            store.delete_child(child.id).await,
            Err(StoreError::Domain(DomainError::ChildNotFound))
        ));
    }

    #[tokio::test]
    async fn stock_is_listed_in_category_order() {
        let store = seeded().await;
        let (_, child) = group_with_child(&store).await;
        for id in [5, 2, 8] {
            store
                .adjust_stock(
                    child.id,
                    ClothingCategoryId(id),
                    StockAdjustment::increment(1).unwrap(),
                    Utc::now(),
                )
                .await
                .unwrap();
        }
        let ids: Vec<i64> = store
            .stock_for_child(child.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.clothing_category.id.0)
            .collect();
        assert_eq!(ids, vec![2, 5, 8]);
    }
}
