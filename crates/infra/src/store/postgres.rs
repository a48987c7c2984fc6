//! Postgres-backed entity store.
//!
//! ## Stock adjustments
//!
//! Increments are a single upsert that adds to the stored count. Decrements are a
//! conditional `UPDATE … WHERE current_count >= $n`: when it touches no row the
//! count was too low (or the item does not exist yet), and nothing was written.
//! A `CHECK (current_count >= 0)` constraint backs the invariant at the schema level.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23505` on `groups.share_token` | `Domain(Conflict)` | Share token collision |
//! | `23503` | `Domain(ChildNotFound / GroupNotFound)` | Parent deleted concurrently |
//! | `23514` | `Domain(InsufficientStock)` | Check constraint rejected a negative count |
//! | `22003` | `Domain(Validation)` on `increment` | Increment would overflow `BIGINT` |
//! | other | `Database` | Anything else |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::instrument;

use kidstock_core::{ChildId, DomainError, GroupId, StockItemId};
use kidstock_inventory::{
    AdjustmentKind, Child, ClothingCategory, ClothingCategoryId, Group, ShareToken,
    StockAdjustment, StockEntry, StockItem,
};

use super::{EntityStore, StoreError, StoreResult};

/// Idempotent schema, applied statement by statement by [`PostgresEntityStore::migrate`].
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS groups (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        share_token TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS groups_share_token_key ON groups (share_token)",
    r#"
    CREATE TABLE IF NOT EXISTS children (
        id         UUID PRIMARY KEY,
        group_id   UUID NOT NULL REFERENCES groups (id) ON DELETE CASCADE,
        name       TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS children_group_id_idx ON children (group_id)",
    r#"
    CREATE TABLE IF NOT EXISTS clothing_categories (
        id         BIGINT PRIMARY KEY,
        name       TEXT NOT NULL,
        icon_path  TEXT NULL,
        sort_order INTEGER NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock_items (
        id                   UUID PRIMARY KEY,
        child_id             UUID NOT NULL REFERENCES children (id) ON DELETE CASCADE,
        clothing_category_id BIGINT NOT NULL REFERENCES clothing_categories (id),
        current_count        BIGINT NOT NULL CHECK (current_count >= 0),
        updated_at           TIMESTAMPTZ NOT NULL,
        UNIQUE (child_id, clothing_category_id)
    )
    "#,
];

const STOCK_ENTRY_SELECT: &str = r#"
    SELECT
        s.id,
        s.child_id,
        s.clothing_category_id,
        s.current_count,
        s.updated_at,
        c.name AS category_name,
        c.icon_path,
        c.sort_order
    FROM stock_items s
    JOIN clothing_categories c ON c.id = s.clothing_category_id
"#;

/// Postgres-backed entity store.
///
/// `Send + Sync`; all access goes through the SQLx connection pool.
#[derive(Debug, Clone)]
pub struct PostgresEntityStore {
    pool: Arc<PgPool>,
}

impl PostgresEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn require_child(tx: &mut Transaction<'_, Postgres>, child_id: ChildId) -> StoreResult<()> {
        let found = sqlx::query("SELECT 1 FROM children WHERE id = $1")
            .bind(child_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("require_child", e))?;
        match found {
            Some(_) => Ok(()),
            None => Err(DomainError::ChildNotFound.into()),
        }
    }

    async fn category_in(
        tx: &mut Transaction<'_, Postgres>,
        id: ClothingCategoryId,
    ) -> StoreResult<Option<ClothingCategory>> {
        let row = sqlx::query(
            "SELECT id, name, icon_path, sort_order FROM clothing_categories WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("category", e))?;
        row.map(|r| category_from_row(&r)).transpose()
    }
}

#[async_trait]
impl EntityStore for PostgresEntityStore {
    #[instrument(skip(self, group), fields(group_id = %group.id), err)]
    async fn insert_group(&self, group: Group) -> StoreResult<Group> {
        sqlx::query(
            r#"
            INSERT INTO groups (id, name, share_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(group.id.as_uuid())
        .bind(group.name.as_str())
        .bind(group.share_token.as_str())
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if has_sqlstate(&e, "23505") {
                DomainError::conflict("share token already in use").into()
            } else {
                map_sqlx_error("insert_group", e)
            }
        })?;
        Ok(group)
    }

    async fn group_by_token(&self, token: &ShareToken) -> StoreResult<Option<Group>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, share_token, created_at, updated_at
            FROM groups
            WHERE share_token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("group_by_token", e))?;
        row.map(|r| group_from_row(&r)).transpose()
    }

    async fn children_of_group(&self, group_id: GroupId) -> StoreResult<Vec<Child>> {
        let rows = sqlx::query(
            r#"
            SELECT id, group_id, name, created_at, updated_at
            FROM children
            WHERE group_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("children_of_group", e))?;
        rows.iter().map(child_from_row).collect()
    }

    #[instrument(skip(self, child), fields(child_id = %child.id, group_id = %child.group_id), err)]
    async fn insert_child(&self, child: Child) -> StoreResult<Child> {
        sqlx::query(
            r#"
            INSERT INTO children (id, group_id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(child.id.as_uuid())
        .bind(child.group_id.as_uuid())
        .bind(child.name.as_str())
        .bind(child.created_at)
        .bind(child.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if has_sqlstate(&e, "23503") {
                DomainError::GroupNotFound.into()
            } else {
                map_sqlx_error("insert_child", e)
            }
        })?;
        Ok(child)
    }

    async fn child(&self, child_id: ChildId) -> StoreResult<Option<Child>> {
        let row = sqlx::query(
            "SELECT id, group_id, name, created_at, updated_at FROM children WHERE id = $1",
        )
        .bind(child_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("child", e))?;
        row.map(|r| child_from_row(&r)).transpose()
    }

    #[instrument(skip(self, child), fields(child_id = %child.id), err)]
    async fn update_child(&self, child: Child) -> StoreResult<Child> {
        let row = sqlx::query(
            r#"
            UPDATE children
            SET name = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, group_id, name, created_at, updated_at
            "#,
        )
        .bind(child.id.as_uuid())
        .bind(child.name.as_str())
        .bind(child.updated_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_child", e))?;
        match row {
            Some(r) => child_from_row(&r),
            None => Err(DomainError::ChildNotFound.into()),
        }
    }

    #[instrument(skip(self), fields(child_id = %child_id), err)]
    async fn delete_child(&self, child_id: ChildId) -> StoreResult<()> {
        // stock_items rows go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM children WHERE id = $1")
            .bind(child_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_child", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::ChildNotFound.into());
        }
        Ok(())
    }

    async fn categories(&self) -> StoreResult<Vec<ClothingCategory>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, icon_path, sort_order
            FROM clothing_categories
            ORDER BY sort_order ASC NULLS LAST, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("categories", e))?;
        rows.iter().map(category_from_row).collect()
    }

    async fn category(&self, id: ClothingCategoryId) -> StoreResult<Option<ClothingCategory>> {
        let row = sqlx::query(
            "SELECT id, name, icon_path, sort_order FROM clothing_categories WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("category", e))?;
        row.map(|r| category_from_row(&r)).transpose()
    }

    async fn upsert_category(&self, category: ClothingCategory) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clothing_categories (id, name, icon_path, sort_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                icon_path = EXCLUDED.icon_path,
                sort_order = EXCLUDED.sort_order
            "#,
        )
        .bind(category.id.0)
        .bind(&category.name)
        .bind(category.icon_path.as_deref())
        .bind(category.sort_order)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_category", e))?;
        Ok(())
    }

    async fn stock_for_child(&self, child_id: ChildId) -> StoreResult<Vec<StockEntry>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Self::require_child(&mut tx, child_id).await?;

        let rows = sqlx::query(&format!(
            "{STOCK_ENTRY_SELECT} WHERE s.child_id = $1 ORDER BY c.sort_order ASC NULLS LAST, c.id ASC"
        ))
        .bind(child_id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("stock_for_child", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        rows.iter().map(stock_entry_from_row).collect()
    }

    #[instrument(
        skip(self, adjustment, now),
        fields(
            child_id = %child_id,
            category_id = %category_id,
            delta = adjustment.delta()
        ),
        err
    )]
    async fn adjust_stock(
        &self,
        child_id: ChildId,
        category_id: ClothingCategoryId,
        adjustment: StockAdjustment,
        now: DateTime<Utc>,
    ) -> StoreResult<StockEntry> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        Self::require_child(&mut tx, child_id).await?;
        let category = Self::category_in(&mut tx, category_id)
            .await?
            .ok_or(DomainError::InvalidCategory(category_id.0))?;

        let row = match adjustment.kind() {
            AdjustmentKind::Increment => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO stock_items (id, child_id, clothing_category_id, current_count, updated_at)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (child_id, clothing_category_id)
                    DO UPDATE SET
                        current_count = stock_items.current_count + EXCLUDED.current_count,
                        updated_at = EXCLUDED.updated_at
                    RETURNING id, child_id, clothing_category_id, current_count, updated_at
                    "#,
                )
                .bind(StockItemId::new().as_uuid())
                .bind(child_id.as_uuid())
                .bind(category_id.0)
                .bind(adjustment.amount())
                .bind(now)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_adjust_error(e, adjustment))?;
                Some(row)
            }
            AdjustmentKind::Decrement => sqlx::query(
                r#"
                UPDATE stock_items
                SET current_count = current_count - $3, updated_at = $4
                WHERE child_id = $1 AND clothing_category_id = $2 AND current_count >= $3
                RETURNING id, child_id, clothing_category_id, current_count, updated_at
                "#,
            )
            .bind(child_id.as_uuid())
            .bind(category_id.0)
            .bind(adjustment.amount())
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_adjust_error(e, adjustment))?,
        };

        let Some(row) = row else {
            // Nothing was written; report what is actually there.
            let available: Option<i64> = sqlx::query_scalar(
                "SELECT current_count FROM stock_items WHERE child_id = $1 AND clothing_category_id = $2",
            )
            .bind(child_id.as_uuid())
            .bind(category_id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("read_stock_count", e))?;
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::InsufficientStock {
                available: available.unwrap_or(0),
                requested: adjustment.amount(),
            }
            .into());
        };

        let item = stock_item_from_row(&row)?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(StockEntry {
            item,
            clothing_category: category,
        })
    }
}

fn group_from_row(row: &PgRow) -> StoreResult<Group> {
    Ok(Group {
        id: GroupId::from_uuid(row.try_get("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        share_token: ShareToken::from_raw(row.try_get::<String, _>("share_token").map_err(decode_error)?),
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

fn child_from_row(row: &PgRow) -> StoreResult<Child> {
    Ok(Child {
        id: ChildId::from_uuid(row.try_get("id").map_err(decode_error)?),
        group_id: GroupId::from_uuid(row.try_get("group_id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

fn category_from_row(row: &PgRow) -> StoreResult<ClothingCategory> {
    Ok(ClothingCategory {
        id: ClothingCategoryId(row.try_get("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        icon_path: row.try_get("icon_path").map_err(decode_error)?,
        sort_order: row.try_get("sort_order").map_err(decode_error)?,
    })
}

fn stock_item_from_row(row: &PgRow) -> StoreResult<StockItem> {
    Ok(StockItem {
        id: StockItemId::from_uuid(row.try_get("id").map_err(decode_error)?),
        child_id: ChildId::from_uuid(row.try_get("child_id").map_err(decode_error)?),
        clothing_category_id: ClothingCategoryId(
            row.try_get("clothing_category_id").map_err(decode_error)?,
        ),
        current_count: row.try_get("current_count").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

fn stock_entry_from_row(row: &PgRow) -> StoreResult<StockEntry> {
    let item = stock_item_from_row(row)?;
    let clothing_category = ClothingCategory {
        id: item.clothing_category_id,
        name: row.try_get("category_name").map_err(decode_error)?,
        icon_path: row.try_get("icon_path").map_err(decode_error)?,
        sort_order: row.try_get("sort_order").map_err(decode_error)?,
    };
    Ok(StockEntry {
        item,
        clothing_category,
    })
}

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(format!("failed to decode row: {err}"))
}

fn map_adjust_error(err: sqlx::Error, adjustment: StockAdjustment) -> StoreError {
    if has_sqlstate(&err, "23503") {
        DomainError::ChildNotFound.into()
    } else if has_sqlstate(&err, "22003") {
        DomainError::validation("increment", "increment would overflow the stock count").into()
    } else if has_sqlstate(&err, "23514") {
        DomainError::InsufficientStock {
            available: 0,
            requested: adjustment.amount(),
        }
        .into()
    } else {
        map_sqlx_error("adjust_stock", err)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => {
            StoreError::Database(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn has_sqlstate(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}
