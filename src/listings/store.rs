use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::query::Query;
use sqlx::query_builder::Separated;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// One listing kind: its table, row shape, creation payload and admin patch.
/// The store below is generic over this closed set, so the approval filter
/// and write paths cannot drift apart between kinds.
pub trait ListingKind: Send + Sync + 'static {
    const TABLE: &'static str;
    /// Filter applied to the public feed; admin listing bypasses it.
    const PUBLIC_FILTER: &'static str = "approved = 1";
    const INSERT_SQL: &'static str;

    type Row: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + 'static;
    type Create: DeserializeOwned + Send + Sync;
    type Patch: DeserializeOwned + Send + Sync;

    /// Required fields must be present and non-empty.
    fn validate(payload: &Self::Create) -> Result<(), ApiError>;

    /// Bind the kind-specific columns of `INSERT_SQL`; the id is already bound.
    fn bind_insert<'q>(q: SqliteQuery<'q>, payload: &Self::Create) -> SqliteQuery<'q>;

    /// Push `column = value` for every supplied patch field, returning how
    /// many were pushed.
    fn push_updates<'qb, 'args>(
        patch: &Self::Patch,
        sep: &mut Separated<'qb, 'args, Sqlite, &'static str>,
    ) -> usize;
}

pub(crate) fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn set_col<'qb, 'args, T>(
    sep: &mut Separated<'qb, 'args, Sqlite, &'static str>,
    count: &mut usize,
    column: &str,
    value: &Option<T>,
) where
    T: Clone + Send + sqlx::Encode<'args, Sqlite> + sqlx::Type<Sqlite> + 'args,
{
    if let Some(v) = value {
        sep.push(column);
        sep.push_unseparated(" = ");
        sep.push_bind_unseparated(v.clone());
        *count += 1;
    }
}

/// Approved rows only (marketplace also hides sold ones), newest first.
/// The rowid tie-break keeps creation order stable within one timestamp.
pub async fn list_public<K: ListingKind>(db: &SqlitePool) -> Result<Vec<K::Row>, ApiError> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} ORDER BY created_at DESC, rowid DESC",
        K::TABLE,
        K::PUBLIC_FILTER
    );
    Ok(sqlx::query_as::<_, K::Row>(&sql).fetch_all(db).await?)
}

/// Every row regardless of approval; admin surface only.
pub async fn list_all<K: ListingKind>(db: &SqlitePool) -> Result<Vec<K::Row>, ApiError> {
    let sql = format!(
        "SELECT * FROM {} ORDER BY created_at DESC, rowid DESC",
        K::TABLE
    );
    Ok(sqlx::query_as::<_, K::Row>(&sql).fetch_all(db).await?)
}

/// Insert with a fresh random id. `approved` and `created_at` come from the
/// table defaults; the insert is committed before the id is returned.
pub async fn create<K: ListingKind>(
    db: &SqlitePool,
    payload: &K::Create,
) -> Result<String, ApiError> {
    K::validate(payload)?;
    let id = Uuid::new_v4().to_string();
    K::bind_insert(sqlx::query(K::INSERT_SQL).bind(id.clone()), payload)
        .execute(db)
        .await?;
    debug!(table = K::TABLE, id = %id, "listing created");
    Ok(id)
}

/// Partial update: only the supplied fields change. A patch with nothing in
/// it is a validation error rather than an UPDATE with an empty SET clause.
pub async fn update<K: ListingKind>(
    db: &SqlitePool,
    id: &str,
    patch: &K::Patch,
) -> Result<(), ApiError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("UPDATE {} SET ", K::TABLE));
    let mut sep = qb.separated(", ");
    let fields = K::push_updates(patch, &mut sep);
    if fields == 0 {
        return Err(ApiError::Validation("no fields to update".into()));
    }
    qb.push(" WHERE id = ").push_bind(id.to_string());
    qb.build().execute(db).await?;
    debug!(table = K::TABLE, id = %id, fields, "listing updated");
    Ok(())
}

/// Hard delete; removing an id that does not exist is a no-op success.
pub async fn delete<K: ListingKind>(db: &SqlitePool, id: &str) -> Result<(), ApiError> {
    let sql = format!("DELETE FROM {} WHERE id = ?", K::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(db).await?;
    debug!(table = K::TABLE, id = %id, rows = result.rows_affected(), "listing deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::kinds::{Business, Job, MarketplaceItem, Post};
    use crate::state::AppState;
    use serde_json::json;

    fn job_payload(title: &str) -> <Job as ListingKind>::Create {
        serde_json::from_value(json!({
            "title": title,
            "company": "Harbour Roasters",
            "location": "Main Road",
            "type": "Part-time",
            "salary": "R95/hour",
            "description": "Weekend shifts.",
            "contact": "021-555-0101",
        }))
        .expect("job payload")
    }

    #[tokio::test]
    async fn create_then_list_first() {
        let state = AppState::for_tests().await;
        store_job(&state, "Barista").await;
        let id = store_job(&state, "Bookkeeper").await;

        let rows = list_public::<Job>(&state.db).await.expect("list");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, id, "newest listing comes first");
    }

    async fn store_job(state: &AppState, title: &str) -> String {
        let id = create::<Job>(&state.db, &job_payload(title))
            .await
            .expect("create job");
        assert!(!id.is_empty());
        id
    }

    #[tokio::test]
    async fn create_rejects_empty_required_field() {
        let state = AppState::for_tests().await;
        let err = create::<Job>(&state.db, &job_payload("   "))
            .await
            .expect_err("blank title must fail");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unapproved_rows_hidden_from_public_list() {
        let state = AppState::for_tests().await;
        let id = store_job(&state, "Lifeguard").await;

        let patch: <Job as ListingKind>::Patch =
            serde_json::from_value(json!({ "approved": false })).expect("patch");
        update::<Job>(&state.db, &id, &patch).await.expect("update");

        let public = list_public::<Job>(&state.db).await.expect("public");
        assert!(public.iter().all(|row| row.id != id));

        let all = list_all::<Job>(&state.db).await.expect("all");
        assert!(all.iter().any(|row| row.id == id && !row.approved));
    }

    #[tokio::test]
    async fn sold_items_hidden_from_public_marketplace() {
        let state = AppState::for_tests().await;
        let payload: <MarketplaceItem as ListingKind>::Create = serde_json::from_value(json!({
            "title": "Longboard",
            "price": "R1200",
            "category": "Sport",
            "condition": "Used",
            "location": "Beachfront",
            "description": "9ft single fin.",
            "seller": "Jo",
            "contact": "071-555-0102",
        }))
        .expect("payload");
        let id = create::<MarketplaceItem>(&state.db, &payload)
            .await
            .expect("create");

        let patch: <MarketplaceItem as ListingKind>::Patch =
            serde_json::from_value(json!({ "sold": true })).expect("patch");
        update::<MarketplaceItem>(&state.db, &id, &patch)
            .await
            .expect("update");

        let public = list_public::<MarketplaceItem>(&state.db).await.expect("public");
        assert!(public.is_empty());
        let all = list_all::<MarketplaceItem>(&state.db).await.expect("all");
        assert_eq!(all.len(), 1);
        assert!(all[0].sold);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let state = AppState::for_tests().await;
        let payload: <Business as ListingKind>::Create = serde_json::from_value(json!({
            "name": "Empire Cafe",
            "category": "Food & Coffee",
            "address": "11 York Road",
            "phone": "021-555-0103",
            "hours": "7am - 4pm",
            "description": "Breakfast institution.",
        }))
        .expect("payload");
        let id = create::<Business>(&state.db, &payload).await.expect("create");

        let patch: <Business as ListingKind>::Patch =
            serde_json::from_value(json!({ "phone": "021-555-0999" })).expect("patch");
        update::<Business>(&state.db, &id, &patch).await.expect("update");

        let rows = list_all::<Business>(&state.db).await.expect("list");
        assert_eq!(rows[0].phone, "021-555-0999");
        assert_eq!(rows[0].name, "Empire Cafe");
        assert!(rows[0].approved);
    }

    #[tokio::test]
    async fn empty_patch_is_a_validation_error() {
        let state = AppState::for_tests().await;
        let id = store_job(&state, "Cleaner").await;
        let patch: <Job as ListingKind>::Patch =
            serde_json::from_value(json!({})).expect("patch");
        let err = update::<Job>(&state.db, &id, &patch)
            .await
            .expect_err("empty patch must fail");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let state = AppState::for_tests().await;
        let id = store_job(&state, "Gardener").await;

        delete::<Job>(&state.db, &id).await.expect("first delete");
        delete::<Job>(&state.db, &id).await.expect("second delete is a no-op");
        delete::<Job>(&state.db, "no-such-id")
            .await
            .expect("unknown id is a no-op");

        assert!(list_all::<Job>(&state.db).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn posts_default_counters_to_zero() {
        let state = AppState::for_tests().await;
        let payload: <Post as ListingKind>::Create = serde_json::from_value(json!({
            "type": "event",
            "title": "Beach cleanup",
            "content": "Saturday 8am at the main beach.",
            "author": "Beach Keepers",
        }))
        .expect("payload");
        create::<Post>(&state.db, &payload).await.expect("create");

        let rows = list_public::<Post>(&state.db).await.expect("list");
        assert_eq!(rows[0].likes, 0);
        assert_eq!(rows[0].comments, 0);
    }
}
