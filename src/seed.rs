use tracing::info;

use crate::auth::password::hash_password;
use crate::auth::repo::{Role, User};
use crate::error::ApiError;
use crate::listings::kinds::{
    Business, BusinessCreate, Job, JobCreate, Post, PostCreate,
};
use crate::listings::store;
use crate::state::AppState;

/// First-run population: the admin account and a handful of sample listings.
/// Idempotent by existence checks, so a wiped table heals on the next start
/// and repeated calls never duplicate anything.
pub async fn ensure_seeded(state: &AppState) -> Result<(), ApiError> {
    let config = &state.config;

    if User::find_by_email(&state.db, &config.admin_email)
        .await?
        .is_none()
    {
        let hash = hash_password(&config.admin_password)?;
        let admin = User::create(
            &state.db,
            &config.admin_email,
            &hash,
            &config.admin_name,
            Role::Admin,
        )
        .await?;
        info!(user_id = %admin.id, "admin account created");
    }

    if count(state, "businesses").await? == 0 {
        for business in sample_businesses() {
            store::create::<Business>(&state.db, &business).await?;
        }
        info!("seeded sample businesses");
    }

    if count(state, "posts").await? == 0 {
        for post in sample_posts() {
            store::create::<Post>(&state.db, &post).await?;
        }
        info!("seeded sample posts");
    }

    if count(state, "jobs").await? == 0 {
        store::create::<Job>(&state.db, &sample_job()).await?;
        info!("seeded sample job");
    }

    Ok(())
}

async fn count(state: &AppState, table: &str) -> Result<i64, ApiError> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    Ok(sqlx::query_scalar(&sql).fetch_one(&state.db).await?)
}

fn sample_businesses() -> Vec<BusinessCreate> {
    vec![
        BusinessCreate {
            name: "Harbour Roasters".into(),
            category: "Food & Coffee".into(),
            address: "12 Main Road".into(),
            phone: "021-555-0110".into(),
            hours: "7am - 4pm daily".into(),
            description: "Small-batch coffee and breakfasts by the harbour.".into(),
            rating: Some(4.6),
            reviews: Some(214),
            website: None,
        },
        BusinessCreate {
            name: "Shoreline Surf School".into(),
            category: "Surf & Beach".into(),
            address: "3 Beach Road".into(),
            phone: "021-555-0111".into(),
            hours: "8am - 5pm daily".into(),
            description: "Lessons and rentals for every level, twenty years running.".into(),
            rating: Some(4.8),
            reviews: Some(131),
            website: Some("https://shorelinesurf.example".into()),
        },
        BusinessCreate {
            name: "Corner Bookshop".into(),
            category: "Shops".into(),
            address: "45 Station Road".into(),
            phone: "021-555-0112".into(),
            hours: "9am - 6pm Mon-Sat".into(),
            description: "Second-hand books and a noticeboard for the neighbourhood.".into(),
            rating: None,
            reviews: None,
            website: None,
        },
    ]
}

fn sample_posts() -> Vec<PostCreate> {
    vec![
        PostCreate {
            kind: "event".into(),
            title: "Beach cleanup Saturday 8am".into(),
            content: "Meet at the main beach steps. Bags and gloves provided.".into(),
            author: "Beach Keepers".into(),
        },
        PostCreate {
            kind: "alert".into(),
            title: "Road works on Station Road".into(),
            content: "Single lane until Friday; expect delays at peak hours.".into(),
            author: "Community Office".into(),
        },
    ]
}

fn sample_job() -> JobCreate {
    JobCreate {
        title: "Barista".into(),
        company: "Harbour Roasters".into(),
        location: "Main Road".into(),
        kind: "Part-time".into(),
        salary: "R95/hour".into(),
        description: "Weekend shifts, training provided.".into(),
        contact: "021-555-0110".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::listings::store::list_public;

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate() {
        let state = AppState::for_tests().await;
        ensure_seeded(&state).await.expect("first seed");
        ensure_seeded(&state).await.expect("second seed");

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&state.db)
            .await
            .expect("count admins");
        assert_eq!(admins, 1);

        assert_eq!(count(&state, "businesses").await.unwrap(), 3);
        assert_eq!(count(&state, "posts").await.unwrap(), 2);
        assert_eq!(count(&state, "jobs").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn seeded_admin_can_log_in() {
        let state = AppState::for_tests().await;
        ensure_seeded(&state).await.expect("seed");

        let admin = User::find_by_email(&state.db, &state.config.admin_email)
            .await
            .expect("query")
            .expect("admin exists");
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password(
            &state.config.admin_password,
            &admin.password_hash
        ));
    }

    #[tokio::test]
    async fn seed_heals_after_wipe() {
        let state = AppState::for_tests().await;
        ensure_seeded(&state).await.expect("seed");

        sqlx::query("DELETE FROM businesses")
            .execute(&state.db)
            .await
            .expect("wipe");
        ensure_seeded(&state).await.expect("re-seed");

        let businesses = list_public::<Business>(&state.db).await.expect("list");
        assert_eq!(businesses.len(), 3);
    }
}
