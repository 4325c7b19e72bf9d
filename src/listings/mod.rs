use axum::{routing::get, Router};

use crate::state::AppState;

pub mod kinds;
pub mod store;

mod handlers;

use handlers::{admin_create, admin_delete, admin_list, admin_update, create, list_public};
use kinds::{Business, Job, MarketplaceItem, Post};
use store::ListingKind;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(kind_routes::<Business>("/businesses", "/admin/businesses"))
        .merge(kind_routes::<Job>("/jobs", "/admin/jobs"))
        .merge(kind_routes::<Post>("/posts", "/admin/posts"))
        .merge(kind_routes::<MarketplaceItem>(
            "/marketplace",
            "/admin/marketplace",
        ))
}

/// Every kind exposes the same shape: a public feed plus an authenticated
/// create, and an admin surface with full listing, create, delete and patch.
fn kind_routes<K: ListingKind>(public: &str, admin: &str) -> Router<AppState> {
    Router::new()
        .route(public, get(list_public::<K>).post(create::<K>))
        .route(
            admin,
            get(admin_list::<K>)
                .post(admin_create::<K>)
                .delete(admin_delete::<K>)
                .patch(admin_update::<K>),
        )
}
