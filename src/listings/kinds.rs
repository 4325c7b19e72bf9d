use serde::{Deserialize, Serialize};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Sqlite};

use crate::error::ApiError;

use super::store::{required, set_col, ListingKind, SqliteQuery};

// ---------------------------------------------------------------- businesses

pub struct Business;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusinessRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    pub hours: String,
    pub description: String,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub website: Option<String>,
    pub approved: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct BusinessCreate {
    pub name: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    pub hours: String,
    pub description: String,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub hours: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
    pub website: Option<String>,
    pub approved: Option<bool>,
}

impl ListingKind for Business {
    const TABLE: &'static str = "businesses";
    const INSERT_SQL: &'static str = "INSERT INTO businesses \
        (id, name, category, address, phone, hours, description, rating, reviews, website) \
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

    type Row = BusinessRow;
    type Create = BusinessCreate;
    type Patch = BusinessPatch;

    fn validate(payload: &Self::Create) -> Result<(), ApiError> {
        required("name", &payload.name)?;
        required("category", &payload.category)?;
        required("address", &payload.address)?;
        required("phone", &payload.phone)?;
        required("hours", &payload.hours)?;
        required("description", &payload.description)
    }

    fn bind_insert<'q>(q: SqliteQuery<'q>, payload: &Self::Create) -> SqliteQuery<'q> {
        q.bind(payload.name.clone())
            .bind(payload.category.clone())
            .bind(payload.address.clone())
            .bind(payload.phone.clone())
            .bind(payload.hours.clone())
            .bind(payload.description.clone())
            .bind(payload.rating)
            .bind(payload.reviews)
            .bind(payload.website.clone())
    }

    fn push_updates<'qb, 'args>(
        patch: &Self::Patch,
        sep: &mut Separated<'qb, 'args, Sqlite, &'static str>,
    ) -> usize {
        let mut n = 0;
        set_col(sep, &mut n, "name", &patch.name);
        set_col(sep, &mut n, "category", &patch.category);
        set_col(sep, &mut n, "address", &patch.address);
        set_col(sep, &mut n, "phone", &patch.phone);
        set_col(sep, &mut n, "hours", &patch.hours);
        set_col(sep, &mut n, "description", &patch.description);
        set_col(sep, &mut n, "rating", &patch.rating);
        set_col(sep, &mut n, "reviews", &patch.reviews);
        set_col(sep, &mut n, "website", &patch.website);
        set_col(sep, &mut n, "approved", &patch.approved);
        n
    }
}

// --------------------------------------------------------------------- jobs

pub struct Job;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub salary: String,
    pub description: String,
    pub contact: String,
    pub approved: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct JobCreate {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub salary: String,
    pub description: String,
    pub contact: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub approved: Option<bool>,
}

impl ListingKind for Job {
    const TABLE: &'static str = "jobs";
    const INSERT_SQL: &'static str = "INSERT INTO jobs \
        (id, title, company, location, type, salary, description, contact) \
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

    type Row = JobRow;
    type Create = JobCreate;
    type Patch = JobPatch;

    fn validate(payload: &Self::Create) -> Result<(), ApiError> {
        required("title", &payload.title)?;
        required("company", &payload.company)?;
        required("location", &payload.location)?;
        required("type", &payload.kind)?;
        required("salary", &payload.salary)?;
        required("description", &payload.description)?;
        required("contact", &payload.contact)
    }

    fn bind_insert<'q>(q: SqliteQuery<'q>, payload: &Self::Create) -> SqliteQuery<'q> {
        q.bind(payload.title.clone())
            .bind(payload.company.clone())
            .bind(payload.location.clone())
            .bind(payload.kind.clone())
            .bind(payload.salary.clone())
            .bind(payload.description.clone())
            .bind(payload.contact.clone())
    }

    fn push_updates<'qb, 'args>(
        patch: &Self::Patch,
        sep: &mut Separated<'qb, 'args, Sqlite, &'static str>,
    ) -> usize {
        let mut n = 0;
        set_col(sep, &mut n, "title", &patch.title);
        set_col(sep, &mut n, "company", &patch.company);
        set_col(sep, &mut n, "location", &patch.location);
        set_col(sep, &mut n, "type", &patch.kind);
        set_col(sep, &mut n, "salary", &patch.salary);
        set_col(sep, &mut n, "description", &patch.description);
        set_col(sep, &mut n, "contact", &patch.contact);
        set_col(sep, &mut n, "approved", &patch.approved);
        n
    }
}

// -------------------------------------------------------------------- posts

pub struct Post;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostRow {
    pub id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub likes: i64,
    pub comments: i64,
    pub approved: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct PostCreate {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostPatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub approved: Option<bool>,
}

impl ListingKind for Post {
    const TABLE: &'static str = "posts";
    const INSERT_SQL: &'static str =
        "INSERT INTO posts (id, type, title, content, author) VALUES (?, ?, ?, ?, ?)";

    type Row = PostRow;
    type Create = PostCreate;
    type Patch = PostPatch;

    fn validate(payload: &Self::Create) -> Result<(), ApiError> {
        required("type", &payload.kind)?;
        required("title", &payload.title)?;
        required("content", &payload.content)?;
        required("author", &payload.author)
    }

    fn bind_insert<'q>(q: SqliteQuery<'q>, payload: &Self::Create) -> SqliteQuery<'q> {
        q.bind(payload.kind.clone())
            .bind(payload.title.clone())
            .bind(payload.content.clone())
            .bind(payload.author.clone())
    }

    fn push_updates<'qb, 'args>(
        patch: &Self::Patch,
        sep: &mut Separated<'qb, 'args, Sqlite, &'static str>,
    ) -> usize {
        let mut n = 0;
        set_col(sep, &mut n, "type", &patch.kind);
        set_col(sep, &mut n, "title", &patch.title);
        set_col(sep, &mut n, "content", &patch.content);
        set_col(sep, &mut n, "author", &patch.author);
        set_col(sep, &mut n, "likes", &patch.likes);
        set_col(sep, &mut n, "comments", &patch.comments);
        set_col(sep, &mut n, "approved", &patch.approved);
        n
    }
}

// -------------------------------------------------------------- marketplace

pub struct MarketplaceItem;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketplaceItemRow {
    pub id: String,
    pub title: String,
    pub price: String,
    pub category: String,
    pub condition: String,
    pub location: String,
    pub description: String,
    pub seller: String,
    pub contact: String,
    pub emoji: String,
    pub approved: bool,
    pub sold: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct MarketplaceItemCreate {
    pub title: String,
    pub price: String,
    pub category: String,
    pub condition: String,
    pub location: String,
    pub description: String,
    pub seller: String,
    pub contact: String,
    pub emoji: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketplaceItemPatch {
    pub title: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub seller: Option<String>,
    pub contact: Option<String>,
    pub emoji: Option<String>,
    pub approved: Option<bool>,
    pub sold: Option<bool>,
}

impl ListingKind for MarketplaceItem {
    const TABLE: &'static str = "marketplace_items";
    // Sold items drop out of the public feed alongside unapproved ones.
    const PUBLIC_FILTER: &'static str = "approved = 1 AND sold = 0";
    const INSERT_SQL: &'static str = "INSERT INTO marketplace_items \
        (id, title, price, category, condition, location, description, seller, contact, emoji) \
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

    type Row = MarketplaceItemRow;
    type Create = MarketplaceItemCreate;
    type Patch = MarketplaceItemPatch;

    fn validate(payload: &Self::Create) -> Result<(), ApiError> {
        required("title", &payload.title)?;
        required("price", &payload.price)?;
        required("category", &payload.category)?;
        required("condition", &payload.condition)?;
        required("location", &payload.location)?;
        required("description", &payload.description)?;
        required("seller", &payload.seller)?;
        required("contact", &payload.contact)
    }

    fn bind_insert<'q>(q: SqliteQuery<'q>, payload: &Self::Create) -> SqliteQuery<'q> {
        q.bind(payload.title.clone())
            .bind(payload.price.clone())
            .bind(payload.category.clone())
            .bind(payload.condition.clone())
            .bind(payload.location.clone())
            .bind(payload.description.clone())
            .bind(payload.seller.clone())
            .bind(payload.contact.clone())
            .bind(payload.emoji.clone().unwrap_or_else(|| "📦".into()))
    }

    fn push_updates<'qb, 'args>(
        patch: &Self::Patch,
        sep: &mut Separated<'qb, 'args, Sqlite, &'static str>,
    ) -> usize {
        let mut n = 0;
        set_col(sep, &mut n, "title", &patch.title);
        set_col(sep, &mut n, "price", &patch.price);
        set_col(sep, &mut n, "category", &patch.category);
        set_col(sep, &mut n, "condition", &patch.condition);
        set_col(sep, &mut n, "location", &patch.location);
        set_col(sep, &mut n, "description", &patch.description);
        set_col(sep, &mut n, "seller", &patch.seller);
        set_col(sep, &mut n, "contact", &patch.contact);
        set_col(sep, &mut n, "emoji", &patch.emoji);
        set_col(sep, &mut n, "approved", &patch.approved);
        set_col(sep, &mut n, "sold", &patch.sold);
        n
    }
}
