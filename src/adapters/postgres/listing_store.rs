//! PostgreSQL implementation of the listing store.
//!
//! The `identity_key` column carries the digit-only phone projection and is
//! written in the same transaction as every insert and update; identity
//! lookups hit its index instead of scanning the table. The corpus revision
//! row is bumped alongside each write.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::foundation::{DomainError, ListingId};
use crate::domain::listing::{self, Listing, NewListing, CREATED_AT_FORMAT};
use crate::domain::spelling::CorpusSeed;
use crate::ports::{ListingStore, UpdateTarget};

const LISTING_COLUMNS: &str = "id, name, address, website, phone_number, reviews_count, \
                               reviews_average, category, subcategory, city, state, area, \
                               created_at";

/// PostgreSQL implementation of [`ListingStore`].
#[derive(Clone)]
pub struct PostgresListingStore {
    pool: PgPool,
}

impl PostgresListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage_err(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::storage(format!("{}: {}", context, e))
}

fn row_to_listing(row: &PgRow) -> Result<Listing, sqlx::Error> {
    Ok(Listing {
        id: ListingId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        website: row.try_get("website")?,
        phone_number: row.try_get("phone_number")?,
        reviews_count: row.try_get("reviews_count")?,
        reviews_average: row.try_get("reviews_average")?,
        category: row.try_get("category")?,
        subcategory: row.try_get("subcategory")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        area: row.try_get("area")?,
        created_at: row.try_get("created_at")?,
    })
}

fn contains_pattern(term: &str) -> String {
    format!("%{}%", term.to_lowercase())
}

async fn bump_revision(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE corpus_revision SET revision = revision + 1 WHERE id")
        .execute(&mut **tx)
        .await?;
    Ok(())
}

impl PostgresListingStore {
    async fn search_rows(
        &self,
        sql: &str,
        binds: &[String],
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError> {
        let mut query = sqlx::query(sql);
        for bind in binds {
            query = query.bind(bind);
        }
        query = query.bind(limit as i64);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err("search failed"))?;

        rows.iter()
            .map(|row| row_to_listing(row).map_err(|e| DomainError::storage(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl ListingStore for PostgresListingStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Vec<Listing>, DomainError> {
        if identity.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM listings WHERE identity_key = $1 \
             ORDER BY created_at DESC, id ASC",
            LISTING_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(identity)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err("identity lookup failed"))?;

        rows.iter()
            .map(|row| row_to_listing(row).map_err(|e| DomainError::storage(e.to_string())))
            .collect()
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, DomainError> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err("id lookup failed"))?;

        row.as_ref()
            .map(|r| row_to_listing(r).map_err(|e| DomainError::storage(e.to_string())))
            .transpose()
    }

    async fn insert(&self, new_listing: NewListing) -> Result<Option<ListingId>, DomainError> {
        let identity = new_listing.identity_key();
        let created_at = Utc::now().format(CREATED_AT_FORMAT).to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_err("failed to start transaction"))?;

        // Idempotency on the name+address+area+city+state+identity tuple.
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM listings \
             WHERE LOWER(name) = LOWER($1) \
               AND LOWER(address) = LOWER($2) \
               AND LOWER(area) = LOWER($3) \
               AND LOWER(city) = LOWER($4) \
               AND LOWER(state) = LOWER($5) \
               AND identity_key = $6 \
             ORDER BY id DESC \
             LIMIT 1",
        )
        .bind(&new_listing.name)
        .bind(&new_listing.address)
        .bind(&new_listing.area)
        .bind(&new_listing.city)
        .bind(&new_listing.state)
        .bind(&identity)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_err("duplicate check failed"))?;

        if let Some(existing_id) = existing {
            tx.commit()
                .await
                .map_err(storage_err("failed to commit transaction"))?;
            return Ok(Some(ListingId::new(existing_id)));
        }

        let new_id: i64 = sqlx::query_scalar(
            "INSERT INTO listings \
             (name, address, website, phone_number, identity_key, reviews_count, \
              reviews_average, category, subcategory, city, state, area, created_at) \
             VALUES ($1, $2, $3, $4, $5, 0, NULL, $6, $7, $8, $9, $10, $11) \
             RETURNING id",
        )
        .bind(&new_listing.name)
        .bind(&new_listing.address)
        .bind(&new_listing.website)
        .bind(&identity)
        .bind(&identity)
        .bind(&new_listing.category)
        .bind(&new_listing.subcategory)
        .bind(&new_listing.city)
        .bind(&new_listing.state)
        .bind(&new_listing.area)
        .bind(&created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_err("insert failed"))?;

        bump_revision(&mut tx)
            .await
            .map_err(storage_err("revision bump failed"))?;

        tx.commit()
            .await
            .map_err(storage_err("failed to commit transaction"))?;

        Ok(Some(ListingId::new(new_id)))
    }

    async fn update(
        &self,
        target: UpdateTarget,
        updates: &HashMap<String, String>,
    ) -> Result<bool, DomainError> {
        let filtered = listing::sanitize_updates(updates);
        if filtered.is_empty() {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_err("failed to start transaction"))?;

        let target_ids: Vec<i64> = match &target {
            UpdateTarget::ById(id) => sqlx::query_scalar("SELECT id FROM listings WHERE id = $1")
                .bind(id.as_i64())
                .fetch_all(&mut *tx)
                .await
                .map_err(storage_err("target lookup failed"))?,
            UpdateTarget::ByIdentity(identity) => {
                sqlx::query_scalar("SELECT id FROM listings WHERE identity_key = $1")
                    .bind(identity)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(storage_err("target lookup failed"))?
            }
        };

        if target_ids.is_empty() {
            return Ok(false);
        }

        // Assemble the SET clause from the sanitized allow-listed fields. A
        // phone change rewrites identity_key in the same statement.
        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        for (key, value) in &filtered {
            assignments.push(format!("{} = ${}", key, values.len() + 1));
            values.push(value.clone());
            if key == "phone_number" {
                assignments.push(format!("identity_key = ${}", values.len() + 1));
                values.push(value.clone());
            }
        }

        let id_placeholders: Vec<String> = (0..target_ids.len())
            .map(|i| format!("${}", values.len() + 1 + i))
            .collect();

        let sql = format!(
            "UPDATE listings SET {} WHERE id IN ({})",
            assignments.join(", "),
            id_placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for value in &values {
            query = query.bind(value);
        }
        for id in &target_ids {
            query = query.bind(id);
        }

        let result = query
            .execute(&mut *tx)
            .await
            .map_err(storage_err("update failed"))?;

        bump_revision(&mut tx)
            .await
            .map_err(storage_err("revision bump failed"))?;

        tx.commit()
            .await
            .map_err(storage_err("failed to commit transaction"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn search_keyword_location(
        &self,
        keyword: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError> {
        let sql = format!(
            "SELECT {} FROM listings \
             WHERE (LOWER(name) LIKE $1 OR LOWER(category) LIKE $1 OR LOWER(subcategory) LIKE $1) \
               AND (LOWER(city) LIKE $2 OR LOWER(address) LIKE $2) \
             ORDER BY reviews_average DESC NULLS LAST, reviews_count DESC \
             LIMIT $3",
            LISTING_COLUMNS
        );
        self.search_rows(
            &sql,
            &[contains_pattern(keyword), contains_pattern(location)],
            limit,
        )
        .await
    }

    async fn search_keyword(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError> {
        let sql = format!(
            "SELECT {} FROM listings \
             WHERE LOWER(name) LIKE $1 OR LOWER(category) LIKE $1 OR LOWER(subcategory) LIKE $1 \
             ORDER BY reviews_average DESC NULLS LAST, reviews_count DESC \
             LIMIT $2",
            LISTING_COLUMNS
        );
        self.search_rows(&sql, &[contains_pattern(keyword)], limit).await
    }

    async fn search_location(
        &self,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Listing>, DomainError> {
        let sql = format!(
            "SELECT {} FROM listings \
             WHERE LOWER(city) LIKE $1 OR LOWER(address) LIKE $1 \
             ORDER BY reviews_average DESC NULLS LAST, reviews_count DESC \
             LIMIT $2",
            LISTING_COLUMNS
        );
        self.search_rows(&sql, &[contains_pattern(location)], limit).await
    }

    async fn search_any(&self, query: &str, limit: usize) -> Result<Vec<Listing>, DomainError> {
        let sql = format!(
            "SELECT {} FROM listings \
             WHERE LOWER(name) LIKE $1 OR LOWER(category) LIKE $1 OR LOWER(city) LIKE $1 \
             ORDER BY reviews_average DESC NULLS LAST, reviews_count DESC \
             LIMIT $2",
            LISTING_COLUMNS
        );
        self.search_rows(&sql, &[contains_pattern(query)], limit).await
    }

    async fn corpus_version(&self) -> Result<u64, DomainError> {
        let revision: i64 = sqlx::query_scalar("SELECT revision FROM corpus_revision WHERE id")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err("revision read failed"))?;
        Ok(revision as u64)
    }

    async fn corpus_seed(&self) -> Result<CorpusSeed, DomainError> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM listings WHERE category IS NOT NULL AND category != ''",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("category seed failed"))?;

        let cities: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT city FROM listings WHERE city IS NOT NULL AND city != ''",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("city seed failed"))?;

        let names: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT name FROM listings WHERE name IS NOT NULL AND name != ''",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("name seed failed"))?;

        Ok(CorpusSeed {
            categories,
            cities,
            names,
        })
    }

    async fn suggested_categories(&self, limit: usize) -> Result<Vec<String>, DomainError> {
        sqlx::query_scalar(
            "SELECT DISTINCT category FROM listings \
             WHERE category IS NOT NULL AND category != '' \
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("category suggestions failed"))
    }
}
