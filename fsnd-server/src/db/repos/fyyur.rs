//! Fyyur repository on Postgres
//!
//! - summaries: LEFT JOIN on shows with a filtered COUNT (no N+1)
//! - create/update: record + genre links in one transaction
//! - genres: get-or-create by name via ON CONFLICT

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::{like_pattern, DbError, FyyurRepo};
use crate::models::{
    Artist, ArtistDraft, Show, ShowDraft, ShowListing, Summary, Venue, VenueDraft,
};

const SHOW_LISTING_SELECT: &str = r#"
    SELECT
        s.id,
        s.venue_id,
        v.name AS venue_name,
        v.image_link AS venue_image_link,
        s.artist_id,
        a.name AS artist_name,
        a.image_link AS artist_image_link,
        s.start_time
    FROM shows s
    JOIN venues v ON v.id = s.venue_id
    JOIN artists a ON a.id = s.artist_id
"#;

/// Which link table a set of genres belongs to
#[derive(Debug, Clone, Copy)]
enum GenreOwner {
    Venue,
    Artist,
}

impl GenreOwner {
    fn delete_sql(self) -> &'static str {
        match self {
            Self::Venue => "DELETE FROM venue_genres WHERE venue_id = $1",
            Self::Artist => "DELETE FROM artist_genres WHERE artist_id = $1",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Self::Venue => {
                "INSERT INTO venue_genres (venue_id, genre_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            }
            Self::Artist => {
                "INSERT INTO artist_genres (artist_id, genre_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            }
        }
    }
}

/// Fyyur repository
#[derive(Clone)]
pub struct PgFyyurRepo {
    pool: PgPool,
}

impl PgFyyurRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace the genre links of one record inside `tx`.
    async fn link_genres(
        tx: &mut Transaction<'_, Postgres>,
        owner: GenreOwner,
        owner_id: i32,
        genres: &[String],
    ) -> Result<(), DbError> {
        sqlx::query(owner.delete_sql())
            .bind(owner_id)
            .execute(&mut **tx)
            .await?;

        for name in genres {
            let (genre_id,): (i32,) = sqlx::query_as(
                r#"
                INSERT INTO genres (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;

            sqlx::query(owner.insert_sql())
                .bind(owner_id)
                .bind(genre_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn shows_where(&self, clause: &str, id: i32) -> Result<Vec<ShowListing>, DbError> {
        let sql = format!("{SHOW_LISTING_SELECT} WHERE {clause} ORDER BY s.start_time");
        let shows = sqlx::query_as::<_, ShowListing>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(shows)
    }
}

#[async_trait]
impl FyyurRepo for PgFyyurRepo {
    async fn venue_summaries(
        &self,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Summary>, DbError> {
        let rows = sqlx::query_as::<_, Summary>(
            r#"
            SELECT
                v.id,
                v.name,
                v.city,
                v.state,
                COUNT(s.id) FILTER (WHERE s.start_time > $1) AS num_upcoming_shows
            FROM venues v
            LEFT JOIN shows s ON s.venue_id = v.id
            WHERE $2::text IS NULL OR v.name ILIKE $2
            GROUP BY v.id
            ORDER BY v.state, v.city, v.name
            "#,
        )
        .bind(now)
        .bind(search.map(like_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_venue(&self, id: i32) -> Result<Venue, DbError> {
        sqlx::query_as::<_, Venue>(
            r#"
            SELECT
                v.id, v.name, v.city, v.state, v.address, v.phone,
                v.image_link, v.facebook_link, v.website,
                v.seeking_talent, v.seeking_description,
                COALESCE(
                    ARRAY_AGG(g.name::text ORDER BY g.name) FILTER (WHERE g.name IS NOT NULL),
                    '{}'::text[]
                ) AS genres
            FROM venues v
            LEFT JOIN venue_genres vg ON vg.venue_id = v.id
            LEFT JOIN genres g ON g.id = vg.genre_id
            WHERE v.id = $1
            GROUP BY v.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("venue", id))
    }

    async fn create_venue(&self, draft: &VenueDraft) -> Result<Venue, DbError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO venues (
                name, city, state, address, phone, image_link,
                facebook_link, website, seeking_talent, seeking_description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(&draft.address)
        .bind(&draft.phone)
        .bind(&draft.image_link)
        .bind(&draft.facebook_link)
        .bind(&draft.website)
        .bind(draft.seeking_talent)
        .bind(&draft.seeking_description)
        .fetch_one(&mut *tx)
        .await?;

        Self::link_genres(&mut tx, GenreOwner::Venue, id, &draft.genres).await?;
        tx.commit().await?;

        tracing::debug!(venue_id = id, "created venue");
        self.get_venue(id).await
    }

    async fn update_venue(&self, id: i32, draft: &VenueDraft) -> Result<Venue, DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_as::<_, (i32,)>(
            r#"
            UPDATE venues SET
                name = $2, city = $3, state = $4, address = $5, phone = $6,
                image_link = $7, facebook_link = $8, website = $9,
                seeking_talent = $10, seeking_description = $11
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(&draft.address)
        .bind(&draft.phone)
        .bind(&draft.image_link)
        .bind(&draft.facebook_link)
        .bind(&draft.website)
        .bind(draft.seeking_talent)
        .bind(&draft.seeking_description)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("venue", id))?;

        Self::link_genres(&mut tx, GenreOwner::Venue, id, &draft.genres).await?;
        tx.commit().await?;

        self.get_venue(id).await
    }

    async fn delete_venue(&self, id: i32) -> Result<Venue, DbError> {
        let venue = self.get_venue(id).await?;

        // shows and venue_genres go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("venue", id));
        }

        Ok(venue)
    }

    async fn artist_summaries(
        &self,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Summary>, DbError> {
        let rows = sqlx::query_as::<_, Summary>(
            r#"
            SELECT
                a.id,
                a.name,
                a.city,
                a.state,
                COUNT(s.id) FILTER (WHERE s.start_time > $1) AS num_upcoming_shows
            FROM artists a
            LEFT JOIN shows s ON s.artist_id = a.id
            WHERE $2::text IS NULL OR a.name ILIKE $2
            GROUP BY a.id
            ORDER BY a.name, a.id
            "#,
        )
        .bind(now)
        .bind(search.map(like_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_artist(&self, id: i32) -> Result<Artist, DbError> {
        sqlx::query_as::<_, Artist>(
            r#"
            SELECT
                a.id, a.name, a.city, a.state, a.phone,
                a.image_link, a.facebook_link, a.website,
                a.seeking_venue, a.seeking_description,
                COALESCE(
                    ARRAY_AGG(g.name::text ORDER BY g.name) FILTER (WHERE g.name IS NOT NULL),
                    '{}'::text[]
                ) AS genres
            FROM artists a
            LEFT JOIN artist_genres ag ON ag.artist_id = a.id
            LEFT JOIN genres g ON g.id = ag.genre_id
            WHERE a.id = $1
            GROUP BY a.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("artist", id))
    }

    async fn create_artist(&self, draft: &ArtistDraft) -> Result<Artist, DbError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO artists (
                name, city, state, phone, image_link,
                facebook_link, website, seeking_venue, seeking_description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(&draft.phone)
        .bind(&draft.image_link)
        .bind(&draft.facebook_link)
        .bind(&draft.website)
        .bind(draft.seeking_venue)
        .bind(&draft.seeking_description)
        .fetch_one(&mut *tx)
        .await?;

        Self::link_genres(&mut tx, GenreOwner::Artist, id, &draft.genres).await?;
        tx.commit().await?;

        tracing::debug!(artist_id = id, "created artist");
        self.get_artist(id).await
    }

    async fn update_artist(&self, id: i32, draft: &ArtistDraft) -> Result<Artist, DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_as::<_, (i32,)>(
            r#"
            UPDATE artists SET
                name = $2, city = $3, state = $4, phone = $5,
                image_link = $6, facebook_link = $7, website = $8,
                seeking_venue = $9, seeking_description = $10
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.city)
        .bind(&draft.state)
        .bind(&draft.phone)
        .bind(&draft.image_link)
        .bind(&draft.facebook_link)
        .bind(&draft.website)
        .bind(draft.seeking_venue)
        .bind(&draft.seeking_description)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("artist", id))?;

        Self::link_genres(&mut tx, GenreOwner::Artist, id, &draft.genres).await?;
        tx.commit().await?;

        self.get_artist(id).await
    }

    async fn list_shows(&self) -> Result<Vec<ShowListing>, DbError> {
        let sql = format!("{SHOW_LISTING_SELECT} ORDER BY s.start_time, s.id");
        let shows = sqlx::query_as::<_, ShowListing>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(shows)
    }

    async fn shows_for_venue(&self, venue_id: i32) -> Result<Vec<ShowListing>, DbError> {
        self.shows_where("s.venue_id = $1", venue_id).await
    }

    async fn shows_for_artist(&self, artist_id: i32) -> Result<Vec<ShowListing>, DbError> {
        self.shows_where("s.artist_id = $1", artist_id).await
    }

    async fn create_show(&self, draft: &ShowDraft) -> Result<Show, DbError> {
        let mut tx = self.pool.begin().await?;

        let (venue_exists, artist_exists): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM venues WHERE id = $1),
                EXISTS(SELECT 1 FROM artists WHERE id = $2)
            "#,
        )
        .bind(draft.venue_id)
        .bind(draft.artist_id)
        .fetch_one(&mut *tx)
        .await?;

        if !venue_exists {
            return Err(DbError::not_found("venue", draft.venue_id));
        }
        if !artist_exists {
            return Err(DbError::not_found("artist", draft.artist_id));
        }

        let show: Show = sqlx::query_as(
            r#"
            INSERT INTO shows (venue_id, artist_id, start_time)
            VALUES ($1, $2, $3)
            RETURNING id, venue_id, artist_id, start_time
            "#,
        )
        .bind(draft.venue_id)
        .bind(draft.artist_id)
        .bind(draft.start_time)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(show)
    }
}
