//! Schema migrations for both applications
//!
//! Every statement is idempotent, so `run` can be called at each startup.

use sqlx::PgPool;

use crate::models::trivia::DEFAULT_CATEGORIES;

const FYYUR_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS genres (
        id SERIAL PRIMARY KEY,
        name VARCHAR(120) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS venues (
        id SERIAL PRIMARY KEY,
        name VARCHAR(120) NOT NULL,
        city VARCHAR(120) NOT NULL,
        state VARCHAR(120) NOT NULL,
        address VARCHAR(120) NOT NULL,
        phone VARCHAR(120),
        image_link VARCHAR(500),
        facebook_link VARCHAR(500),
        website VARCHAR(500),
        seeking_talent BOOLEAN NOT NULL DEFAULT FALSE,
        seeking_description VARCHAR(500)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS venue_genres (
        venue_id INTEGER NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
        genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
        PRIMARY KEY (venue_id, genre_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artists (
        id SERIAL PRIMARY KEY,
        name VARCHAR(120) NOT NULL,
        city VARCHAR(120) NOT NULL,
        state VARCHAR(120) NOT NULL,
        phone VARCHAR(120),
        image_link VARCHAR(500),
        facebook_link VARCHAR(500),
        website VARCHAR(500),
        seeking_venue BOOLEAN NOT NULL DEFAULT FALSE,
        seeking_description VARCHAR(500)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS artist_genres (
        artist_id INTEGER NOT NULL REFERENCES artists(id) ON DELETE CASCADE,
        genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
        PRIMARY KEY (artist_id, genre_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shows (
        id SERIAL PRIMARY KEY,
        venue_id INTEGER NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
        artist_id INTEGER NOT NULL REFERENCES artists(id) ON DELETE CASCADE,
        start_time TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS shows_venue_id_idx ON shows (venue_id, start_time)",
    "CREATE INDEX IF NOT EXISTS shows_artist_id_idx ON shows (artist_id, start_time)",
];

const TRIVIA_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id SERIAL PRIMARY KEY,
        type TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questions (
        id SERIAL PRIMARY KEY,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        category INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 5)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS questions_category_idx ON questions (category)",
];

/// Create the Fyyur tables
pub async fn run_fyyur(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running Fyyur migrations...");
    for statement in FYYUR_SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Create the Trivia tables and seed the default categories
pub async fn run_trivia(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running Trivia migrations...");
    for statement in TRIVIA_SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    let mut seeded = 0;
    for kind in DEFAULT_CATEGORIES {
        seeded += sqlx::query("INSERT INTO categories (type) VALUES ($1) ON CONFLICT (type) DO NOTHING")
            .bind(*kind)
            .execute(pool)
            .await?
            .rows_affected();
    }
    if seeded > 0 {
        tracing::info!(seeded, "Seeded trivia categories");
    }
    Ok(())
}

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    run_fyyur(pool).await?;
    run_trivia(pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependent_tables_come_after_their_parents() {
        let position = |schema: &[&str], table: &str| {
            schema
                .iter()
                .position(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {} ", table)))
                .unwrap_or_else(|| panic!("missing table {table}"))
        };

        assert!(position(FYYUR_SCHEMA, "genres") < position(FYYUR_SCHEMA, "venue_genres"));
        assert!(position(FYYUR_SCHEMA, "venues") < position(FYYUR_SCHEMA, "shows"));
        assert!(position(FYYUR_SCHEMA, "artists") < position(FYYUR_SCHEMA, "shows"));
        assert!(position(TRIVIA_SCHEMA, "categories") < position(TRIVIA_SCHEMA, "questions"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");

        run(&pool).await.expect("first run");
        run(&pool).await.expect("second run");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert!(count >= DEFAULT_CATEGORIES.len() as i64);
    }
}
