//! In-memory Fyyur storage
//!
//! Mirrors the Postgres schema: genres are get-or-created by name and
//! deleting a venue drops its shows.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::repos::{DbError, FyyurRepo};
use crate::models::fyyur::name_matches;
use crate::models::{
    Artist, ArtistDraft, Genre, Show, ShowDraft, ShowListing, Summary, Venue, VenueDraft,
};

#[derive(Default)]
struct Tables {
    venues: BTreeMap<i32, Venue>,
    artists: BTreeMap<i32, Artist>,
    shows: BTreeMap<i32, Show>,
    genres: Vec<Genre>,
    last_venue_id: i32,
    last_artist_id: i32,
    last_show_id: i32,
}

impl Tables {
    /// Get-or-create each genre by exact name, returning names sorted
    fn intern_genres(&mut self, names: &[String]) -> Vec<String> {
        for name in names {
            if !self.genres.iter().any(|g| &g.name == name) {
                let id = self.genres.len() as i32 + 1;
                self.genres.push(Genre {
                    id,
                    name: name.clone(),
                });
            }
        }
        let mut sorted = names.to_vec();
        sorted.sort();
        sorted.dedup();
        sorted
    }

    fn upcoming_for(&self, now: DateTime<Utc>, matches: impl Fn(&Show) -> bool) -> i64 {
        self.shows
            .values()
            .filter(|s| matches(s) && s.start_time > now)
            .count() as i64
    }

    fn listing(&self, show: &Show) -> Option<ShowListing> {
        let venue = self.venues.get(&show.venue_id)?;
        let artist = self.artists.get(&show.artist_id)?;
        Some(ShowListing {
            id: show.id,
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            venue_image_link: venue.image_link.clone(),
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: artist.image_link.clone(),
            start_time: show.start_time,
        })
    }

    fn listings(&self, keep: impl Fn(&Show) -> bool) -> Vec<ShowListing> {
        let mut shows: Vec<ShowListing> = self
            .shows
            .values()
            .filter(|s| keep(s))
            .filter_map(|s| self.listing(s))
            .collect();
        shows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        shows
    }
}

/// In-memory Fyyur storage for development and tests
#[derive(Default)]
pub struct MemoryFyyurRepo {
    tables: RwLock<Tables>,
}

impl MemoryFyyurRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn venue_from_draft(id: i32, draft: &VenueDraft, genres: Vec<String>) -> Venue {
    Venue {
        id,
        name: draft.name.clone(),
        city: draft.city.clone(),
        state: draft.state.clone(),
        address: draft.address.clone(),
        phone: draft.phone.clone(),
        image_link: draft.image_link.clone(),
        facebook_link: draft.facebook_link.clone(),
        website: draft.website.clone(),
        seeking_talent: draft.seeking_talent,
        seeking_description: draft.seeking_description.clone(),
        genres,
    }
}

fn artist_from_draft(id: i32, draft: &ArtistDraft, genres: Vec<String>) -> Artist {
    Artist {
        id,
        name: draft.name.clone(),
        city: draft.city.clone(),
        state: draft.state.clone(),
        phone: draft.phone.clone(),
        image_link: draft.image_link.clone(),
        facebook_link: draft.facebook_link.clone(),
        website: draft.website.clone(),
        seeking_venue: draft.seeking_venue,
        seeking_description: draft.seeking_description.clone(),
        genres,
    }
}

#[async_trait]
impl FyyurRepo for MemoryFyyurRepo {
    async fn venue_summaries(
        &self,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Summary>, DbError> {
        let tables = self.tables.read().await;
        let mut summaries: Vec<Summary> = tables
            .venues
            .values()
            .filter(|v| search.map_or(true, |term| name_matches(&v.name, term)))
            .map(|v| Summary {
                id: v.id,
                name: v.name.clone(),
                city: v.city.clone(),
                state: v.state.clone(),
                num_upcoming_shows: tables.upcoming_for(now, |s| s.venue_id == v.id),
            })
            .collect();
        summaries.sort_by(|a, b| {
            (&a.state, &a.city, &a.name).cmp(&(&b.state, &b.city, &b.name))
        });
        Ok(summaries)
    }

    async fn get_venue(&self, id: i32) -> Result<Venue, DbError> {
        self.tables
            .read()
            .await
            .venues
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("venue", id))
    }

    async fn create_venue(&self, draft: &VenueDraft) -> Result<Venue, DbError> {
        let mut tables = self.tables.write().await;
        tables.last_venue_id += 1;
        let id = tables.last_venue_id;
        let genres = tables.intern_genres(&draft.genres);
        let venue = venue_from_draft(id, draft, genres);
        tables.venues.insert(id, venue.clone());

        debug!(venue_id = id, "created venue");
        Ok(venue)
    }

    async fn update_venue(&self, id: i32, draft: &VenueDraft) -> Result<Venue, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.venues.contains_key(&id) {
            return Err(DbError::not_found("venue", id));
        }
        let genres = tables.intern_genres(&draft.genres);
        let venue = venue_from_draft(id, draft, genres);
        tables.venues.insert(id, venue.clone());
        Ok(venue)
    }

    async fn delete_venue(&self, id: i32) -> Result<Venue, DbError> {
        let mut tables = self.tables.write().await;
        let venue = tables
            .venues
            .remove(&id)
            .ok_or_else(|| DbError::not_found("venue", id))?;
        tables.shows.retain(|_, s| s.venue_id != id);
        Ok(venue)
    }

    async fn artist_summaries(
        &self,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Summary>, DbError> {
        let tables = self.tables.read().await;
        let mut summaries: Vec<Summary> = tables
            .artists
            .values()
            .filter(|a| search.map_or(true, |term| name_matches(&a.name, term)))
            .map(|a| Summary {
                id: a.id,
                name: a.name.clone(),
                city: a.city.clone(),
                state: a.state.clone(),
                num_upcoming_shows: tables.upcoming_for(now, |s| s.artist_id == a.id),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    async fn get_artist(&self, id: i32) -> Result<Artist, DbError> {
        self.tables
            .read()
            .await
            .artists
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("artist", id))
    }

    async fn create_artist(&self, draft: &ArtistDraft) -> Result<Artist, DbError> {
        let mut tables = self.tables.write().await;
        tables.last_artist_id += 1;
        let id = tables.last_artist_id;
        let genres = tables.intern_genres(&draft.genres);
        let artist = artist_from_draft(id, draft, genres);
        tables.artists.insert(id, artist.clone());

        debug!(artist_id = id, "created artist");
        Ok(artist)
    }

    async fn update_artist(&self, id: i32, draft: &ArtistDraft) -> Result<Artist, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.artists.contains_key(&id) {
            return Err(DbError::not_found("artist", id));
        }
        let genres = tables.intern_genres(&draft.genres);
        let artist = artist_from_draft(id, draft, genres);
        tables.artists.insert(id, artist.clone());
        Ok(artist)
    }

    async fn list_shows(&self) -> Result<Vec<ShowListing>, DbError> {
        Ok(self.tables.read().await.listings(|_| true))
    }

    async fn shows_for_venue(&self, venue_id: i32) -> Result<Vec<ShowListing>, DbError> {
        Ok(self
            .tables
            .read()
            .await
            .listings(|s| s.venue_id == venue_id))
    }

    async fn shows_for_artist(&self, artist_id: i32) -> Result<Vec<ShowListing>, DbError> {
        Ok(self
            .tables
            .read()
            .await
            .listings(|s| s.artist_id == artist_id))
    }

    async fn create_show(&self, draft: &ShowDraft) -> Result<Show, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.venues.contains_key(&draft.venue_id) {
            return Err(DbError::not_found("venue", draft.venue_id));
        }
        if !tables.artists.contains_key(&draft.artist_id) {
            return Err(DbError::not_found("artist", draft.artist_id));
        }

        tables.last_show_id += 1;
        let show = Show {
            id: tables.last_show_id,
            venue_id: draft.venue_id,
            artist_id: draft.artist_id,
            start_time: draft.start_time,
        };
        tables.shows.insert(show.id, show.clone());
        Ok(show)
    }
}
