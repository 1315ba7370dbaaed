//! Fyyur records: venues, artists, genres and the shows joining them
//!
//! Whether a show is upcoming is never stored; it is decided by comparing
//! `start_time` with the clock when the page is built.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::datetime::parse_start_time;
use super::validation::{optional, required};
use super::{FormData, ValidationError};

const MAX_TEXT_LEN: usize = 120;
const MAX_LINK_LEN: usize = 500;

/// Genres offered by the venue and artist forms
pub const GENRE_CHOICES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

/// State choices for the venue and artist forms
pub const STATE_CHOICES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Show {
    pub id: i32,
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: DateTime<Utc>,
}

/// A show joined with the display fields of both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ShowListing {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
}

impl ShowListing {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }
}

/// Venue or artist name with its upcoming show count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Summary {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub num_upcoming_shows: i64,
}

/// Venues sharing a city and state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<Summary>,
}

/// Group venue summaries by (city, state), keeping first-seen order.
pub fn group_by_area(summaries: Vec<Summary>) -> Vec<Area> {
    let mut areas: Vec<Area> = Vec::new();
    for summary in summaries {
        match areas
            .iter_mut()
            .find(|a| a.city == summary.city && a.state == summary.state)
        {
            Some(area) => area.venues.push(summary),
            None => areas.push(Area {
                city: summary.city.clone(),
                state: summary.state.clone(),
                venues: vec![summary],
            }),
        }
    }
    areas
}

/// Split shows into `(past, upcoming)` relative to `now`.
pub fn split_shows(
    shows: Vec<ShowListing>,
    now: DateTime<Utc>,
) -> (Vec<ShowListing>, Vec<ShowListing>) {
    shows.into_iter().partition(|show| !show.is_upcoming(now))
}

/// Case-insensitive substring match used by both search backends
pub fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.trim().to_lowercase())
}

/// Validated venue form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueDraft {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

impl VenueDraft {
    pub fn from_form(form: &FormData) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required("name", form.text("name"), MAX_TEXT_LEN)?,
            city: required("city", form.text("city"), MAX_TEXT_LEN)?,
            state: state_choice(form.text("state"))?,
            address: required("address", form.text("address"), MAX_TEXT_LEN)?,
            phone: optional("phone", form.get("phone"), MAX_TEXT_LEN)?,
            image_link: optional("image_link", form.get("image_link"), MAX_LINK_LEN)?,
            facebook_link: link("facebook_link", form.get("facebook_link"))?,
            website: link("website", form.get("website"))?,
            seeking_talent: form.flag("seeking_talent"),
            seeking_description: optional(
                "seeking_description",
                form.get("seeking_description"),
                MAX_LINK_LEN,
            )?,
            genres: genres(form),
        })
    }
}

#[cfg(test)]
impl From<&Venue> for VenueDraft {
    fn from(v: &Venue) -> Self {
        Self {
            name: v.name.clone(),
            city: v.city.clone(),
            state: v.state.clone(),
            address: v.address.clone(),
            phone: v.phone.clone(),
            image_link: v.image_link.clone(),
            facebook_link: v.facebook_link.clone(),
            website: v.website.clone(),
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description.clone(),
            genres: v.genres.clone(),
        }
    }
}

/// Validated artist form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistDraft {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub genres: Vec<String>,
}

impl ArtistDraft {
    pub fn from_form(form: &FormData) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required("name", form.text("name"), MAX_TEXT_LEN)?,
            city: required("city", form.text("city"), MAX_TEXT_LEN)?,
            state: state_choice(form.text("state"))?,
            phone: optional("phone", form.get("phone"), MAX_TEXT_LEN)?,
            image_link: optional("image_link", form.get("image_link"), MAX_LINK_LEN)?,
            facebook_link: link("facebook_link", form.get("facebook_link"))?,
            website: link("website", form.get("website"))?,
            seeking_venue: form.flag("seeking_venue"),
            seeking_description: optional(
                "seeking_description",
                form.get("seeking_description"),
                MAX_LINK_LEN,
            )?,
            genres: genres(form),
        })
    }
}

/// Validated show form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowDraft {
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: DateTime<Utc>,
}

impl ShowDraft {
    pub fn from_form(form: &FormData) -> Result<Self, ValidationError> {
        Ok(Self {
            artist_id: id_field("artist_id", form.text("artist_id"))?,
            venue_id: id_field("venue_id", form.text("venue_id"))?,
            start_time: parse_start_time(form.text("start_time"))?,
        })
    }
}

fn state_choice(value: &str) -> Result<String, ValidationError> {
    let state = required("state", value, 2)?.to_ascii_uppercase();
    if STATE_CHOICES.contains(&state.as_str()) {
        Ok(state)
    } else {
        Err(ValidationError::InvalidFormat {
            field: "state",
            reason: "not a valid choice",
        })
    }
}

fn link(field: &'static str, value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let value = optional(field, value, MAX_LINK_LEN)?;
    match value {
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(ValidationError::InvalidFormat {
                field,
                reason: "must be an http(s) URL",
            })
        }
        other => Ok(other),
    }
}

fn id_field(field: &'static str, value: &str) -> Result<i32, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    value.parse().map_err(|_| ValidationError::InvalidFormat {
        field,
        reason: "must be a numeric id",
    })
}

/// Submitted genres, de-duplicated in submission order
fn genres(form: &FormData) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for genre in form.all("genres") {
        if !genres.iter().any(|g| g.eq_ignore_ascii_case(&genre)) {
            genres.push(genre);
        }
    }
    genres
}
