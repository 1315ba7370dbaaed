//! Askama page templates and the view models they render
//!
//! Templates only see plain strings, numbers and booleans. Optional
//! fields become "" and datetimes are formatted up front.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::models::fyyur::{split_shows, GENRE_CHOICES, STATE_CHOICES};
use crate::models::{format_datetime, Area, Artist, DateFormat, ShowListing, Summary, Venue};

/// One `<option>` of a select input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

fn options(choices: &[&'static str], selected: &[String]) -> Vec<SelectOption> {
    choices
        .iter()
        .map(|&value| SelectOption {
            value,
            selected: selected.iter().any(|s| s == value),
        })
        .collect()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// A show as listed on the detail and shows pages
#[derive(Debug, Clone)]
pub struct ShowCard {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

impl From<ShowListing> for ShowCard {
    fn from(show: ShowListing) -> Self {
        Self {
            venue_id: show.venue_id,
            venue_name: show.venue_name,
            venue_image_link: text(&show.venue_image_link),
            artist_id: show.artist_id,
            artist_name: show.artist_name,
            artist_image_link: text(&show.artist_image_link),
            start_time: format_datetime(&show.start_time, DateFormat::Full),
        }
    }
}

/// Past and upcoming shows with their counts
#[derive(Debug, Clone, Default)]
pub struct ShowSplit {
    pub past_shows: Vec<ShowCard>,
    pub upcoming_shows: Vec<ShowCard>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl ShowSplit {
    pub fn new(shows: Vec<ShowListing>, now: DateTime<Utc>) -> Self {
        let (past, upcoming) = split_shows(shows, now);
        Self {
            past_shows_count: past.len(),
            upcoming_shows_count: upcoming.len(),
            past_shows: past.into_iter().map(ShowCard::from).collect(),
            upcoming_shows: upcoming.into_iter().map(ShowCard::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VenueView {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl From<Venue> for VenueView {
    fn from(v: Venue) -> Self {
        Self {
            id: v.id,
            phone: text(&v.phone),
            website: text(&v.website),
            facebook_link: text(&v.facebook_link),
            seeking_description: text(&v.seeking_description),
            image_link: text(&v.image_link),
            name: v.name,
            genres: v.genres,
            address: v.address,
            city: v.city,
            state: v.state,
            seeking_talent: v.seeking_talent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtistView {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl From<Artist> for ArtistView {
    fn from(a: Artist) -> Self {
        Self {
            id: a.id,
            phone: text(&a.phone),
            website: text(&a.website),
            facebook_link: text(&a.facebook_link),
            seeking_description: text(&a.seeking_description),
            image_link: text(&a.image_link),
            name: a.name,
            genres: a.genres,
            city: a.city,
            state: a.state,
            seeking_venue: a.seeking_venue,
        }
    }
}

/// Values for the venue and artist forms
///
/// `address` is only rendered by the venue form, `seeking` is
/// `seeking_talent` for venues and `seeking_venue` for artists.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub name: String,
    pub city: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    pub website: String,
    pub seeking: bool,
    pub seeking_description: String,
    pub states: Vec<SelectOption>,
    pub genres: Vec<SelectOption>,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            city: String::new(),
            address: String::new(),
            phone: String::new(),
            image_link: String::new(),
            facebook_link: String::new(),
            website: String::new(),
            seeking: false,
            seeking_description: String::new(),
            states: options(STATE_CHOICES, &[]),
            genres: options(GENRE_CHOICES, &[]),
        }
    }
}

impl From<&Venue> for ProfileForm {
    fn from(v: &Venue) -> Self {
        Self {
            name: v.name.clone(),
            city: v.city.clone(),
            address: v.address.clone(),
            phone: text(&v.phone),
            image_link: text(&v.image_link),
            facebook_link: text(&v.facebook_link),
            website: text(&v.website),
            seeking: v.seeking_talent,
            seeking_description: text(&v.seeking_description),
            states: options(STATE_CHOICES, std::slice::from_ref(&v.state)),
            genres: options(GENRE_CHOICES, &v.genres),
        }
    }
}

impl From<&Artist> for ProfileForm {
    fn from(a: &Artist) -> Self {
        Self {
            name: a.name.clone(),
            city: a.city.clone(),
            address: String::new(),
            phone: text(&a.phone),
            image_link: text(&a.image_link),
            facebook_link: text(&a.facebook_link),
            website: text(&a.website),
            seeking: a.seeking_venue,
            seeking_description: text(&a.seeking_description),
            states: options(STATE_CHOICES, std::slice::from_ref(&a.state)),
            genres: options(GENRE_CHOICES, &a.genres),
        }
    }
}

#[derive(Template, Default)]
#[template(path = "pages/home.html")]
pub struct HomePage {
    pub flash: String,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesPage {
    pub flash: String,
    pub areas: Vec<Area>,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsPage {
    pub flash: String,
    pub artists: Vec<Summary>,
}

/// Search results for venues or artists
#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchPage {
    pub flash: String,
    /// "venues" or "artists", used for the heading and links
    pub kind: &'static str,
    pub search_term: String,
    pub count: usize,
    pub results: Vec<Summary>,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct VenuePage {
    pub flash: String,
    pub venue: VenueView,
    pub shows: ShowSplit,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ArtistPage {
    pub flash: String,
    pub artist: ArtistView,
    pub shows: ShowSplit,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsPage {
    pub flash: String,
    pub shows: Vec<ShowCard>,
}

/// New or edit venue form
#[derive(Template)]
#[template(path = "forms/venue.html")]
pub struct VenueFormPage {
    pub flash: String,
    pub heading: String,
    pub action: String,
    pub form: ProfileForm,
}

/// New or edit artist form
#[derive(Template)]
#[template(path = "forms/artist.html")]
pub struct ArtistFormPage {
    pub flash: String,
    pub heading: String,
    pub action: String,
    pub form: ProfileForm,
}

#[derive(Template)]
#[template(path = "forms/new_show.html")]
pub struct ShowFormPage {
    pub flash: String,
    /// Prefilled start time, `YYYY-MM-DD HH:MM:SS`
    pub start_time: String,
}

#[derive(Template, Default)]
#[template(path = "errors/404.html")]
pub struct NotFoundPage {
    pub flash: String,
}

#[derive(Template, Default)]
#[template(path = "errors/500.html")]
pub struct ServerErrorPage {
    pub flash: String,
}
