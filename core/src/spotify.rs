use crate::auth::AuthError;
use crate::error::{EraError, Result};
use crate::library::MusicLibrary;
use crate::models::{Page, PageCursor, Playlist, PlaylistRef, TrackRef, UserRef};
use async_trait::async_trait;
use log::debug;
use rspotify::{
    model::{self, PlayableId, PlayableItem, PlaylistId, PlaylistItem, TrackId, UserId},
    http::HttpError,
    prelude::*,
    AuthCodeSpotify, ClientError,
};

// Spotify's maximum page sizes per endpoint.
const SAVED_TRACKS_LIMIT: u32 = 50;
const PLAYLISTS_LIMIT: u32 = 50;
const PLAYLIST_ITEMS_LIMIT: u32 = 100;

/// [`MusicLibrary`] backed by the Spotify Web API.
///
/// Cursors carry the offset of the next page.
pub struct SpotifyLibrary {
    spotify: AuthCodeSpotify,
}

impl SpotifyLibrary {
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        Self { spotify }
    }
}

fn offset_of(cursor: Option<&PageCursor>) -> Result<u32> {
    match cursor {
        None => Ok(0),
        Some(c) => c
            .as_str()
            .parse()
            .map_err(|_| EraError::Config(format!("invalid page cursor '{}'", c.as_str()))),
    }
}

fn next_cursor<T>(page: &model::Page<T>) -> Option<PageCursor> {
    // An empty page with a `next` link would loop forever.
    if page.next.is_none() || page.items.is_empty() {
        return None;
    }
    Some(PageCursor::new(
        (page.offset + page.items.len() as u32).to_string(),
    ))
}

fn http_status(err: &ClientError) -> Option<u16> {
    match err {
        ClientError::Http(http) => match http.as_ref() {
            HttpError::StatusCode(response) => Some(response.status().as_u16()),
            _ => None,
        },
        _ => None,
    }
}

/// Sorts a failed call on `target` into the error kinds callers act on.
fn classify(err: ClientError, target: &str) -> EraError {
    from_status(http_status(&err), err, target)
}

fn from_status(status: Option<u16>, err: ClientError, target: &str) -> EraError {
    match status {
        Some(404) => EraError::NotFound(target.to_string()),
        Some(401) => AuthError::SessionRejected(target.to_string()).into(),
        _ => EraError::Spotify(err),
    }
}

fn playlist_id(id: &str) -> Result<PlaylistId<'_>> {
    PlaylistId::from_id(id).map_err(|_| EraError::InvalidId(id.to_string()))
}

fn playable_ids(track_ids: &[String]) -> Result<Vec<PlayableId<'_>>> {
    track_ids
        .iter()
        .map(|id| {
            TrackId::from_id(id.as_str())
                .map(PlayableId::Track)
                .map_err(|_| EraError::InvalidId(id.clone()))
        })
        .collect()
}

/// Track ids of a playlist page. Episodes and local files have no track id and are left out.
fn item_ids(page: model::Page<PlaylistItem>) -> Page<String> {
    let next = next_cursor(&page);
    let items = page
        .items
        .into_iter()
        .filter_map(|item| match item.track {
            Some(PlayableItem::Track(track)) => track.id.map(|id| id.id().to_string()),
            _ => None,
        })
        .collect();
    Page { items, next }
}

#[async_trait]
impl MusicLibrary for SpotifyLibrary {
    async fn current_user(&self) -> Result<UserRef> {
        let user = self
            .spotify
            .current_user()
            .await
            .map_err(|e| classify(e, "current user"))?;
        Ok(UserRef {
            id: user.id.id().to_string(),
        })
    }

    async fn saved_tracks(&self, cursor: Option<PageCursor>) -> Result<Page<TrackRef>> {
        let offset = offset_of(cursor.as_ref())?;
        let page = self
            .spotify
            .current_user_saved_tracks_manual(None, Some(SAVED_TRACKS_LIMIT), Some(offset))
            .await
            .map_err(|e| classify(e, "saved tracks"))?;
        debug!("Saved tracks page at {} of {}", offset, page.total);

        let next = next_cursor(&page);
        let items = page
            .items
            .into_iter()
            .filter_map(|saved| {
                let track = saved.track;
                let id = track.id?.id().to_string();
                Some(TrackRef {
                    id,
                    name: track.name,
                    release_date: track.album.release_date,
                })
            })
            .collect();

        Ok(Page { items, next })
    }

    async fn playlists(&self, cursor: Option<PageCursor>) -> Result<Page<PlaylistRef>> {
        let offset = offset_of(cursor.as_ref())?;
        let page = self
            .spotify
            .current_user_playlists_manual(Some(PLAYLISTS_LIMIT), Some(offset))
            .await
            .map_err(|e| classify(e, "playlists"))?;

        let next = next_cursor(&page);
        let items = page
            .items
            .into_iter()
            .map(|pl| PlaylistRef {
                id: pl.id.id().to_string(),
                name: pl.name,
            })
            .collect();

        Ok(Page { items, next })
    }

    async fn playlist(&self, id: &str) -> Result<Playlist> {
        let full = self
            .spotify
            .playlist(playlist_id(id)?, None, None)
            .await
            .map_err(|e| classify(e, id))?;
        Ok(Playlist {
            id: full.id.id().to_string(),
            name: full.name,
            tracks: item_ids(full.tracks),
        })
    }

    async fn playlist_tracks(&self, id: &str, cursor: PageCursor) -> Result<Page<String>> {
        let offset = offset_of(Some(&cursor))?;
        let page = self
            .spotify
            .playlist_items_manual(
                playlist_id(id)?,
                None,
                None,
                Some(PLAYLIST_ITEMS_LIMIT),
                Some(offset),
            )
            .await
            .map_err(|e| classify(e, id))?;
        Ok(item_ids(page))
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<Playlist> {
        let user = UserId::from_id(user_id).map_err(|_| EraError::InvalidId(user_id.to_string()))?;
        let full = self
            .spotify
            .user_playlist_create(user, name, Some(public), Some(false), Some(description))
            .await
            .map_err(|e| classify(e, user_id))?;
        Ok(Playlist {
            id: full.id.id().to_string(),
            name: full.name,
            tracks: item_ids(full.tracks),
        })
    }

    async fn add_tracks(&self, id: &str, track_ids: &[String]) -> Result<()> {
        let items = playable_ids(track_ids)?;
        self.spotify
            .playlist_add_items(playlist_id(id)?, items, None)
            .await
            .map_err(|e| classify(e, id))?;
        Ok(())
    }

    async fn remove_tracks(&self, id: &str, track_ids: &[String]) -> Result<()> {
        let items = playable_ids(track_ids)?;
        self.spotify
            .playlist_remove_all_occurrences_of_items(playlist_id(id)?, items, None)
            .await
            .map_err(|e| classify(e, id))?;
        Ok(())
    }

    async fn unfollow_playlist(&self, id: &str) -> Result<()> {
        self.spotify
            .playlist_unfollow(playlist_id(id)?)
            .await
            .map_err(|e| classify(e, id))?;
        Ok(())
    }
}
