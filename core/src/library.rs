//! The remote music library the era sync runs against.
//!
//! Listings are cursor paginated: pass `None` for the first page and the
//! returned `Page::next` for every following one. Mutations accept at most
//! one batch of track ids per call; chunking is the caller's job (see
//! [`crate::batch`]).

use crate::error::Result;
use crate::models::{Page, PageCursor, Playlist, PlaylistRef, TrackRef, UserRef};
use async_trait::async_trait;

#[async_trait]
pub trait MusicLibrary: Send + Sync {
    /// The authenticated user. Needed to create playlists.
    async fn current_user(&self) -> Result<UserRef>;

    /// One page of the user's saved tracks ("Liked Songs").
    async fn saved_tracks(&self, cursor: Option<PageCursor>) -> Result<Page<TrackRef>>;

    /// One page of the user's playlists.
    async fn playlists(&self, cursor: Option<PageCursor>) -> Result<Page<PlaylistRef>>;

    /// Full playlist details with the first page of member track ids.
    async fn playlist(&self, playlist_id: &str) -> Result<Playlist>;

    /// One page of a playlist's member track ids.
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: PageCursor,
    ) -> Result<Page<String>>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<Playlist>;

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    /// Removes every occurrence of the given tracks.
    async fn remove_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    async fn unfollow_playlist(&self, playlist_id: &str) -> Result<()>;
}
