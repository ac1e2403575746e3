/*
    spotify-era-rs | Rust CLI tool to sort Liked Songs into decade playlists.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use rspotify::{prelude::*, scopes, AuthCodeSpotify, Config, Credentials, OAuth};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to initialize Spotify client: {0}")]
    ClientConfig(String),
    #[error("Spotify authentication failed: {0}")]
    Spotify(#[from] rspotify::ClientError),
    #[error("Spotify rejected the session while accessing {0}; log in again")]
    SessionRejected(String),
}

/// Scopes needed to read Liked Songs and maintain the era playlists.
///
/// - user-read-private: To look up the current user's ID.
/// - user-library-read: To read Liked Songs.
/// - playlist-read-private: To find existing era playlists.
/// - playlist-modify-private / playlist-modify-public: To create, fill and unfollow them.
pub fn required_scopes() -> HashSet<String> {
    scopes!(
        "user-read-private",
        "user-library-read",
        "playlist-read-private",
        "playlist-modify-private",
        "playlist-modify-public"
    )
}

/// Initializes and authenticates a Spotify client using the Authorization Code Flow.
///
/// Credentials come from `RSPOTIFY_CLIENT_ID` / `RSPOTIFY_CLIENT_SECRET` and the
/// callback from `RSPOTIFY_REDIRECT_URI`. The authorization exchange happens once
/// per call: `prompt_for_token` opens (or prints) the authorize URL and waits for
/// the redirected URL, and the returned client is the session for the whole run.
/// Tokens are cached and refreshed by `rspotify`.
pub async fn get_spotify_client() -> Result<AuthCodeSpotify, AuthError> {
    let creds = Credentials::from_env().ok_or_else(|| {
        AuthError::ClientConfig("Missing RSPOTIFY_CLIENT_ID or RSPOTIFY_CLIENT_SECRET".to_string())
    })?;

    let oauth = OAuth::from_env(required_scopes())
        .ok_or_else(|| AuthError::ClientConfig("Missing RSPOTIFY_REDIRECT_URI".to_string()))?;

    let config = Config {
        token_cached: true,
        token_refreshing: true,
        ..Default::default()
    };

    let spotify = AuthCodeSpotify::with_config(creds, oauth, config);

    let url = spotify.get_authorize_url(false)?;
    spotify.prompt_for_token(&url).await?;

    Ok(spotify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_cover_playlist_writes() {
        let scopes = required_scopes();
        assert!(scopes.contains("user-library-read"));
        assert!(scopes.contains("playlist-modify-private"));
        assert!(scopes.contains("user-read-private"));
        assert!(!scopes.contains("user-library-modify"));
    }
}
