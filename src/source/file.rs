use std::path::Path;

use crate::{
    error::{SyncError, SyncResult},
    types::{SourcePlaylist, Track},
};

/// Reads a playlist exported as a JSON array of `{title, artist, album}`.
/// The file stem becomes the playlist name.
pub async fn load_file(path: &Path) -> SyncResult<SourcePlaylist> {
    let content = async_fs::read_to_string(path).await?;
    let tracks: Vec<Track> = serde_json::from_str(&content)
        .map_err(|e| SyncError::source(format!("{} is not a track list: {e}", path.display())))?;

    Ok(SourcePlaylist {
        name: path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
        tracks,
    })
}
