// components/video_downloader/src/utils.rs
use std::path::Path;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Build the watch URL for a video id
pub fn watch_url(id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, id)
}

/// Whether a URL points at a playlist rather than a single video
pub fn is_playlist_url(url: &str) -> bool {
    url.contains("playlist") || url.contains("list=")
}

/// Output template handed to the engine, `<dir>/%(title)s.%(ext)s`
pub fn output_template(output_dir: Option<&Path>) -> String {
    const TEMPLATE: &str = "%(title)s.%(ext)s";
    match output_dir {
        Some(dir) => dir.join(TEMPLATE).to_string_lossy().into_owned(),
        None => TEMPLATE.to_string(),
    }
}
