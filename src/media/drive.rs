//! Google Drive share-link handling.

use super::types::DriveFolder;

type Matcher = fn(&str) -> Option<&str>;

/// Tried in order; the first match wins.
const MATCHERS: &[Matcher] = &[file_path_id, query_id, open_query_id];

/// `.../file/d/<ID>/view`
fn file_path_id(link: &str) -> Option<&str> {
    let (_, rest) = link.split_once("/file/d/")?;
    take_until(rest, &['/', '?', '#'])
}

/// `.../uc?id=<ID>&export=download`
fn query_id(link: &str) -> Option<&str> {
    let (_, rest) = link.split_once("id=")?;
    take_until(rest, &['&', '#'])
}

/// `.../open?id=<ID>`
fn open_query_id(link: &str) -> Option<&str> {
    let (_, rest) = link.split_once("/open?id=")?;
    take_until(rest, &['&', '#'])
}

fn take_until<'a>(value: &'a str, stops: &[char]) -> Option<&'a str> {
    let end = value.find(stops).unwrap_or(value.len());
    let id = &value[..end];
    (!id.is_empty()).then_some(id)
}

/// Pulls the file identifier out of a Drive sharing link.
pub fn extract_file_id(link: &str) -> Option<&str> {
    MATCHERS.iter().find_map(|matcher| matcher(link))
}

/// Canonical viewer link, or `link` unchanged when no identifier is found.
pub fn view_url(link: &str) -> String {
    match extract_file_id(link) {
        Some(id) => format!("https://drive.google.com/file/d/{}/view", id),
        None => link.to_string(),
    }
}

pub fn folder_url(folder: DriveFolder) -> String {
    format!("https://drive.google.com/drive/folders/{}", folder.id())
}
