mod drive;
mod resize;
mod types;
mod utils;

pub use drive::{extract_file_id, folder_url, view_url};
pub use resize::ImageEncoder;
pub use types::{DriveFolder, EncoderSettings};
pub use utils::{from_data_url, is_embedded_image, youtube_watch_url};
