use crate::catalog::{Category, ProfileSlot};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage portfolio videos
    #[command(subcommand)]
    Videos(VideosCommand),

    /// Manage the hero and about images
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Show how much of the storage quota is in use
    Usage,

    /// Extract the file id from a Google Drive sharing link
    Resolve { link: String },

    /// Print the Google Drive upload folders
    Folders,

    /// Print a WhatsApp link with a pre-filled message
    Contact {
        message: String,

        /// Phone number with country code, defaults to the configured one
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum VideosCommand {
    /// List videos, newest first
    List {
        #[arg(long, value_enum)]
        category: Option<Category>,
    },

    /// Show one video
    Show { id: String },

    /// Add a video
    Add(AddArgs),

    /// Edit fields of an existing video
    Edit(EditArgs),

    /// Delete a video
    Delete { id: String },

    /// Keep only the most recently added videos
    Prune {
        #[arg(long, default_value_t = 10)]
        keep: usize,
    },

    /// Remove every video, keeping the profile images
    Clear,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    /// Free text, e.g. 12:45
    #[arg(long)]
    pub duration: String,

    /// Free text, e.g. 4K
    #[arg(long)]
    pub resolution: String,

    #[arg(long, value_enum)]
    pub category: Category,

    /// Required for the youtube category
    #[arg(long, conflicts_with = "video_url")]
    pub youtube_id: Option<String>,

    /// Google Drive sharing link, required for other categories
    #[arg(long)]
    pub video_url: Option<String>,

    #[arg(long)]
    pub thumbnail_url: Option<String>,

    /// Image to embed as the thumbnail
    #[arg(long)]
    pub thumbnail_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub duration: Option<String>,

    #[arg(long)]
    pub resolution: Option<String>,

    #[arg(long, value_enum)]
    pub category: Option<Category>,

    #[arg(long, conflicts_with = "video_url")]
    pub youtube_id: Option<String>,

    #[arg(long)]
    pub video_url: Option<String>,

    #[arg(long)]
    pub thumbnail_url: Option<String>,

    #[arg(long)]
    pub thumbnail_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show both profile images
    Show,

    /// Replace a profile image with an uploaded file or a link
    Set {
        #[arg(value_enum)]
        slot: ProfileSlot,

        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        file: Option<PathBuf>,

        #[arg(long)]
        url: Option<String>,
    },
}
