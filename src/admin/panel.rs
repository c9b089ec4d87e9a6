use super::commands::{AddArgs, Command, EditArgs, ProfileCommand, VideosCommand};
use crate::catalog::{
    CatalogError, Category, NewVideo, Persisted, Playback, ProfileImages, ProfileSlot, Thumbnail,
    VideoPatch, VideoRecord, VideoStore,
};
use crate::config::Config;
use crate::contact::whatsapp_link;
use crate::media::{
    extract_file_id, folder_url, from_data_url, is_embedded_image, view_url, DriveFolder,
    ImageEncoder,
};
use crate::storage::{LocalStorage, UsageEstimator};
use crate::utils::{format_file_size, format_number};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

const TOO_LARGE_HINT: &str =
    "The image is too large for local storage. Please provide a Google Drive URL for the thumbnail.";

/// Everything the operator screens need, wired to one storage handle.
pub struct Panel {
    videos: VideoStore,
    profiles: ProfileImages,
    estimator: UsageEstimator,
    encoder: ImageEncoder,
    whatsapp_number: String,
}

impl Panel {
    pub fn new(storage: LocalStorage, config: &Config) -> Self {
        Self {
            videos: VideoStore::new(storage.clone()),
            profiles: ProfileImages::new(storage.clone()),
            estimator: UsageEstimator::new(storage),
            encoder: ImageEncoder::new(config.media),
            whatsapp_number: config.contact.whatsapp_number.clone(),
        }
    }

    pub async fn open(config: &Config) -> Result<Self> {
        let path = config.storage_path();
        info!("Opening storage at {}", path.display());

        let storage = LocalStorage::file(&path, Some(config.storage.quota_bytes))
            .await
            .with_context(|| format!("Failed to open storage at {}", path.display()))?;

        Ok(Self::new(storage, config))
    }

    pub async fn handle(&self, command: Command) -> Result<()> {
        match command {
            Command::Videos(cmd) => self.handle_videos(cmd).await,
            Command::Profile(cmd) => self.handle_profile(cmd).await,
            Command::Usage => self.show_usage().await,
            Command::Resolve { link } => {
                match extract_file_id(&link) {
                    Some(id) => {
                        println!("File id: {}", id);
                        println!("Viewer:  {}", view_url(&link));
                    }
                    None => println!("No Drive file id found, the link is used as-is: {}", link),
                }
                Ok(())
            }
            Command::Folders => {
                println!("Thumbnails: {}", folder_url(DriveFolder::Thumbnails));
                println!("Videos:     {}", folder_url(DriveFolder::Videos));
                Ok(())
            }
            Command::Contact { message, phone } => {
                let phone = phone.as_deref().unwrap_or(&self.whatsapp_number);
                println!("{}", whatsapp_link(&message, phone));
                Ok(())
            }
        }
    }

    async fn handle_videos(&self, command: VideosCommand) -> Result<()> {
        match command {
            VideosCommand::List { category } => self.list_videos(category).await,
            VideosCommand::Show { id } => match self.videos.get(&id).await {
                Some(video) => {
                    print_video(&video);
                    Ok(())
                }
                None => bail!("No video with id {}", id),
            },
            VideosCommand::Add(args) => self.add_video(args).await,
            VideosCommand::Edit(args) => self.edit_video(args).await,
            VideosCommand::Delete { id } => {
                if self.videos.delete(&id).await? {
                    println!("Deleted video {}", id);
                } else {
                    println!("No video with id {}", id);
                }
                Ok(())
            }
            VideosCommand::Prune { keep } => {
                if self.videos.prune_to_recent(keep).await? {
                    println!("Removed older videos, kept the {} most recent", keep);
                } else {
                    println!("Nothing to clear, {} or fewer videos stored", keep);
                }
                self.show_usage().await
            }
            VideosCommand::Clear => {
                if self.videos.clear().await? {
                    println!("All videos removed, profile images kept");
                } else {
                    println!("No videos stored");
                }
                Ok(())
            }
        }
    }

    async fn list_videos(&self, category: Option<Category>) -> Result<()> {
        let videos = match category {
            Some(category) => self.videos.by_category(category).await,
            None => self.videos.recent().await,
        };

        if videos.is_empty() {
            println!("No videos found");
            return Ok(());
        }

        for video in &videos {
            print_video(video);
        }
        Ok(())
    }

    async fn add_video(&self, args: AddArgs) -> Result<()> {
        let thumbnail_embedded = self
            .embed_thumbnail(args.thumbnail_file.as_deref(), args.thumbnail_url.as_deref())
            .await?;

        let playback = if args.category.is_youtube() {
            Playback::YouTube {
                id: args.youtube_id.unwrap_or_default(),
            }
        } else {
            Playback::External {
                url: args.video_url.unwrap_or_default(),
            }
        };

        let video = NewVideo {
            title: args.title,
            description: args.description,
            duration: args.duration,
            resolution: args.resolution,
            category: args.category,
            playback,
            thumbnail_url: args.thumbnail_url,
            thumbnail_embedded,
        };

        self.warn_if_nearly_full().await;

        let persisted = self.videos.create(video).await.map_err(quota_hint)?;
        report_write("Video added", &persisted);
        self.show_usage().await
    }

    async fn edit_video(&self, args: EditArgs) -> Result<()> {
        let thumbnail_embedded = self
            .embed_thumbnail(args.thumbnail_file.as_deref(), args.thumbnail_url.as_deref())
            .await?;

        let playback = match (args.youtube_id, args.video_url) {
            (Some(id), _) => Some(Playback::YouTube { id }),
            (None, Some(url)) => Some(Playback::External { url }),
            (None, None) => None,
        };

        let patch = VideoPatch {
            title: args.title,
            description: args.description,
            duration: args.duration,
            resolution: args.resolution,
            category: args.category,
            playback,
            thumbnail_url: args.thumbnail_url,
            thumbnail_embedded,
        };

        if patch.is_empty() {
            bail!("Nothing to change, pass at least one field to edit");
        }

        match self.videos.update(&args.id, patch).await.map_err(quota_hint)? {
            Some(persisted) => {
                report_write("Video updated", &persisted);
                self.show_usage().await
            }
            None => bail!("No video with id {}", args.id),
        }
    }

    /// Encodes the picked file, if any. Fails when the file cannot be
    /// embedded and no link was given to use instead.
    async fn embed_thumbnail(
        &self,
        file: Option<&Path>,
        fallback_url: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(file) = file else {
            return Ok(None);
        };

        let embedded = self.encoder.encode_file(file).await?;
        if embedded.is_none() && fallback_url.is_none_or(|url| url.trim().is_empty()) {
            bail!(TOO_LARGE_HINT);
        }
        Ok(embedded)
    }

    async fn handle_profile(&self, command: ProfileCommand) -> Result<()> {
        match command {
            ProfileCommand::Show => {
                for slot in ProfileSlot::ALL {
                    match self.profiles.get(slot).await {
                        Some(value) => println!("{:<6} {}", slot, describe_image(&value)),
                        None => println!("{:<6} (not set)", slot),
                    }
                }
                Ok(())
            }
            ProfileCommand::Set { slot, file, url } => {
                let value = match (file, url) {
                    (Some(file), _) => match self.encoder.encode_file(&file).await? {
                        Some(embedded) => embedded,
                        None => bail!(
                            "The image is too large for local storage. Please use a Google Drive link instead."
                        ),
                    },
                    (None, Some(url)) => url,
                    (None, None) => bail!("Provide either --file or --url"),
                };

                self.profiles.set(slot, &value).await.map_err(quota_hint)?;
                println!("Saved {} image", slot);
                self.show_usage().await
            }
        }
    }

    async fn warn_if_nearly_full(&self) {
        let usage = self.estimator.estimate().await;
        if usage.is_nearly_full() {
            warn!("Storage is {}% full", usage.percentage);
            println!(
                "Warning: storage is {}% full. Consider clearing old videos to free up space.",
                usage.percentage
            );
        }
    }

    async fn show_usage(&self) -> Result<()> {
        let usage = self.estimator.estimate().await;
        println!(
            "Storage: {} of {} used ({}%, {} bytes)",
            format_file_size(usage.used as u64),
            format_file_size(usage.total as u64),
            usage.percentage,
            format_number(usage.used as u64)
        );
        Ok(())
    }
}

fn report_write(action: &str, persisted: &Persisted<VideoRecord>) {
    let video = persisted.get();
    if persisted.is_degraded() {
        warn!("Video {} stored without its embedded thumbnail", video.id);
        println!(
            "{} ({}), but the image was too large for storage. Only the URL has been saved. \
             Please use Google Drive links for large images.",
            action, video.id
        );
    } else {
        println!("{} ({})", action, video.id);
    }
}

fn quota_hint(err: CatalogError) -> anyhow::Error {
    if err.is_quota_exceeded() {
        anyhow::Error::new(err).context("Storage is full. Consider clearing old videos to free up space")
    } else {
        err.into()
    }
}

fn describe_image(value: &str) -> String {
    if is_embedded_image(value) {
        match from_data_url(value) {
            Some((mime, bytes)) => format!(
                "embedded {} ({})",
                mime,
                format_file_size(bytes.len() as u64)
            ),
            None => format!("embedded image ({} chars)", value.len()),
        }
    } else {
        value.to_string()
    }
}

fn print_video(video: &VideoRecord) {
    println!("{}  {}", video.id, video.title);
    println!(
        "    {} | {} | {} | added {}",
        video.category,
        video.duration,
        video.resolution,
        video.date_added.format("%Y-%m-%d")
    );
    println!("    {}", video.description);

    let thumbnail = match video.thumbnail() {
        Thumbnail::Embedded(data) => describe_image(data),
        Thumbnail::External(url) => url.to_string(),
        Thumbnail::Placeholder => "(placeholder)".to_string(),
    };
    println!("    thumbnail: {}", thumbnail);

    match video.playback() {
        Some(playback) => println!("    watch: {}", playback.link()),
        None => println!("    watch: (no playable link)"),
    }
}
