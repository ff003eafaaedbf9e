use crate::{AlbumId, JobId, PlaylistId, TrackId};
use serde::{Deserialize, Serialize};

pub const ARCHIVE_LABEL: &str = "ZIP Archive";

fn default_media_number() -> u32 {
    1
}

pub(crate) fn format_title(title: &str, version: Option<&str>) -> String {
    match version.map(str::trim) {
        Some(version) if !version.is_empty() => format!("{} ({})", title, version),
        _ => title.to_string(),
    }
}

/// Album metadata without its track list.
///
/// This is what a catalog search returns for an album, and also the parent
/// context attached to every album-sourced track before it is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub id: AlbumId,
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    pub artist: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub tracks_count: u32,
}

impl AlbumInfo {
    pub fn format_title(&self) -> String {
        format_title(&self.title, self.version.as_deref())
    }

    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub info: AlbumInfo,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub tracks_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub info: PlaylistInfo,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    pub performer: String,
    pub track_number: u32,
    #[serde(default = "default_media_number")]
    pub media_number: u32,
    #[serde(default)]
    pub duration: u32,
    pub streamable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<AlbumInfo>,
}

impl Track {
    pub fn format_title(&self) -> String {
        format_title(&self.title, self.version.as_deref())
    }

    pub fn with_album(self, album: AlbumInfo) -> Self {
        Self {
            album: Some(album),
            ..self
        }
    }
}

/// A search result as selected by the user, before track-level expansion.
///
/// A result without a recognised `type` is read as an album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", from = "RawCatalogResult")]
pub enum CatalogResult {
    Album(AlbumInfo),
    Playlist(PlaylistInfo),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedCatalogResult {
    Album(AlbumInfo),
    Playlist(PlaylistInfo),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCatalogResult {
    Tagged(TaggedCatalogResult),
    Untyped(AlbumInfo),
}

impl From<RawCatalogResult> for CatalogResult {
    fn from(raw: RawCatalogResult) -> Self {
        match raw {
            RawCatalogResult::Tagged(TaggedCatalogResult::Album(album)) => {
                CatalogResult::Album(album)
            }
            RawCatalogResult::Tagged(TaggedCatalogResult::Playlist(playlist)) => {
                CatalogResult::Playlist(playlist)
            }
            RawCatalogResult::Untyped(album) => CatalogResult::Album(album),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Album,
    Playlist,
}

impl ResultKind {
    pub fn tracks_label(&self) -> &'static str {
        match self {
            ResultKind::Album => "No ZIP Archive",
            ResultKind::Playlist => "Download All Tracks",
        }
    }

    pub fn queued_description(&self) -> &'static str {
        match self {
            ResultKind::Album => "The album has been added to the queue",
            ResultKind::Playlist => "All tracks from the playlist have been added to the queue",
        }
    }
}

impl CatalogResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            CatalogResult::Album(_) => ResultKind::Album,
            CatalogResult::Playlist(_) => ResultKind::Playlist,
        }
    }

    pub fn offers_archive(&self) -> bool {
        !matches!(self.kind(), ResultKind::Playlist)
    }

    /// Labels of the download options offered for this result, in menu order.
    pub fn download_options(&self) -> Vec<&'static str> {
        let mut options = Vec::with_capacity(2);

        if self.offers_archive() {
            options.push(ARCHIVE_LABEL);
        }
        options.push(self.kind().tracks_label());

        options
    }

    pub fn format_title(&self) -> String {
        match self {
            CatalogResult::Album(album) => album.format_title(),
            CatalogResult::Playlist(playlist) => playlist.name.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown audio quality format id: {0}")]
pub struct UnknownQualityError(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AudioQuality {
    Mp3,
    Cd,
    HiRes96,
    #[default]
    HiRes192,
}

impl AudioQuality {
    pub fn format_id(&self) -> u32 {
        match self {
            AudioQuality::Mp3 => 5,
            AudioQuality::Cd => 6,
            AudioQuality::HiRes96 => 7,
            AudioQuality::HiRes192 => 27,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioQuality::Mp3 => "mp3",
            _ => "flac",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AudioQuality::Mp3 => "MP3 320",
            AudioQuality::Cd => "CD 16-bit",
            AudioQuality::HiRes96 => "Hi-Res 24-bit 96kHz",
            AudioQuality::HiRes192 => "Hi-Res 24-bit 192kHz",
        }
    }
}

impl TryFrom<u32> for AudioQuality {
    type Error = UnknownQualityError;

    fn try_from(format_id: u32) -> Result<Self, Self::Error> {
        match format_id {
            5 => Ok(AudioQuality::Mp3),
            6 => Ok(AudioQuality::Cd),
            7 => Ok(AudioQuality::HiRes96),
            27 => Ok(AudioQuality::HiRes192),
            other => Err(UnknownQualityError(other)),
        }
    }
}

impl From<AudioQuality> for u32 {
    fn from(quality: AudioQuality) -> Self {
        quality.format_id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSettings {
    pub quality: AudioQuality,
    pub track_name_template: String,
    pub archive_name_template: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            quality: AudioQuality::default(),
            track_name_template: "{track_number}. {artist} - {title}".into(),
            archive_name_template: "{artist} - {album}".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    Track { track: Track },
    Archive { album: AlbumInfo },
}

/// Everything a job runner needs to perform one download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub job_id: JobId,
    pub title: String,
    pub output_name: String,
    pub settings: DownloadSettings,
    #[serde(flatten)]
    pub kind: JobKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Downloading { progress: u8 },
    Packaging,
    Completed { path: String },
    Failed { reason: String },
}

impl JobState {
    fn rank(&self) -> u8 {
        match self {
            JobState::Queued => 0,
            JobState::Downloading { .. } => 1,
            JobState::Packaging => 2,
            JobState::Completed { .. } | JobState::Failed { .. } => 3,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }

    /// Whether `next` may replace this state. Updates for one job can arrive
    /// in any order, so a job never moves backwards.
    pub fn accepts(&self, next: &JobState) -> bool {
        if self.is_finished() {
            return false;
        }

        match (self, next) {
            (JobState::Downloading { progress }, JobState::Downloading { progress: next }) => {
                next >= progress
            }
            _ => next.rank() >= self.rank(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: JobId,
    pub title: String,
    #[serde(flatten)]
    pub state: JobState,
}

pub type StatusSnapshot = Vec<JobStatus>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub title: String,
    pub kind: ResultKind,
    pub submitted: usize,
    pub skipped: usize,
}
