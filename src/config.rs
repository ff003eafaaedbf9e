use download_jobs::{
    AudioQuality, DownloadSettings, FixedDelayPacer, SubmissionPacer, TokenBucketPacer,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30u64
}

fn default_download_directory() -> String {
    "downloads".to_string()
}

fn default_submission_delay_ms() -> u64 {
    100u64
}

fn default_submission_burst() -> u32 {
    1u32
}

fn default_max_concurrent_jobs() -> usize {
    2usize
}

fn default_output_quality() -> u32 {
    27u32
}

fn default_track_name_template() -> String {
    "{track_number}. {artist} - {title}".to_string()
}

fn default_archive_name_template() -> String {
    "{artist} - {album}".to_string()
}

fn default_qobuz_api_endpoint() -> String {
    qobuz_client::QOBUZ_API_ENDPOINT.to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct QobuzCredentials {
    #[serde(rename = "qobuz_app_id")]
    pub(crate) app_id: String,
    #[serde(rename = "qobuz_app_secret")]
    pub(crate) app_secret: String,
    #[serde(rename = "qobuz_auth_token", default)]
    pub(crate) auth_token: Option<String>,
    #[serde(rename = "qobuz_api_endpoint", default = "default_qobuz_api_endpoint")]
    pub(crate) api_endpoint: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_bind_address")]
    pub(crate) bind_address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub(crate) shutdown_timeout: u64,
    #[serde(default = "default_download_directory")]
    pub(crate) download_directory: String,
    #[serde(default = "default_submission_delay_ms")]
    pub(crate) submission_delay_ms: u64,
    #[serde(default)]
    pub(crate) submission_rate: Option<f64>,
    #[serde(default = "default_submission_burst")]
    pub(crate) submission_burst: u32,
    #[serde(default = "default_max_concurrent_jobs")]
    pub(crate) max_concurrent_jobs: usize,
    #[serde(default = "default_output_quality")]
    pub(crate) output_quality: u32,
    #[serde(default = "default_track_name_template")]
    pub(crate) track_name_template: String,
    #[serde(default = "default_archive_name_template")]
    pub(crate) archive_name_template: String,
    #[serde(flatten)]
    pub(crate) qobuz: QobuzCredentials,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        match envy::from_env::<Self>() {
            Ok(config) => config,
            Err(error) => panic!("Missing environment variable: {:#?}", error),
        }
    }

    pub(crate) fn download_settings(&self) -> DownloadSettings {
        let quality = AudioQuality::try_from(self.output_quality).unwrap_or_else(|error| {
            warn!(%error, "Falling back to the default output quality");
            AudioQuality::default()
        });

        DownloadSettings {
            quality,
            track_name_template: self.track_name_template.clone(),
            archive_name_template: self.archive_name_template.clone(),
        }
    }

    /// A token bucket when `submission_rate` is set, the fixed delay otherwise.
    pub(crate) fn submission_pacer(&self) -> Arc<dyn SubmissionPacer> {
        match self.submission_rate {
            Some(rate) if rate > 0.0 => {
                Arc::new(TokenBucketPacer::new(rate, self.submission_burst))
            }
            _ => {
                let delay = Duration::from_millis(self.submission_delay_ms);
                Arc::new(FixedDelayPacer::new(delay))
            }
        }
    }
}
