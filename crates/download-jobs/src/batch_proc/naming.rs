use crate::batch_proc::types::{AlbumInfo, DownloadSettings, Track};

const FORBIDDEN_FILE_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
const UNNAMED: &str = "untitled";

#[derive(Debug, Default)]
pub struct TemplateValues<'a> {
    pub artist: &'a str,
    pub title: &'a str,
    pub album: &'a str,
    pub track_number: Option<u32>,
    pub media_number: Option<u32>,
    pub year: Option<&'a str>,
    pub quality: &'a str,
}

impl<'a> TemplateValues<'a> {
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "artist" => Some(self.artist.to_string()),
            "title" => Some(self.title.to_string()),
            "album" => Some(self.album.to_string()),
            "track_number" => Some(
                self.track_number
                    .map(|number| format!("{:02}", number))
                    .unwrap_or_default(),
            ),
            "media_number" => Some(
                self.media_number
                    .map(|number| number.to_string())
                    .unwrap_or_default(),
            ),
            "year" => Some(self.year.unwrap_or_default().to_string()),
            "quality" => Some(self.quality.to_string()),
            _ => None,
        }
    }
}

/// Replaces `{placeholder}`s in `template`. Unknown placeholders stay as written.
pub fn render_template(template: &str, values: &TemplateValues) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];

        match after_brace.find('}') {
            Some(end) => {
                let key = &after_brace[..end];
                match values.lookup(key) {
                    Some(value) => rendered.push_str(&value),
                    None => {
                        rendered.push('{');
                        rendered.push_str(key);
                        rendered.push('}');
                    }
                }
                rest = &after_brace[end + 1..];
            }
            None => {
                rendered.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

pub fn sanitize_file_name(name: &str) -> String {
    let replaced = name
        .chars()
        .map(|c| {
            if c.is_control() || FORBIDDEN_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect::<String>();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if trimmed.is_empty() {
        UNNAMED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name (without extension) for a single track download.
pub fn track_output_name(track: &Track, settings: &DownloadSettings) -> String {
    let title = track.format_title();
    let album_title = track
        .album
        .as_ref()
        .map(AlbumInfo::format_title)
        .unwrap_or_default();
    let values = TemplateValues {
        artist: &track.performer,
        title: &title,
        album: &album_title,
        track_number: Some(track.track_number),
        media_number: Some(track.media_number),
        year: track.album.as_ref().and_then(AlbumInfo::year),
        quality: settings.quality.label(),
    };

    let name = render_template(&settings.track_name_template, &values);

    // Track numbers restart on every disc.
    if track.media_number > 1 && !settings.track_name_template.contains("{media_number}") {
        return sanitize_file_name(&format!("{}-{}", track.media_number, name));
    }

    sanitize_file_name(&name)
}

/// File name (without extension) for an album archive.
pub fn archive_output_name(album: &AlbumInfo, settings: &DownloadSettings) -> String {
    let album_title = album.format_title();
    let values = TemplateValues {
        artist: &album.artist,
        title: &album_title,
        album: &album_title,
        track_number: None,
        media_number: None,
        year: album.year(),
        quality: settings.quality.label(),
    };

    sanitize_file_name(&render_template(&settings.archive_name_template, &values))
}
