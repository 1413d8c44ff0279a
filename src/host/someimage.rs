//! someimage.com
//!
//! Images are posted one request each; the links are then fetched from the
//! `done` page. That page lists every image of the session in upload order,
//! so each call only keeps the newest links.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::{Client, multipart::Form};

use super::{
    Credentials, HostCapabilities, HostOptions, ImageHost, UploadRange, UploadSource,
    UploadedFile, ensure_success, normalize_base_url, pair_links, scrape_links, session_client,
    upload_name,
};
use crate::error::FramepostError;

const BASE_URL: &str = "http://someimage.com/";

// The upper bound is arbitrary; the site itself does not publish one.
pub(crate) static CAPABILITIES: HostCapabilities = HostCapabilities {
    quantity: UploadRange::new(1, 20),
    thumbnail_sizes: &[100, 150, 200, 250, 300, 350],
    default_thumbnail_size: 200,
};

// Matches the BBcode box on the `done` page.
static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[URL=(https?://[^\]]*)\]\[IMG\](https?://[^\[]*)\[/IMG\]\[/URL\]").unwrap()
});

/// The last `count` links of the `done` page, which belong to the images
/// just posted.
fn newest_links(html: &str, count: usize) -> Vec<(String, String)> {
    let mut links = scrape_links(&LINK_REGEX, html);
    let earlier = links.len().saturating_sub(count);
    links.split_off(earlier)
}

pub(crate) fn create(options: HostOptions) -> Result<Box<dyn ImageHost>, FramepostError> {
    Ok(Box::new(SomeImage::new(options)?))
}

pub struct SomeImage {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    thumbnail_size: u32,
    session_open: bool,
    uploaded_files: Vec<UploadedFile>,
}

impl SomeImage {
    pub const NAME: &'static str = "someimage";

    pub fn new(options: HostOptions) -> Result<Self, FramepostError> {
        Ok(Self {
            client: session_client()?,
            base_url: normalize_base_url(options.base_url.as_deref().unwrap_or(BASE_URL)),
            credentials: options.credentials,
            thumbnail_size: CAPABILITIES.resolve_thumbnail_size(options.thumbnail_size),
            session_open: false,
            uploaded_files: Vec::new(),
        })
    }

    /// Log in, or visit the front page to get an anonymous session cookie.
    fn open_session(&mut self) -> Result<(), FramepostError> {
        if self.session_open {
            return Ok(());
        }

        match &self.credentials {
            Some(credentials) => {
                log::info!("Logging in to {} as {}", Self::NAME, credentials.username);
                let form = [
                    ("act", "takelogin"),
                    ("username", credentials.username.as_str()),
                    ("password", credentials.password.as_str()),
                ];
                let url = format!("{}index.php", self.base_url);
                ensure_success(self.client.post(url).form(&form).send()?)?;
            }
            None => {
                ensure_success(self.client.get(&self.base_url).send()?)?;
            }
        }

        self.session_open = true;
        Ok(())
    }
}

impl ImageHost for SomeImage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn capabilities(&self) -> &'static HostCapabilities {
        &CAPABILITIES
    }

    fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    fn upload(&mut self, files: &[UploadSource]) -> Result<Vec<UploadedFile>, FramepostError> {
        self.open_session()?;

        let upload_url = format!("{}upload.php", self.base_url);
        for (number, file) in (1..).zip(files) {
            let name = upload_name(number);
            log::debug!("Uploading {} as {}", file.display_name(), name);

            let form = Form::new()
                .text("name", name.clone())
                .text("safe", "1")
                .text("thumb", format!("w{}", self.thumbnail_size))
                .text("gallery", "1")
                .text("galleryname", "")
                .part("file", file.to_part(&name)?);
            ensure_success(self.client.post(&upload_url).multipart(form).send()?)?;
        }

        let done_url = format!("{}done", self.base_url);
        let html = ensure_success(self.client.get(done_url).send()?)?.text()?;

        let uploaded = pair_links(Self::NAME, files, newest_links(&html, files.len()))?;
        self.uploaded_files.extend(uploaded.iter().cloned());
        Ok(uploaded)
    }

    fn uploaded_files(&self) -> &[UploadedFile] {
        &self.uploaded_files
    }
}
