//! imagebam.com
//!
//! All images go up in one multipart POST; the answer page lists a BBcode
//! snippet per image inside `value='...'` attributes, in upload order.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::{Client, multipart::Form};

use super::{
    Credentials, HostCapabilities, HostOptions, ImageHost, UploadRange, UploadSource,
    UploadedFile, ensure_success, normalize_base_url, pair_links, scrape_links, session_client,
    upload_name,
};
use crate::error::FramepostError;

const BASE_URL: &str = "http://www.imagebam.com/";

pub(crate) static CAPABILITIES: HostCapabilities = HostCapabilities {
    quantity: UploadRange::new(1, 20),
    thumbnail_sizes: &[100, 150, 180, 250, 300, 350],
    default_thumbnail_size: 180,
};

// Matches the markup of the upload result page; breaks if the site changes it.
static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"value='\[URL=(https?://[^\]]*)\]\[IMG\](https?://[^\[]*)\[/IMG\]\[/URL\]")
        .unwrap()
});

pub(crate) fn create(options: HostOptions) -> Result<Box<dyn ImageHost>, FramepostError> {
    Ok(Box::new(ImageBam::new(options)?))
}

pub struct ImageBam {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    thumbnail_size: u32,
    logged_in: bool,
    uploaded_files: Vec<UploadedFile>,
}

impl ImageBam {
    pub const NAME: &'static str = "imagebam";

    pub fn new(options: HostOptions) -> Result<Self, FramepostError> {
        Ok(Self {
            client: session_client()?,
            base_url: normalize_base_url(options.base_url.as_deref().unwrap_or(BASE_URL)),
            credentials: options.credentials,
            thumbnail_size: CAPABILITIES.resolve_thumbnail_size(options.thumbnail_size),
            logged_in: false,
            uploaded_files: Vec::new(),
        })
    }

    fn login(&mut self) -> Result<(), FramepostError> {
        let Some(credentials) = &self.credentials else {
            return Ok(());
        };
        if self.logged_in {
            return Ok(());
        }

        log::info!("Logging in to {} as {}", Self::NAME, credentials.username);
        let form = [
            ("action", "true"),
            ("nick", credentials.username.as_str()),
            ("pw", credentials.password.as_str()),
        ];
        let url = format!("{}login", self.base_url);
        ensure_success(self.client.post(url).form(&form).send()?)?;

        self.logged_in = true;
        Ok(())
    }
}

impl ImageHost for ImageBam {
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
        self.login()?;

        let mut form = Form::new()
            .text("content_type", "0")
            .text("thumb_size", self.thumbnail_size.to_string())
            .text("thumb_aspect_ratio", "resize")
            .text("thumb_file_type", "jpg")
            .text("gallery_options", "1")
            .text("galley_title", "")
            .text("galley_description", "");
        for (number, file) in (1..).zip(files) {
            form = form.part("file[]", file.to_part(&upload_name(number))?);
        }

        log::info!("Uploading {} image(s) to {}", files.len(), Self::NAME);
        let url = format!("{}sys/upload/save", self.base_url);
        let html = ensure_success(self.client.post(url).multipart(form).send()?)?.text()?;

        let uploaded = pair_links(Self::NAME, files, scrape_links(&LINK_REGEX, &html))?;
        self.uploaded_files.extend(uploaded.iter().cloned());
        Ok(uploaded)
    }

    fn uploaded_files(&self) -> &[UploadedFile] {
        &self.uploaded_files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::to_bbcode;

    #[test]
    fn links_are_scraped_in_page_order() {
        let html = format!(
            "<input type='text' value='{}' />\n<input value='{}'>\n<a href='http://www.imagebam.com/ignored'>",
            to_bbcode("http://www.imagebam.com/image/aa11", "http://thumbs2.imagebam.com/aa11_t.jpg"),
            to_bbcode("http://www.imagebam.com/image/bb22", "http://thumbs2.imagebam.com/bb22_t.jpg"),
        );

        assert_eq!(
            scrape_links(&LINK_REGEX, &html),
            [
                (
                    "http://www.imagebam.com/image/aa11".to_string(),
                    "http://thumbs2.imagebam.com/aa11_t.jpg".to_string()
                ),
                (
                    "http://www.imagebam.com/image/bb22".to_string(),
                    "http://thumbs2.imagebam.com/bb22_t.jpg".to_string()
                ),
            ]
        );
    }

    #[test]
    fn bbcode_outside_value_attribute_is_ignored() {
        let html = to_bbcode("http://www.imagebam.com/image/aa11", "http://t/aa11.jpg");
        assert!(scrape_links(&LINK_REGEX, &html).is_empty());
    }

    #[test]
    fn invalid_thumbnail_size_uses_default() {
        let host = ImageBam::new(HostOptions {
            thumbnail_size: Some(200),
            ..HostOptions::default()
        })
        .unwrap();
        assert_eq!(host.thumbnail_size(), 180);
        assert!(host.uploaded_files().is_empty());
    }
}
