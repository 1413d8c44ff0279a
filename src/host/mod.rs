//! Image host plugins.
//!
//! Each supported website implements [`ImageHost`]: it knows its own
//! [`HostCapabilities`] and turns an ordered list of images into an ordered
//! list of [`UploadedFile`] links by posting the site's upload form and
//! scraping the page it answers with. The scraping regexes are tied to each
//! site's current markup; when a site changes its pages the upload fails with
//! [`FramepostError::UnexpectedResponse`].
//!
//! Hosts are found through a [`HostRegistry`], an explicit table of names,
//! capabilities, and constructors.
//!
//! # Example
//!
//! ```no_run
//! use framepost::{HostOptions, HostRegistry, UploadSource};
//!
//! let registry = HostRegistry::builtin();
//! let mut host = registry.create("imagebam", HostOptions::default())?;
//! let links = host.upload(&[UploadSource::from("shot01.png")])?;
//! println!("{} -> {}", links[0].page_url, links[0].thumbnail_url);
//! # Ok::<(), framepost::FramepostError>(())
//! ```

mod imagebam;
mod someimage;

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::{Client, Response, multipart::Part};
use serde::Serialize;

use crate::error::FramepostError;

pub use imagebam::ImageBam;
pub use someimage::SomeImage;

/// Host used when neither the command line nor the config file names one.
pub const DEFAULT_HOST: &str = "imagebam";

const USER_AGENT: &str = concat!("framepost/", env!("CARGO_PKG_VERSION"));

/// Inclusive bounds on how many images one upload may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadRange {
    pub min: u32,
    pub max: u32,
}

impl UploadRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, amount: u32) -> bool {
        (self.min..=self.max).contains(&amount)
    }
}

/// Static description of what a host accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostCapabilities {
    #[serde(flatten)]
    pub quantity: UploadRange,
    pub thumbnail_sizes: &'static [u32],
    pub default_thumbnail_size: u32,
}

impl HostCapabilities {
    pub fn supports_thumbnail_size(&self, size: u32) -> bool {
        self.thumbnail_sizes.contains(&size)
    }

    /// `requested` if the host offers it, otherwise the host default.
    pub fn resolve_thumbnail_size(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|&size| self.supports_thumbnail_size(size))
            .unwrap_or(self.default_thumbnail_size)
    }
}

/// Links for one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Local path or name of the image that was sent.
    pub filename: String,
    pub page_url: String,
    pub thumbnail_url: String,
}

/// Login for an image host account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl FromStr for Credentials {
    type Err = FramepostError;

    /// Parse `username:password`; the password may itself contain colons.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (username, password) = value.split_once(':').ok_or_else(|| {
            FramepostError::Config("login must be given as username:password".to_string())
        })?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// One image to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// A file on disk, read when the upload is sent.
    File(PathBuf),
    /// Image data already in memory.
    Memory { name: String, bytes: Vec<u8> },
}

impl UploadSource {
    /// Name reported in [`UploadedFile::filename`].
    pub fn display_name(&self) -> String {
        match self {
            UploadSource::File(path) => path.display().to_string(),
            UploadSource::Memory { name, .. } => name.clone(),
        }
    }

    /// Build a multipart part named `upload_name` for this image.
    pub(crate) fn to_part(&self, upload_name: &str) -> Result<Part, FramepostError> {
        let bytes = match self {
            UploadSource::File(path) => fs::read(path)?,
            UploadSource::Memory { bytes, .. } => bytes.clone(),
        };

        Ok(Part::bytes(bytes)
            .file_name(upload_name.to_string())
            .mime_str("image/png")?)
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        UploadSource::File(path)
    }
}

impl From<&str> for UploadSource {
    fn from(path: &str) -> Self {
        UploadSource::File(PathBuf::from(path))
    }
}

/// Construction settings shared by all hosts.
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    pub credentials: Option<Credentials>,
    /// Preferred thumbnail size; ignored if the host does not offer it.
    pub thumbnail_size: Option<u32>,
    /// Alternate site root, mainly for talking to a local test server.
    pub base_url: Option<String>,
}

/// Capability contract every image host implements.
pub trait ImageHost {
    /// Registry name of the host.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> &'static HostCapabilities;

    /// Thumbnail size used for uploads.
    fn thumbnail_size(&self) -> u32;

    /// Upload `files` and return their links in the same order.
    ///
    /// # Errors
    ///
    /// Any non-success HTTP status, transport failure, or page that yields
    /// fewer links than files aborts the whole call.
    fn upload(&mut self, files: &[UploadSource]) -> Result<Vec<UploadedFile>, FramepostError>;

    /// Everything this instance has uploaded so far.
    fn uploaded_files(&self) -> &[UploadedFile];
}

/// Constructor stored in the registry.
pub type HostFactory = fn(HostOptions) -> Result<Box<dyn ImageHost>, FramepostError>;

/// One registered host. Serializes as its name followed by the flattened
/// capabilities.
#[derive(Clone, Copy, Serialize)]
pub struct HostEntry {
    pub name: &'static str,
    #[serde(flatten)]
    pub capabilities: &'static HostCapabilities,
    #[serde(skip)]
    factory: HostFactory,
}

impl HostEntry {
    pub const fn new(
        name: &'static str,
        capabilities: &'static HostCapabilities,
        factory: HostFactory,
    ) -> Self {
        Self {
            name,
            capabilities,
            factory,
        }
    }

    pub fn create(&self, options: HostOptions) -> Result<Box<dyn ImageHost>, FramepostError> {
        (self.factory)(options)
    }
}

impl Display for HostEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let sizes = self
            .capabilities
            .thumbnail_sizes
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "'{}': max {} screenshots; thumbnail sizes: {}",
            self.name, self.capabilities.quantity.max, sizes
        )
    }
}

/// Name-to-constructor table of image hosts.
pub struct HostRegistry {
    entries: Vec<HostEntry>,
    default_name: &'static str,
}

impl HostRegistry {
    /// Empty registry whose default is `default_name`.
    pub fn new(default_name: &'static str) -> Self {
        Self {
            entries: Vec::new(),
            default_name,
        }
    }

    /// Every host shipped with the crate, defaulting to [`DEFAULT_HOST`].
    pub fn builtin() -> Self {
        let mut registry = Self::new(DEFAULT_HOST);
        registry.register(HostEntry::new(
            ImageBam::NAME,
            &imagebam::CAPABILITIES,
            imagebam::create,
        ));
        registry.register(HostEntry::new(
            SomeImage::NAME,
            &someimage::CAPABILITIES,
            someimage::create,
        ));
        registry
    }

    /// Add a host; an entry with the same name is replaced.
    pub fn register(&mut self, entry: HostEntry) {
        self.entries.retain(|existing| existing.name != entry.name);
        self.entries.push(entry);
    }

    /// Hosts in registration order.
    pub fn entries(&self) -> &[HostEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn default_name(&self) -> &'static str {
        self.default_name
    }

    pub fn get(&self, name: &str) -> Result<&HostEntry, FramepostError> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| FramepostError::UnknownHost(name.to_string()))
    }

    pub fn default_entry(&self) -> Result<&HostEntry, FramepostError> {
        self.get(self.default_name)
    }

    pub fn create(
        &self,
        name: &str,
        options: HostOptions,
    ) -> Result<Box<dyn ImageHost>, FramepostError> {
        self.get(name)?.create(options)
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Cookie-keeping client; one per host instance so a login carries over to
/// every later request.
pub(crate) fn session_client() -> Result<Client, FramepostError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(None::<Duration>)
        .build()?)
}

/// Site root with exactly one trailing slash.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Fail with [`FramepostError::UnexpectedStatus`] unless the response is 2xx.
pub(crate) fn ensure_success(response: Response) -> Result<Response, FramepostError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FramepostError::UnexpectedStatus {
            url: response.url().to_string(),
            status,
        })
    }
}

/// Name each image is uploaded under: `image01.png`, `image02.png`, ...
pub(crate) fn upload_name(number: usize) -> String {
    format!("image{number:02}.png")
}

/// All `(page, thumbnail)` capture pairs of `regex` in `html`, in page order.
pub(crate) fn scrape_links(regex: &Regex, html: &str) -> Vec<(String, String)> {
    regex
        .captures_iter(html)
        .map(|captures| (captures[1].to_string(), captures[2].to_string()))
        .collect()
}

/// Zip submitted images with scraped links, requiring one link per image.
pub(crate) fn pair_links(
    host: &str,
    files: &[UploadSource],
    links: Vec<(String, String)>,
) -> Result<Vec<UploadedFile>, FramepostError> {
    if links.len() < files.len() {
        return Err(FramepostError::UnexpectedResponse(format!(
            "{host} returned {} link(s) for {} image(s)",
            links.len(),
            files.len()
        )));
    }

    Ok(files
        .iter()
        .zip(links)
        .map(|(file, (page_url, thumbnail_url))| UploadedFile {
            filename: file.display_name(),
            page_url,
            thumbnail_url,
        })
        .collect())
}
