//! Run settings: config file, command-line overrides, and validation.
//!
//! Settings come in layers. A [`SettingsLayer`] holds whatever one source
//! specified (every field optional); the command line is layered over the
//! config file, which is layered over built-in defaults. [`Settings::resolve`]
//! merges the layers and checks the result against the chosen host's
//! [`HostCapabilities`](crate::HostCapabilities) before any work starts.
//!
//! The config file is YAML with a single `framepost:` section:
//!
//! ```yaml
//! framepost:
//!   output_dir: /tmp/shots
//!   screenshot_amount: 6
//!   image_host: someimage
//!   thumbnail_size: 250
//!   show: bbcode
//!   host_url: https://mirror.example.net
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::configuration::ExtractOptions;
use crate::error::FramepostError;
use crate::ffmpeg::{FfmpegTool, default_ffmpeg_command};
use crate::host::{Credentials, HostOptions, HostRegistry};
use crate::markup::LinkFormat;

/// Name of the config file section holding the settings.
pub const CONFIG_SECTION: &str = "framepost";

/// Screenshots per input file when nothing else is configured.
pub const DEFAULT_SCREENSHOT_AMOUNT: u32 = 3;

/// Output directory (under the working directory) when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "framepost_out";

/// Settings from one source. `None` means "not specified here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsLayer {
    pub output_dir: Option<PathBuf>,
    pub screenshot_amount: Option<u32>,
    pub no_upload: Option<bool>,
    pub image_host: Option<String>,
    pub thumbnail_size: Option<u32>,
    pub login: Option<String>,
    pub show: Option<String>,
    pub browser: Option<bool>,
    pub frame_accurate: Option<bool>,
    pub ffmpeg_arg: Option<String>,
    pub ffmpeg_command: Option<PathBuf>,
    /// Address the image host is reached at instead of its public site.
    /// Only read from the config file.
    pub host_url: Option<String>,
}

impl SettingsLayer {
    /// Fields set in `self` win; the rest come from `lower`.
    #[must_use]
    pub fn over(self, lower: SettingsLayer) -> SettingsLayer {
        SettingsLayer {
            output_dir: self.output_dir.or(lower.output_dir),
            screenshot_amount: self.screenshot_amount.or(lower.screenshot_amount),
            no_upload: self.no_upload.or(lower.no_upload),
            image_host: self.image_host.or(lower.image_host),
            thumbnail_size: self.thumbnail_size.or(lower.thumbnail_size),
            login: self.login.or(lower.login),
            show: self.show.or(lower.show),
            browser: self.browser.or(lower.browser),
            frame_accurate: self.frame_accurate.or(lower.frame_accurate),
            ffmpeg_arg: self.ffmpeg_arg.or(lower.ffmpeg_arg),
            ffmpeg_command: self.ffmpeg_command.or(lower.ffmpeg_command),
            host_url: self.host_url.or(lower.host_url),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    framepost: Option<SettingsLayer>,
}

/// Config files tried, in order, when none is given explicitly.
pub fn default_config_paths() -> Vec<PathBuf> {
    // ~/.config on every platform, matching other command-line tools rather
    // than the platform's application-support directory.
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };

    vec![
        home.join(".config").join(CONFIG_SECTION).join("config.yml"),
        home.join(format!(".{CONFIG_SECTION}.yml")),
    ]
}

/// Parse config file text. A document without the section yields an empty
/// layer.
pub fn parse_config(contents: &str) -> Result<SettingsLayer, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(SettingsLayer::default());
    }
    let document: ConfigDocument = serde_yaml::from_str(contents)?;
    Ok(document.framepost.unwrap_or_default())
}

fn read_config_file(path: &Path) -> Result<SettingsLayer, FramepostError> {
    let contents = fs::read_to_string(path).map_err(|error| FramepostError::ConfigFile {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;

    parse_config(&contents).map_err(|error| FramepostError::ConfigFile {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

/// Load the config file layer.
///
/// An explicit path must be readable. Otherwise the first existing file of
/// [`default_config_paths`] is used, and having none is fine.
pub fn load_config(explicit: Option<&Path>) -> Result<SettingsLayer, FramepostError> {
    if let Some(path) = explicit {
        log::debug!("Reading config {}", path.display());
        return read_config_file(path);
    }

    match default_config_paths().into_iter().find(|path| path.is_file()) {
        Some(path) => {
            log::debug!("Reading config {}", path.display());
            read_config_file(&path)
        }
        None => Ok(SettingsLayer::default()),
    }
}

/// Fully resolved and validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub screenshot_amount: u32,
    pub no_upload: bool,
    pub image_host: String,
    pub thumbnail_size: u32,
    pub credentials: Option<Credentials>,
    pub show: Option<LinkFormat>,
    pub browser: bool,
    pub frame_accurate: bool,
    pub ffmpeg_arg: Option<String>,
    pub ffmpeg_command: PathBuf,
    pub host_url: Option<String>,
}

impl Settings {
    /// Merge `command_line` over `config_file` over defaults and validate.
    ///
    /// The host defaults to the registry's default host. Screenshot amount
    /// and thumbnail size must be allowed by that host.
    ///
    /// # Errors
    ///
    /// [`FramepostError::UnknownHost`] for an unregistered host name and
    /// [`FramepostError::Config`] for any other invalid value.
    pub fn resolve(
        command_line: SettingsLayer,
        config_file: SettingsLayer,
        registry: &HostRegistry,
    ) -> Result<Settings, FramepostError> {
        let layer = command_line.over(config_file);

        let image_host = layer
            .image_host
            .unwrap_or_else(|| registry.default_name().to_string());
        let host = registry.get(&image_host)?;
        let capabilities = host.capabilities;

        let screenshot_amount = layer.screenshot_amount.unwrap_or(DEFAULT_SCREENSHOT_AMOUNT);
        if !capabilities.quantity.contains(screenshot_amount) {
            return Err(FramepostError::Config(format!(
                "screenshot amount {} is not allowed for '{}' (allowed: {}-{})",
                screenshot_amount,
                host.name,
                capabilities.quantity.min,
                capabilities.quantity.max
            )));
        }

        let thumbnail_size = match layer.thumbnail_size {
            Some(size) if capabilities.supports_thumbnail_size(size) => size,
            Some(size) => {
                return Err(FramepostError::Config(format!(
                    "thumbnail size {} is not allowed for '{}' (allowed: {:?})",
                    size, host.name, capabilities.thumbnail_sizes
                )));
            }
            None => capabilities.default_thumbnail_size,
        };

        let show = layer
            .show
            .map(|value| value.parse::<LinkFormat>().map_err(FramepostError::Config))
            .transpose()?;

        let credentials = layer
            .login
            .map(|login| login.parse::<Credentials>())
            .transpose()?;

        let output_dir = match layer.output_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => std::env::current_dir()?.join(dir),
            None => std::env::current_dir()?.join(DEFAULT_OUTPUT_DIR),
        };

        Ok(Settings {
            output_dir,
            screenshot_amount,
            no_upload: layer.no_upload.unwrap_or(false),
            image_host,
            thumbnail_size,
            credentials,
            show,
            browser: layer.browser.unwrap_or(false),
            frame_accurate: layer.frame_accurate.unwrap_or(false),
            ffmpeg_arg: layer.ffmpeg_arg.filter(|arg| !arg.trim().is_empty()),
            ffmpeg_command: layer.ffmpeg_command.unwrap_or_else(default_ffmpeg_command),
            host_url: layer.host_url.filter(|url| !url.trim().is_empty()),
        })
    }

    pub fn ffmpeg(&self) -> FfmpegTool {
        FfmpegTool::new(&self.ffmpeg_command)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        let options = ExtractOptions::new()
            .with_ffmpeg(self.ffmpeg())
            .with_frame_accurate(self.frame_accurate);
        match &self.ffmpeg_arg {
            Some(args) => options.with_extra_args(args.clone()),
            None => options,
        }
    }

    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            credentials: self.credentials.clone(),
            thumbnail_size: Some(self.thumbnail_size),
            base_url: self.host_url.clone(),
        }
    }
}
