use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use framepost::{
    ExtractOptions, FfmpegTool, HostRegistry, HtmlReport, ImageHost, InputFile, OperationType,
    ProgressCallback, ProgressInfo, Settings, SettingsLayer, UploadSource, VersionCheck,
    collect_input_files, logging, prompt_input_path, report::REPORT_FILE_NAME, settings,
};
use indicatif::{ProgressBar, ProgressStyle};

const CLI_AFTER_HELP: &str = "Examples:\n  framepost episode.mkv\n  framepost -n 6 -s bbcode season1/\n  framepost -N -o shots --frame-accurate movie.mp4\n  framepost --hosts --json\n  framepost -I -s html\n  framepost --completions zsh > _framepost";

#[derive(Debug, Parser)]
#[command(
    name = "framepost",
    version,
    about = "Take screenshots of video files and upload them to an image host",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Video files, or directories whose videos should be used.
    inputs: Vec<PathBuf>,

    /// Ask for the video file or directory on the terminal.
    #[arg(short = 'I', long, conflicts_with = "inputs")]
    interactive: bool,

    /// Directory screenshots and the report are written to.
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Screenshots per input file (0 uses the configured default).
    #[arg(short = 'n', long)]
    screenshot_amount: Option<u32>,

    /// Only take screenshots; print their paths instead of uploading.
    #[arg(short = 'N', long)]
    no_upload: bool,

    /// Thumbnail width in pixels (0 uses the host's default).
    #[arg(short = 't', long)]
    thumbnail_size: Option<u32>,

    /// Image host to upload to.
    #[arg(short = 'i', long)]
    image_host: Option<String>,

    /// List the available image hosts and exit.
    #[arg(long)]
    hosts: bool,

    /// Print the host list as JSON.
    #[arg(long, requires = "hosts")]
    json: bool,

    /// Account on the image host, as USER:PASSWORD.
    #[arg(short = 'l', long, value_name = "USER:PASSWORD")]
    login: Option<String>,

    /// Print the links in this format (url, html, bbcode) instead of the report path.
    #[arg(short = 's', long)]
    show: Option<String>,

    /// Open the report in the default browser.
    #[arg(long)]
    browser: bool,

    /// Seek precisely to the requested time (slower).
    #[arg(long)]
    frame_accurate: bool,

    /// Extra arguments passed to ffmpeg when extracting a frame.
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    ffmpeg_arg: Option<String>,

    /// ffmpeg executable to use.
    #[arg(long, value_name = "PATH")]
    ffmpeg: Option<PathBuf>,

    /// Config file to read instead of the default locations.
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show progress bars while taking screenshots and uploading.
    #[arg(long)]
    progress: bool,

    /// Print a shell completion script and exit.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    /// Options given on the command line; zero counts as "not given".
    fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            output_dir: self.output_dir.clone(),
            screenshot_amount: self.screenshot_amount.filter(|&amount| amount != 0),
            no_upload: self.no_upload.then_some(true),
            image_host: self.image_host.clone(),
            thumbnail_size: self.thumbnail_size.filter(|&size| size != 0),
            login: self.login.clone(),
            show: self.show.clone(),
            browser: self.browser.then_some(true),
            frame_accurate: self.frame_accurate.then_some(true),
            ffmpeg_arg: self.ffmpeg_arg.clone(),
            ffmpeg_command: self.ffmpeg.clone(),
            host_url: None,
        }
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
        if let Some(item) = &info.item {
            self.bar.set_message(item.clone());
        }
    }
}

fn warn(message: impl AsRef<str>) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.as_ref().yellow());
}

fn print_hosts(registry: &HostRegistry, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(registry.entries())?);
    } else {
        for entry in registry.entries() {
            println!("{entry}");
        }
    }
    Ok(())
}

fn check_ffmpeg(ffmpeg: &FfmpegTool) -> Result<(), Box<dyn std::error::Error>> {
    match ffmpeg.version()? {
        VersionCheck::Compatible(banner) => {
            log::debug!("Using {banner}");
            Ok(())
        }
        VersionCheck::Unrecognized => {
            warn(format!(
                "{} does not look like ffmpeg; continuing anyway",
                ffmpeg.program().display()
            ));
            Ok(())
        }
        VersionCheck::Failed => Err(format!(
            "'{} -version' exited with an error",
            ffmpeg.program().display()
        )
        .into()),
    }
}

fn take_screenshots(
    inputs: &mut [InputFile],
    settings: &Settings,
    show_progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let base_options = settings.extract_options();

    for input in inputs.iter_mut() {
        let progress = if show_progress {
            Some(Arc::new(TerminalProgress::new()?))
        } else {
            None
        };
        let options: ExtractOptions = match &progress {
            Some(progress) => base_options.clone().with_progress(progress.clone()),
            None => base_options.clone(),
        };

        let results =
            input.make_screenshots(settings.screenshot_amount, &settings.output_dir, &options)?;
        if let Some(progress) = &progress {
            progress.finish();
        }

        let taken = results.iter().flatten().count();
        if taken < results.len() {
            warn(format!(
                "{} of {} screenshots of {} failed",
                results.len() - taken,
                results.len(),
                input.filename()
            ));
        }
    }

    Ok(())
}

fn upload_screenshots(
    host: &mut dyn ImageHost,
    input: &mut InputFile,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = input
        .screenshots()
        .iter()
        .map(|screenshot| UploadSource::File(screenshot.path().to_path_buf()))
        .collect::<Vec<_>>();
    if sources.is_empty() {
        warn(format!("no screenshots of {} to upload", input.filename()));
        return Ok(());
    }

    let uploaded = host.upload(&sources)?;
    for (screenshot, file) in input.screenshots_mut().iter_mut().zip(&uploaded) {
        screenshot.set_links(file);
    }
    Ok(())
}

fn open_in_browser(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let program = "xdg-open";

    Command::new(program).arg(path).spawn().map(|_| ())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "framepost", &mut std::io::stdout());
        return Ok(());
    }

    logging::init_logger(cli.verbose)?;
    let registry = HostRegistry::builtin();

    if cli.hosts {
        return print_hosts(&registry, cli.json);
    }

    let config_file = settings::load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.settings_layer(), config_file, &registry)?;
    fs::create_dir_all(&settings.output_dir)?;

    check_ffmpeg(&settings.ffmpeg())?;

    let mut inputs = if cli.interactive {
        let answer = prompt_input_path(std::io::stdin().lock(), std::io::stderr())?;
        collect_input_files(&[answer])?
    } else {
        collect_input_files(cli.inputs.as_slice())?
    };
    take_screenshots(&mut inputs, &settings, cli.progress)?;

    if settings.no_upload {
        for input in &inputs {
            for screenshot in input.screenshots() {
                println!("{}", screenshot.path().display());
            }
            println!();
        }
        return Ok(());
    }

    let mut host = registry.create(&settings.image_host, settings.host_options())?;
    let mut report = HtmlReport::new(settings.output_dir.join(REPORT_FILE_NAME));
    let progress = if cli.progress {
        Some(TerminalProgress::new()?)
    } else {
        None
    };
    let total = inputs.len() as u64;

    for (current, input) in (1..).zip(inputs.iter_mut()) {
        upload_screenshots(host.as_mut(), input)?;
        report.add_section(input);

        if let Some(progress) = &progress {
            progress.on_progress(&ProgressInfo {
                operation: OperationType::Upload,
                current,
                total,
                item: Some(input.filename().to_string()),
            });
        }
    }
    if let Some(progress) = &progress {
        progress.finish();
    }

    report.write()?;

    if settings.browser {
        if let Err(error) = open_in_browser(report.path()) {
            warn(format!("could not open {}: {error}", report.path().display()));
        }
    }

    match settings.show {
        Some(format) => {
            for input in &inputs {
                for screenshot in input.screenshots() {
                    if let (Some(page_url), Some(thumbnail_url)) =
                        (screenshot.page_url(), screenshot.thumbnail_url())
                    {
                        println!("{}", format.render(page_url, thumbnail_url));
                    }
                }
                println!();
            }
        }
        None => println!("{}", report.path().display()),
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn zero_counts_mean_not_given() {
        let cli = Cli::parse_from(["framepost", "-n", "0", "-t", "0", "a.mkv"]);
        let layer = cli.settings_layer();
        assert_eq!(layer.screenshot_amount, None);
        assert_eq!(layer.thumbnail_size, None);
        assert_eq!(cli.inputs, [PathBuf::from("a.mkv")]);
    }

    #[test]
    fn unset_flags_leave_config_values_alone() {
        let cli = Cli::parse_from(["framepost", "a.mkv"]);
        assert_eq!(cli.settings_layer(), SettingsLayer::default());
    }

    #[test]
    fn flags_map_onto_settings() {
        let cli = Cli::parse_from([
            "framepost",
            "-N",
            "-n",
            "5",
            "-i",
            "someimage",
            "-s",
            "bbcode",
            "--frame-accurate",
            "--ffmpeg-arg",
            "-vf scale=640:-1",
            "--ffmpeg",
            "/opt/ffmpeg",
            "a.mkv",
            "b.mp4",
        ]);
        let layer = cli.settings_layer();
        assert_eq!(layer.no_upload, Some(true));
        assert_eq!(layer.screenshot_amount, Some(5));
        assert_eq!(layer.image_host.as_deref(), Some("someimage"));
        assert_eq!(layer.show.as_deref(), Some("bbcode"));
        assert_eq!(layer.frame_accurate, Some(true));
        assert_eq!(layer.ffmpeg_arg.as_deref(), Some("-vf scale=640:-1"));
        assert_eq!(layer.ffmpeg_command, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(cli.inputs.len(), 2);
    }

    #[test]
    fn interactive_excludes_inputs() {
        assert!(Cli::try_parse_from(["framepost", "-I", "a.mkv"]).is_err());
        let cli = Cli::try_parse_from(["framepost", "--interactive", "-N"]).unwrap();
        assert!(cli.interactive);
        assert!(cli.inputs.is_empty());
    }

    #[test]
    fn json_requires_hosts() {
        assert!(Cli::try_parse_from(["framepost", "--json"]).is_err());
        assert!(Cli::try_parse_from(["framepost", "--hosts", "--json"]).is_ok());
    }
}
