//! HTML report of uploaded screenshots.
//!
//! [`HtmlReport`] collects one section per input file and renders a single
//! static page: per section, three text areas holding every link of the
//! section in HTML, BBcode, and plain URL form, followed by one boxed preview
//! per screenshot with its own copyable inputs.
//!
//! # Example
//!
//! ```no_run
//! use framepost::{HtmlReport, InputFile};
//!
//! let input = InputFile::new("episode.mkv");
//! let mut report = HtmlReport::new("out/out.html");
//! report.add_section(&input);
//! report.write()?;
//! # Ok::<(), framepost::FramepostError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FramepostError;
use crate::markup::{to_bbcode, to_html, to_url};
use crate::media::{InputFile, Screenshot};

/// File name of the report inside the output directory.
pub const REPORT_FILE_NAME: &str = "out.html";

type Formatter = fn(&str, &str) -> String;

const SECTION_FORMATS: [(&str, Formatter); 3] =
    [("HTML", to_html), ("BBcode", to_bbcode), ("URLs", to_url)];

const PREVIEW_FORMATS: [(&str, Formatter); 3] =
    [("HTML", to_html), ("BBcode", to_bbcode), ("URL", to_url)];

const HEADER: &str = concat!(
    "<?xml version=\"1.0\"?>\n<html>\n<head>\n<style>\n",
    ".box-shadow {\n",
    "  -moz-box-shadow: 3px 3px 5px #000000;\n",
    "  -webkit-box-shadow: 3px 3px 5px #000000;\n",
    "  box-shadow: 3px 3px 5px #000000;\n",
    "}\n",
    "</style>\n</head>\n<body>\n",
);

const FOOTER: &str = "\n</body>\n</html>\n";

/// Value snapshot of one uploaded screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotInfo {
    pub timecode: Option<String>,
    pub page_url: String,
    pub thumbnail_url: String,
}

impl From<&Screenshot> for ScreenshotInfo {
    /// A zero timecode means the position was never known and gets no label.
    fn from(screenshot: &Screenshot) -> Self {
        let timecode = screenshot.timecode();
        Self {
            timecode: (timecode.seconds() > 0).then(|| timecode.to_string()),
            page_url: screenshot.page_url().unwrap_or_default().to_string(),
            thumbnail_url: screenshot.thumbnail_url().unwrap_or_default().to_string(),
        }
    }
}

/// Screenshots of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub filename: String,
    pub screenshots: Vec<ScreenshotInfo>,
}

/// Append-only collection of sections, written to disk once.
#[derive(Debug, Clone)]
pub struct HtmlReport {
    path: PathBuf,
    sections: Vec<ReportSection>,
}

impl HtmlReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sections: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    /// Snapshot the current screenshots of `input` into a new section.
    pub fn add_section(&mut self, input: &InputFile) {
        let screenshots = input.screenshots().iter().map(ScreenshotInfo::from).collect();

        self.push_section(ReportSection {
            filename: input.filename().to_string(),
            screenshots,
        });
    }

    pub fn push_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    /// Render the whole document.
    pub fn render(&self) -> String {
        let mut html = String::from(HEADER);

        for section in &self.sections {
            html.push_str(&format!(
                "<font size='5' style='font-weight:bold;'>{}</font>\n<hr width='100%'>\n",
                section.filename
            ));

            html.push_str("<table style='width:0%;'><td>\n");
            for (name, format) in SECTION_FORMATS {
                html.push_str(&text_area(name, &section.screenshots, format));
            }
            html.push_str("</table>\n");

            for info in &section.screenshots {
                html.push_str(&format!(
                    "<table class=box-shadow style='position:relative;'>\n<tr><td rowspan=2>{}</td>",
                    to_html(&info.page_url, &info.thumbnail_url)
                ));

                if let Some(timecode) = &info.timecode {
                    html.push_str(&format!(
                        "<td><font style='font-weight:bold; position: absolute; right:0px;'>{timecode}</font></td>"
                    ));
                }

                html.push_str("</tr>\n<tr><td>\n");
                for (name, format) in PREVIEW_FORMATS {
                    html.push_str(&input_box(
                        name,
                        &format(&info.page_url, &info.thumbnail_url),
                    ));
                }
                html.push_str("</td></tr>\n</table>\n");
            }
        }

        html.push_str(FOOTER);
        html
    }

    /// Write the rendered document to [`path`](HtmlReport::path), replacing
    /// any previous file.
    pub fn write(&self) -> Result<(), FramepostError> {
        fs::write(&self.path, self.render())?;
        log::info!("Wrote report {}", self.path.display());
        Ok(())
    }
}

fn text_area(name: &str, screenshots: &[ScreenshotInfo], format: Formatter) -> String {
    let links = screenshots
        .iter()
        .map(|info| format(&info.page_url, &info.thumbnail_url))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "<td>\n<b>{name}</b><br />\n\
<textarea onclick='this.select();' style='width:300px; height:200px;'>\n\
{links}\n</textarea>\n</td>\n"
    )
}

fn input_box(name: &str, link: &str) -> String {
    format!(
        "<div>{name}</div>\n\
<div><input style='width:350px;' type='text' onClick='this.select();' value='{link}' /></div>\n"
    )
}
