//! Shared helpers: a stand-in `ffmpeg` shell script and a loopback image host.
//!
//! The script answers `-version` with a banner, `-i <file>` with a
//! `Duration:` line on stderr, and anything else by touching its last
//! argument (the output file). Every invocation is appended to `calls.log`
//! next to the script.

#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use framepost::HostOptions;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub struct FakeFfmpeg {
    pub banner: &'static str,
    pub version_status: i32,
    pub duration: Option<&'static str>,
    pub writes_frames: bool,
}

impl Default for FakeFfmpeg {
    fn default() -> Self {
        Self {
            banner: "ffmpeg version 6.1-fake Copyright (c) 2000-2023 the FFmpeg developers",
            version_status: 0,
            duration: Some("00:01:30.00"),
            writes_frames: true,
        }
    }
}

impl FakeFfmpeg {
    /// Write the script into `directory` and return its path.
    #[cfg(unix)]
    pub fn install(&self, directory: &Path) -> PathBuf {
        let duration_line = match self.duration {
            Some(duration) => {
                format!("echo \"  Duration: {duration}, start: 0.000000, bitrate: 1200 kb/s\" >&2")
            }
            None => "echo \"could not find codec parameters\" >&2".to_string(),
        };
        let write_frame = if self.writes_frames {
            "for last; do :; done\ntouch \"$last\""
        } else {
            ":"
        };

        let script = format!(
            "#!/bin/sh\n\
printf '%s\\n' \"$*\" >> \"$(dirname \"$0\")/calls.log\"\n\
case \"$1\" in\n\
  -version)\n    echo \"{banner}\"\n    exit {status}\n    ;;\n\
  -i)\n    {duration_line}\n    exit 1\n    ;;\n\
esac\n\
{write_frame}\n\
exit 0\n",
            banner = self.banner,
            status = self.version_status,
        );

        let path = directory.join("ffmpeg");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

/// Argument lines the fake tool in `directory` was called with.
pub fn calls(directory: &Path) -> Vec<String> {
    fs::read_to_string(directory.join("calls.log"))
        .map(|log| log.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

// ── Image host stand-in ────────────────────────────────────────────

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

impl Request {
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

type Handler = dyn Fn(&Request) -> (u16, String) + Send + Sync;

/// Loopback HTTP server answering every request through a handler.
///
/// Requests are recorded in arrival order.
pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl TestServer {
    pub fn start(handler: impl Fn(&Request) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                if let Some(request) = read_request(&stream) {
                    let (status, body) = handler(&request);
                    recorded.lock().unwrap().push(request);
                    write_response(stream, status, &body);
                }
            }
        });

        Self { base_url, requests }
    }

    pub fn options(&self) -> HostOptions {
        HostOptions {
            base_url: Some(self.base_url.clone()),
            ..HostOptions::default()
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(Request::line).collect()
    }
}

fn read_request(stream: &TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0;
    let mut chunked = false;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        let (name, value) = header.split_once(':')?;
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().ok()?;
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            chunked = value.eq_ignore_ascii_case("chunked");
        }
    }

    let mut body = Vec::new();
    if chunked {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).ok()?;
            let size = usize::from_str_radix(size_line.trim(), 16).ok()?;
            let mut chunk = vec![0; size + 2];
            reader.read_exact(&mut chunk).ok()?;
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    } else {
        body.resize(content_length, 0);
        reader.read_exact(&mut body).ok()?;
    }

    Some(Request { method, path, body })
}

fn write_response(mut stream: TcpStream, status: u16, body: &str) {
    let reason = if status < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
