//! Image host integration tests.
//!
//! Each test starts a throwaway HTTP server on a loopback port that answers
//! with canned pages shaped like the real sites, and points the host at it
//! through `HostOptions::base_url`.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::TestServer;
use framepost::{
    Credentials, FramepostError, HostOptions, HostRegistry, ImageHost, UploadSource,
};

fn memory_image(name: &str) -> UploadSource {
    UploadSource::Memory {
        name: name.to_string(),
        bytes: b"\x89PNG fake image data".to_vec(),
    }
}

fn imagebam_page(ids: &[&str]) -> String {
    ids.iter()
        .map(|id| {
            format!(
                "<input type='text' value='[URL=http://www.imagebam.com/image/{id}][IMG]http://thumbs.imagebam.com/{id}_t.jpg[/IMG][/URL]' />\n"
            )
        })
        .collect()
}

fn someimage_page(ids: &[&str]) -> String {
    let bbcode = ids
        .iter()
        .map(|id| format!("[URL=http://someimage.com/{id}][IMG]http://t1.someimage.com/{id}.png[/IMG][/URL]"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("<html><textarea>{bbcode}</textarea></html>")
}

// ── imagebam ───────────────────────────────────────────────────────

#[test]
fn imagebam_uploads_all_files_in_one_request() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/sys/upload/save" => (200, imagebam_page(&["aa11", "bb22"])),
        _ => (404, String::new()),
    });

    let registry = HostRegistry::builtin();
    let mut host = registry.create("imagebam", server.options()).unwrap();
    let uploaded = host
        .upload(&[memory_image("first.png"), memory_image("second.png")])
        .unwrap();

    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded[0].filename, "first.png");
    assert_eq!(uploaded[0].page_url, "http://www.imagebam.com/image/aa11");
    assert_eq!(uploaded[1].filename, "second.png");
    assert_eq!(uploaded[1].thumbnail_url, "http://thumbs.imagebam.com/bb22_t.jpg");
    assert_eq!(host.uploaded_files(), uploaded.as_slice());

    assert_eq!(server.request_lines(), ["POST /sys/upload/save"]);
    let body = server.requests()[0].body_text();
    assert!(body.contains("name=\"thumb_size\"\r\n\r\n180\r\n"));
    assert!(body.contains("name=\"file[]\"; filename=\"image01.png\""));
    assert!(body.contains("name=\"file[]\"; filename=\"image02.png\""));
}

#[test]
fn imagebam_logs_in_once_per_instance() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/login" => (200, "welcome".to_string()),
        "/sys/upload/save" => (200, imagebam_page(&["cc33"])),
        _ => (404, String::new()),
    });

    let options = HostOptions {
        credentials: Some("bob:s3cret".parse::<Credentials>().unwrap()),
        ..server.options()
    };
    let mut host = HostRegistry::builtin().create("imagebam", options).unwrap();
    host.upload(&[memory_image("a.png")]).unwrap();
    host.upload(&[memory_image("b.png")]).unwrap();

    assert_eq!(
        server.request_lines(),
        ["POST /login", "POST /sys/upload/save", "POST /sys/upload/save"]
    );
    let login = server.requests()[0].body_text();
    assert!(login.contains("nick=bob"));
    assert!(login.contains("pw=s3cret"));
    assert_eq!(host.uploaded_files().len(), 2);
}

#[test]
fn imagebam_error_status_fails_upload() {
    let server = TestServer::start(|_| (500, "down".to_string()));

    let mut host = HostRegistry::builtin()
        .create("imagebam", server.options())
        .unwrap();
    let result = host.upload(&[memory_image("a.png")]);

    assert!(matches!(
        result,
        Err(FramepostError::UnexpectedStatus { status, .. }) if status.as_u16() == 500
    ));
    assert!(host.uploaded_files().is_empty());
}

#[test]
fn imagebam_page_without_enough_links_fails_upload() {
    let server = TestServer::start(|_| (200, imagebam_page(&["only1"])));

    let mut host = HostRegistry::builtin()
        .create("imagebam", server.options())
        .unwrap();
    let result = host.upload(&[memory_image("a.png"), memory_image("b.png")]);

    assert!(matches!(result, Err(FramepostError::UnexpectedResponse(_))));
}

#[test]
fn imagebam_reads_files_from_disk() {
    let server = TestServer::start(|_| (200, imagebam_page(&["dd44"])));
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("shot.png");
    std::fs::write(&path, b"png bytes on disk").unwrap();

    let mut host = HostRegistry::builtin()
        .create("imagebam", server.options())
        .unwrap();
    let uploaded = host.upload(&[UploadSource::from(path.clone())]).unwrap();

    assert_eq!(uploaded[0].filename, path.display().to_string());
    assert!(server.requests()[0].body_text().contains("png bytes on disk"));
}

// ── someimage ──────────────────────────────────────────────────────

#[test]
fn someimage_posts_each_file_then_reads_done_page() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/" => (200, "front page".to_string()),
        "/upload.php" => (200, "ok".to_string()),
        "/done" => (200, someimage_page(&["aB3", "xY9"])),
        _ => (404, String::new()),
    });

    let options = HostOptions {
        thumbnail_size: Some(250),
        ..server.options()
    };
    let mut host = HostRegistry::builtin().create("someimage", options).unwrap();
    let uploaded = host
        .upload(&[memory_image("one.png"), memory_image("two.png")])
        .unwrap();

    assert_eq!(
        server.request_lines(),
        ["GET /", "POST /upload.php", "POST /upload.php", "GET /done"]
    );
    let first_post = server.requests()[1].body_text();
    assert!(first_post.contains("name=\"name\"\r\n\r\nimage01.png\r\n"));
    assert!(first_post.contains("name=\"thumb\"\r\n\r\nw250\r\n"));

    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded[0].page_url, "http://someimage.com/aB3");
    assert_eq!(uploaded[1].thumbnail_url, "http://t1.someimage.com/xY9.png");
}

#[test]
fn someimage_login_replaces_anonymous_visit() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/index.php" => (200, "logged in".to_string()),
        "/upload.php" => (200, "ok".to_string()),
        "/done" => (200, someimage_page(&["q1"])),
        _ => (404, String::new()),
    });

    let options = HostOptions {
        credentials: Some("alice:pw".parse::<Credentials>().unwrap()),
        ..server.options()
    };
    let mut host = HostRegistry::builtin().create("someimage", options).unwrap();
    host.upload(&[memory_image("one.png")]).unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].line(), "POST /index.php");
    let login = requests[0].body_text();
    assert!(login.contains("act=takelogin"));
    assert!(login.contains("username=alice"));
}

#[test]
fn someimage_changed_done_page_fails_upload() {
    let server = TestServer::start(|request| match request.path.as_str() {
        "/done" => (200, "<html>redesigned</html>".to_string()),
        _ => (200, "ok".to_string()),
    });

    let mut host = HostRegistry::builtin()
        .create("someimage", server.options())
        .unwrap();
    let result = host.upload(&[memory_image("one.png")]);

    assert!(matches!(result, Err(FramepostError::UnexpectedResponse(_))));
}

#[test]
fn someimage_second_upload_gets_its_own_links() {
    // The done page lists every image posted in the session so far.
    let posted = AtomicUsize::new(0);
    let server = TestServer::start(move |request| match request.path.as_str() {
        "/upload.php" => {
            posted.fetch_add(1, Ordering::SeqCst);
            (200, "ok".to_string())
        }
        "/done" => {
            let ids = ["img1", "img2", "img3"];
            (200, someimage_page(&ids[..posted.load(Ordering::SeqCst)]))
        }
        _ => (200, "front page".to_string()),
    });

    let mut host = HostRegistry::builtin()
        .create("someimage", server.options())
        .unwrap();
    let first = host.upload(&[memory_image("one.png")]).unwrap();
    let second = host
        .upload(&[memory_image("two.png"), memory_image("three.png")])
        .unwrap();

    assert_eq!(first[0].page_url, "http://someimage.com/img1");
    assert_eq!(second[0].filename, "two.png");
    assert_eq!(second[0].page_url, "http://someimage.com/img2");
    assert_eq!(second[1].page_url, "http://someimage.com/img3");

    let pages = host
        .uploaded_files()
        .iter()
        .map(|file| file.page_url.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        pages,
        [
            "http://someimage.com/img1",
            "http://someimage.com/img2",
            "http://someimage.com/img3"
        ]
    );
}
