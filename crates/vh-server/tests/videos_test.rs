//! Video listing and upload over HTTP.

mod common;

use std::time::Duration;

use common::{url, TestHarness};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use vh_db::queries::videos;

fn upload_form(title: &str, file: Option<&[u8]>) -> Form {
    let mut form = Form::new()
        .text("title", title.to_string())
        .text("description", "A short clip")
        .text("genre", "documentary");
    if let Some(bytes) = file {
        form = form.part(
            "original_file",
            Part::bytes(bytes.to_vec()).file_name("holiday.MP4"),
        );
    }
    form
}

#[tokio::test]
async fn list_is_empty_initially() {
    let (_h, addr) = TestHarness::new().serve().await;
    let body: Value = reqwest::get(url(addr, "/api/videos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn list_shape_with_missing_thumbnail() {
    let (h, addr) = TestHarness::new().serve().await;
    let v = videos::create_video(&h.conn(), "My Great Video!", "desc", "videos/originals/a.mp4", "comedy")
        .unwrap();
    videos::set_thumbnail(&h.conn(), v.id, Some("thumbnails/gone.jpg")).unwrap();

    let body: Value = reqwest::get(url(addr, "/api/videos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let item = &body[0];
    assert_eq!(item["id"], v.id.to_string());
    assert_eq!(item["created_at"], v.upload_date);
    assert_eq!(item["title"], "My Great Video!");
    assert_eq!(item["description"], "desc");
    assert_eq!(item["category"], "comedy");
    assert_eq!(item["slug"], "my-great-video");
    assert!(item["thumbnail_url"].is_null());
}

#[tokio::test]
async fn list_thumbnail_url_is_absolute() {
    let (h, addr) = TestHarness::new().serve().await;
    let v = videos::create_video(&h.conn(), "T", "", "videos/originals/a.mp4", "").unwrap();
    h.write_media("thumbnails/t.jpg", b"jpeg");
    videos::set_thumbnail(&h.conn(), v.id, Some("thumbnails/t.jpg")).unwrap();

    let body: Value = reqwest::get(url(addr, "/api/videos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let thumb = body[0]["thumbnail_url"].as_str().unwrap().to_string();
    assert_eq!(thumb, url(addr, "/media/thumbnails/t.jpg"));

    // The URL is actually servable.
    let resp = reqwest::get(&thumb).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"jpeg");
}

#[tokio::test]
async fn list_newest_first() {
    let (h, addr) = TestHarness::new().serve().await;
    let first = videos::create_video(&h.conn(), "First", "", "a.mp4", "").unwrap();
    let second = videos::create_video(&h.conn(), "Second", "", "b.mp4", "").unwrap();

    let body: Value = reqwest::get(url(addr, "/api/videos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body[0]["id"], second.id.to_string());
    assert_eq!(body[1]["id"], first.id.to_string());
}

#[tokio::test]
async fn get_video_by_id() {
    let (h, addr) = TestHarness::new().serve().await;
    let v = videos::create_video(&h.conn(), "Hello World", "", "a.mp4", "news").unwrap();

    let resp = reqwest::get(url(addr, &format!("/api/videos/{}", v.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["slug"], "hello-world");

    let resp = reqwest::get(url(addr, &format!("/api/videos/{}", vh_core::VideoId::new())))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "not_found");

    let resp = reqwest::get(url(addr, "/api/videos/nope")).await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn upload_stores_file_and_record() {
    let (h, addr) = TestHarness::new().serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("Holiday", Some(b"fake video bytes".as_slice())))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["title"], "Holiday");
    assert_eq!(body["description"], "A short clip");
    assert_eq!(body["genre"], "documentary");

    let id: vh_core::VideoId = body["id"].as_str().unwrap().parse().unwrap();
    let stored = videos::get_video(&h.conn(), id).unwrap().unwrap();
    assert!(stored.original_file.starts_with("videos/originals/"));
    assert!(stored.original_file.ends_with(".mp4"));
    assert_eq!(
        body["original_file"],
        url(addr, &format!("/media/{}", stored.original_file))
    );
    assert_eq!(
        std::fs::read(h.media_root().join(&stored.original_file)).unwrap(),
        b"fake video bytes"
    );

    // No encoder: nothing is generated.
    assert_eq!(stored.thumbnail, None);
}

fn stored_originals(h: &TestHarness) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(h.media_root().join("videos/originals")) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn large_upload_is_written_intact() {
    let (h, addr) = TestHarness::new().serve().await;
    let payload: Vec<u8> = (0..3 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();

    let resp = reqwest::Client::new()
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("Big", Some(payload.as_slice())))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();

    let id: vh_core::VideoId = body["id"].as_str().unwrap().parse().unwrap();
    let stored = videos::get_video(&h.conn(), id).unwrap().unwrap();
    let on_disk = std::fs::read(h.media_root().join(&stored.original_file)).unwrap();
    assert_eq!(on_disk.len(), payload.len());
    assert!(on_disk == payload);
    assert_eq!(stored_originals(&h).len(), 1);
}

#[tokio::test]
async fn rejected_upload_leaves_no_file() {
    let (h, addr) = TestHarness::new().serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("", Some(b"bytes".as_slice())))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("Empty", Some(b"".as_slice())))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    assert!(stored_originals(&h).is_empty());
    assert!(videos::list_videos(&h.conn()).unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_record_and_media() {
    let (h, addr) = TestHarness::new().serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("Doomed", Some(b"source".as_slice())))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let id: vh_core::VideoId = body["id"].as_str().unwrap().parse().unwrap();
    let original = h
        .media_root()
        .join(videos::get_video(&h.conn(), id).unwrap().unwrap().original_file);

    let thumb_name = format!("thumbnails/{id}.jpg");
    let thumb = h.write_media(&thumb_name, b"jpeg");
    videos::set_thumbnail(&h.conn(), id, Some(thumb_name.as_str())).unwrap();
    let playlist = h.write_media(&format!("videos/{id}/720p/index.m3u8"), b"#EXTM3U\n");
    h.write_media(&format!("videos/{id}/720p/000.ts"), b"ts");
    videos::set_hls_manifest(&h.conn(), id, vh_core::ResolutionTier::P720, Some(playlist.as_path()))
        .unwrap();

    let resp = client
        .delete(url(addr, &format!("/api/videos/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    assert!(videos::get_video(&h.conn(), id).unwrap().is_none());
    assert!(!original.exists());
    assert!(!thumb.exists());
    assert!(!h.media_root().join(format!("videos/{id}")).exists());
    assert!(h.media_root().join("videos/originals").is_dir());

    let resp = client
        .delete(url(addr, &format!("/api/videos/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(url(addr, "/api/videos/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn upload_requires_title_and_file() {
    let (h, addr) = TestHarness::new().serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("   ", Some(b"bytes".as_slice())))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "validation_error");

    let resp = client
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("Title", None))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    assert!(videos::list_videos(&h.conn()).unwrap().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn upload_triggers_thumbnail_and_hls() {
    let tools_dir = tempfile::tempdir().unwrap();
    let encoder = vh_av::Encoder::new(common::fake_ffmpeg(tools_dir.path()));
    let (h, addr) = TestHarness::with_encoder(Some(encoder)).serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(url(addr, "/api/videos"))
        .multipart(upload_form("Transcoded", Some(b"source".as_slice())))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let id: vh_core::VideoId = body["id"].as_str().unwrap().parse().unwrap();

    let mut done = None;
    for _ in 0..100 {
        let v = videos::get_video(&h.conn(), id).unwrap().unwrap();
        if v.thumbnail.is_some() && v.hls_1080p_manifest.is_some() {
            done = Some(v);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let video = done.expect("transcode did not finish");
    assert_eq!(video.thumbnail, Some(format!("thumbnails/{id}.jpg")));

    let list: Value = reqwest::get(url(addr, "/api/videos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        list[0]["thumbnail_url"],
        url(addr, &format!("/media/thumbnails/{id}.jpg"))
    );

    for tier in ["480p", "720p", "1080p"] {
        let resp = client
            .get(url(addr, &format!("/api/videos/{id}/{tier}/index.m3u8")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "playlist for {tier}");

        let resp = client
            .get(url(addr, &format!("/api/videos/{id}/{tier}/000.ts")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "segment for {tier}");
    }
}
