// 通过公开的保存 / 清理接口，在临时目录上验证端到端行为。
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use base64::{Engine as _, engine::general_purpose};
use image_store::{ImageSource, ImageStore, StoreConfig, StoreError};

fn store_in(dir: &Path) -> ImageStore {
    ImageStore::new(StoreConfig::with_images_dir(dir)).expect("store init failed")
}

fn serve_once(status_line: &'static str, body: Vec<u8>) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
    let port = listener.local_addr().expect("read local addr failed").port();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept failed");

        let mut req_buf = [0u8; 1024];
        let _ = stream.read(&mut req_buf);

        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line,
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body);
        let _ = stream.flush();
    });

    (port, server)
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read dir failed").count()
}

#[tokio::test]
async fn data_uri_round_trips_decoded_bytes() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);
    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let data = format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(&payload));

    let path = store.save_image(&data, "round").await.expect("save failed");

    assert_eq!(path.as_deref(), Some("/resource/image/audio/round.png"));
    assert_eq!(std::fs::read(images.join("round.png")).expect("read failed"), payload);
}

#[tokio::test]
async fn wrapped_and_url_safe_data_uris_are_written() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);

    let wrapped = store
        .save_image("data:image/png;base64,aGVs\nbG8=", "wrapped")
        .await
        .expect("save failed");
    let url_safe = store
        .save_image("data:image/png;base64,_-8=", "urlsafe")
        .await
        .expect("save failed");

    assert_eq!(wrapped.as_deref(), Some("/resource/image/audio/wrapped.png"));
    assert_eq!(url_safe.as_deref(), Some("/resource/image/audio/urlsafe.png"));
    assert_eq!(std::fs::read(images.join("wrapped.png")).expect("read failed"), b"hello");
    assert_eq!(std::fs::read(images.join("urlsafe.png")).expect("read failed"), [0xff, 0xef]);
}

#[tokio::test]
async fn malformed_data_uri_is_absent_and_writes_nothing() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);

    let path = store
        .save_image("data:image/png;base64iVBORw0KGgo=", "broken")
        .await
        .expect("mismatch must not be an error");

    assert_eq!(path, None);
    assert!(!images.exists());

    let typed = store
        .save(ImageSource::classify("data:image/png;base64iVBORw0KGgo="), "broken")
        .await;
    assert!(matches!(typed, Err(StoreError::InvalidFormat(_))));
}

#[tokio::test]
async fn missing_local_file_is_absent_but_dir_is_created() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);
    let missing = tmp.path().join("nowhere.png");

    let path = store
        .save_image(&format!("file://{}", missing.display()), "local")
        .await
        .expect("remote branch never errors");

    assert_eq!(path, None);
    assert!(images.is_dir());
    assert_eq!(file_count(&images), 0);
}

#[tokio::test]
async fn http_404_is_absent_and_leaves_no_file() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);
    let (port, server) = serve_once("404 Not Found", b"missing".to_vec());

    let path = store
        .save_image(&format!("http://127.0.0.1:{}/gone.png", port), "gone")
        .await
        .expect("remote branch never errors");
    server.join().expect("server thread failed");

    assert_eq!(path, None);
    assert!(!images.join("gone.png").exists());
}

#[tokio::test]
async fn http_200_streams_to_png_and_returns_resource_path() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);
    let body = b"\x89PNG\r\n\x1a\nfake-image-body".to_vec();
    let (port, server) = serve_once("200 OK", body.clone());

    let path = store
        .save_image(&format!("http://127.0.0.1:{}/pic.jpg?size=large", port), "pic")
        .await
        .expect("save failed");
    server.join().expect("server thread failed");

    assert_eq!(path.as_deref(), Some("/resource/image/audio/pic.png"));
    assert_eq!(std::fs::read(images.join("pic.png")).expect("read failed"), body);
}

#[tokio::test]
async fn delete_images_empties_dir_but_keeps_it() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);

    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        store
            .save(ImageSource::Binary(vec![i as u8; 8]), name)
            .await
            .expect("save failed");
    }
    assert_eq!(file_count(&images), 3);

    let removed = store.delete_images().await.expect("delete failed");

    assert_eq!(removed, 3);
    assert!(images.is_dir());
    assert_eq!(file_count(&images), 0);
}

#[tokio::test]
async fn delete_images_without_dir_is_noop() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("never");
    let store = store_in(&images);

    assert_eq!(store.delete_images().await.expect("delete failed"), 0);
    assert!(!images.exists());
}

#[tokio::test]
async fn saving_same_name_twice_keeps_second_content() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);

    store.save_image("first payload", "dup").await.expect("first save failed");
    let path = store.save_image("2nd", "dup").await.expect("second save failed");

    assert_eq!(path.as_deref(), Some("/resource/image/audio/dup.png"));
    assert_eq!(std::fs::read(images.join("dup.png")).expect("read failed"), b"2nd");
    assert_eq!(file_count(&images), 1);
}

#[tokio::test]
async fn binary_string_uses_single_byte_mapping() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);

    store
        .save_image("\u{89}PNG\u{ff}", "bin")
        .await
        .expect("save failed");

    assert_eq!(
        std::fs::read(images.join("bin.png")).expect("read failed"),
        vec![0x89, b'P', b'N', b'G', 0xff]
    );
}

#[tokio::test]
async fn concurrent_saves_with_distinct_names_are_independent() {
    let tmp = tempfile::tempdir().expect("create temp dir failed");
    let images = tmp.path().join("images");
    let store = store_in(&images);

    let (a, b) = tokio::join!(
        store.save(ImageSource::Binary(b"aaa".to_vec()), "left"),
        store.save(ImageSource::Binary(b"bbb".to_vec()), "right"),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(std::fs::read(images.join("left.png")).expect("read failed"), b"aaa");
    assert_eq!(std::fs::read(images.join("right.png")).expect("read failed"), b"bbb");
}
