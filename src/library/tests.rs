use super::*;
use crate::config::LibrarySettings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[test]
fn display_title_strips_only_the_last_extension() {
    assert_eq!(display_title("Song.mp3"), "Song");
    assert_eq!(display_title("Artist - Song.live.flac"), "Artist - Song.live");
    assert_eq!(display_title("no-extension"), "no-extension");
    assert_eq!(display_title(".hidden"), ".hidden");
    assert_eq!(display_title("trailing."), "trailing.");
}

#[test]
fn codec_decodes_what_it_encodes() {
    let url = encode("audio/ogg", b"OggS\x00\x02");
    assert!(url.starts_with("data:audio/ogg;base64,"));

    let decoded = decode(&url).unwrap();
    assert_eq!(decoded.media_type, "audio/ogg");
    assert_eq!(decoded.bytes, b"OggS\x00\x02");
}

#[test]
fn codec_rejects_malformed_urls() {
    assert!(matches!(decode("file:///tmp/a.mp3"), Err(CodecError::NotDataUrl)));
    assert!(matches!(decode("data:audio/mpeg;base64"), Err(CodecError::NotDataUrl)));
    assert!(matches!(decode("data:audio/mpeg,plain"), Err(CodecError::NotBase64)));
    assert!(matches!(
        decode("data:audio/mpeg;base64,@@@"),
        Err(CodecError::Base64(_))
    ));
}

#[test]
fn media_type_follows_extension_case_insensitive() {
    assert_eq!(media_type_for(Path::new("/tmp/a.MP3")), "audio/mpeg");
    assert_eq!(media_type_for(Path::new("/tmp/a.flac")), "audio/flac");
    assert_eq!(media_type_for(Path::new("/tmp/a.m4a")), "audio/mp4");
    assert_eq!(
        media_type_for(Path::new("/tmp/a.xyz")),
        "application/octet-stream"
    );
    assert_eq!(media_type_for(Path::new("/tmp/a")), "application/octet-stream");
}

#[test]
fn scan_filters_non_audio_and_sorts_directory_contents() {
    let dir = tempdir().unwrap();

    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

    let found = scan(&[dir.path().to_path_buf()], &LibrarySettings::default());
    let names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["A.ogg".to_string(), "b.MP3".to_string()]);
}

#[test]
fn scan_respects_hidden_and_recursion_settings() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();

    fs::write(dir.path().join(".secret.mp3"), b"x").unwrap();
    fs::write(dir.path().join("top.mp3"), b"x").unwrap();
    fs::write(nested.join("deep.mp3"), b"x").unwrap();

    let settings = LibrarySettings {
        include_hidden: false,
        recursive: false,
        ..LibrarySettings::default()
    };
    let found = scan(&[dir.path().to_path_buf()], &settings);
    assert_eq!(found, vec![dir.path().join("top.mp3")]);

    let found = scan(&[dir.path().to_path_buf()], &LibrarySettings::default());
    assert_eq!(found.len(), 3);
}

#[test]
fn scan_keeps_explicit_file_order_and_skips_missing_paths() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("zz.wav");
    let b = dir.path().join("aa.wav");
    fs::write(&a, b"x").unwrap();
    fs::write(&b, b"x").unwrap();

    let paths: Vec<PathBuf> = vec![a.clone(), dir.path().join("missing.wav"), b.clone()];
    assert_eq!(scan(&paths, &LibrarySettings::default()), vec![a, b]);
}

#[test]
fn load_track_encodes_file_bytes_with_media_type() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Intro.flac");
    fs::write(&path, b"fLaC").unwrap();

    let track = load_track(&path).unwrap();
    assert_eq!(track.name, "Intro.flac");
    assert_eq!(track.media_type, "audio/flac");

    let decoded = decode(&track.payload).unwrap();
    assert_eq!(decoded.bytes, b"fLaC");
}

#[test]
fn import_loads_every_scanned_file_in_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("02 second.mp3"), b"2").unwrap();
    fs::write(dir.path().join("01 first.mp3"), b"1").unwrap();

    let tracks = import(&[dir.path().to_path_buf()], &LibrarySettings::default());
    let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["01 first.mp3", "02 second.mp3"]);
}

#[test]
fn track_serializes_with_wire_field_names() {
    let track = Track::new("a.mp3", "audio/mpeg", "data:audio/mpeg;base64,AA==");
    let value = serde_json::to_value(&track).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "name": "a.mp3",
            "type": "audio/mpeg",
            "data": "data:audio/mpeg;base64,AA=="
        })
    );
}
