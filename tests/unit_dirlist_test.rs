use filetime::FileTime;
use homeserve::core::commands::ListOrder;
use homeserve::core::index::{list_directories, render_listing};
use homeserve::core::ServeError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn make_dir(root: &Path, name: &str, mtime_secs: i64) {
    let path = root.join(name);
    fs::create_dir(&path).unwrap();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime_secs, 0)).unwrap();
}

#[test]
fn test_alphabetical_is_case_insensitive() {
    let tmp = TempDir::new().unwrap();
    make_dir(tmp.path(), "banana", 100);
    make_dir(tmp.path(), "Apple", 200);
    make_dir(tmp.path(), "cherry", 300);

    let entries = list_directories(tmp.path(), ListOrder::Alphabetical).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Apple", "banana", "cherry"]);
}

#[test]
fn test_alphabetical_rendering_is_bare_names() {
    let tmp = TempDir::new().unwrap();
    make_dir(tmp.path(), "docs", 100);

    let entries = list_directories(tmp.path(), ListOrder::Alphabetical).unwrap();
    let lines = render_listing(&entries, ListOrder::Alphabetical);
    assert_eq!(lines, ["docs"]);
}

#[test]
fn test_recency_is_descending_by_mtime() {
    let tmp = TempDir::new().unwrap();
    make_dir(tmp.path(), "oldest", 1_000_000);
    make_dir(tmp.path(), "newest", 3_000_000);
    make_dir(tmp.path(), "middle", 2_000_000);

    let entries = list_directories(tmp.path(), ListOrder::RecencyDescending).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["newest", "middle", "oldest"]);
}

#[test]
fn test_recency_rendering_carries_timestamp_then_name() {
    let tmp = TempDir::new().unwrap();
    make_dir(tmp.path(), "projects", 1_700_000_000);

    let entries = list_directories(tmp.path(), ListOrder::RecencyDescending).unwrap();
    let lines = render_listing(&entries, ListOrder::RecencyDescending);
    assert_eq!(lines.len(), 1);
    // "YYYY-MM-DD HH:MM:SS - projects"
    let (timestamp, name) = lines[0].split_once(" - ").unwrap();
    assert_eq!(name, "projects");
    assert_eq!(timestamp.len(), 19);
    assert_eq!(&timestamp[4..5], "-");
    assert_eq!(&timestamp[13..14], ":");
}

#[test]
fn test_listing_is_non_recursive_and_skips_files() {
    let tmp = TempDir::new().unwrap();
    make_dir(tmp.path(), "top", 100);
    fs::create_dir(tmp.path().join("top").join("nested")).unwrap();
    fs::write(tmp.path().join("a_file.txt"), b"not a dir").unwrap();

    let entries = list_directories(tmp.path(), ListOrder::Alphabetical).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["top"]);
}

#[test]
fn test_missing_root_is_resource_error() {
    let tmp = TempDir::new().unwrap();
    let gone = tmp.path().join("does-not-exist");
    let err = list_directories(&gone, ListOrder::Alphabetical).unwrap_err();
    assert!(matches!(err, ServeError::Resource(_)));
}

#[test]
fn test_empty_root_lists_nothing() {
    let tmp = TempDir::new().unwrap();
    let entries = list_directories(tmp.path(), ListOrder::Alphabetical).unwrap();
    assert!(entries.is_empty());
}
