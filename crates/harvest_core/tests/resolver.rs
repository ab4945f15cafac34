use std::path::PathBuf;

use harvest_core::{
    kind_for, DestinationResolver, DownloadResult, MediaKind, Profile, RawItem, RunSummary,
    SeedKind,
};
use pretty_assertions::assert_eq;

fn profile() -> Profile {
    Profile::new("7", "Someone", "@someone", "https://cdn/p.jpg", "", "https://x.com/someone")
}

#[test]
fn video_items_land_in_collection_video_folder() {
    let resolver = DestinationResolver::new("/data", "x");
    let item = RawItem::new("123", "https://video.cdn/v/123.mp4?tag=1").in_collection("posts");
    let kind = kind_for(&item);
    let dest = resolver.resolve(&profile(), &item, kind);

    assert_eq!(kind, MediaKind::Video);
    assert_eq!(dest.folder, PathBuf::from("/data/x/someone/posts/videos"));
    assert_eq!(dest.filename, "123.mp4");
}

#[test]
fn hint_beats_url_extension() {
    let resolver = DestinationResolver::new("root", "threads");
    let item = RawItem::new("9", "https://cdn/img.webp?x=1").with_extension("jpg");
    let dest = resolver.resolve(&profile(), &item, MediaKind::Image);

    assert_eq!(dest.filename, "9.jpg");
    assert_eq!(dest.folder, PathBuf::from("root/threads/someone/images"));
}

#[test]
fn explicit_filename_is_sanitized_and_kept() {
    let resolver = DestinationResolver::new("root", "pixiv");
    let item = RawItem::new("5", "https://cdn/a.png")
        .named("55_p0.png")
        .in_collection("mangas/My: Title?");
    let dest = resolver.resolve(&profile(), &item, MediaKind::Image);

    assert_eq!(dest.filename, "55_p0.png");
    assert_eq!(
        dest.folder,
        PathBuf::from("root/pixiv/someone/mangas_My_ Title/images")
    );
}

#[test]
fn empty_id_gets_deterministic_hashed_name() {
    let resolver = DestinationResolver::new("root", "x");
    let a = RawItem::new("", "https://cdn/one/photo");
    let b = RawItem::new("", "https://cdn/two/photo");

    let first = resolver.resolve(&profile(), &a, MediaKind::Image);
    let again = resolver.resolve(&profile(), &a, MediaKind::Image);
    let other = resolver.resolve(&profile(), &b, MediaKind::Image);

    assert!(first.filename.starts_with("item-"));
    assert!(first.filename.ends_with(".jpg"));
    assert_eq!(first, again);
    assert_ne!(first.filename, other.filename);
}

#[test]
fn profile_without_username_falls_back_to_id_then_unknown() {
    let resolver = DestinationResolver::new("root", "x");
    let by_id = Profile::new("77", "", "", "", "", "");
    let anonymous = Profile::default();

    assert_eq!(resolver.profile_folder(&by_id), PathBuf::from("root/x/77"));
    assert_eq!(
        resolver.profile_folder(&anonymous),
        PathBuf::from("root/x/unknown")
    );
}

#[test]
fn seeds_live_in_profile_root() {
    let resolver = DestinationResolver::new("root", "deviantart");
    let dest = resolver.seed(&profile(), SeedKind::Header);

    assert_eq!(dest.path(), PathBuf::from("root/deviantart/someone/profile_header.jpg"));
}

#[test]
fn summary_serializes_with_wire_field_names() {
    let summary = RunSummary::new(
        profile(),
        Some(2),
        vec![
            DownloadResult::downloaded("a.jpg"),
            DownloadResult::error("b.jpg", "boom"),
        ],
    );
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["status"], true);
    assert_eq!(json["total_requested"], 2);
    assert_eq!(json["total_processed"], 2);
    assert_eq!(json["profile"]["username"], "someone");
    assert_eq!(
        json["downloads"][0],
        serde_json::json!({"status": "downloaded", "fileName": "a.jpg"})
    );
    assert_eq!(
        json["downloads"][1],
        serde_json::json!({"status": "error", "fileName": "b.jpg", "error": "boom"})
    );
}

#[test]
fn ids_differing_only_in_forbidden_characters_get_distinct_files() {
    let resolver = DestinationResolver::new("/s", "x");
    let colon = RawItem::new("a:b", "https://cdn/one");
    let question = RawItem::new("a?b", "https://cdn/two");

    let first = resolver.resolve(&profile(), &colon, MediaKind::Image);
    let second = resolver.resolve(&profile(), &question, MediaKind::Image);

    assert_ne!(first.path(), second.path());
    assert!(first.filename.starts_with("a_b--"));
    assert!(first.filename.ends_with(".jpg"));
}

#[test]
fn long_ids_differing_past_the_length_limit_get_distinct_files() {
    let resolver = DestinationResolver::new("/s", "x");
    let base = "7".repeat(90);
    let a = RawItem::new(format!("{base}a"), "https://cdn/a");
    let b = RawItem::new(format!("{base}b"), "https://cdn/b");

    let first = resolver.resolve(&profile(), &a, MediaKind::Image);
    let second = resolver.resolve(&profile(), &b, MediaKind::Image);

    assert_ne!(first.filename, second.filename);
    assert_eq!(
        first,
        resolver.resolve(&profile(), &a, MediaKind::Image),
        "resolution stays deterministic"
    );
}

#[test]
fn clean_ids_keep_their_plain_name() {
    let resolver = DestinationResolver::new("/s", "x");
    let item = RawItem::new("1789_p0", "https://cdn/a.png");

    let dest = resolver.resolve(&profile(), &item, MediaKind::Image);

    assert_eq!(dest.filename, "1789_p0.png");
}

#[test]
fn altered_explicit_names_keep_their_extension_last() {
    let resolver = DestinationResolver::new("/s", "x");
    let a = RawItem::new("1", "https://cdn/a").named("cover:1.png");
    let b = RawItem::new("2", "https://cdn/b").named("cover?1.png");

    let first = resolver.resolve(&profile(), &a, MediaKind::Image);
    let second = resolver.resolve(&profile(), &b, MediaKind::Image);

    assert_ne!(first.filename, second.filename);
    assert!(first.filename.starts_with("cover_1--"));
    assert!(first.filename.ends_with(".png"));
}
