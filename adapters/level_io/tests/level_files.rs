use std::fs;

use dungeon_runner_core::{Level, Tile};
use dungeon_runner_level_io::{
    decode, encode, load_level, open_level, save_level, DecodeError, LevelIoError, PathError,
    SchemaError,
};
use dungeon_runner_system_generator::generate;

fn valid_grid() -> Vec<Vec<u8>> {
    vec![
        vec![1, 1, 1, 1, 1],
        vec![1, 2, 0, 0, 1],
        vec![1, 0, 1, 0, 1],
        vec![1, 0, 0, 3, 1],
        vec![1, 1, 1, 1, 1],
    ]
}

fn document(grid: &[Vec<u8>]) -> String {
    let rows: Vec<String> = grid
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(u8::to_string).collect();
            format!("[{}]", cells.join(","))
        })
        .collect();
    format!(r#"{{"version":1,"name":"demo","grid":[{}]}}"#, rows.join(","))
}

#[test]
fn demo_level_round_trips_through_the_codec() {
    let level = Level::from_ascii(
        ["##########", "#S......E#", "#........#", "##########"],
        "fallback_demo",
    )
    .expect("valid level");
    assert_eq!(level.width(), 10);
    assert_eq!(level.height(), 4);

    let restored = decode(&encode(&level)).expect("round trip");
    assert_eq!(restored.grid(), level.grid());
    assert_eq!(restored.name(), "fallback_demo");
    assert_eq!(restored.find_first(Tile::Start), Some((1, 1).into()));
    assert_eq!(restored.find_first(Tile::Exit), Some((8, 1).into()));
}

#[test]
fn version_two_is_unsupported() {
    assert!(matches!(
        decode(r#"{"version":2,"grid":[[1]]}"#),
        Err(DecodeError::UnsupportedVersion { found }) if found.as_i64() == Some(2)
    ));
}

#[test]
fn two_starts_is_a_schema_error() {
    let mut grid = valid_grid();
    grid[1][2] = 2;
    assert!(matches!(
        decode(&document(&grid)),
        Err(DecodeError::Schema(SchemaError::TileCount {
            tile: Tile::Start,
            found: 2,
            ..
        }))
    ));
}

#[test]
fn save_then_load_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let level = decode(&document(&valid_grid())).expect("valid level");
    let path = dir.path().join("roundtrip.json");

    save_level(&level, &path).expect("save");
    let loaded = load_level(&path).expect("load");

    assert_eq!(loaded, level);
    let codes: Vec<Vec<u8>> = loaded
        .grid()
        .rows()
        .map(|row| row.iter().map(|tile| tile.code()).collect())
        .collect();
    assert_eq!(codes, valid_grid());
}

#[test]
fn unnamed_documents_take_the_file_stem() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("cellar.json");
    fs::write(&path, r#"{"grid":[[2,0,3]]}"#).expect("write");

    assert_eq!(load_level(&path).expect("load").name(), "cellar");
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("missing.json");
    assert!(matches!(
        load_level(&path),
        Err(LevelIoError::NotFound { path: reported }) if reported == path
    ));
}

#[test]
fn invalid_json_reports_the_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("bad.json");
    fs::write(&path, "{not valid json").expect("write");

    match load_level(&path) {
        Err(LevelIoError::Decode {
            path: reported,
            source: DecodeError::Format(_),
        }) => assert_eq!(reported, path),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn missing_start_and_extra_exit_are_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let mut no_start = valid_grid();
    no_start[1][1] = 0;
    let no_start_path = dir.path().join("no_start.json");
    fs::write(&no_start_path, document(&no_start)).expect("write");
    assert!(matches!(
        load_level(&no_start_path),
        Err(LevelIoError::Decode { .. })
    ));

    let mut two_exits = valid_grid();
    two_exits[1][2] = 3;
    let two_exits_path = dir.path().join("two_exits.json");
    fs::write(&two_exits_path, document(&two_exits)).expect("write");
    assert!(matches!(
        load_level(&two_exits_path),
        Err(LevelIoError::Decode {
            source: DecodeError::Schema(SchemaError::TileCount {
                tile: Tile::Exit,
                found: 2,
                ..
            }),
            ..
        })
    ));
}

#[test]
fn open_level_guards_the_levels_directory() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("demo.json"), document(&valid_grid())).expect("write");
    fs::write(dir.path().join("notes.txt"), "not a level").expect("write");

    assert_eq!(open_level(dir.path(), "demo.json").expect("open").name(), "demo");
    assert!(matches!(
        open_level(dir.path(), "../demo.json"),
        Err(LevelIoError::Path(PathError::Escapes { .. }))
    ));
    assert!(matches!(
        open_level(dir.path(), "notes.txt"),
        Err(LevelIoError::Path(PathError::WrongSuffix { .. }))
    ));
}

#[cfg(unix)]
#[test]
fn open_level_rejects_links_leaving_the_levels_directory() {
    use std::os::unix::fs::symlink;

    let root = tempfile::tempdir().expect("create temp dir");
    let levels = root.path().join("levels");
    let outside = root.path().join("outside");
    fs::create_dir_all(&levels).expect("create levels");
    fs::create_dir_all(&outside).expect("create outside");
    fs::write(outside.join("secret.json"), document(&valid_grid())).expect("write");
    fs::write(levels.join("inner.json"), document(&valid_grid())).expect("write");
    symlink(outside.join("secret.json"), levels.join("link.json")).expect("file link");
    symlink(&outside, levels.join("pack")).expect("dir link");
    symlink(levels.join("inner.json"), levels.join("alias.json")).expect("inner link");

    for escaping in ["link.json", "pack/secret.json"] {
        assert!(
            matches!(
                open_level(&levels, escaping),
                Err(LevelIoError::Path(PathError::Escapes { .. }))
            ),
            "{escaping}"
        );
    }
    assert_eq!(open_level(&levels, "alias.json").expect("open").name(), "demo");
}

#[test]
fn generated_levels_survive_the_codec() {
    for seed in [0, 1, 7, 42, 123, 2024, u64::MAX] {
        for (width, height) in [(15, 11), (21, 15), (41, 31), (60, 25)] {
            let level = generate(seed, width, height).expect("generate");
            let restored = decode(&encode(&level)).expect("round trip");
            assert_eq!(restored.grid(), level.grid(), "seed {seed} {width}x{height}");
            assert_eq!(restored.name(), level.name());
        }
    }
}
