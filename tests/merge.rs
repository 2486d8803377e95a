mod common;

use common::{read_json, write_json};
use project_stars::dataset::save_pretty;
use project_stars::merge::{merge_projects, ProjectMerger};
use serde_json::{json, Value};
use tempfile::tempdir;

fn as_value(projects: Vec<project_stars::models::Record>) -> Value {
    Value::Array(projects.into_iter().map(Value::Object).collect())
}

#[test]
fn test_higher_stars_win() {
    let dir = tempdir().unwrap();
    let a = write_json(dir.path(), "a.json", &json!([{"name": "a", "stars_count": 5}]));
    let b = write_json(dir.path(), "b.json", &json!([{"name": "a", "stars_count": 9}]));

    let (projects, _) = merge_projects(&[a, b]);

    assert_eq!(as_value(projects), json!([{"name": "a", "stars_count": 9}]));
}

#[test]
fn test_higher_stars_win_regardless_of_file_order() {
    let dir = tempdir().unwrap();
    let low = write_json(
        dir.path(),
        "low.json",
        &json!([{"name": "tool", "stars_count": 5, "source": "low"}]),
    );
    let high = write_json(
        dir.path(),
        "high.json",
        &json!([{"name": "tool", "stars_count": 50, "source": "high"}]),
    );

    let (forward, _) = merge_projects(&[low.clone(), high.clone()]);
    let (backward, _) = merge_projects(&[high, low]);

    assert_eq!(forward.len(), 1);
    assert_eq!(forward, backward);
    assert_eq!(forward[0]["source"], json!("high"));
}

#[test]
fn test_merging_a_file_with_itself_is_idempotent() {
    let dir = tempdir().unwrap();
    let file = write_json(
        dir.path(),
        "projects.json",
        &json!([
            {"name": "a", "stars_count": 3},
            {"name": "b", "stars_count": 7, "extra": {"nested": true}},
            {"name": "a", "stars_count": 4},
            {"name": "c", "stars_count": 0}
        ]),
    );

    let (once, _) = merge_projects(&[file.clone()]);
    let (twice, stats) = merge_projects(&[file.clone(), file]);

    assert_eq!(once, twice);
    assert_eq!(stats.files_read, 2);
    assert_eq!(
        as_value(once),
        json!([
            {"name": "a", "stars_count": 4},
            {"name": "b", "stars_count": 7, "extra": {"nested": true}},
            {"name": "c", "stars_count": 0}
        ])
    );
}

#[test]
fn test_bad_files_do_not_stop_the_merge() {
    let dir = tempdir().unwrap();
    let first = write_json(dir.path(), "first.json", &json!([{"name": "a", "stars_count": 1}]));
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    let object = write_json(dir.path(), "object.json", &json!({"name": "b", "stars_count": 2}));
    let missing = dir.path().join("missing.json");
    let last = write_json(dir.path(), "last.json", &json!([{"name": "c", "stars_count": 3}]));

    let (projects, stats) = merge_projects(&[first, broken, object, missing, last]);

    let names: Vec<&Value> = projects.iter().map(|p| &p["name"]).collect();
    assert_eq!(names, vec![&json!("a"), &json!("c")]);
    assert_eq!(stats.files_read, 2);
    assert_eq!(stats.files_skipped, 3);
}

#[test]
fn test_invalid_records_are_skipped() {
    let dir = tempdir().unwrap();
    let file = write_json(
        dir.path(),
        "mixed.json",
        &json!([
            {"name": "ok", "stars_count": 1},
            {"name": "no-stars"},
            {"stars_count": 10},
            ["nested", "array"],
            null
        ]),
    );

    let (projects, stats) = merge_projects(&[file]);

    assert_eq!(as_value(projects), json!([{"name": "ok", "stars_count": 1}]));
    assert_eq!(stats.records_seen, 5);
    assert_eq!(stats.records_skipped, 4);
}

#[test]
fn test_first_occurrence_order_is_kept() {
    let dir = tempdir().unwrap();
    let a = write_json(
        dir.path(),
        "a.json",
        &json!([
            {"name": "zeta", "stars_count": 1},
            {"name": "alpha", "stars_count": 1}
        ]),
    );
    let b = write_json(
        dir.path(),
        "b.json",
        &json!([
            {"name": "mid", "stars_count": 1},
            {"name": "zeta", "stars_count": 99}
        ]),
    );

    let (projects, stats) = merge_projects(&[a, b]);

    let names: Vec<&Value> = projects.iter().map(|p| &p["name"]).collect();
    assert_eq!(names, vec![&json!("zeta"), &json!("alpha"), &json!("mid")]);
    assert_eq!(projects[0]["stars_count"], json!(99));
    assert_eq!(stats.replaced, 1);
}

#[test]
fn test_merged_output_written_pretty() {
    let dir = tempdir().unwrap();
    let a = write_json(dir.path(), "a.json", &json!([{"name": "a", "stars_count": 2}]));
    let out = dir.path().join("projects.json");

    let (projects, _) = merge_projects(&[a]);
    save_pretty(&out, &projects).unwrap();

    assert_eq!(read_json(&out), json!([{"name": "a", "stars_count": 2}]));
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("[\n  {\n    \"name\""));
}

#[test]
fn test_write_to_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("no-such-dir").join("projects.json");

    let merger = ProjectMerger::new();
    assert!(save_pretty(&out, &merger.into_projects()).is_err());
}

#[test]
fn test_counts_beyond_float_precision_compare_exactly() {
    let dir = tempdir().unwrap();
    let a = write_json(
        dir.path(),
        "a.json",
        &json!([{"name": "big", "stars_count": 9007199254740992u64, "src": "a"}]),
    );
    let b = write_json(
        dir.path(),
        "b.json",
        &json!([{"name": "big", "stars_count": 9007199254740993u64, "src": "b"}]),
    );

    let (projects, stats) = merge_projects(&[a, b]);

    assert_eq!(projects[0]["src"], json!("b"));
    assert_eq!(projects[0]["stars_count"], json!(9007199254740993u64));
    assert_eq!(stats.replaced, 1);
}

#[test]
fn test_merge_keeps_large_extra_fields_verbatim() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.json");
    std::fs::write(
        &input,
        r#"[{"name": "a", "id": 123456789012345678901234, "stars_count": 1}]"#,
    )
    .unwrap();
    let out = dir.path().join("projects.json");

    let (projects, _) = merge_projects(&[input]);
    save_pretty(&out, &projects).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("123456789012345678901234"));
    assert!(!text.contains("e+23"));
}
