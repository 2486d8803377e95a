use project_stars::models::{ProjectFields, Record};
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

#[test]
fn test_project_fields() {
    let rec = record(json!({
        "name": "clap",
        "links": [{"url": "https://github.com/clap-rs/clap"}],
        "stars_count": 13000,
        "forks_count": 1000
    }));

    assert_eq!(rec.name_str(), Some("clap"));
    assert_eq!(rec.stars_count(), Some(&json!(13000)));
    assert_eq!(rec.forks_count(), Some(&json!(1000)));
    assert_eq!(rec.link_urls(), vec!["https://github.com/clap-rs/clap"]);
}

#[test]
fn test_non_string_name() {
    let rec = record(json!({"name": 7, "stars_count": 1}));

    assert_eq!(rec.name(), Some(&json!(7)));
    assert_eq!(rec.name_str(), None);
}
