use nested_map::{NestedMap, Value};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const NESTED_DOC: &str = r#"
{
    "A": {
        "B": {
            "C": {
                "D": "old_value"
            }
        }
    }
}"#;

#[test]
fn decode_get_graft_encode() {
    init_tracing();

    let mut map: NestedMap = serde_json::from_str(NESTED_DOC).expect("decode");

    assert_eq!(map.get("[A][B][C][D]").unwrap(), "old_value");
    assert_eq!(map.get("[A][B][C][DD]"), None);

    let graft: NestedMap = [("X", "xyz"), ("Y", "abc")].into_iter().collect();
    assert!(map.set("[A][B][C][E][XX]", graft));
    assert_eq!(map.get("[A][B][C][E][XX][X]").unwrap(), "xyz");

    assert_eq!(
        serde_json::to_string(&map).unwrap(),
        r#"{"A":{"B":{"C":{"D":"old_value","E":{"XX":{"X":"xyz","Y":"abc"}}}}}}"#
    );
}

#[test]
fn set_sibling_then_encode() {
    let mut map = NestedMap::from_json_str(&NESTED_DOC.replace("old_value", "value")).unwrap();

    assert_eq!(map.get("[A][B][C][D]").map(Value::to_string), Some("value".to_string()));
    assert!(map.set("[A][B][C][E]", "OK"));
    assert_eq!(
        map.to_json_string().unwrap(),
        r#"{"A":{"B":{"C":{"D":"value","E":"OK"}}}}"#
    );
}

#[test]
fn container_sequence_get_and_encode() {
    let mut first = NestedMap::new();
    let mut second = NestedMap::new();
    assert!(first.set("[A][B]", "value1"));
    assert!(second.set("[X][Y]", "value2"));

    let mut map = NestedMap::new();
    assert!(map.set("[U]", vec![first, second]));

    assert_eq!(map.get("[U][0][A][B]").unwrap(), "value1");
    assert_eq!(map.get("[U][1][X][Y]").unwrap(), "value2");
    assert_eq!(
        map.to_json_string().unwrap(),
        r#"{"U":[{"A":{"B":"value1"}},{"X":{"Y":"value2"}}]}"#
    );
}

#[test]
fn set_then_get_deep_path() {
    let mut map = NestedMap::new();
    assert!(map.set("[A][B][C][E][X]", "xyz"));
    assert_eq!(map.get("[A][B][C][E][X]").unwrap(), "xyz");
}

#[test]
fn custom_serialization_hides_wrapper() {
    let mut map = NestedMap::new();
    map.set("[A][B][C]", "value");
    assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"A":{"B":{"C":"value"}}}"#);
}

#[test]
fn stored_null_is_not_absent() {
    let mut map = NestedMap::new();
    map.set("[k]", ());
    assert_eq!(map.get("[k]"), Some(&Value::Null));
    assert_eq!(map.get("[missing]"), None);
    assert_eq!(map.to_json_value(), json!({"k": null}));
}

#[test]
fn leaf_replacement_changes_type() {
    init_tracing();

    let mut map = NestedMap::new();
    map.set("[a][b]", 1);
    map.set("[a]", "scalar");
    assert_eq!(map.to_json_value(), json!({"a": "scalar"}));
    map.set("[a][c]", json!([1, 2]));
    assert_eq!(map.to_json_value(), json!({"a": {"c": [1, 2]}}));
}
