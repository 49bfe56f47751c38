use super::*;
use serde_json::json;

#[test]
fn parses_hex_short_long_and_alpha() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));

    let c: Color = serde_json::from_value(json!("#fff")).unwrap();
    assert_eq!(c, Color::WHITE);

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));
}

#[test]
fn parses_named_object_and_array() {
    let c: Color = serde_json::from_value(json!("White")).unwrap();
    assert_eq!(c, Color::WHITE);

    let c: Color = serde_json::from_value(json!({"r": 10, "g": 20, "b": 30})).unwrap();
    assert_eq!(c, Color::rgb(10, 20, 30));

    let c: Color = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c, Color::rgba(1, 2, 3, 4));
}

#[test]
fn serializes_back_to_hex() {
    assert_eq!(serde_json::to_value(Color::WHITE).unwrap(), json!("#ffffff"));
    assert_eq!(
        serde_json::to_value(Color::rgba(0, 0, 0, 128)).unwrap(),
        json!("#00000080")
    );
}

#[test]
fn rejects_garbage() {
    assert!(Color::parse("#12").is_err());
    assert!(Color::parse("#gggggg").is_err());
    assert!(Color::parse("purple-ish").is_err());
}
