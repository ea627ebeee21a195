use super::*;

#[test]
fn parses_camel_case_records() {
    let json = r#"[{"countyName":"Nyeri","queries":10,"escalations":1,"satisfaction":90,"coordinates":[-0.42,36.95]}]"#;
    let counties = parse(json).unwrap();
    assert_eq!(counties.len(), 1);
    assert_eq!(counties[0].county_name, "Nyeri");
    assert!((counties[0].coordinates[1] - 36.95).abs() < f64::EPSILON);
}

#[test]
fn rejects_out_of_range_satisfaction() {
    let json = r#"[{"countyName":"Nyeri","queries":10,"escalations":1,"satisfaction":101,"coordinates":[0,0]}]"#;
    let err = parse(json).unwrap_err();
    assert!(matches!(err, DatasetError::Invalid { .. }));
    assert_eq!(err.error_code(), "E_DATASET_INVALID");
}

#[test]
fn rejects_malformed_json() {
    assert!(matches!(parse("{not json"), Err(DatasetError::Parse(_))));
}

#[test]
fn missing_file_is_read_error() {
    let err = load_from_file(Path::new("/definitely/missing/counties.json")).unwrap_err();
    assert!(matches!(err, DatasetError::Read { .. }));
}

#[test]
fn loads_replacement_file() {
    let path = std::env::temp_dir().join(format!("afroken-counties-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, r#"[{"countyName":"Lamu","queries":3,"escalations":0,"satisfaction":70,"coordinates":[-2.27,40.9]}]"#).unwrap();
    let counties = load_from_file(&path).unwrap();
    assert_eq!(counties[0].county_name, "Lamu");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn bundled_dataset_parses() {
    assert!(!bundled().is_empty());
}
