use super::*;

#[test]
fn defaults_are_serial() {
    let s = EngineSettings::default();
    assert!(!s.parallel);
    assert_eq!(s.threads, None);
    assert_eq!(s.chunk_size, 256);
    assert!(s.build_pool().unwrap().is_none());
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let s = EngineSettings::from_json(r#"{ "parallel": true, "threads": 2 }"#).unwrap();
    assert!(s.parallel);
    assert_eq!(s.threads, Some(2));
    assert_eq!(s.chunk_size, 256);

    let pool = s.build_pool().unwrap().expect("parallel settings build a pool");
    assert_eq!(pool.current_num_threads(), 2);
}

#[test]
fn zero_threads_is_rejected() {
    let err = EngineSettings::from_json(r#"{ "threads": 0 }"#).unwrap_err();
    assert!(matches!(err, MaskconvError::Validation(_)));

    let s = EngineSettings {
        parallel: true,
        threads: Some(0),
        chunk_size: 8,
    };
    assert!(s.build_pool().is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = EngineSettings::from_json(r#"{ "parallel": "yes" }"#).unwrap_err();
    assert!(matches!(err, MaskconvError::Serde(_)));

    let err = EngineSettings::from_json(r#"{ "workers": 4 }"#).unwrap_err();
    assert!(matches!(err, MaskconvError::Serde(_)));
}

#[test]
fn zero_chunk_size_is_normalized() {
    let s = EngineSettings {
        chunk_size: 0,
        ..EngineSettings::default()
    };
    assert_eq!(s.normalized_chunk_size(), 1);
}

#[test]
fn settings_round_trip_through_json() {
    let s = EngineSettings {
        parallel: true,
        threads: Some(3),
        chunk_size: 17,
    };
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(EngineSettings::from_json(&json).unwrap(), s);
}

#[test]
fn parallel_preset_uses_rayon_defaults() {
    let s = EngineSettings::parallel();
    assert!(s.parallel);
    assert_eq!(s.threads, None);
    assert_eq!(s.chunk_size, EngineSettings::default().chunk_size);
    assert!(s.build_pool().unwrap().is_some());
}
