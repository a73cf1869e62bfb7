use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_match_documented_constants() {
    let opts = FramepipeOpts::default();
    assert_eq!(opts.pipeline_depth, 2);
    assert!(opts.instrumentation);
    assert_eq!(opts.refresh_rate_hz, 60.0);
    assert_eq!(opts.raster_cache.access_threshold, 3);
    assert_eq!(
        opts.raster_cache.picture_and_display_list_cache_limit_per_frame,
        3
    );
    assert_eq!(opts.raster_cache.max_surface_age, 3);
    assert_eq!(opts.raster_cache.scale_quantization, 1000.0);
    opts.validate().unwrap();
}

#[test]
fn from_reader_fills_missing_fields_with_defaults() {
    let json = r#"{ "pipeline_depth": 4, "raster_cache": { "max_surface_age": 5 } }"#;
    let opts = FramepipeOpts::from_reader(json.as_bytes()).unwrap();
    assert_eq!(opts.pipeline_depth, 4);
    assert_eq!(opts.raster_cache.max_surface_age, 5);
    assert_eq!(opts.raster_cache.access_threshold, DEFAULT_ACCESS_THRESHOLD);
    assert_eq!(opts.refresh_rate_hz, DEFAULT_REFRESH_RATE_HZ);
}

#[test]
fn from_reader_rejects_invalid_values() {
    let err = FramepipeOpts::from_reader(r#"{ "pipeline_depth": 0 }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, FramepipeError::Validation(_)), "{err}");

    let err = FramepipeOpts::from_reader(r#"{ "raster_cache": { "max_surface_age": 0 } }"#.as_bytes())
        .unwrap_err();
    assert!(matches!(err, FramepipeError::Validation(_)), "{err}");

    let err = FramepipeOpts::from_reader(r#"{ "refresh_rate_hz": -1.0 }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, FramepipeError::Validation(_)), "{err}");
}

#[test]
fn from_reader_reports_malformed_json_as_config_error() {
    let err = FramepipeOpts::from_reader("{ not json".as_bytes()).unwrap_err();
    assert!(matches!(err, FramepipeError::Config(_)), "{err}");
}

#[test]
fn from_path_reports_missing_file() {
    let err = FramepipeOpts::from_path("/definitely/not/here/framepipe.json").unwrap_err();
    assert!(err.to_string().contains("framepipe.json"));
}

#[test]
fn overrides_apply_and_ignore_garbage() {
    let opts = FramepipeOpts::default()
        .with_overrides(lookup(&[
            ("FRAMEPIPE_PIPELINE_DEPTH", "5"),
            ("FRAMEPIPE_INSTRUMENTATION", "false"),
            ("FRAMEPIPE_CACHE_LIMIT_PER_FRAME", " 7 "),
            ("FRAMEPIPE_MAX_SURFACE_AGE", "not-a-number"),
            ("FRAMEPIPE_ACCESS_THRESHOLD", "1"),
        ]))
        .unwrap();
    assert_eq!(opts.pipeline_depth, 5);
    assert!(!opts.instrumentation);
    assert_eq!(
        opts.raster_cache.picture_and_display_list_cache_limit_per_frame,
        7
    );
    assert_eq!(opts.raster_cache.max_surface_age, DEFAULT_MAX_SURFACE_AGE);
    assert_eq!(opts.raster_cache.access_threshold, 1);
}

#[test]
fn overrides_are_validated() {
    let err = FramepipeOpts::default()
        .with_overrides(lookup(&[("FRAMEPIPE_PIPELINE_DEPTH", "0")]))
        .unwrap_err();
    assert!(matches!(err, FramepipeError::Validation(_)));
}

#[test]
fn opts_round_trip_through_json() {
    let mut opts = FramepipeOpts::default();
    opts.raster_cache.complexity_threshold = 11;
    let json = serde_json::to_string(&opts).unwrap();
    let back = FramepipeOpts::from_reader(json.as_bytes()).unwrap();
    assert_eq!(back, opts);
}
