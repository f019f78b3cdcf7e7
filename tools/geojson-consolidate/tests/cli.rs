//! End-to-end runs of the consolidator binary over temporary line data.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_geojson-consolidate"))
        .args(args)
        .output()
        .expect("Failed to run geojson-consolidate")
}

fn write(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn stop(lon: f64, lat: f64, name: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [lon, lat]},
        "properties": {"name": name}
    })
}

fn route(coordinates: Value, direction: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "LineString", "coordinates": coordinates},
        "properties": {"type": "route_path", "direction": direction}
    })
}

fn collection(features: Vec<Value>) -> Value {
    json!({"type": "FeatureCollection", "features": features})
}

/// Metro lines 2 and 3 meeting at Syntagma, tram T6 stopping next to it.
fn line_data(root: &Path) {
    write(
        &root.join("Metro lines/2/metro_line_2.geojson"),
        &collection(vec![
            stop(23.7348, 37.9755, "Syntagma"),
            stop(23.7259, 37.9760, "Monastiraki"),
            route(json!([[23.7259, 37.9760], [23.7348, 37.9755]]), "east"),
        ]),
    );
    write(
        &root.join("Metro lines/3/metro_line_3.geojson"),
        &collection(vec![stop(23.73482, 37.97552, "Syntagma")]),
    );
    write(
        &root.join("Tram lines/T6/tram_line_T6.geojson"),
        &collection(vec![
            stop(23.7350, 37.9752, "Syntagma"),
            route(json!([[23.7350, 37.9752], [23.7400, 37.9700]]), "south"),
        ]),
    );
}

#[test]
fn test_stations_from_root() {
    let dir = tempfile::tempdir().unwrap();
    line_data(dir.path());
    let output = dir.path().join("combined_metro_tram_stations.geojson");

    let result = run(&[
        "stations",
        "--root",
        dir.path().to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let stations = read(&output);
    let features = stations["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"]["name"], json!("Syntagma"));
    assert_eq!(features[0]["properties"]["lines"], json!(["2", "3", "T6"]));
    assert_eq!(features[0]["properties"]["categories"], json!(["metro", "tram"]));
    assert_eq!(features[1]["properties"]["name"], json!("Monastiraki"));
}

#[test]
fn test_stations_from_sources_and_locate() {
    let dir = tempfile::tempdir().unwrap();
    line_data(dir.path());
    let output = dir.path().join("stations.geojson");
    let line_2 = dir.path().join("Metro lines/2/metro_line_2.geojson");
    let line_3 = dir.path().join("Metro lines/3/metro_line_3.geojson");

    let result = run(&[
        "stations",
        "--source",
        &format!("metro:2={}", line_2.display()),
        "--source",
        &format!("metro:3={}", line_3.display()),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let found = run(&[
        "locate",
        "--stations",
        output.to_str().unwrap(),
        "--lat",
        "37.9756",
        "--lon",
        "23.7349",
    ]);
    assert!(found.status.success());
    assert_eq!(String::from_utf8_lossy(&found.stdout).trim(), "Syntagma\tM2, M3");

    let missing = run(&[
        "locate",
        "--stations",
        output.to_str().unwrap(),
        "--lat",
        "38.5",
        "--lon",
        "24.0",
    ]);
    assert!(missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stdout).starts_with("No station within"));

    let on_line = run(&["locate", "--stations", output.to_str().unwrap(), "--line", "2"]);
    assert!(on_line.status.success());
    let listed: Vec<String> = String::from_utf8_lossy(&on_line.stdout)
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(listed, vec!["Syntagma\tM2, M3", "Monastiraki\tM2"]);
}

#[test]
fn test_segments_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Tram lines/T7/tram_line_T7.geojson");
    write(
        &path,
        &collection(vec![
            stop(23.70, 37.90, "Start"),
            route(json!([[23.7000, 37.9], [23.7001, 37.9], [23.7002, 37.9]]), "outbound"),
            route(json!([[23.7002, 37.9], [23.7003, 37.9]]), "continued"),
        ]),
    );
    // Generated files are left alone
    let generated = dir.path().join("combined_tram_lines.geojson");
    write(
        &generated,
        &collection(vec![
            route(json!([[23.7, 37.9], [23.7001, 37.9]]), "a"),
            route(json!([[23.7, 37.9], [23.7001, 37.9]]), "b"),
        ]),
    );

    let result = run(&["segments", "--input", dir.path().to_str().unwrap()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let merged = read(&path);
    let features = merged["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["geometry"]["coordinates"].as_array().unwrap().len(), 4);
    assert_eq!(features[0]["properties"]["direction"], json!("outbound"));
    assert_eq!(features[1]["properties"]["name"], json!("Start"));

    assert_eq!(read(&generated)["features"].as_array().unwrap().len(), 2);
}

#[test]
fn test_segments_in_place_keeps_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Metro lines/1/metro_line_1.geojson");
    let original = collection(vec![
        route(json!([[23.7000, 37.9], [23.7001, 37.9]]), "a"),
        route(json!([[23.7001, 37.9], [23.7002, 37.9]]), "b"),
        json!({
            "type": "Feature",
            "geometry": {"type": "Circle", "coordinates": [23.7, 37.9]},
            "properties": {"name": "Unreadable"}
        }),
    ]);
    write(&path, &original);

    let result = run(&["segments", "--input", dir.path().to_str().unwrap()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(read(&path), original);

    // Written elsewhere, the readable features are still merged
    let out = dir.path().join("out");
    let result = run(&[
        "segments",
        "--input",
        path.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let written = read(&out.join("metro_line_1.geojson"));
    assert_eq!(written["features"].as_array().unwrap().len(), 1);
}

#[test]
fn test_segments_to_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let out = dir.path().join("out");
    let path = input.join("Metro lines/1/metro_line_1.geojson");
    let original = collection(vec![route(json!([[23.7, 37.9], [23.71, 37.9]]), "only")]);
    write(&path, &original);

    let result = run(&[
        "segments",
        "--input",
        input.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    assert_eq!(read(&path), original);
    let written = read(&out.join("Metro lines/1/metro_line_1.geojson"));
    assert_eq!(written["features"].as_array().unwrap().len(), 1);
}

#[test]
fn test_lines() {
    let dir = tempfile::tempdir().unwrap();
    line_data(dir.path());
    let out = dir.path().join("out");

    let result = run(&[
        "lines",
        "--root",
        dir.path().to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let metro = read(&out.join("combined_metro_lines.geojson"));
    let metro_features = metro["features"].as_array().unwrap();
    assert_eq!(metro_features.len(), 1);
    assert_eq!(metro_features[0]["properties"]["lineNumber"], json!("2"));
    assert_eq!(metro_features[0]["properties"]["lineColor"], json!("#ED1C24"));

    let tram = read(&out.join("combined_tram_lines.geojson"));
    assert_eq!(tram["features"][0]["properties"]["category"], json!("tram"));

    let all = read(&out.join("final_all_lines.geojson"));
    assert_eq!(all["features"].as_array().unwrap().len(), 2);
}

#[test]
fn test_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    line_data(dir.path());

    let result = run(&[
        "segments",
        "--input",
        dir.path().to_str().unwrap(),
        "--segment-radius=-5",
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Invalid consolidation config"));
}
