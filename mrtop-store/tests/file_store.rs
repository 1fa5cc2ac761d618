//! JSON file store against a real directory

use std::fs;

use mrtop_core::{
    CoreField, Home, HomeConfig, ModelState, Notification, PersistedRoom, ProfileManager, Preset, QuantityKind,
    RoomConfig, RoomId, SourceBinding, StateStore, Unit,
};
use mrtop_store::{load_config, JsonFileStore, StoreError};
use tempfile::TempDir;

fn persisted() -> PersistedRoom {
    let mut profiles = ProfileManager::new(Preset::Attic);
    profiles.edit(CoreField::KSolar, 1.1).unwrap();
    PersistedRoom {
        model_state: ModelState {
            mrt_prev: Some(18.4),
            last_update_ts: Some(120_000),
            ..ModelState::default()
        },
        profiles,
    }
}

#[test]
fn missing_documents_load_as_none() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    assert!(store.load(RoomId(3)).unwrap().is_none());
}

#[test]
fn saved_state_survives_reopening() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::open(dir.path().join("state")).unwrap();
    let state = persisted();
    store.save(RoomId(3), &state).unwrap();

    assert!(store.path_for(RoomId(3)).exists());
    let names: Vec<_> = fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["room-3.json".to_string()]);

    let reopened = JsonFileStore::open(dir.path().join("state")).unwrap();
    assert_eq!(reopened.load(RoomId(3)).unwrap(), Some(state));
}

#[test]
fn remove_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::open(dir.path()).unwrap();
    store.save(RoomId(1), &persisted()).unwrap();
    store.remove(RoomId(1)).unwrap();
    store.remove(RoomId(1)).unwrap();
    assert!(store.load(RoomId(1)).unwrap().is_none());
}

#[test]
fn corrupt_documents_are_reported() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    fs::write(store.path_for(RoomId(2)), "{ not json").unwrap();
    assert!(matches!(store.load(RoomId(2)), Err(StoreError::Json(_))));
}

#[test]
fn documents_from_older_versions_fill_defaults() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    fs::write(store.path_for(RoomId(5)), r#"{ "model_state": { "mrt_prev": 19.5 } }"#).unwrap();

    let loaded = store.load(RoomId(5)).unwrap().unwrap();
    assert_eq!(loaded.model_state.mrt_prev, Some(19.5));
    assert_eq!(loaded.profiles, ProfileManager::default());
}

#[test]
fn home_restarts_from_disk() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("home.json");
    fs::write(
        &config_path,
        r#"{
            "elevation_m": 250,
            "rooms": [{
                "id": 1,
                "name": "Living room",
                "sources": {
                    "air_temperature": [{ "source_id": "sensor.living_temperature" }],
                    "outdoor_temperature": [{ "source_id": "sensor.outdoor" }]
                }
            }]
        }"#,
    )
    .unwrap();

    let config: HomeConfig = load_config(&config_path).unwrap();
    let state_dir = dir.path().join("state");

    let mut home = Home::new(config.clone(), JsonFileStore::open(&state_dir).unwrap()).unwrap();
    home.handle(
        &Notification::number("sensor.outdoor", QuantityKind::OutdoorTemperature, 2.0, Unit::Celsius, 0),
        0,
    );
    let results = home.handle(
        &Notification::number("sensor.living_temperature", QuantityKind::AirTemperature, 21.0, Unit::Celsius, 0),
        0,
    );
    assert_eq!(results.len(), 1);
    let mrt = results[0].mrt_final;
    drop(home);

    let home = Home::new(config, JsonFileStore::open(&state_dir).unwrap()).unwrap();
    assert_eq!(home.room(RoomId(1)).unwrap().state().mrt_prev, Some(mrt));
}

#[test]
fn room_configs_round_trip_through_json() {
    let config = RoomConfig::new(RoomId(8), "Study")
        .with_source(QuantityKind::AirTemperature, SourceBinding::new("sensor.study").with_ttl(600_000));
    let json = serde_json::to_string(&config).unwrap();
    let back: RoomConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
