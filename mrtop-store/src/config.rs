//! Home configuration from JSON

use std::fs;
use std::path::Path;

use mrtop_core::HomeConfig;

use crate::StoreError;

/// Parse and validate a home configuration
pub fn parse_config(json: &str) -> Result<HomeConfig, StoreError> {
    let config: HomeConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate a home configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<HomeConfig, StoreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    log::info!("loaded {} rooms from {}", config.rooms.len(), path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrtop_core::{ComfortError, RoomId};

    #[test]
    fn parse_reports_invalid_values() {
        let json = r#"{ "rooms": [{ "id": 1, "name": "Den", "alpha": 0 }] }"#;
        match parse_config(json) {
            Err(StoreError::Config(ComfortError::InvalidConfiguration { field: "alpha", .. })) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_reports_malformed_json() {
        assert!(matches!(parse_config("{ rooms: "), Err(StoreError::Json(_))));
    }

    #[test]
    fn parse_accepts_minimal_home() {
        let config = parse_config(r#"{ "rooms": [{ "id": 4, "name": "Study" }] }"#).unwrap();
        assert_eq!(config.rooms[0].id, RoomId(4));
    }
}
