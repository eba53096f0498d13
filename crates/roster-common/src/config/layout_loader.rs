//! Community layout loading
//!
//! The layout file is TOML. Any key can be overridden from the environment
//! with a `ROSTER__` prefix and `__` as the nesting separator, for example
//! `ROSTER__COMMUNITY_ID=1234` or `ROSTER__MANAGED_ROLES__MISSING_NAME=42`.

use config::{Config, Environment, File, FileFormat};
use roster_core::RosterLayout;

use super::ConfigError;

const ENV_PREFIX: &str = "ROSTER";
const ENV_SEPARATOR: &str = "__";

/// Load and validate the layout from a TOML file plus environment overrides
pub fn load_layout(path: &str) -> Result<RosterLayout, ConfigError> {
    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml))
        .add_source(env_overrides())
        .build()
        .map_err(|e| ConfigError::Layout(e.to_string()))?;

    into_layout(settings)
}

/// Parse a layout from TOML text (no environment overrides)
pub fn parse_layout(toml: &str) -> Result<RosterLayout, ConfigError> {
    let settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Layout(e.to_string()))?;

    into_layout(settings)
}

fn env_overrides() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
}

fn into_layout(settings: Config) -> Result<RosterLayout, ConfigError> {
    let layout: RosterLayout = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Layout(e.to_string()))?;

    layout
        .validate()
        .map_err(|e| ConfigError::Layout(e.to_string()))?;

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::Snowflake;

    const LAYOUT: &str = r#"
community_id = "1309266911703334952"
authorized_roles = ["1309271313398894643"]
review_channels = ["1316181886308978788"]

[managed_roles]
missing_name = "1319882093756678175"
missing_class = "1319882096331853936"
missing_conversation = "1319882021518184520"

[[class_categories]]
name = "Tank"
roles = [
    { id = "1315087293408739401", name = "SnS/GS" },
    { id = "1315087506105958420", name = "SnS/Wand" },
]

[[class_categories]]
name = "Healer"
roles = [{ id = "1315090429233991812", name = "Wand/Bow" }]
"#;

    #[test]
    fn test_parse_layout() {
        let layout = parse_layout(LAYOUT).unwrap();
        assert_eq!(layout.community_id, Snowflake::new(1309266911703334952));
        assert_eq!(layout.class_categories.len(), 2);
        assert_eq!(layout.class_categories[0].roles[1].name, "SnS/Wand");
        assert_eq!(
            layout.managed_roles.missing_conversation,
            Snowflake::new(1319882021518184520)
        );
        assert_eq!(layout.weapon_table().count(), 3);
    }

    #[test]
    fn test_rejects_invalid_layout() {
        let broken = LAYOUT.replace(
            "missing_class = \"1319882096331853936\"",
            "missing_class = \"1319882093756678175\"",
        );
        let err = parse_layout(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Layout(_)));
    }

    #[test]
    fn test_rejects_layout_without_review_channels() {
        let broken = LAYOUT.replace("review_channels = [\"1316181886308978788\"]\n", "");
        let err = parse_layout(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Layout(_)));

        let empty = LAYOUT.replace("[\"1316181886308978788\"]", "[]");
        let err = parse_layout(&empty).unwrap_err();
        assert!(matches!(err, ConfigError::Layout(_)));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_layout("does/not/exist.toml").is_err());
    }
}
