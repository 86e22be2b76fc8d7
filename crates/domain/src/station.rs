//! Command station presets: the macro table size of each NCE system.

use serde::{Deserialize, Serialize};

use crate::id::MacroCount;

/// NCE command station (or booster/command station combo) model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandStation {
    PowerCab,
    Sb3a,
    #[default]
    PowerPro,
}

impl CommandStation {
    /// Number of macros the station stores.
    #[must_use]
    pub fn macro_count(self) -> MacroCount {
        match self {
            Self::PowerCab | Self::Sb3a => MacroCount::from(16),
            Self::PowerPro => MacroCount::from(256),
        }
    }
}

impl std::fmt::Display for CommandStation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PowerCab => f.write_str("power-cab"),
            Self::Sb3a => f.write_str("sb3a"),
            Self::PowerPro => f.write_str("power-pro"),
        }
    }
}

impl std::str::FromStr for CommandStation {
    type Err = UnknownStation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power-cab" => Ok(Self::PowerCab),
            "sb3a" => Ok(Self::Sb3a),
            "power-pro" => Ok(Self::PowerPro),
            other => Err(UnknownStation(other.to_string())),
        }
    }
}

/// Station name that matches no preset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command station {0:?} (expected power-cab, sb3a or power-pro)")]
pub struct UnknownStation(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_presets_to_macro_table_sizes() {
        assert_eq!(CommandStation::PowerCab.macro_count().get(), 16);
        assert_eq!(CommandStation::Sb3a.macro_count().get(), 16);
        assert_eq!(CommandStation::PowerPro.macro_count().get(), 256);
    }

    #[test]
    fn should_parse_station_from_display_form() {
        for station in [
            CommandStation::PowerCab,
            CommandStation::Sb3a,
            CommandStation::PowerPro,
        ] {
            assert_eq!(station.to_string().parse::<CommandStation>(), Ok(station));
        }
    }

    #[test]
    fn should_reject_unknown_station() {
        assert!("cs03".parse::<CommandStation>().is_err());
    }

    #[test]
    fn should_deserialize_kebab_case() {
        let station: CommandStation = serde_json::from_str("\"power-cab\"").unwrap();
        assert_eq!(station, CommandStation::PowerCab);
    }
}
