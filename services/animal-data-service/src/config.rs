use animal_common::{env_or, env_string_or};
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("endpoint paths must differ, both are {0}")]
    DuplicatePath(String),
    #[error("endpoint path {0} contains characters outside a plain path segment")]
    InvalidPath(String),
    #[error("endpoint path {0} is reserved for health checks")]
    ReservedPath(String),
}

const HEALTH_PATHS: [&str; 2] = ["/healthz", "/readyz"];

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub host: Ipv4Addr,
    pub port: u16,
    pub max_history: usize,
    pub default_history_limit: usize,
    pub overview_history_limit: usize,
    pub animal_data_path: String,
    pub latest_animal_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED,
            port: 8080,
            max_history: 50,
            default_history_limit: 10,
            overview_history_limit: 5,
            animal_data_path: "/api/animal-data".to_string(),
            latest_animal_path: "/api/latest-animal".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        // Unset or unparsable values keep the defaults.
        let defaults = Self::default();
        let config = Self {
            host: env_or("BIND_HOST", defaults.host),
            port: env_or("PORT", defaults.port),
            max_history: env_or("MAX_HISTORY", defaults.max_history),
            default_history_limit: env_or("DEFAULT_HISTORY_LIMIT", defaults.default_history_limit),
            overview_history_limit: env_or(
                "OVERVIEW_HISTORY_LIMIT",
                defaults.overview_history_limit,
            ),
            animal_data_path: normalize_path(&env_string_or(
                "ANIMAL_DATA_PATH",
                &defaults.animal_data_path,
            )),
            latest_animal_path: normalize_path(&env_string_or(
                "LATEST_ANIMAL_PATH",
                &defaults.latest_animal_path,
            )),
        };
        config.with_valid_paths()
    }

    pub fn with_valid_paths(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(err) => {
                let defaults = Self::default();
                tracing::warn!(
                    error = %err,
                    animal_data_path = %defaults.animal_data_path,
                    latest_animal_path = %defaults.latest_animal_path,
                    "invalid endpoint paths, using defaults"
                );
                Self {
                    animal_data_path: defaults.animal_data_path,
                    latest_animal_path: defaults.latest_animal_path,
                    ..self
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.animal_data_path, &self.latest_animal_path] {
            let plain = path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'));
            if !plain || path.contains("//") {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
            if HEALTH_PATHS.contains(&path.as_str()) {
                return Err(ConfigError::ReservedPath(path.clone()));
            }
        }
        if self.animal_data_path == self.latest_animal_path {
            return Err(ConfigError::DuplicatePath(self.animal_data_path.clone()));
        }
        Ok(())
    }
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_leading_and_trailing_slashes() {
        assert_eq!(normalize_path("api/animals/"), "/api/animals");
        assert_eq!(normalize_path(" /api/animals "), "/api/animals");
    }

    #[test]
    fn defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history, 50);
        assert_eq!(config.default_history_limit, 10);
        assert_eq!(config.overview_history_limit, 5);
    }

    #[test]
    fn rejects_colliding_paths() {
        let config = ServiceConfig {
            latest_animal_path: "/api/animal-data".to_string(),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicatePath(_))
        ));
    }

    #[test]
    fn rejects_health_paths_and_falls_back() {
        let config = ServiceConfig {
            animal_data_path: "/healthz".to_string(),
            max_history: 7,
            ..ServiceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ReservedPath(_))));

        let config = config.with_valid_paths();
        assert_eq!(config.animal_data_path, "/api/animal-data");
        assert_eq!(config.latest_animal_path, "/api/latest-animal");
        assert_eq!(config.max_history, 7);
    }

    #[test]
    fn colliding_paths_fall_back_to_defaults() {
        let config = ServiceConfig {
            animal_data_path: "/api/same".to_string(),
            latest_animal_path: "/api/same".to_string(),
            ..ServiceConfig::default()
        }
        .with_valid_paths();
        assert!(config.validate().is_ok());
        assert_eq!(config.animal_data_path, "/api/animal-data");
    }

    #[test]
    fn rejects_route_parameters() {
        let config = ServiceConfig {
            animal_data_path: "/api/:id".to_string(),
            ..ServiceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPath(_))));
    }
}
