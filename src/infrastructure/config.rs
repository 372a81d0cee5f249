use crate::application::model_group_store::ModelGroupStore;
use crate::domain::plot::KeyScope;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub api: ApiSettings,
    pub server: ServerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CacheSettings {
    #[serde(default)]
    pub key_scope: KeyScope,
}

/// Model group created at startup
#[derive(Debug, Deserialize, Clone)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub models: Vec<String>,
}

pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind_address", "0.0.0.0:8080")?
        .add_source(config::File::with_name("config/ozone").required(false))
        .add_source(config::Environment::with_prefix("OZONE").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Builds a store holding the configured groups, in configuration order.
pub fn seed_group_store(groups: &[GroupConfig]) -> ModelGroupStore {
    let mut store = ModelGroupStore::new();
    for group in groups {
        let next_id = store.state().id_counter;
        store.set_models_of_group(next_id, &group.name, &group.models);
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> ServiceConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
            [api]
            base_url = "https://api.example.org/api/v1"

            [server]
            bind_address = "127.0.0.1:9000"

            [cache]
            key_scope = "reference"

            [[groups]]
            name = "Example Group"
            models = ["CCMI-1_ACCESS_ACCESS-CCM-refC2", "CCMI-1_CCCma_CMAM-refC2"]
            "#,
        );

        assert_eq!(config.api.base_url, "https://api.example.org/api/v1");
        assert_eq!(config.cache.key_scope, KeyScope::Reference);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].models.len(), 2);
    }

    #[test]
    fn test_cache_and_groups_are_optional() {
        let config = parse(
            r#"
            [api]
            base_url = "http://localhost:5000"

            [server]
            bind_address = "0.0.0.0:8080"
            "#,
        );

        assert_eq!(config.cache.key_scope, KeyScope::Full);
        assert!(config.groups.is_empty());
    }

    #[test]
    fn test_seed_group_store() {
        let groups = vec![
            GroupConfig {
                name: "first".to_string(),
                models: vec!["a".to_string()],
            },
            GroupConfig {
                name: "second".to_string(),
                models: vec!["a".to_string(), "b".to_string()],
            },
        ];

        let store = seed_group_store(&groups);

        assert_eq!(store.group_ids(), &[0, 1]);
        assert_eq!(store.name_of_group(1).unwrap(), "second");
        assert_eq!(store.models_of_group(1).unwrap().len(), 2);
    }
}
