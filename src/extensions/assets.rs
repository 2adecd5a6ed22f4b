use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{ChartError, ChartResult, EngineError};

/// Loads auxiliary drawable assets such as geographic region outlines.
pub trait AssetLoader {
    fn load(&mut self, url: &str) -> Result<Value, EngineError>;
}

/// Named map assets available to specifications that reference them.
#[derive(Debug, Clone, Default)]
pub struct MapRegistry {
    maps: IndexMap<String, Value>,
}

impl MapRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `url` and registers it under `name`, replacing an earlier asset.
    pub fn load_and_register(
        &mut self,
        name: impl Into<String>,
        url: &str,
        loader: &mut dyn AssetLoader,
    ) -> ChartResult<()> {
        let asset = loader.load(url).map_err(|err| ChartError::AssetLoad {
            url: url.to_owned(),
            reason: err.to_string(),
        })?;
        if !asset.is_object() {
            return Err(ChartError::AssetLoad {
                url: url.to_owned(),
                reason: "asset root must be an object".to_owned(),
            });
        }
        let name = name.into();
        debug!(name = %name, url, "registered map asset");
        self.maps.insert(name, asset);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.maps.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.maps.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetLoader, MapRegistry};
    use crate::error::{ChartError, EngineError};
    use serde_json::{Value, json};

    struct FixtureLoader;

    impl AssetLoader for FixtureLoader {
        fn load(&mut self, url: &str) -> Result<Value, EngineError> {
            match url {
                "maps/world.json" => Ok(json!({"type": "FeatureCollection", "features": []})),
                "maps/list.json" => Ok(json!([])),
                _ => Err(EngineError::new("404")),
            }
        }
    }

    #[test]
    fn loaded_asset_is_registered_by_name() {
        let mut registry = MapRegistry::new();
        registry
            .load_and_register("world", "maps/world.json", &mut FixtureLoader)
            .expect("load");
        assert!(registry.contains("world"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["world"]);
    }

    #[test]
    fn loader_failures_surface_as_asset_errors() {
        let mut registry = MapRegistry::new();
        let err = registry
            .load_and_register("moon", "maps/moon.json", &mut FixtureLoader)
            .expect_err("missing");
        assert!(matches!(err, ChartError::AssetLoad { ref url, .. } if url == "maps/moon.json"));

        let err = registry
            .load_and_register("list", "maps/list.json", &mut FixtureLoader)
            .expect_err("not an object");
        assert!(err.to_string().contains("asset root"));
        assert!(registry.is_empty());
    }
}
