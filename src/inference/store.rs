use crate::config::toml_config::LoadPolicy;
use crate::inference::pricing::PricingModel;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Hands out the pricing model according to the configured load policy.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
    policy: LoadPolicy,
    strict_categories: bool,
    cached: Option<Arc<PricingModel>>,
}

impl ModelStore {
    /// Loads the artifact once so a broken model fails at startup under either policy.
    pub fn open<P: AsRef<Path>>(path: P, policy: LoadPolicy, strict_categories: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let model = PricingModel::load(&path)?.with_strict_categories(strict_categories);
        tracing::info!("Loaded pricing model {:?} from {}", model, path.display());

        let cached = match policy {
            LoadPolicy::Startup => Some(Arc::new(model)),
            LoadPolicy::PerRequest => None,
        };

        Ok(Self {
            path,
            policy,
            strict_categories,
            cached,
        })
    }

    pub fn from_model(model: PricingModel) -> Self {
        Self {
            path: PathBuf::new(),
            policy: LoadPolicy::Startup,
            strict_categories: false,
            cached: Some(Arc::new(model)),
        }
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// Reads the artifact from disk under `per_request`; call off the async executor.
    pub fn get(&self) -> Result<Arc<PricingModel>> {
        match &self.cached {
            Some(model) => Ok(Arc::clone(model)),
            None => {
                tracing::debug!("Reloading pricing model from {}", self.path.display());
                let model = PricingModel::load(&self.path)?.with_strict_categories(self.strict_categories);
                Ok(Arc::new(model))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CarFeatures;
    use crate::inference::pricing::tests::test_artifact;
    use tempfile::TempDir;

    fn write_artifact(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("final_model.json");
        std::fs::write(&path, serde_json::to_string(&test_artifact()).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_startup_policy_caches_model() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(&dir);
        let store = ModelStore::open(&path, LoadPolicy::Startup, false).unwrap();
        assert!(store.is_loaded());

        std::fs::remove_file(&path).unwrap();
        let model = store.get().unwrap();
        assert_eq!(model.predict(&[CarFeatures::sample()]).unwrap(), vec![115.0]);
    }

    #[test]
    fn test_per_request_policy_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(&dir);
        let store = ModelStore::open(&path, LoadPolicy::PerRequest, false).unwrap();
        assert!(!store.is_loaded());
        assert!(store.get().is_ok());

        std::fs::remove_file(&path).unwrap();
        assert!(store.get().is_err());
    }

    #[test]
    fn test_open_fails_on_missing_artifact() {
        assert!(ModelStore::open("/nonexistent/model.json", LoadPolicy::Startup, false).is_err());
    }
}
