//! Seller directory backed by a map, optionally seeded from a JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::ports::{SellerDirectory, SellerDirectoryError};
use crate::domain::{SellerId, SellerIdentity, SellerSummary, SellerValidationError};

/// One seller record in a seed file.
///
/// ```json
/// [{"id": "6f0c…", "name": "Asha", "college": "IIT Delhi", "phone": "98…"}]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SellerSeed {
    pub id: SellerId,
    pub name: String,
    pub college: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Errors raised while loading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SellerSeedError {
    #[error("failed to read seller seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seller seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid seller {id}: {source}")]
    Invalid {
        id: SellerId,
        #[source]
        source: SellerValidationError,
    },
}

#[derive(Debug, Clone)]
struct SellerRecord {
    identity: SellerIdentity,
    phone: Option<String>,
    rating: Option<f64>,
}

/// Map-backed `SellerDirectory`.
#[derive(Debug, Clone, Default)]
pub struct InMemorySellerDirectory {
    sellers: Arc<RwLock<HashMap<SellerId, SellerRecord>>>,
}

impl InMemorySellerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a seller.
    pub async fn insert(&self, identity: SellerIdentity) {
        self.insert_record(SellerRecord {
            identity,
            phone: None,
            rating: None,
        })
        .await;
    }

    async fn insert_record(&self, record: SellerRecord) {
        self.sellers
            .write()
            .await
            .insert(record.identity.id, record);
    }

    /// Build a directory from parsed seed records.
    pub async fn from_seeds(seeds: Vec<SellerSeed>) -> Result<Self, SellerSeedError> {
        let directory = Self::new();
        for seed in seeds {
            let identity = SellerIdentity::new(seed.id, seed.name, seed.college)
                .map_err(|source| SellerSeedError::Invalid {
                    id: seed.id,
                    source,
                })?;
            directory
                .insert_record(SellerRecord {
                    identity,
                    phone: seed.phone,
                    rating: seed.rating,
                })
                .await;
        }
        Ok(directory)
    }

    /// Load sellers from a JSON array on disk.
    pub async fn from_json_file(path: &Path) -> Result<Self, SellerSeedError> {
        let read_error = |source| SellerSeedError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| read_error(std::io::ErrorKind::InvalidInput.into()))?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let raw = dir.read_to_string(file_name).map_err(read_error)?;
        let seeds: Vec<SellerSeed> =
            serde_json::from_str(&raw).map_err(|source| SellerSeedError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let count = seeds.len();
        let directory = Self::from_seeds(seeds).await?;
        info!(path = %path.display(), count, "loaded seller seed file");
        Ok(directory)
    }
}

#[async_trait]
impl SellerDirectory for InMemorySellerDirectory {
    async fn find_identity(
        &self,
        id: &SellerId,
    ) -> Result<Option<SellerIdentity>, SellerDirectoryError> {
        Ok(self
            .sellers
            .read()
            .await
            .get(id)
            .map(|record| record.identity.clone()))
    }

    async fn find_summary(
        &self,
        id: &SellerId,
    ) -> Result<Option<SellerSummary>, SellerDirectoryError> {
        Ok(self.sellers.read().await.get(id).map(|record| SellerSummary {
            phone: record.phone.clone(),
            rating: record.rating,
            ..SellerSummary::from(&record.identity)
        }))
    }
}
