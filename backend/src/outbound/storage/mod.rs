//! Filesystem asset store rooted at the configured upload directory.
//!
//! All access goes through a `cap_std::fs::Dir` opened once at startup, so
//! asset names can never escape the upload directory. Blocking filesystem
//! calls run on the blocking thread pool.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, File, OpenOptions};
use tracing::{debug, info, warn};

use crate::domain::ports::{AssetStore, AssetStoreError};
use crate::domain::{AssetId, UploadedImage};

/// `AssetStore` writing one file per image into a single directory.
#[derive(Clone)]
pub struct FsAssetStore {
    dir: Arc<Dir>,
}

impl FsAssetStore {
    /// Open `root`, creating it when missing.
    pub fn open(root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        info!(path = %root.display(), "asset store ready");
        Ok(Self { dir: Arc::new(dir) })
    }

    async fn blocking<T, F>(&self, op: F) -> io::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || op(&dir))
            .await
            .map_err(io::Error::other)?
    }
}

/// Create `name` and fill it with `fill`. A file that was created but not
/// completely written is removed again before the error is returned.
fn create_filled<F>(dir: &Dir, name: &str, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(name, &options)?;
    let written = fill(&mut file);
    drop(file);
    if let Err(err) = written {
        if let Err(cleanup) = dir.remove_file(name) {
            warn!(asset = name, error = %cleanup, "failed to remove partially written asset");
        }
        return Err(err);
    }
    Ok(())
}

fn write_new(dir: &Dir, name: &str, bytes: &[u8]) -> io::Result<()> {
    create_filled(dir, name, |file| {
        file.write_all(bytes)?;
        file.sync_all()
    })
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn stage(&self, image: UploadedImage) -> Result<AssetId, AssetStoreError> {
        let asset = AssetId::generate(image.original_name.as_deref());
        let name = asset.as_ref().to_owned();
        let size = image.bytes.len();
        self.blocking(move |dir| write_new(dir, &name, &image.bytes))
            .await
            .map_err(|err| AssetStoreError::write(asset.as_ref(), err.to_string()))?;
        debug!(%asset, size, "staged asset");
        Ok(asset)
    }

    async fn delete(&self, asset: &AssetId) -> Result<(), AssetStoreError> {
        let name = asset.as_ref().to_owned();
        match self.blocking(move |dir| dir.remove_file(&name)).await {
            Ok(()) => {
                debug!(%asset, "deleted asset");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AssetStoreError::delete(asset.as_ref(), err.to_string())),
        }
    }

    async fn read(&self, asset: &AssetId) -> Result<Option<Vec<u8>>, AssetStoreError> {
        let name = asset.as_ref().to_owned();
        match self.blocking(move |dir| dir.read(&name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AssetStoreError::read(asset.as_ref(), err.to_string())),
        }
    }
}
