//! Job to dump the whole store as JSON.
//!
//! The file is written next to its destination and renamed into place, so
//! readers never see a partial export.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::ExportSettings;
use crate::store::Store;

pub async fn run(store: &Store, settings: &ExportSettings) -> Result<()> {
    let start = std::time::Instant::now();

    let snapshot = store.snapshot().await;
    let body =
        serde_json::to_vec_pretty(&snapshot).context("Failed to serialize store snapshot")?;

    write_atomically(Path::new(&settings.path), &body).await?;

    info!(
        "Exported store snapshot to {} in {:?} ({} bytes, {} pool networks, {} token networks)",
        settings.path,
        start.elapsed(),
        body.len(),
        snapshot.pools.len(),
        snapshot.tokens.len()
    );
    Ok(())
}

async fn write_atomically(path: &Path, body: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");

    tokio::fs::write(&tmp, body)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move export into {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SupportedDex;

    #[tokio::test]
    async fn test_export_writes_valid_json() {
        let dir = std::env::temp_dir().join(format!("dexscope-export-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("store.json");

        let store = Store::new();
        store.register_pools(SupportedDex::Litedex, &["0xpool"]).await;

        let settings = ExportSettings {
            path: path.to_string_lossy().into_owned(),
            interval_secs: 60,
        };
        run(&store, &settings).await.unwrap();

        let written = tokio::fs::read(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert!(json["pools"]["litedex"].get("0xpool").is_some());
        assert!(!path.with_extension("json.tmp").exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
