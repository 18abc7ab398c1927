use anyhow::{Context, Result, bail};
use colored::Colorize;

use groundwork::{RedisVersionStore, VersionStore};

use crate::manifest::Manifest;

/// Manually record a declared version as applied, without running its steps.
///
/// Useful after applying a change out of band, or to baseline an existing
/// store against a freshly-declared history.
pub async fn resolve(
    redis_url: &str,
    manifest: &Manifest,
    module_id: &str,
    version_id: &str,
) -> Result<()> {
    let modules = manifest.modules();
    let Some(module) = modules.iter().find(|module| module.id() == module_id) else {
        bail!("module `{module_id}` is not declared in the manifest");
    };
    if module.position_of(version_id).is_none() {
        bail!("version `{version_id}` is not declared for module `{module_id}`");
    }

    let mut store = RedisVersionStore::connect(redis_url)
        .await
        .context("failed to connect to Redis")?;
    store.initialize().await?;
    store.set_version(module_id, version_id).await?;

    println!(
        "{} {}: marker set to {}",
        "✓".green(),
        module_id.bold(),
        version_id
    );
    Ok(())
}
