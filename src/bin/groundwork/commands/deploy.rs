use anyhow::{Context, Result};
use colored::Colorize;

use groundwork::{DirResolver, MigrationRunner};

use crate::manifest::Manifest;

/// Run every declared module through the engine, in manifest order.
pub async fn deploy(redis_url: &str, manifest: &Manifest) -> Result<()> {
    let resolver = DirResolver::new(&manifest.resources);
    let mut runner = MigrationRunner::connect(redis_url, Box::new(resolver))
        .await
        .context("failed to connect to Redis")?
        .with_dialect(manifest.dialect);

    for module in manifest.modules() {
        let report = runner
            .run(&module)
            .await
            .with_context(|| format!("migration of module `{}` failed", module.id()))?;

        if report.applied.is_empty() {
            println!(
                "{} {}: up to date ({} version(s) already applied)",
                "✓".green(),
                module.id().bold(),
                report.skipped
            );
        } else {
            for applied in &report.applied {
                println!(
                    "{} {}: applied {} in {}ms",
                    "✓".green(),
                    module.id().bold(),
                    applied.version,
                    applied.duration_ms
                );
            }
        }
    }

    Ok(())
}
