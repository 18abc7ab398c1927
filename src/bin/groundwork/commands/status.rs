use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};

use groundwork::{RedisVersionStore, VersionStore};

use crate::manifest::Manifest;

/// Show each declared module's marker and how many versions are pending.
pub async fn status(redis_url: &str, manifest: &Manifest) -> Result<()> {
    let mut store = RedisVersionStore::connect(redis_url)
        .await
        .context("failed to connect to Redis")?;
    store.initialize().await?;

    let mut table = Table::new();
    table.set_header(vec!["module", "declared", "marker", "pending"]);

    for module in manifest.modules() {
        let marker = store.current_version(module.id()).await?;
        let pending = match marker.as_deref() {
            None => Some(module.versions().len()),
            Some(recorded) => module
                .position_of(recorded)
                .map(|position| module.versions().len() - position - 1),
        };

        let marker_cell = match (&marker, pending) {
            (Some(recorded), None) => Cell::new(format!("{recorded} (unknown)")).fg(Color::Red),
            (Some(recorded), Some(_)) => Cell::new(recorded),
            (None, _) => Cell::new("-"),
        };
        let pending_cell = match pending {
            Some(0) => Cell::new("0").fg(Color::Green),
            Some(count) => Cell::new(count).fg(Color::Yellow),
            None => Cell::new("?").fg(Color::Red),
        };

        table.add_row(vec![
            Cell::new(module.id()),
            Cell::new(module.versions().len()),
            marker_cell,
            pending_cell,
        ]);
    }

    println!("{table}");
    Ok(())
}
