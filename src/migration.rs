use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context};
use sqlx::{Pool, Postgres};

/// Runs every `NNN_*.sql` file in `dir` in number order. The scripts
/// are written to be re-runnable, so this happens on every start.
pub async fn migrate(p: &Pool<Postgres>, dir: &str) -> anyhow::Result<()> {
    let mut migration_files: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir))? {
        let entry = entry?;

        if !entry.metadata()?.is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().map_or(true, |e| e != "sql") {
            continue;
        }

        migration_files.push((migration_number(&path)?, path))
    }

    migration_files.sort_by_key(|v| v.0);

    log::info!("starting migration");
    for (_, path) in &migration_files {
        let content = fs::read_to_string(path)?;
        log::info!("migrating {}", path.display());
        sqlx::raw_sql(&content)
            .execute(p)
            .await
            .with_context(|| format!("applying {}", path.display()))?;
    }
    log::info!("migration end");

    Ok(())
}

fn migration_number(path: &PathBuf) -> anyhow::Result<usize> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("bad migration file name {}", path.display()))?;
    name.get(..3)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| anyhow!("migration {} must start with a 3 digit number", name))
}
