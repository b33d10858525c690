use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;

const DIRECTORY_KEY: &str = "active-employees";

/// Short-lived snapshot of the Employee-role directory. Aggregator queries
/// and bulk salary runs hit this instead of re-listing the users table on
/// every request.
static DIRECTORY_CACHE: Lazy<Cache<&'static str, Arc<Vec<u64>>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(8)
        .time_to_live(Duration::from_secs(60))
        .build()
});

/// Ids of every currently-existing Employee-role account, ascending.
pub async fn active_employee_ids(pool: &MySqlPool) -> Result<Arc<Vec<u64>>, sqlx::Error> {
    if let Some(ids) = DIRECTORY_CACHE.get(DIRECTORY_KEY).await {
        return Ok(ids);
    }

    let ids = Arc::new(load_ids(pool).await?);
    DIRECTORY_CACHE.insert(DIRECTORY_KEY, ids.clone()).await;
    Ok(ids)
}

async fn load_ids(pool: &MySqlPool) -> Result<Vec<u64>, sqlx::Error> {
    let mut stream =
        sqlx::query_as::<_, (u64,)>("SELECT id FROM users WHERE role = 'Employee' ORDER BY id")
            .fetch(pool);

    let mut ids = Vec::new();
    while let Some(row) = stream.next().await {
        let (id,) = row?;
        ids.push(id);
    }

    Ok(ids)
}

/// Must be called whenever an employee account is created or deleted, so the
/// snapshot never outlives the directory change beyond its TTL.
pub async fn invalidate() {
    DIRECTORY_CACHE.invalidate(DIRECTORY_KEY).await;
}

/// Pre-populate the snapshot at boot.
pub async fn warmup_directory_cache(pool: &MySqlPool) -> Result<()> {
    let ids = active_employee_ids(pool).await?;
    log::info!(
        "Employee directory warmup complete: {} active employees",
        ids.len()
    );
    Ok(())
}
