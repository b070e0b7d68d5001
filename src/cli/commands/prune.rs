use crate::config::Config;
use crate::db::Store;
use crate::services::scheduler::run_retention;

/// One-off retention sweep, same work as the scheduled job.
pub async fn cmd_prune_activity(config: &Config, days: Option<u32>) -> anyhow::Result<()> {
    let days = days.unwrap_or(config.activity.retention_days);
    if days == 0 {
        anyhow::bail!("--days must be greater than 0");
    }

    let store = Store::new(&config.general.database_path).await?;
    let report = run_retention(&store, days).await?;

    println!(
        "Removed {} activity entries older than {} days and {} stale refresh tokens.",
        report.activities, days, report.refresh_tokens
    );
    Ok(())
}
