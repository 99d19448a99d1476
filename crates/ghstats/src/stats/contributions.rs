use super::StatsSource;

/// Sum contributions across every year the account has been active.
///
/// Years the API reports without a total count as zero. When the account has
/// no contribution years the per-year query is never sent.
pub async fn total_contributions<S>(source: &S) -> u64
where
    S: StatsSource + ?Sized,
{
    let years = source.fetch_contribution_years().await;
    if years.is_empty() {
        tracing::debug!("No contribution years reported");
        return 0;
    }

    let per_year = source.fetch_contributions_by_year(&years).await;
    let missing = per_year.iter().filter(|total| total.is_none()).count();
    if missing > 0 {
        tracing::debug!(missing, "Some years reported no contribution total");
    }

    per_year
        .into_iter()
        .fold(0u64, |acc, total| acc.saturating_add(total.unwrap_or(0)))
}
