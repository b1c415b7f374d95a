//! Read-only fleet aggregates — the reporting view over committed state.

use serde::Serialize;

use crate::{
  status::CarStatus,
  store::CarStore,
};

/// Counts over the committed car population; never stored, always derived.
#[derive(Debug, Clone, Serialize)]
pub struct FleetStats {
  pub total:     u64,
  /// Every status in lifecycle order, zero-filled.
  pub by_status: Vec<(CarStatus, u64)>,
  /// Sorted by descending count, then make.
  pub by_make:   Vec<(String, u64)>,
}

impl FleetStats {
  /// Gather the aggregates from a store. Each read reflects committed state
  /// only; an import batch in flight elsewhere is either fully visible or
  /// not at all.
  pub async fn gather<S: CarStore>(store: &S) -> Result<Self, S::Error> {
    let total = store.car_count().await?;
    let raw_by_status = store.count_by_status().await?;
    let mut by_make = store.count_by_make().await?;

    // Zero-fill so the report always shows all six stations.
    let by_status = CarStatus::ALL
      .iter()
      .map(|&status| {
        let count = raw_by_status
          .iter()
          .find(|(s, _)| *s == status)
          .map_or(0, |&(_, n)| n);
        (status, count)
      })
      .collect();

    by_make.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(Self { total, by_status, by_make })
  }
}
