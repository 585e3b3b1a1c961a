//! Series dimension manager.

use tracing::debug;

use crate::domain::SeriesDimRow;
use crate::error::StoreError;
use crate::warehouse::Warehouse;

/// Register `series_id` unless it is already known. The first name written wins.
///
/// Returns `true` when this call created the row.
pub fn ensure_series<W: Warehouse>(warehouse: &mut W, series_id: &str, series_name: &str) -> Result<bool, StoreError> {
    let row = SeriesDimRow {
        series_id: series_id.to_string(),
        series_name: series_name.to_string(),
    };
    let registered = warehouse.transaction(|tx| {
        tx.create_series_dim()?;
        tx.insert_series(&row)
    })?;
    debug!(series_id, registered, "series dimension checked");
    Ok(registered)
}
