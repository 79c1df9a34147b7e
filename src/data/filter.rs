use log::info;

use super::model::{TripFilter, TripTable};

/// Consume the table and keep only the trips passing `filter`, in original
/// order. Optional-column flags carry over unchanged.
pub fn apply_filter(table: TripTable, filter: &TripFilter) -> TripTable {
    if filter.is_identity() {
        return table;
    }
    let before = table.len();
    let TripTable {
        trips,
        has_gender,
        has_birth_year,
    } = table;
    let trips: Vec<_> = trips.into_iter().filter(|t| filter.matches(t)).collect();
    info!("filter {filter:?} kept {} of {before} trips", trips.len());
    TripTable::new(trips, has_gender, has_birth_year)
}
