/// Read-side composition and audit logging
///
/// Services join records from several repositories into the views the API
/// returns. Lookups are per record and run concurrently; missing related
/// records are skipped or rendered as `null`, never turned into errors.
///
/// - `audit`: best-effort audit log writes
/// - `dashboard`: client dashboard overview
/// - `farm_health`: farm health views
/// - `farms`: farms joined with crops or owners, dashboards joined with farms

pub mod audit;
pub mod dashboard;
pub mod farm_health;
pub mod farms;
