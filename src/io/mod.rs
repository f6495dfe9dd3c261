//! File boundary: CSV/JSON export of results and CSV import of profiles.

pub mod export;
pub mod import;
