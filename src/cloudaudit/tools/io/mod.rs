//! Loading inventory sources and reading or writing workbooks.

pub mod csv_source;
pub mod excel_read;
pub mod excel_write;
#[cfg(feature = "postgres")]
pub mod postgres_source;
