mod handle;

pub use handle::*;

// Single-driver application: everything runs against Postgres.
pub type AppDbHandle<'c> = Handle<'c>;

pub fn map_err(e: sqlx::Error) -> crate::Error {
    crate::Error::Database(anyhow::Error::new(e))
}
