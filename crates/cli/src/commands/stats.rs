//! Show document counts per collection.

use tracing::info;

use longbox_core::Collection;
use longbox_core::catalog::Predicate;
use longbox_storefront::db::{DocumentStore, PgDocumentStore};

use super::{CommandError, connect};

/// Log the number of comics and user records.
///
/// # Errors
///
/// Returns an error if the database connection or a count fails.
pub async fn run() -> Result<(), CommandError> {
    let store = PgDocumentStore::new(connect().await?);

    info!("Catalog Statistics");
    info!("==================");
    for collection in [Collection::Comics, Collection::Users] {
        let total = store.count(collection, &Predicate::all()).await?;
        info!("  {collection}: {total}");
    }

    Ok(())
}
