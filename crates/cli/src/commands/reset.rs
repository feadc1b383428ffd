//! Wipe marketplace data.

use tracing::info;

use ecofinds_storefront::storage::Storage;

use super::CliError;

/// Delete every key under the configured prefix. Keys belonging to other
/// prefixes in the same directory are left alone.
///
/// # Errors
///
/// Returns an error if a key cannot be listed or removed.
pub fn run(storage: &Storage) -> Result<(), CliError> {
    let keys: Vec<String> = storage
        .stored_keys()?
        .into_iter()
        .filter(|key| storage.keys().owns(key))
        .collect();

    for key in &keys {
        storage.remove(key)?;
        info!("  removed {key}");
    }
    info!("Reset complete: {} keys removed", keys.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::open_storage;

    #[test]
    fn test_reset_keeps_other_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let ours = open_storage(dir.path(), "ecofinds").unwrap();
        let theirs = open_storage(dir.path(), "evoswap").unwrap();
        let neighbour = open_storage(dir.path(), "ecofinds_staging").unwrap();
        ours.save(&ours.keys().users(), &Vec::<u32>::new()).unwrap();
        ours.save(&ours.keys().products(), &Vec::<u32>::new()).unwrap();
        theirs.save(&theirs.keys().users(), &Vec::<u32>::new()).unwrap();
        neighbour.save(&neighbour.keys().users(), &Vec::<u32>::new()).unwrap();

        run(&ours).unwrap();

        assert_eq!(
            ours.stored_keys().unwrap(),
            vec![
                "ecofinds_staging_users".to_string(),
                "evoswap_users".to_string()
            ]
        );
    }
}
