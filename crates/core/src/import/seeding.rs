//! Initial passwords for imported accounts.
//!
//! Account rows carry their password seed out of validation unhashed. Once the
//! whole file has passed, the seeds of accounts that do not exist yet are
//! hashed (each distinct seed once) and moved into the row's `set_on_insert`.
//! Accounts that already exist keep their password, so their seeds are
//! dropped without paying for Argon2.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::num::NonZeroUsize;

use serde_json::Value;
use tokio::task::JoinSet;

use super::checks::PASSWORD_FIELD;
use super::kind::ImportKind;
use super::row::RowRecord;
use super::ImportError;
use crate::password::hash_password;
use crate::store::{DocumentStore, Filter};

/// Hash the password seeds of rows whose account is new. Returns the number
/// of hashes computed.
pub async fn seed_passwords(
    store: &dyn DocumentStore,
    kind: ImportKind,
    rows: &mut [RowRecord],
) -> Result<usize, ImportError> {
    let Some(key) = kind.account_key() else {
        return Ok(0);
    };
    let account_id = |row: &RowRecord| row.set.get(key).and_then(Value::as_i64);

    let ids: BTreeSet<i64> = rows
        .iter()
        .filter(|row| row.password_seed.is_some())
        .filter_map(account_id)
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }

    let filter = Filter::new().any_of(key, ids.iter().map(|id| Value::from(*id)).collect());
    let existing: HashSet<i64> = store
        .find(kind.collection(), &filter)
        .await
        .map_err(ImportError::Lookup)?
        .iter()
        .filter_map(|account| account.get(key).and_then(Value::as_i64))
        .collect();

    let is_new = |row: &RowRecord| account_id(row).is_some_and(|id| !existing.contains(&id));
    let pending: BTreeSet<String> = rows
        .iter()
        .filter(|row| is_new(row))
        .filter_map(|row| row.password_seed.clone())
        .collect();
    tracing::debug!(
        kind = %kind,
        accounts = ids.len(),
        existing = existing.len(),
        pending = pending.len(),
        "Seeding passwords"
    );

    let hashes = hash_all(pending).await?;
    for row in rows.iter_mut() {
        let new_account = is_new(&*row);
        let Some(seed) = row.password_seed.take() else {
            continue;
        };
        if let Some(hash) = hashes.get(&seed).filter(|_| new_account) {
            row.set_on_insert
                .insert(PASSWORD_FIELD.to_string(), Value::String(hash.clone()));
        }
    }
    Ok(hashes.len())
}

/// Hash `seeds` on the blocking pool, at most one per available core at a time.
async fn hash_all(seeds: BTreeSet<String>) -> Result<HashMap<String, String>, ImportError> {
    let limit = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let mut seeds = seeds.into_iter();
    let mut tasks = JoinSet::new();
    let mut hashes = HashMap::new();

    loop {
        while tasks.len() < limit {
            let Some(seed) = seeds.next() else {
                break;
            };
            tasks.spawn_blocking(move || {
                let hash = hash_password(&seed);
                (seed, hash)
            });
        }
        let Some(joined) = tasks.join_next().await else {
            break;
        };
        let (seed, hash) =
            joined.map_err(|e| ImportError::Internal(format!("Password task failed: {e}")))?;
        let hash = hash.map_err(|e| ImportError::Internal(format!("Password hashing failed: {e}")))?;
        hashes.insert(seed, hash);
    }
    Ok(hashes)
}
