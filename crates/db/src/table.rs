use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard};
use utoipa::ToSchema;

/// Store-assigned identifier of a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

struct Inner<T> {
    next_id: u64,
    rows: BTreeMap<RecordId, T>,
}

/// A named collection of records of one type.
///
/// Cloning a table yields another handle to the same rows.
pub struct Table<T> {
    name: &'static str,
    inner: Arc<RwLock<Inner<T>>>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: self.inner.clone(),
        }
    }
}

impl<T> Table<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::new(RwLock::new(Inner {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get(&self, id: RecordId) -> Option<T> {
        self.inner.read().await.rows.get(&id).cloned()
    }

    /// Rows matching `filter`, in id order.
    pub async fn scan<F>(&self, filter: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .await
            .rows
            .values()
            .filter(|row| filter(row))
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<T> {
        self.scan(|_| true).await
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert a row built from its freshly assigned id.
    pub async fn insert<F>(&self, build: F) -> T
    where
        F: FnOnce(RecordId) -> T,
    {
        let mut inner = self.inner.write().await;
        let id = RecordId(inner.next_id);
        inner.next_id += 1;

        let row = build(id);
        inner.rows.insert(id, row.clone());
        tracing::trace!(table = self.name, %id, "row inserted");
        row
    }

    /// Mutate a row in place. Returns `None` when the id is unknown.
    pub async fn update<F, R>(&self, id: RecordId, apply: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut inner = self.inner.write().await;
        inner.rows.get_mut(&id).map(apply)
    }

    pub async fn delete(&self, id: RecordId) -> Option<T> {
        let removed = self.inner.write().await.rows.remove(&id);
        if removed.is_some() {
            tracing::trace!(table = self.name, %id, "row deleted");
        }
        removed
    }

    /// Delete every row matching `filter`, returning how many were removed.
    pub async fn delete_where<F>(&self, filter: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|_, row| !filter(row));
        before - inner.rows.len()
    }

    /// Shared access to the rows until the returned view is dropped.
    ///
    /// Writers on this table wait while the view is alive, so a row seen
    /// through it cannot be deleted before the view goes away.
    pub async fn read(&self) -> ReadView<'_, T> {
        ReadView {
            guard: self.inner.read().await,
        }
    }

    /// Run `work` with exclusive access to the table.
    ///
    /// Inserts staged through the [`Transaction`] become visible only if
    /// `work` returns `Ok`; on `Err` the table is left untouched. No other
    /// reader or writer observes the table between the reads and the commit.
    pub async fn transaction<F, R, E>(&self, work: F) -> Result<R, E>
    where
        F: FnOnce(&mut Transaction<'_, T>) -> Result<R, E>,
    {
        let mut inner = self.inner.write().await;

        let mut tx = Transaction {
            committed: &inner.rows,
            staged: Vec::new(),
            next_id: inner.next_id,
        };
        let result = work(&mut tx);
        let Transaction {
            staged, next_id, ..
        } = tx;

        match &result {
            Ok(_) => {
                inner.next_id = next_id;
                let staged_count = staged.len();
                inner.rows.extend(staged);
                tracing::trace!(table = self.name, staged_count, "transaction committed");
            }
            Err(_) => {
                tracing::trace!(table = self.name, "transaction rolled back");
            }
        }

        result
    }
}

/// Exclusive view of a table inside [`Table::transaction`].
pub struct Transaction<'a, T> {
    committed: &'a BTreeMap<RecordId, T>,
    staged: Vec<(RecordId, T)>,
    next_id: u64,
}

impl<T: Clone> Transaction<'_, T> {
    /// Rows matching `filter`, committed rows first, then staged inserts.
    pub fn scan<F>(&self, filter: F) -> Vec<&T>
    where
        F: Fn(&T) -> bool,
    {
        self.committed
            .values()
            .chain(self.staged.iter().map(|(_, row)| row))
            .filter(|row| filter(row))
            .collect()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.committed.get(&id).or_else(|| {
            self.staged
                .iter()
                .find(|(staged_id, _)| *staged_id == id)
                .map(|(_, row)| row)
        })
    }

    /// Stage an insert; the row is committed with the transaction.
    pub fn insert<F>(&mut self, build: F) -> T
    where
        F: FnOnce(RecordId) -> T,
    {
        let id = RecordId(self.next_id);
        self.next_id += 1;

        let row = build(id);
        self.staged.push((id, row.clone()));
        row
    }
}

/// Read-locked view of a table, see [`Table::read`].
pub struct ReadView<'a, T> {
    guard: RwLockReadGuard<'a, Inner<T>>,
}

impl<T> ReadView<'_, T> {
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.guard.rows.get(&id)
    }
}
