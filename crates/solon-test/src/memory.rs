//! In-memory storage engine.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use solon_crud::{EngineError, ListQuery, StorageEngine};

/// A row type stored in a [`MemoryTable`].
///
/// The row doubles as the write payload, so inserts echo the stored row.
pub trait MemoryRecord:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Key bound from path captures.
    type Key: DeserializeOwned + Send + Sync;

    /// Key of the parent row for nested lists.
    type Scope: Send + Sync;

    /// Returns true if this row is addressed by `key`.
    fn matches_key(&self, key: &Self::Key) -> bool;

    /// Returns true if this row belongs under `scope`.
    fn in_scope(&self, scope: &Self::Scope) -> bool {
        let _ = scope;
        true
    }

    /// Returns true if this row matches the `q` search term.
    fn matches_search(&self, term: &str) -> bool {
        let _ = term;
        true
    }

    /// Column/value pairs that must be unique across the table.
    fn unique_values(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Stores a generated id on a freshly inserted row.
    ///
    /// `sequence` increases by one per insert, starting at 1.
    fn assign_id(&mut self, sequence: u64) {
        let _ = sequence;
    }

    /// Applies an update payload to this row.
    fn apply(&mut self, payload: &Self);
}

struct State<R> {
    rows: Vec<R>,
    sequence: u64,
}

/// A [`StorageEngine`] over a `Vec`, for tests.
///
/// Rows keep insertion order. Updates report zero affected rows when the
/// payload leaves the row unchanged, the way MySQL counts changed rows.
pub struct MemoryTable<R: MemoryRecord> {
    name: &'static str,
    state: RwLock<State<R>>,
    failures: Mutex<VecDeque<EngineError>>,
}

impl<R: MemoryRecord> MemoryTable<R> {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: RwLock::new(State {
                rows: Vec::new(),
                sequence: 0,
            }),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Creates an empty table behind an `Arc`, ready to put in a binding.
    #[must_use]
    pub fn shared(name: &'static str) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Creates a shared table seeded with `rows`.
    ///
    /// Seeded rows bypass unique checks and id assignment.
    #[must_use]
    pub fn with_rows(name: &'static str, rows: impl IntoIterator<Item = R>) -> Arc<Self> {
        let table = Self::new(name);
        {
            let mut state = table.state.write();
            state.rows.extend(rows);
            state.sequence = state.rows.len() as u64;
        }
        Arc::new(table)
    }

    /// Returns the table name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns a snapshot of all rows.
    #[must_use]
    pub fn rows(&self) -> Vec<R> {
        self.state.read().rows.clone()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().rows.is_empty()
    }

    /// Queues an error returned by the next engine call instead of running it.
    pub fn fail_next(&self, error: EngineError) {
        self.failures.lock().push_back(error);
    }

    fn injected(&self) -> Result<(), EngineError> {
        match self.failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn check_unique(&self, rows: &[R], candidate: &R, skip: Option<usize>) -> Result<(), EngineError> {
        for (column, value) in candidate.unique_values() {
            let taken = rows
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .any(|(_, row)| {
                    row.unique_values()
                        .iter()
                        .any(|(c, v)| *c == column && *v == value)
                });
            if taken {
                return Err(EngineError::duplicate_key(format!(
                    "duplicate entry '{value}' for key '{}.{column}'",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl<R: MemoryRecord> fmt::Debug for MemoryTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTable")
            .field("name", &self.name)
            .field("rows", &self.len())
            .finish_non_exhaustive()
    }
}

impl<R: MemoryRecord> StorageEngine for MemoryTable<R> {
    type Key = R::Key;
    type Scope = R::Scope;
    type Row = R;
    type Payload = R;
    type Query = ListQuery;

    async fn has(&self, key: &R::Key) -> Result<bool, EngineError> {
        self.injected()?;
        Ok(self.state.read().rows.iter().any(|row| row.matches_key(key)))
    }

    async fn fetch_row(&self, key: &R::Key) -> Result<R, EngineError> {
        self.injected()?;
        self.state
            .read()
            .rows
            .iter()
            .find(|row| row.matches_key(key))
            .cloned()
            .ok_or_else(EngineError::no_rows)
    }

    async fn fetch_rows(
        &self,
        scope: Option<&R::Scope>,
        query: &ListQuery,
    ) -> Result<Vec<R>, EngineError> {
        self.injected()?;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
        Ok(self
            .state
            .read()
            .rows
            .iter()
            .filter(|row| scope.map_or(true, |scope| row.in_scope(scope)))
            .filter(|row| query.search().map_or(true, |term| row.matches_search(term)))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert(&self, payload: &mut R) -> Result<(), EngineError> {
        self.injected()?;
        let mut state = self.state.write();
        self.check_unique(&state.rows, payload, None)?;
        state.sequence += 1;
        payload.assign_id(state.sequence);
        state.rows.push(payload.clone());
        Ok(())
    }

    async fn update(&self, key: &R::Key, payload: &R) -> Result<u64, EngineError> {
        self.injected()?;
        let mut state = self.state.write();
        let Some(index) = state.rows.iter().position(|row| row.matches_key(key)) else {
            return Ok(0);
        };

        let mut updated = state.rows[index].clone();
        updated.apply(payload);
        self.check_unique(&state.rows, &updated, Some(index))?;

        if updated == state.rows[index] {
            return Ok(0);
        }
        state.rows[index] = updated;
        Ok(1)
    }

    async fn delete(&self, key: &R::Key) -> Result<u64, EngineError> {
        self.injected()?;
        let mut state = self.state.write();
        let before = state.rows.len();
        state.rows.retain(|row| !row.matches_key(key));
        Ok((before - state.rows.len()) as u64)
    }
}
