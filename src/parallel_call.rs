// Bounded parallel map - a fixed pool of tokio workers pulling from a shared cursor
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinSet;

use crate::error::{ExportError, ExportResult};

/// Maximum number of in-flight invocations allowed by [`map_limit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConcurrencyLimit(NonZeroUsize);

impl ConcurrencyLimit {
    pub fn new(limit: usize) -> ExportResult<Self> {
        NonZeroUsize::new(limit).map(Self).ok_or_else(|| {
            ExportError::InvalidConfigurationError(format!(
                "concurrency limit must be a positive integer, got {}",
                limit
            ))
        })
    }

    pub const fn from_nonzero(limit: NonZeroUsize) -> Self {
        Self(limit)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for ConcurrencyLimit {
    type Error = ExportError;

    fn try_from(limit: usize) -> ExportResult<Self> {
        Self::new(limit)
    }
}

impl TryFrom<i64> for ConcurrencyLimit {
    type Error = ExportError;

    fn try_from(limit: i64) -> ExportResult<Self> {
        match usize::try_from(limit) {
            Ok(limit) => Self::new(limit),
            Err(_) => Err(ExportError::InvalidConfigurationError(format!(
                "concurrency limit must be a positive integer, got {}",
                limit
            ))),
        }
    }
}

impl TryFrom<i32> for ConcurrencyLimit {
    type Error = ExportError;

    fn try_from(limit: i32) -> ExportResult<Self> {
        Self::try_from(i64::from(limit))
    }
}

impl TryFrom<f64> for ConcurrencyLimit {
    type Error = ExportError;

    /// Fractional limits are floored; anything below one slot is rejected.
    fn try_from(limit: f64) -> ExportResult<Self> {
        if !limit.is_finite() || limit < 1.0 {
            return Err(ExportError::InvalidConfigurationError(format!(
                "concurrency limit must be a finite positive number, got {}",
                limit
            )));
        }
        Self::new(limit.floor() as usize)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> ExportResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ExportError::TaskError("parallel worker state was poisoned".to_string()))
}

/// Apply `function` to every item with at most `limit` invocations in flight.
///
/// Workers claim the next unclaimed index from a shared atomic cursor as soon
/// as they finish an item, so slow items never leave a slot idle. Result `i`
/// always belongs to item `i`, whatever the completion order.
///
/// The first error returned by any invocation fails the whole call; the
/// remaining workers are aborted and their results discarded. An invalid
/// limit fails before `function` is invoked on anything.
pub async fn map_limit<T, R, F, Fut, L>(items: Vec<T>, limit: L, function: F) -> ExportResult<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ExportResult<R>> + Send + 'static,
    L: TryInto<ConcurrencyLimit>,
    L::Error: Into<ExportError>,
{
    let limit: ConcurrencyLimit = limit.try_into().map_err(Into::<ExportError>::into)?;

    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let pending: Arc<Mutex<Vec<Option<T>>>> =
        Arc::new(Mutex::new(items.into_iter().map(Some).collect()));
    let slots: Arc<Mutex<Vec<Option<R>>>> =
        Arc::new(Mutex::new((0..total).map(|_| None).collect()));
    let cursor = Arc::new(AtomicUsize::new(0));
    let function = Arc::new(function);

    let worker_count = limit.get().min(total);
    log::debug!("Dispatching {} items across {} workers", total, worker_count);

    let mut workers = JoinSet::new();
    for _ in 0..worker_count {
        let pending = Arc::clone(&pending);
        let slots = Arc::clone(&slots);
        let cursor = Arc::clone(&cursor);
        let function = Arc::clone(&function);

        workers.spawn(async move {
            loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                if index >= total {
                    return Ok::<(), ExportError>(());
                }

                let item = lock(&pending)?[index].take();
                let Some(item) = item else {
                    continue;
                };

                let result = function(item).await?;
                lock(&slots)?[index] = Some(result);
            }
        });
    }

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                workers.abort_all();
                return Err(e);
            }
            Err(e) => {
                workers.abort_all();
                return Err(ExportError::TaskError(format!("worker failed: {}", e)));
            }
        }
    }

    let slots = std::mem::take(&mut *lock(&slots)?);
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| ExportError::TaskError(format!("no result produced for item {}", index)))
        })
        .collect()
}
