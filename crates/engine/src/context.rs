//! Routing of writes through a caller's batch or an immediate context

use std::sync::Arc;

use widecol_concurrency::BatchContext;
use widecol_core::{ColumnStore, ConsistencyPolicy, Result};

/// Run `f` against the caller's batch, or against a throwaway immediate
/// context when there is none.
pub(crate) fn with_batch<T>(
    store: &Arc<dyn ColumnStore>,
    policy: &ConsistencyPolicy,
    batch: Option<&mut BatchContext>,
    f: impl FnOnce(&mut BatchContext) -> Result<T>,
) -> Result<T> {
    match batch {
        Some(ctx) => f(ctx),
        None => {
            let mut ctx = BatchContext::immediate(Arc::clone(store), policy.clone());
            f(&mut ctx)
        }
    }
}
