//! Scoped fan-out of two independent reads

use crate::error::{GridError, Result};

/// Run `first` on a scoped worker thread and `second` on the caller, then
/// wait for both
///
/// The first error wins, checked in argument order.
pub(crate) fn join<A, B, FA, FB>(first: FA, second: FB) -> Result<(A, B)>
where
    A: Send,
    FA: FnOnce() -> Result<A> + Send,
    FB: FnOnce() -> Result<B>,
{
    crossbeam::thread::scope(|scope| {
        let handle = scope.spawn(move |_| first());
        let b = second();
        let a = handle
            .join()
            .map_err(|_| GridError::FanOut("worker thread panicked".to_string()))?;
        Ok((a?, b?))
    })
    .map_err(|_| GridError::FanOut("fan-out scope panicked".to_string()))?
}
