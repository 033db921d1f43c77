//! The single sync-over-async adapter.
//!
//! Async-only operations (OCR, markup reads) are bridged to the synchronous
//! dispatch surface here and nowhere else, so a future fully-asynchronous
//! interpreter can swap this adapter without touching operation
//! implementations. Blocking the calling thread is the documented cost of
//! the synchronous entry point; procedure steps are sequential and rarely
//! latency-critical enough to justify a reactive pipeline.
//!
//! Callers already inside a multi-threaded tokio runtime are bridged with
//! `block_in_place`; callers with no runtime at all borrow a lazily-built
//! current-thread runtime. Calling from a *current-thread* runtime is not
//! supported; use the asynchronous entry point there.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};

static FALLBACK_RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build the fallback runtime for sync bridging")
});

/// Run `future` to completion, blocking the calling thread.
pub fn block_on<F: Future>(future: F) -> F::Output {
    match Handle::try_current() {
        Ok(handle) => tokio::task::block_in_place(|| handle.block_on(future)),
        Err(_) => FALLBACK_RUNTIME.block_on(future),
    }
}
