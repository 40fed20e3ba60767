use std::future::Future;

use futures::future::{abortable, AbortHandle};

/// Platform-independent helper to spawn an async task that runs in the background.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

/// Platform-independent helper to spawn an async task that runs in the background.
///
/// Outside a tokio runtime the task goes to a shared current-thread runtime
/// driven by its own thread, so it makes progress even when the caller uses
/// another executor.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    use std::sync::LazyLock;
    use tokio::runtime::{Builder, Handle};

    static BACKGROUND_RUNTIME: LazyLock<Option<Handle>> = LazyLock::new(|| {
        let runtime = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                log::warn!("failed to build background tokio runtime: {err}");
                return None;
            }
        };
        let handle = runtime.handle().clone();
        let spawned = std::thread::Builder::new()
            .name("push-session-runtime".into())
            .spawn(move || runtime.block_on(std::future::pending::<()>()));
        match spawned {
            Ok(_) => Some(handle),
            Err(err) => {
                log::warn!("failed to start background runtime thread: {err}");
                None
            }
        }
    });

    if let Ok(handle) = Handle::try_current() {
        handle.spawn(future);
    } else if let Some(handle) = BACKGROUND_RUNTIME.as_ref() {
        handle.spawn(future);
    } else {
        log::warn!("no runtime available; background task dropped");
    }
}

/// `Send` on native targets, no bound on wasm32 where futures stay on one thread.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// Spawns `future` in the background and returns a handle that cancels it.
///
/// Aborting drops the future at its next suspension point, which releases any
/// stream it was polling.
pub fn spawn_abortable<F>(future: F) -> AbortHandle
where
    F: Future<Output = ()> + MaybeSend + 'static,
{
    let (task, handle) = abortable(future);
    spawn_detached(async move {
        let _ = task.await;
    });
    handle
}
