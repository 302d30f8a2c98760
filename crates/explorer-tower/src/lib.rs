//! Small pieces of [`tower`] plumbing shared by the explorer service crates

use std::pin::Pin;

use futures::Future;


/// Boxed future returned by the middleware in this workspace
pub type ResponseFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Takes the ready service out of `src`, leaving a fresh clone behind.
///
/// See <https://docs.rs/tower/latest/tower/trait.Service.html#be-careful-when-cloning-inner-services>
pub fn take_ready_service<S, T>(src: &mut S) -> S
where
    S: tower::Service<T> + Clone,
{
    let clone = src.clone();
    std::mem::replace(src, clone)
}
