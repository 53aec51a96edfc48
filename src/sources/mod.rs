/// Sources module
///
/// Fetches the CSRF token from the page origin and stores it in the page state.

pub mod credentials;
pub mod csrf;

/// Something that can run the one-shot token bootstrap.
///
/// Failures are reported by the implementor, never returned.
pub trait FetchToken {
    fn fetch_token(&self) -> impl std::future::Future<Output = ()> + Send;
}
