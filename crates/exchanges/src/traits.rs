//! Transport seam
//!
//! The REST client never opens sockets itself; it hands a prepared
//! [`HttpRequest`] to an [`HttpTransport`] and gets the raw response back.
//! [`crate::http::MonoioHttpsClient`] is the production implementation.

use crate::errors::Result;
use crate::http::{HttpRequest, HttpResponse};
use async_trait::async_trait;

/// Sends one HTTP request and returns the raw response.
///
/// Futures are not `Send`: monoio runs each runtime on a single thread.
#[async_trait(?Send)]
pub trait HttpTransport {
    /// Fails with `Transport` or `Timeout` when no response was obtained.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for std::rc::Rc<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request).await
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request).await
    }
}
