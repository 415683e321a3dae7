// Failure taxonomy for a single API call.
//
// A successful exchange is `Ok(HttpResponse)`; everything that stops an
// operation before it can read a response body lands here. Soft degrades
// (a 2xx whose body could not be interpreted) are not errors and are
// reported by the operation handlers instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// An auth-required call was attempted without a bearer token. No
    /// request was sent.
    #[error("You must login first.")]
    Precondition,

    /// No HTTP exchange completed (DNS, refused connection, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a status >= 400. The body is kept verbatim.
    #[error("HTTP {status}. Server response: {body}")]
    Http { status: u16, body: String },

    /// The payload could not be turned into JSON.
    #[error("Could not encode request: {0}")]
    Serialization(String),
}
