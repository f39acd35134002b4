/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credentials were rejected by the provider.
    AuthFailed,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The provider endpoint could not be reached.
    Unreachable,
    /// Any other errors.
    Other,
}
