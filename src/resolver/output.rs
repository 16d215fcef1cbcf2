//! Response format and asynchronous wait

use tracing::debug;
use crate::error::RequestError;
use crate::request::{AsyncAfter, ResponseFormat};

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve the response format, `json` when absent
pub fn resolve_format(raw: Option<&str>) -> Result<ResponseFormat, RequestError> {
    match present(raw) {
        None => Ok(ResponseFormat::default()),
        Some(format) => ResponseFormat::parse(format).ok_or_else(|| {
            debug!(format, "Unsupported response format");
            RequestError::FormatInvalid(format.to_string())
        }),
    }
}

/// Resolve asyncAfter, `default` when absent
pub fn resolve_async_after(raw: Option<&str>, default: AsyncAfter) -> Result<AsyncAfter, RequestError> {
    match present(raw) {
        None => Ok(default),
        Some(value) => AsyncAfter::parse(value).ok_or_else(|| {
            debug!(async_after = value, "Invalid asyncAfter");
            RequestError::AsyncAfterInvalid(value.to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(resolve_format(None), Ok(ResponseFormat::Json));
        assert_eq!(resolve_format(Some("JSONAPI")), Ok(ResponseFormat::JsonApi));
        assert_eq!(resolve_format(Some("xml")), Err(RequestError::FormatInvalid("xml".into())));
    }

    #[test]
    fn test_async_after() {
        assert_eq!(resolve_async_after(Some(""), AsyncAfter::Never), Ok(AsyncAfter::Never));
        assert_eq!(resolve_async_after(Some("always"), AsyncAfter::Never), Ok(AsyncAfter::Always));
        assert_eq!(resolve_async_after(Some("250"), AsyncAfter::Never), Ok(AsyncAfter::Millis(250)));
        assert_eq!(
            resolve_async_after(Some("-1"), AsyncAfter::Never),
            Err(RequestError::AsyncAfterInvalid("-1".into()))
        );
    }
}
