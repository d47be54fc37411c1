use crate::error::ApiError;
use actix_web::HttpRequest;
use carebook_infra::{Config, CRON_SIGNATURE_HEADER};

/// Only the external scheduler may invoke dispatch targets. It echoes the
/// signing key we attached to the schedule at create time; anything else
/// is rejected before any work happens.
pub fn protect_cron_route(req: &HttpRequest, config: &Config) -> Result<(), ApiError> {
    let signature = req
        .headers()
        .get(CRON_SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("Missing `{}` header", CRON_SIGNATURE_HEADER))
        })?;

    if !constant_time_eq(
        signature.as_bytes(),
        config.cron_signing_key.as_bytes(),
    ) {
        return Err(ApiError::Unauthorized(format!(
            "Invalid `{}` header",
            CRON_SIGNATURE_HEADER
        )));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_equal_secrets() {
        assert!(constant_time_eq(b"secret", b"secret"));
    }

    #[test]
    fn rejects_different_secrets() {
        assert!(!constant_time_eq(b"secret", b"secre7"));
        assert!(!constant_time_eq(b"secret", b"secret-but-longer"));
        assert!(!constant_time_eq(b"secret", b""));
    }
}
