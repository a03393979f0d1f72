use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{AppError, Result};

/// Decoded size of an inline blob: either a `data:<mime>;base64,<payload>`
/// URL or bare base64 text.
pub fn decoded_len(blob: &str) -> Result<usize> {
    let payload = match blob.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| AppError::BadRequest("Malformed data URL".to_string()))?,
        None => blob,
    };

    STANDARD
        .decode(payload.trim())
        .map(|bytes| bytes.len())
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 payload: {}", e)))
}

/// Rejects a blob larger than `max_bytes` once decoded.
pub fn check_blob(field: &str, blob: &str, max_bytes: usize) -> Result<()> {
    let len = decoded_len(blob).map_err(|e| match e {
        AppError::BadRequest(msg) => AppError::ValidationFailed(vec![format!("{}: {}", field, msg)]),
        other => other,
    })?;

    if len > max_bytes {
        return Err(AppError::ValidationFailed(vec![format!(
            "{} is too large ({} bytes, max {} MB)",
            field,
            len,
            max_bytes / (1024 * 1024)
        )]));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_and_bare_base64() {
        let encoded = STANDARD.encode(vec![7u8; 300]);
        assert_eq!(decoded_len(&encoded).unwrap(), 300);
        assert_eq!(
            decoded_len(&format!("data:image/png;base64,{}", encoded)).unwrap(),
            300
        );
    }

    #[test]
    fn test_size_ceiling() {
        let blob = format!("data:application/pdf;base64,{}", STANDARD.encode(vec![0u8; 2048]));
        assert!(check_blob("receipt", &blob, 4096).is_ok());

        match check_blob("receipt", &blob, 1024) {
            Err(AppError::ValidationFailed(errors)) => assert!(errors[0].starts_with("receipt")),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            check_blob("logo", "data:image/png;base64,@@@", 1024),
            Err(AppError::ValidationFailed(_))
        ));
        assert!(decoded_len("data:image/png;base64").is_err());
    }
}
