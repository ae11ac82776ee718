use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

/// Oldest request timestamp accepted, in seconds.
const MAX_REQUEST_AGE_SECS: u64 = 300;
/// Allowed clock skew for timestamps from the future, in seconds.
const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Checks Slack's `v0` request signature over `v0:{timestamp}:{body}`.
#[must_use]
pub fn verify_slack_signature(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
) -> bool {
    let Ok(ts) = timestamp.parse::<u64>() else {
        error!("Slack request timestamp is not a number");
        return false;
    };
    let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        error!("System clock is before the Unix epoch");
        return false;
    };
    let now_secs = now.as_secs();
    if now_secs.saturating_sub(ts) > MAX_REQUEST_AGE_SECS || ts > now_secs + MAX_CLOCK_SKEW_SECS {
        error!("Timestamp out of range, potential replay attack");
        return false;
    }

    let Some(expected) = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
    else {
        error!("Malformed X-Slack-Signature header");
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(signing_secret.as_bytes()) else {
        error!("Failed to create HMAC");
        return false;
    };
    mac.update(format!("v0:{timestamp}:{request_body}").as_bytes());

    if mac.verify_slice(&expected).is_ok() {
        true
    } else {
        error!("Slack signature verification failed");
        false
    }
}

/// Computes the `v0=` signature Slack would send for `request_body`.
#[must_use]
pub fn compute_signature(timestamp: &str, request_body: &str, signing_secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(signing_secret.as_bytes()) else {
        error!("Failed to create HMAC");
        return String::new();
    };
    mac.update(format!("v0:{timestamp}:{request_body}").as_bytes());
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .to_string()
    }

    #[test]
    fn accepts_matching_signature() {
        let ts = now();
        let sig = compute_signature(&ts, "text=2255", "secret");
        assert!(verify_slack_signature("text=2255", &ts, &sig, "secret"));
    }

    #[test]
    fn rejects_tampered_body_and_wrong_secret() {
        let ts = now();
        let sig = compute_signature(&ts, "text=2255", "secret");
        assert!(!verify_slack_signature("text=9999", &ts, &sig, "secret"));
        assert!(!verify_slack_signature("text=2255", &ts, &sig, "other"));
    }

    #[test]
    fn rejects_stale_timestamp() {
        let ts = "1000";
        let sig = compute_signature(ts, "text=2255", "secret");
        assert!(!verify_slack_signature("text=2255", ts, &sig, "secret"));
    }

    #[test]
    fn rejects_malformed_signature_header() {
        let ts = now();
        assert!(!verify_slack_signature("text=2255", &ts, "v1=zz", "secret"));
        assert!(!verify_slack_signature("text=2255", &ts, "v0=not-hex", "secret"));
    }
}
