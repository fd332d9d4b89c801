//! Client certificate expiry inspection for kubeconfig documents

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use kube::config::Kubeconfig;
use tracing::{debug, warn};

use crate::error::KubectlError;

/// Certificates expiring within this window are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Earliest `notAfter` across the embedded client certificates.
///
/// Returns `Ok(None)` when the kubeconfig carries no client certificate
/// (token or exec based auth).
pub fn client_certificate_expiry(kubeconfig: &str) -> Result<Option<DateTime<Utc>>, KubectlError> {
    let config = Kubeconfig::from_yaml(kubeconfig)
        .map_err(|e| KubectlError::Credential(format!("invalid kubeconfig: {}", e)))?;

    let mut earliest: Option<DateTime<Utc>> = None;
    for named in &config.auth_infos {
        let Some(data) = named
            .auth_info
            .as_ref()
            .and_then(|auth| auth.client_certificate_data.as_deref())
        else {
            continue;
        };

        let expiry = decode_not_after(data)?;
        debug!("Client certificate for '{}' expires at {}", named.name, expiry);
        earliest = Some(match earliest {
            Some(current) if current <= expiry => current,
            _ => expiry,
        });
    }
    Ok(earliest)
}

/// Whether a cached kubeconfig can still be used at `now`.
///
/// Unparsable documents are reported invalid so they get refreshed.
pub fn is_usable(kubeconfig: &str, now: DateTime<Utc>) -> bool {
    match client_certificate_expiry(kubeconfig) {
        Ok(Some(expiry)) => expiry > now + Duration::seconds(EXPIRY_MARGIN_SECS),
        Ok(None) => true,
        Err(e) => {
            warn!("Cached kubeconfig is unusable: {}", e);
            false
        }
    }
}

fn decode_not_after(data: &str) -> Result<DateTime<Utc>, KubectlError> {
    let pem_bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| KubectlError::Credential(format!("client certificate is not base64: {}", e)))?;
    let (_, pem) = x509_parser::pem::parse_x509_pem(&pem_bytes)
        .map_err(|e| KubectlError::Credential(format!("client certificate is not PEM: {}", e)))?;
    let cert = pem
        .parse_x509()
        .map_err(|e| KubectlError::Credential(format!("client certificate is not X.509: {}", e)))?;

    let timestamp = cert.validity().not_after.timestamp();
    DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        KubectlError::Credential(format!("certificate expiry {} out of range", timestamp))
    })
}
