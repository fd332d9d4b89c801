//! Kubeconfig fixtures with real client certificates

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Kubeconfig whose client certificate expires on January 1st of `year`
pub fn kubeconfig_expiring(year: i32) -> String {
    let mut params = rcgen::CertificateParams::new(vec!["oks-user".to_string()]).unwrap();
    params.not_before = rcgen::date_time_ymd(2020, 1, 1);
    params.not_after = rcgen::date_time_ymd(year, 1, 1);
    let key = rcgen::KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();

    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: oks
  cluster:
    server: https://127.0.0.1:6443
users:
- name: oks-user
  user:
    client-certificate-data: {}
    client-key-data: {}
contexts:
- name: oks
  context:
    cluster: oks
    user: oks-user
current-context: oks
"#,
        STANDARD.encode(cert.pem()),
        STANDARD.encode(key.serialize_pem()),
    )
}

pub fn kubeconfig_without_certificate() -> String {
    r#"apiVersion: v1
kind: Config
clusters:
- name: oks
  cluster:
    server: https://127.0.0.1:6443
users:
- name: oks-user
  user:
    token: abc123
contexts:
- name: oks
  context:
    cluster: oks
    user: oks-user
current-context: oks
"#
    .to_string()
}
