//! Object names for a peering attempt

use crds::{ACCEPTANCE_SUFFIX, REQUEST_SUFFIX};

const SUFFIX_LEN: usize = 6;

/// Names of the request and acceptance objects of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeringNames {
    /// `<base>-<6 hex>`
    pub base: String,
    pub request: String,
    pub acceptance: String,
}

impl PeeringNames {
    /// Names from `given`, or `<source>-to-<target>` when absent, with a fresh random suffix
    pub fn generate(given: Option<&str>, source_project: &str, target_project: &str) -> Self {
        Self::with_suffix(given, source_project, target_project, &random_suffix())
    }

    pub fn with_suffix(
        given: Option<&str>,
        source_project: &str,
        target_project: &str,
        suffix: &str,
    ) -> Self {
        let stem = match given {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}-to-{}", source_project, target_project),
        };
        let base = format!("{}-{}", stem, suffix);
        Self {
            request: format!("{}{}", base, REQUEST_SUFFIX),
            acceptance: format!("{}{}", base, ACCEPTANCE_SUFFIX),
            base,
        }
    }
}

/// Six lowercase hex characters
pub fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(SUFFIX_LEN);
    suffix
}
