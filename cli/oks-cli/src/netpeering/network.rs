//! CIDR overlap guard

use std::str::FromStr;

use ipnetwork::IpNetwork;

use crate::{CliError, Result};

pub fn parse_cidr(cidr: &str) -> Result<IpNetwork> {
    IpNetwork::from_str(cidr.trim()).map_err(|e| CliError::InvalidCidr {
        cidr: cidr.to_string(),
        reason: e.to_string(),
    })
}

/// Fail with `Overlap` when either range contains the other's network address.
///
/// Both directions are evaluated explicitly.
pub fn ensure_disjoint(source_cidr: &str, target_cidr: &str) -> Result<()> {
    let source = parse_cidr(source_cidr)?;
    let target = parse_cidr(target_cidr)?;

    if source.contains(target.network()) || target.contains(source.network()) {
        return Err(CliError::Overlap {
            source_cidr: source_cidr.to_string(),
            target_cidr: target_cidr.to_string(),
        });
    }
    Ok(())
}
