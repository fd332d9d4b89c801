//! Print the peering CRD manifests as a multi-document YAML stream.

use crds::{NetPeering, NetPeeringAcceptance, NetPeeringRequest};
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crds = [
        NetPeeringRequest::crd(),
        NetPeeringAcceptance::crd(),
        NetPeering::crd(),
    ];

    for crd in crds {
        print!("---\n{}", serde_yaml::to_string(&crd)?);
    }

    Ok(())
}
