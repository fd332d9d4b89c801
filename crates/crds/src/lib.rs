//! OKS NetPeering CRD Definitions
//!
//! Custom resources reconciled by the OKS network controller. The CLI only
//! authors `NetPeeringRequest` and `NetPeeringAcceptance`; `NetPeering` is
//! created by the controller and observed.

pub mod net_peering;
pub mod net_peering_acceptance;
pub mod net_peering_request;
pub mod node_pool;
pub mod state;

pub use net_peering::*;
pub use net_peering_acceptance::*;
pub use net_peering_request::*;
pub use node_pool::*;
pub use state::*;
