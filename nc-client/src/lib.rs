#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod client;
mod error;
mod view;

#[cfg(test)]
mod mock_node;

pub use crate::{
    client::{JoinRequest, PeerNetwork, PeerNetworkClient},
    error::Error,
    view::JoinNetworkView,
};
