#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod message;

pub use message::Message;
