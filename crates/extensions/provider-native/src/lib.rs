//! Native-host-proxied action provider for deskpilot.

mod provider;

pub use provider::NativeHostProvider;
