/// HTTP client for submitting artifacts to a relay.
pub mod client;
/// Relay server settings.
pub mod config;
/// Forwarding uploads to the remote video API.
pub mod graph;
/// The relay's HTTP routes.
pub mod server;
