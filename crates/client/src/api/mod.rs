//! Endpoint groups, each an `impl VraClient` block

mod blueprints;
mod block_devices;
mod cloud_accounts;
mod deployments;
mod fabric;
mod machines;
mod networks;
mod profiles;
mod projects;
mod zones;
