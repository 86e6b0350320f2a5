//! FFI surface exposed to Flutter through flutter_rust_bridge.

pub mod api;
