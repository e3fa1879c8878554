//! Transport backends for `sixpair`.
//!
//! Implementations of [`HidTransport`](crate::device::HidTransport):
//! - [`hid`]: real hardware through `hidapi`.
//! - [`virtual_hid`]: scripted in-memory controllers; no hardware needed.
//!
//! [`raw_node`] holds the platform raw-HID-node lookup used by the
//! DualShock 4 connection fallback.
//!
//! # Feature flags
//! - **`hid`**: enables the `hidapi` backend and the `sixpair` binary (default).

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;
pub mod raw_node;
pub mod virtual_hid;
