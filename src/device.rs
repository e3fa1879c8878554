//! HID transport seam.
//!
//! Everything above this module talks to hardware through two traits:
//! - [`HidTransport`]: process-wide context; enumerates interfaces and opens
//!   handles. Creating one is the library init, dropping it is the teardown.
//! - [`HidHandle`]: one open interface. Dropping it closes the interface.
//!
//! All calls block until the OS or driver answers. Backends live in
//! [`crate::backends`]: `hidapi` for real hardware, `virtual_hid` for tests.

use crate::metadata::DeviceDescriptor;
use thiserror::Error;

/// Failure reported by a transport call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Error text from the underlying HID library.
    #[error("{0}")]
    Hid(String),

    #[error("invalid device path `{0}`")]
    InvalidPath(String),

    #[error("no matching device")]
    NotFound,

    #[error("not supported on this platform")]
    Unsupported,
}

/// Enumerate and open HID interfaces.
pub trait HidTransport {
    type Handle: HidHandle;

    /// Snapshot every interface matching the filter; `0` is a wildcard for
    /// either field, so `(0, 0)` lists every HID device on the system.
    fn enumerate(
        &mut self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open the interface at `path`.
    fn open_path(&self, path: &str) -> Result<Self::Handle, TransportError>;

    /// Open the first interface matching vendor/product. May pick a different
    /// interface than the caller had in mind.
    fn open(&self, vendor_id: u16, product_id: u16) -> Result<Self::Handle, TransportError>;
}

/// One open HID interface.
pub trait HidHandle {
    /// Get a feature report. `buf[0]` selects the report ID on input; returns
    /// the number of bytes written into `buf`, report ID included.
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Send a feature report; `data[0]` is the report ID.
    fn send_feature_report(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Text of the most recent failure on this handle, if any.
    fn last_error(&self) -> Option<String>;

    /// Descriptor of the open interface, when the backend can report it.
    fn descriptor(&self) -> Option<DeviceDescriptor> {
        None
    }
}
