//! Device descriptor snapshot.
//!
//! [`DeviceDescriptor`] is an owned, cloneable copy of one enumerated HID
//! interface. Transports build them in bulk from their enumeration snapshot
//! and release the snapshot before returning, so descriptors stay valid for
//! as long as the caller holds them.
//!
//! # Conventions
//! - `interface_number` is `-1` when the platform does not report one
//!   (Bluetooth, some macOS paths).
//! - `path` is opaque and platform-specific (`/dev/hidraw3`, `IOService:/...`,
//!   `\\?\hid#vid_054c&pid_09cc...`); it is unique within one enumeration and
//!   is what [`HidTransport::open_path`](crate::device::HidTransport::open_path)
//!   expects.
//! - `release_number` is BCD-ish `major << 8 | minor` as reported by USB.

use serde::Serialize;

/// One enumerated HID interface.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    /// USB Vendor ID (VID).
    pub vendor_id: u16,

    /// USB Product ID (PID).
    pub product_id: u16,

    /// Interface index on the USB device, `-1` if not applicable.
    pub interface_number: i32,

    /// OS path addressing this interface.
    pub path: String,

    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,

    /// HID Usage Page (e.g. `0x01` Generic Desktop).
    pub usage_page: u16,

    /// HID Usage within the page (e.g. `0x05` Gamepad).
    pub usage: u16,

    pub release_number: u16,
}

impl DeviceDescriptor {
    /// `major.minor` rendering of `release_number`, hex digits as USB prints them.
    pub fn release_string(&self) -> String {
        format!(
            "{:x}.{:x}",
            self.release_number >> 8,
            self.release_number & 0xff
        )
    }

    /// `Some(n)` when the platform reported an interface number.
    pub fn interface(&self) -> Option<i32> {
        (self.interface_number >= 0).then_some(self.interface_number)
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}
