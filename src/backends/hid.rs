//! `hidapi` transport.
//!
//! [`HidapiTransport`] owns the process-wide `HidApi` context: constructing it
//! initializes the library, dropping it tears it down. Enumeration rebuilds
//! hidapi's device list for the requested filter and copies each entry into a
//! [`DeviceDescriptor`], so nothing borrowed from hidapi outlives the call.

use crate::device::{HidHandle, HidTransport, TransportError};
use crate::error::PairError;
use crate::metadata::DeviceDescriptor;
use hidapi::{DeviceInfo, HidApi, HidDevice, HidError};
use log::trace;
use std::ffi::CString;

impl From<HidError> for TransportError {
    fn from(e: HidError) -> Self {
        TransportError::Hid(e.to_string())
    }
}

/// Build an owned descriptor for a `hidapi` device entry.
pub fn descriptor(info: &DeviceInfo) -> DeviceDescriptor {
    DeviceDescriptor {
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        interface_number: info.interface_number(),
        path: info.path().to_string_lossy().to_string(),
        manufacturer: info.manufacturer_string().map(|s| s.to_string()),
        product: info.product_string().map(|s| s.to_string()),
        serial_number: info.serial_number().map(|s| s.to_string()),
        usage_page: info.usage_page(),
        usage: info.usage(),
        release_number: info.release_number(),
    }
}

pub struct HidapiTransport {
    api: HidApi,
}

impl HidapiTransport {
    /// Initialize the HID library.
    pub fn new() -> Result<Self, PairError> {
        let api = HidApi::new().map_err(|e| PairError::Init(e.to_string()))?;
        Ok(Self { api })
    }

    fn wrap(device: HidDevice, origin: &str) -> HidapiHandle {
        trace!("[HID/OPEN] {origin}");
        HidapiHandle {
            device,
            last_error: None,
        }
    }
}

impl HidTransport for HidapiTransport {
    type Handle = HidapiHandle;

    fn enumerate(
        &mut self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Vec<DeviceDescriptor>, TransportError> {
        self.api.reset_devices()?;
        self.api.add_devices(vendor_id, product_id)?;
        Ok(self.api.device_list().map(descriptor).collect())
    }

    fn open_path(&self, path: &str) -> Result<HidapiHandle, TransportError> {
        let cpath = CString::new(path).map_err(|_| TransportError::InvalidPath(path.to_string()))?;
        let device = self.api.open_path(&cpath)?;
        Ok(Self::wrap(device, path))
    }

    fn open(&self, vendor_id: u16, product_id: u16) -> Result<HidapiHandle, TransportError> {
        let device = self.api.open(vendor_id, product_id)?;
        Ok(Self::wrap(
            device,
            &format!("vid=0x{vendor_id:04x} pid=0x{product_id:04x}"),
        ))
    }
}

/// Open `hidapi` device; closed when dropped.
pub struct HidapiHandle {
    device: HidDevice,
    last_error: Option<String>,
}

impl HidapiHandle {
    fn record(&mut self, e: HidError) -> TransportError {
        let e = TransportError::from(e);
        self.last_error = Some(e.to_string());
        e
    }
}

impl HidHandle for HidapiHandle {
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.device.get_feature_report(buf) {
            Ok(n) => Ok(n),
            Err(e) => Err(self.record(e)),
        }
    }

    fn send_feature_report(&mut self, data: &[u8]) -> Result<(), TransportError> {
        match self.device.send_feature_report(data) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.record(e)),
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    fn descriptor(&self) -> Option<DeviceDescriptor> {
        self.device.get_device_info().ok().map(|info| descriptor(&info))
    }
}
