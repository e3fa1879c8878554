//! Controller discovery and the pairing session.
//!
//! [`find_controllers`] turns one Sony-filtered enumeration into an ordered
//! list of [`ControllerRecord`]s. [`Pairer`] bundles a transport with the
//! raw-node capability and the discovery limit, and is what the CLI drives.

use crate::backends::raw_node::RawNodeLocator;
use crate::catalog::{self, ControllerKind, SONY_VENDOR_ID};
use crate::connect::{self, DeviceHandle};
use crate::device::HidTransport;
use crate::error::PairError;
use crate::mac::MacAddress;
use crate::metadata::DeviceDescriptor;
use crate::pairing;
use log::debug;
use serde::Serialize;

/// Default cap for [`find_controllers`].
pub const DEFAULT_MAX_CONTROLLERS: usize = 10;

/// A descriptor recognized as a supported controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControllerRecord {
    pub descriptor: DeviceDescriptor,
    pub kind: ControllerKind,
    /// The HID interface of a multi-interface device (DualShock 4 interface 3).
    pub preferred: bool,
}

impl ControllerRecord {
    /// `None` unless the descriptor is a supported controller.
    pub fn from_descriptor(descriptor: &DeviceDescriptor) -> Option<Self> {
        let kind = ControllerKind::identify(descriptor.vendor_id, descriptor.product_id)?;
        Some(Self {
            preferred: catalog::is_preferred_interface(
                descriptor.product_id,
                descriptor.interface_number,
            ),
            descriptor: descriptor.clone(),
            kind,
        })
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.descriptor.path
    }
}

/// Outcome of [`find_controllers`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct ControllerScan {
    /// Preferred records first, enumeration order otherwise.
    pub controllers: Vec<ControllerRecord>,
    /// Records dropped because of the cap.
    pub omitted: usize,
    /// Sony interfaces that are not a supported model.
    pub unsupported: Vec<DeviceDescriptor>,
}

impl ControllerScan {
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// More matching devices existed than the cap allowed.
    pub fn is_capped(&self) -> bool {
        self.omitted > 0
    }

    /// Convert an empty scan into the matching error.
    pub fn require_any(self) -> Result<Self, PairError> {
        if !self.is_empty() {
            Ok(self)
        } else if self.omitted > 0 {
            Err(PairError::Capped {
                omitted: self.omitted,
            })
        } else if !self.unsupported.is_empty() {
            Err(PairError::UnsupportedModel {
                devices: self.unsupported,
            })
        } else {
            Err(PairError::NoController)
        }
    }
}

/// Enumerate interfaces; `None` lists every HID device.
pub fn enumerate<T: HidTransport + ?Sized>(
    transport: &mut T,
    vendor_filter: Option<u16>,
) -> Result<Vec<DeviceDescriptor>, PairError> {
    let vendor = vendor_filter.unwrap_or(0);
    let found = transport
        .enumerate(vendor, 0)
        .map_err(|e| PairError::Enumerate(e.to_string()))?;
    // Some backends ignore the filter; apply it again.
    let found: Vec<_> = match vendor_filter {
        Some(v) => found.into_iter().filter(|d| d.vendor_id == v).collect(),
        None => found,
    };
    debug!(
        "enumerate: vendor={} -> {} interface(s)",
        vendor_filter.map_or_else(|| "any".to_string(), |v| format!("0x{v:04x}")),
        found.len()
    );
    Ok(found)
}

/// Find supported controllers, preferred interfaces first, at most `max`.
pub fn find_controllers<T: HidTransport + ?Sized>(
    transport: &mut T,
    max: usize,
) -> Result<ControllerScan, PairError> {
    let found = enumerate(transport, Some(SONY_VENDOR_ID))?;

    let mut unsupported = Vec::new();
    let mut records = Vec::new();
    for descriptor in found {
        match ControllerRecord::from_descriptor(&descriptor) {
            Some(record) => records.push(record),
            None => unsupported.push(descriptor),
        }
    }

    // Stable partition: preferred first, relative order kept on both sides.
    let (mut controllers, rest): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.preferred);
    controllers.extend(rest);

    let omitted = controllers.len().saturating_sub(max);
    controllers.truncate(max);
    if omitted > 0 {
        debug!("find_controllers: cap {max} reached, {omitted} record(s) omitted");
    }

    Ok(ControllerScan {
        controllers,
        omitted,
        unsupported,
    })
}

/// A pairing session over one transport.
pub struct Pairer<T: HidTransport> {
    transport: T,
    raw_nodes: Box<dyn RawNodeLocator>,
    max_controllers: usize,
}

impl<T: HidTransport> Pairer<T> {
    pub fn new(transport: T, raw_nodes: Box<dyn RawNodeLocator>) -> Self {
        Self {
            transport,
            raw_nodes,
            max_controllers: DEFAULT_MAX_CONTROLLERS,
        }
    }

    pub fn with_max_controllers(mut self, max: usize) -> Self {
        self.max_controllers = max;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn list_devices(
        &mut self,
        vendor_filter: Option<u16>,
    ) -> Result<Vec<DeviceDescriptor>, PairError> {
        enumerate(&mut self.transport, vendor_filter)
    }

    pub fn scan(&mut self) -> Result<ControllerScan, PairError> {
        find_controllers(&mut self.transport, self.max_controllers)
    }

    pub fn connect(
        &self,
        record: &ControllerRecord,
    ) -> Result<DeviceHandle<T::Handle>, PairError> {
        connect::connect(&self.transport, record, self.raw_nodes.as_ref())
    }

    /// Connect and read; the handle is closed before returning.
    pub fn read_pairing(&self, record: &ControllerRecord) -> Result<MacAddress, PairError> {
        let mut handle = self.connect(record)?;
        pairing::read_pairing(&mut handle)
    }

    /// Connect and write; the handle is closed before returning.
    pub fn write_pairing(
        &self,
        record: &ControllerRecord,
        mac: &MacAddress,
    ) -> Result<(), PairError> {
        let mut handle = self.connect(record)?;
        pairing::write_pairing(&mut handle, mac).map(|_| ())
    }
}
