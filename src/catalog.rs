//! Supported controller catalog.
//!
//! Every supported controller is a Sony (`0x054c`) device. Product IDs:
//! - `0x0268` PlayStation 3 SixAxis / DualShock 3
//! - `0x042f` PlayStation Move Motion controller
//! - `0x09cc` DualShock 4 [CUH-ZCT2x]
//!
//! The DualShock 4 exposes several USB interfaces (audio control, audio
//! streaming, HID). Only interface 3 carries the HID control surface that
//! answers pairing feature reports; that one is the *preferred* interface.

use serde::Serialize;
use std::fmt;

/// Sony Corp. USB vendor ID.
pub const SONY_VENDOR_ID: u16 = 0x054c;

pub const SIXAXIS_PRODUCT_ID: u16 = 0x0268;
pub const MOVE_PRODUCT_ID: u16 = 0x042f;
pub const DS4_PRODUCT_ID: u16 = 0x09cc;

/// Interface number of the DualShock 4's HID interface.
pub const DS4_HID_INTERFACE: i32 = 3;

/// Name used for anything outside the table.
pub const GENERIC_NAME: &str = "Compatible Device";

/// Controller model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ControllerKind {
    SixAxis,
    Move,
    DualShock4,
    Generic,
}

/// Models with a catalog entry, in table order.
pub const SUPPORTED: [ControllerKind; 3] = [
    ControllerKind::SixAxis,
    ControllerKind::Move,
    ControllerKind::DualShock4,
];

impl ControllerKind {
    /// Kind for a Sony product ID; anything unknown is `Generic`.
    pub fn from_product(product_id: u16) -> Self {
        match product_id {
            SIXAXIS_PRODUCT_ID => ControllerKind::SixAxis,
            MOVE_PRODUCT_ID => ControllerKind::Move,
            DS4_PRODUCT_ID => ControllerKind::DualShock4,
            _ => ControllerKind::Generic,
        }
    }

    /// Kind for a vendor/product pair, `None` unless it is a supported model.
    pub fn identify(vendor_id: u16, product_id: u16) -> Option<Self> {
        if vendor_id != SONY_VENDOR_ID {
            return None;
        }
        match Self::from_product(product_id) {
            ControllerKind::Generic => None,
            kind => Some(kind),
        }
    }

    pub fn product_id(self) -> Option<u16> {
        match self {
            ControllerKind::SixAxis => Some(SIXAXIS_PRODUCT_ID),
            ControllerKind::Move => Some(MOVE_PRODUCT_ID),
            ControllerKind::DualShock4 => Some(DS4_PRODUCT_ID),
            ControllerKind::Generic => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ControllerKind::SixAxis => "SixAxis Controller",
            ControllerKind::Move => "Move Motion Controller",
            ControllerKind::DualShock4 => "DualShock 4 [CUH-ZCT2x]",
            ControllerKind::Generic => GENERIC_NAME,
        }
    }

    #[inline]
    pub fn is_dualshock4(self) -> bool {
        self == ControllerKind::DualShock4
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display name for a product ID.
pub fn name_for(product_id: u16) -> &'static str {
    ControllerKind::from_product(product_id).name()
}

/// True iff the vendor is Sony and the product is in the table.
pub fn is_supported(vendor_id: u16, product_id: u16) -> bool {
    ControllerKind::identify(vendor_id, product_id).is_some()
}

/// True for the one interface of a multi-interface device usable for pairing.
pub fn is_preferred_interface(product_id: u16, interface_number: i32) -> bool {
    product_id == DS4_PRODUCT_ID && interface_number == DS4_HID_INTERFACE
}
