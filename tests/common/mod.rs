//! Descriptor builders shared by the integration tests.
#![allow(dead_code)]

use sixpair::catalog::{DS4_PRODUCT_ID, MOVE_PRODUCT_ID, SIXAXIS_PRODUCT_ID, SONY_VENDOR_ID};
use sixpair::DeviceDescriptor;

pub fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

pub fn interface(
    vendor_id: u16,
    product_id: u16,
    interface_number: i32,
    path: &str,
) -> DeviceDescriptor {
    DeviceDescriptor {
        vendor_id,
        product_id,
        interface_number,
        path: path.to_string(),
        manufacturer: Some("Sony Interactive Entertainment".into()),
        product: Some("Wireless Controller".into()),
        release_number: 0x0100,
        ..Default::default()
    }
}

pub fn ds4(path: &str, interface_number: i32) -> DeviceDescriptor {
    interface(SONY_VENDOR_ID, DS4_PRODUCT_ID, interface_number, path)
}

pub fn sixaxis(path: &str) -> DeviceDescriptor {
    interface(SONY_VENDOR_ID, SIXAXIS_PRODUCT_ID, 0, path)
}

pub fn move_motion(path: &str) -> DeviceDescriptor {
    interface(SONY_VENDOR_ID, MOVE_PRODUCT_ID, 0, path)
}

/// A Sony interface that is not a supported model (a DualSense).
pub fn dualsense(path: &str) -> DeviceDescriptor {
    interface(SONY_VENDOR_ID, 0x0ce6, 3, path)
}

pub fn keyboard(path: &str) -> DeviceDescriptor {
    DeviceDescriptor {
        vendor_id: 0x046d,
        product_id: 0xc31c,
        interface_number: 0,
        path: path.to_string(),
        manufacturer: Some("Logitech".into()),
        product: Some("USB Keyboard".into()),
        ..Default::default()
    }
}
