//! Pairing-address feature reports.
//!
//! The pairing register is an 8-byte feature report:
//!
//! ```text
//! [0]    report ID (0xF5)
//! [1]    reserved, 0x00
//! [2..8] host MAC, wire order
//! ```
//!
//! HIDAPI adds the feature-report type itself (`0x03f5` on the wire), so the
//! buffer carries the bare ID. Some DualShock 4 firmware rejects `0xF5`; for
//! those the same layout is retried under `0x12` and then `0x81`. Other
//! models only ever use `0xF5`.

use crate::catalog::ControllerKind;
use crate::connect::DeviceHandle;
use crate::device::HidHandle;
use crate::error::PairError;
use crate::mac::MacAddress;
use log::{debug, info};

/// Primary pairing report ID.
pub const PAIRING_REPORT_ID: u8 = 0xF5;

/// Alternates tried on DualShock 4, in order.
pub const DS4_ALTERNATE_REPORT_IDS: [u8; 2] = [0x12, 0x81];

/// Pairing report length, report ID included.
pub const PAIRING_REPORT_LEN: usize = 8;

const DS4_REPORT_IDS: [u8; 3] = [
    PAIRING_REPORT_ID,
    DS4_ALTERNATE_REPORT_IDS[0],
    DS4_ALTERNATE_REPORT_IDS[1],
];

/// Report IDs to try for a controller kind.
pub fn report_ids(kind: ControllerKind) -> &'static [u8] {
    if kind.is_dualshock4() {
        &DS4_REPORT_IDS
    } else {
        &DS4_REPORT_IDS[..1]
    }
}

/// Build the 8-byte pairing report for `mac` under `report_id`.
pub fn pairing_report(report_id: u8, mac: &MacAddress) -> [u8; PAIRING_REPORT_LEN] {
    let mut buf = [0u8; PAIRING_REPORT_LEN];
    buf[0] = report_id;
    buf[2..].copy_from_slice(mac.bytes());
    buf
}

fn failure_detail<H: HidHandle>(handle: &DeviceHandle<H>, fallback: String) -> String {
    handle.last_error().unwrap_or(fallback)
}

/// Read the host address the controller is paired to.
pub fn read_pairing<H: HidHandle>(handle: &mut DeviceHandle<H>) -> Result<MacAddress, PairError> {
    let mut detail = String::from("no report attempted");

    for (n, &id) in report_ids(handle.kind()).iter().enumerate() {
        if n == 1 {
            info!("standard pairing report failed on DualShock 4, trying alternatives");
        }
        let mut buf = [0u8; PAIRING_REPORT_LEN];
        buf[0] = id;
        match handle.get_feature_report(&mut buf) {
            Ok(len) if len >= PAIRING_REPORT_LEN => {
                debug!("report 0x{id:02x}: {len} bytes");
                let mut bytes = [0u8; 6];
                bytes.copy_from_slice(&buf[2..]);
                return Ok(MacAddress::new(bytes));
            }
            Ok(len) => {
                debug!("report 0x{id:02x}: short read ({len} bytes)");
                detail = format!("report 0x{id:02x} returned {len} byte(s)");
            }
            Err(e) => {
                debug!("report 0x{id:02x}: {e}");
                detail = e.to_string();
            }
        }
    }

    Err(PairError::Read {
        detail: failure_detail(handle, detail),
    })
}

/// Store `mac` as the controller's host address.
///
/// Returns the report ID the controller accepted.
pub fn write_pairing<H: HidHandle>(
    handle: &mut DeviceHandle<H>,
    mac: &MacAddress,
) -> Result<u8, PairError> {
    let mut buf = pairing_report(PAIRING_REPORT_ID, mac);
    let mut detail = String::from("no report attempted");

    for (n, &id) in report_ids(handle.kind()).iter().enumerate() {
        if n == 1 {
            info!("standard pairing report failed on DualShock 4, trying alternatives");
        }
        buf[0] = id;
        match handle.send_feature_report(&buf) {
            Ok(()) => {
                debug!("report 0x{id:02x} accepted");
                return Ok(id);
            }
            Err(e) => {
                debug!("report 0x{id:02x} rejected: {e}");
                detail = e.to_string();
            }
        }
    }

    Err(PairError::Write {
        detail: failure_detail(handle, detail),
    })
}
