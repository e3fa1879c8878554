//! Feature-report probing and the extended controller dump.
//!
//! Nothing here writes to the controller; every call is a get-feature-report.
//! Known layouts:
//! - `0xF2` controller information: firmware `major.minor` in bytes 1..3,
//!   the controller's own Bluetooth address in bytes 4..10.
//! - `0xF5` current pairing (see [`crate::pairing`]).
//! - `0xA3` status and `0x01` capabilities: raw bytes only.

use crate::connect::DeviceHandle;
use crate::device::HidHandle;
use crate::mac::MacAddress;
use crate::metadata::DeviceDescriptor;
use crate::pairing::{PAIRING_REPORT_ID, PAIRING_REPORT_LEN};
use log::debug;
use serde::Serialize;

/// Buffer size used for probing.
pub const PROBE_BUFFER_LEN: usize = 256;

pub const CONTROLLER_INFO_REPORT_ID: u8 = 0xF2;
pub const STATUS_REPORT_ID: u8 = 0xA3;
pub const CAPABILITIES_REPORT_ID: u8 = 0x01;

/// IDs probed for every Sony interface when listing.
pub const LIST_PROBE_IDS: [u8; 6] = [0x01, 0xF2, 0xF5, 0xA3, 0x12, 0x81];

/// Extra IDs scanned by [`dump`] by default.
pub const DEFAULT_SCAN_IDS: [u8; 15] = [
    0x00, 0x02, 0x10, 0x12, 0x81, 0xA0, 0xF0, 0xF1, 0xF3, 0xF4, 0xF6, 0xF7, 0xF8, 0xF9, 0xFA,
];

/// One probed report ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProbedReport {
    pub id: u8,
    /// Response bytes (report ID included); empty when unsupported.
    pub data: Vec<u8>,
}

impl ProbedReport {
    pub fn supported(&self) -> bool {
        !self.data.is_empty()
    }

    /// Response without its leading report ID.
    pub fn payload(&self) -> &[u8] {
        self.data.get(1..).unwrap_or(&[])
    }
}

/// Decoded `0xF2` report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ControllerInfo {
    pub firmware: (u8, u8),
    pub bluetooth_address: MacAddress,
}

impl ControllerInfo {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 10 {
            return None;
        }
        Some(Self {
            firmware: (data[1], data[2]),
            bluetooth_address: MacAddress::from_slice(&data[4..10])?,
        })
    }
}

/// Everything [`dump`] could learn about an open controller.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DiagnosticDump {
    pub descriptor: Option<DeviceDescriptor>,
    pub controller_info: Option<ControllerInfo>,
    pub pairing: Option<MacAddress>,
    pub status: Option<Vec<u8>>,
    pub capabilities: Option<Vec<u8>>,
    /// Answers from the additional scan, supported IDs only.
    pub additional: Vec<ProbedReport>,
}

fn get_report<H: HidHandle>(handle: &mut DeviceHandle<H>, id: u8) -> Vec<u8> {
    let mut buf = vec![0u8; PROBE_BUFFER_LEN];
    buf[0] = id;
    match handle.get_feature_report(&mut buf) {
        Ok(n) if n > 0 => {
            buf.truncate(n);
            buf
        }
        Ok(_) => Vec::new(),
        Err(e) => {
            debug!("probe 0x{id:02x}: {e}");
            Vec::new()
        }
    }
}

/// Try each ID once; one entry per ID, in order.
pub fn probe_reports<H: HidHandle>(handle: &mut DeviceHandle<H>, ids: &[u8]) -> Vec<ProbedReport> {
    ids.iter()
        .map(|&id| ProbedReport {
            id,
            data: get_report(handle, id),
        })
        .collect()
}

/// Read the known reports, then scan `scan_ids` for anything else answering.
pub fn dump<H: HidHandle>(handle: &mut DeviceHandle<H>, scan_ids: &[u8]) -> DiagnosticDump {
    let descriptor = handle.descriptor();

    let info = get_report(handle, CONTROLLER_INFO_REPORT_ID);
    let pairing = get_report(handle, PAIRING_REPORT_ID);
    let status = get_report(handle, STATUS_REPORT_ID);
    let caps = get_report(handle, CAPABILITIES_REPORT_ID);

    let known = [
        CONTROLLER_INFO_REPORT_ID,
        PAIRING_REPORT_ID,
        STATUS_REPORT_ID,
        CAPABILITIES_REPORT_ID,
    ];
    let scan: Vec<u8> = scan_ids
        .iter()
        .copied()
        .filter(|id| !known.contains(id))
        .collect();
    let additional = probe_reports(handle, &scan)
        .into_iter()
        .filter(ProbedReport::supported)
        .collect();

    DiagnosticDump {
        descriptor,
        controller_info: ControllerInfo::parse(&info),
        pairing: if pairing.len() >= PAIRING_REPORT_LEN {
            MacAddress::from_slice(&pairing[2..])
        } else {
            None
        },
        status: (!status.is_empty()).then(|| status[1..].to_vec()),
        capabilities: (!caps.is_empty()).then(|| caps[1..].to_vec()),
        additional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_info_needs_ten_bytes() {
        let data = [0xF2, 0x01, 0x08, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
        let info = ControllerInfo::parse(&data).unwrap();
        assert_eq!(info.firmware, (1, 8));
        assert_eq!(info.bluetooth_address.to_string(), "11:22:33:44:55:66");
        assert_eq!(ControllerInfo::parse(&data[..9]), None);
    }

    #[test]
    fn payload_skips_report_id() {
        let r = ProbedReport {
            id: 0xA3,
            data: vec![0xA3, 1, 2],
        };
        assert_eq!(r.payload(), &[1, 2]);
        let empty = ProbedReport { id: 0x10, data: vec![] };
        assert!(!empty.supported());
        assert_eq!(empty.payload(), &[] as &[u8]);
    }
}
