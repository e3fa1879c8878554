//! Raw HID node lookup.
//!
//! Last-resort route for the DualShock 4: find the OS-level raw HID node
//! (`/dev/hidrawN` on Linux) belonging to a vendor/product pair and open it
//! by path. The lookup is a capability behind [`RawNodeLocator`] so platforms
//! without raw nodes answer [`RawNodeLookup::Unsupported`] instead of failing
//! the whole connection.
//!
//! The Linux implementation reads sysfs directly:
//!
//! ```text
//! /sys/class/hidraw/hidrawN/device            -> .../0003:054C:09CC.0007
//! /sys/class/hidraw/hidrawN/device/uevent     HID_ID=0003:0000054C:000009CC
//! /sys/class/hidraw/hidrawN/device/../../..   idVendor / idProduct (USB)
//! ```

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a raw-node lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawNodeLookup {
    Found(PathBuf),
    NotFound,
    /// The platform has no raw-node concept.
    Unsupported,
}

/// Map a vendor/product pair to a raw HID node.
pub trait RawNodeLocator {
    fn find_raw_node(&self, vendor_id: u16, product_id: u16) -> RawNodeLookup;
}

/// Answers [`RawNodeLookup::Unsupported`] for everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedRawNodes;

impl RawNodeLocator for UnsupportedRawNodes {
    fn find_raw_node(&self, _vendor_id: u16, _product_id: u16) -> RawNodeLookup {
        RawNodeLookup::Unsupported
    }
}

/// sysfs-backed lookup (`/sys/class/hidraw` → `/dev/hidrawN`).
#[derive(Clone, Debug)]
pub struct SysfsRawNodes {
    class_dir: PathBuf,
    dev_dir: PathBuf,
}

impl Default for SysfsRawNodes {
    fn default() -> Self {
        Self::with_roots("/sys/class/hidraw", "/dev")
    }
}

impl SysfsRawNodes {
    /// Use alternate roots for the hidraw class directory and `/dev`.
    pub fn with_roots(class_dir: impl Into<PathBuf>, dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            class_dir: class_dir.into(),
            dev_dir: dev_dir.into(),
        }
    }
}

impl RawNodeLocator for SysfsRawNodes {
    fn find_raw_node(&self, vendor_id: u16, product_id: u16) -> RawNodeLookup {
        let entries = match fs::read_dir(&self.class_dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("cannot read {}: {e}", self.class_dir.display());
                return RawNodeLookup::NotFound;
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("hidraw"))
            .collect();
        names.sort_by_key(|n| node_index(n));

        for name in names {
            let device = self.class_dir.join(&name).join("device");
            let ids = read_hid_id(&device).or_else(|| read_usb_ids(&device));
            match ids {
                Some((vid, pid)) if vid == vendor_id && pid == product_id => {
                    let node = self.dev_dir.join(&name);
                    debug!("raw node {} matches {vid:04x}:{pid:04x}", node.display());
                    return RawNodeLookup::Found(node);
                }
                Some((vid, pid)) => debug!("{name}: {vid:04x}:{pid:04x}"),
                None => debug!("{name}: no vendor/product ids found"),
            }
        }
        RawNodeLookup::NotFound
    }
}

/// Locator for the platform this binary runs on.
pub fn platform_raw_nodes() -> Box<dyn RawNodeLocator> {
    if cfg!(target_os = "linux") {
        Box::new(SysfsRawNodes::default())
    } else {
        Box::new(UnsupportedRawNodes)
    }
}

fn node_index(name: &str) -> u32 {
    name.trim_start_matches("hidraw").parse().unwrap_or(u32::MAX)
}

/// `HID_ID=BBBB:VVVVVVVV:PPPPPPPP` from the HID device's uevent.
fn read_hid_id(device: &Path) -> Option<(u16, u16)> {
    let uevent = fs::read_to_string(device.join("uevent")).ok()?;
    let value = uevent
        .lines()
        .find_map(|l| l.strip_prefix("HID_ID="))?
        .trim();
    let mut parts = value.split(':').skip(1);
    let vid = u32::from_str_radix(parts.next()?, 16).ok()?;
    let pid = u32::from_str_radix(parts.next()?, 16).ok()?;
    Some((u16::try_from(vid).ok()?, u16::try_from(pid).ok()?))
}

/// Walk up from the hidraw device to the USB device carrying `idVendor`/`idProduct`.
fn read_usb_ids(device: &Path) -> Option<(u16, u16)> {
    let real = fs::canonicalize(device).ok()?;
    let mut current = real.as_path();
    for _ in 0..6 {
        let vid_path = current.join("idVendor");
        let pid_path = current.join("idProduct");
        if vid_path.exists() && pid_path.exists() {
            let vid = u16::from_str_radix(fs::read_to_string(&vid_path).ok()?.trim(), 16).ok()?;
            let pid = u16::from_str_radix(fs::read_to_string(&pid_path).ok()?.trim(), 16).ok()?;
            return Some((vid, pid));
        }
        current = current.parent()?;
    }
    None
}
