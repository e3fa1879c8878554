//! In-memory HID transport.
//!
//! [`VirtualTransport`] stands in for real hardware: it holds a list of
//! descriptors, a [`VirtualController`] behind each openable path, and a
//! shared [`CallLog`] of every transport call (enumerate, open, feature
//! report get/send, close). Controllers are stateful: a sent feature report is
//! stored under its report ID and returned by the next get for that ID.
//!
//! Open failures are scripted with [`VirtualTransport::deny_path`] and
//! [`VirtualTransport::deny_vendor_product`]; report failures through the
//! controller's `reports` / `rejected_sends`.
//!
//! Single-threaded (`Rc<RefCell<..>>`), like the rest of the crate.

use crate::backends::raw_node::{RawNodeLocator, RawNodeLookup};
use crate::device::{HidHandle, HidTransport, TransportError};
use crate::metadata::DeviceDescriptor;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

/// One transport call, as observed by the virtual backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    Enumerate { vendor_id: u16, product_id: u16 },
    OpenPath(String),
    Open { vendor_id: u16, product_id: u16 },
    GetFeature { path: String, report_id: u8 },
    SendFeature { path: String, report_id: u8 },
    Close(String),
}

/// Shared, cloneable call log.
#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<TransportCall>>>);

impl CallLog {
    fn push(&self, call: TransportCall) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Open attempts, in order.
    pub fn opens(&self) -> Vec<TransportCall> {
        self.filtered(|c| matches!(c, TransportCall::OpenPath(_) | TransportCall::Open { .. }))
    }

    /// Feature-report get/send calls, in order.
    pub fn feature_calls(&self) -> Vec<TransportCall> {
        self.filtered(|c| {
            matches!(
                c,
                TransportCall::GetFeature { .. } | TransportCall::SendFeature { .. }
            )
        })
    }

    pub fn closes(&self) -> usize {
        self.filtered(|c| matches!(c, TransportCall::Close(_))).len()
    }

    fn filtered(&self, f: impl Fn(&TransportCall) -> bool) -> Vec<TransportCall> {
        self.0.borrow().iter().filter(|c| f(c)).cloned().collect()
    }
}

/// Feature-report state of one simulated controller interface.
#[derive(Clone, Debug, Default)]
pub struct VirtualController {
    /// Bytes returned for each report ID (report ID byte included).
    pub reports: HashMap<u8, Vec<u8>>,
    /// Report IDs whose sends are rejected.
    pub rejected_sends: HashSet<u8>,
}

impl VirtualController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `id` with `data` (stored as given, report ID included).
    pub fn with_report(mut self, id: u8, data: &[u8]) -> Self {
        self.reports.insert(id, data.to_vec());
        self
    }

    /// Convenience: a pairing register answering `0xF5` with `mac`.
    pub fn paired_to(self, mac: [u8; 6]) -> Self {
        let mut data = vec![0xF5, 0x00];
        data.extend_from_slice(&mac);
        self.with_report(0xF5, &data)
    }

    pub fn rejecting_send(mut self, id: u8) -> Self {
        self.rejected_sends.insert(id);
        self
    }
}

type SharedController = Rc<RefCell<VirtualController>>;

/// Scripted in-memory transport.
#[derive(Default)]
pub struct VirtualTransport {
    descriptors: Vec<DeviceDescriptor>,
    nodes: HashMap<String, (DeviceDescriptor, SharedController)>,
    denied_paths: HashSet<String>,
    denied_ids: HashSet<(u16, u16)>,
    log: CallLog,
}

impl VirtualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enumerable interface backed by `controller`.
    pub fn add_device(
        &mut self,
        descriptor: DeviceDescriptor,
        controller: VirtualController,
    ) -> &mut Self {
        self.nodes.insert(
            descriptor.path.clone(),
            (descriptor.clone(), Rc::new(RefCell::new(controller))),
        );
        self.descriptors.push(descriptor);
        self
    }

    /// Add an enumerable interface that cannot be opened at all.
    pub fn add_listing(&mut self, descriptor: DeviceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Make `node` openable by path only, sharing the state of `alias_of`.
    /// Models a raw node that is not part of the enumeration.
    pub fn add_alias(&mut self, node: &str, alias_of: &str) -> &mut Self {
        if let Some(entry) = self.nodes.get(alias_of).cloned() {
            self.nodes.insert(node.to_string(), entry);
        }
        self
    }

    pub fn deny_path(&mut self, path: &str) -> &mut Self {
        self.denied_paths.insert(path.to_string());
        self
    }

    pub fn deny_vendor_product(&mut self, vendor_id: u16, product_id: u16) -> &mut Self {
        self.denied_ids.insert((vendor_id, product_id));
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Current state of the controller behind `path`.
    pub fn controller(&self, path: &str) -> Option<VirtualController> {
        self.nodes.get(path).map(|(_, c)| c.borrow().clone())
    }

    fn handle(&self, path: &str) -> Option<VirtualHandle> {
        let (descriptor, controller) = self.nodes.get(path)?;
        Some(VirtualHandle {
            path: path.to_string(),
            descriptor: descriptor.clone(),
            controller: Rc::clone(controller),
            log: self.log.clone(),
            last_error: None,
        })
    }
}

impl HidTransport for VirtualTransport {
    type Handle = VirtualHandle;

    fn enumerate(
        &mut self,
        vendor_id: u16,
        product_id: u16,
    ) -> Result<Vec<DeviceDescriptor>, TransportError> {
        self.log.push(TransportCall::Enumerate {
            vendor_id,
            product_id,
        });
        Ok(self
            .descriptors
            .iter()
            .filter(|d| vendor_id == 0 || d.vendor_id == vendor_id)
            .filter(|d| product_id == 0 || d.product_id == product_id)
            .cloned()
            .collect())
    }

    fn open_path(&self, path: &str) -> Result<VirtualHandle, TransportError> {
        self.log.push(TransportCall::OpenPath(path.to_string()));
        if self.denied_paths.contains(path) {
            return Err(TransportError::Hid(format!("permission denied: {path}")));
        }
        self.handle(path).ok_or(TransportError::NotFound)
    }

    fn open(&self, vendor_id: u16, product_id: u16) -> Result<VirtualHandle, TransportError> {
        self.log.push(TransportCall::Open {
            vendor_id,
            product_id,
        });
        if self.denied_ids.contains(&(vendor_id, product_id)) {
            return Err(TransportError::Hid(format!(
                "unable to open {vendor_id:04x}:{product_id:04x}"
            )));
        }
        self.descriptors
            .iter()
            .filter(|d| d.matches(vendor_id, product_id))
            .find_map(|d| self.handle(&d.path))
            .ok_or(TransportError::NotFound)
    }
}

/// Open virtual interface; logs a `Close` when dropped.
pub struct VirtualHandle {
    path: String,
    descriptor: DeviceDescriptor,
    controller: SharedController,
    log: CallLog,
    last_error: Option<String>,
}

impl VirtualHandle {
    pub fn path(&self) -> &str {
        &self.path
    }

    fn fail(&mut self, msg: String) -> TransportError {
        self.last_error = Some(msg.clone());
        TransportError::Hid(msg)
    }
}

impl HidHandle for VirtualHandle {
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let id = buf.first().copied().unwrap_or(0);
        self.log.push(TransportCall::GetFeature {
            path: self.path.clone(),
            report_id: id,
        });
        let data = self.controller.borrow().reports.get(&id).cloned();
        match data {
            Some(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            None => Err(self.fail(format!("report 0x{id:02x} not supported"))),
        }
    }

    fn send_feature_report(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let id = data.first().copied().unwrap_or(0);
        self.log.push(TransportCall::SendFeature {
            path: self.path.clone(),
            report_id: id,
        });
        if self.controller.borrow().rejected_sends.contains(&id) {
            return Err(self.fail(format!("report 0x{id:02x} rejected")));
        }
        self.controller.borrow_mut().reports.insert(id, data.to_vec());
        Ok(())
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    fn descriptor(&self) -> Option<DeviceDescriptor> {
        Some(self.descriptor.clone())
    }
}

impl Drop for VirtualHandle {
    fn drop(&mut self) {
        self.log.push(TransportCall::Close(self.path.clone()));
    }
}

/// Raw-node locator with a fixed table.
#[derive(Clone, Debug, Default)]
pub struct VirtualRawNodes {
    nodes: Vec<(u16, u16, PathBuf)>,
}

impl VirtualRawNodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, vendor_id: u16, product_id: u16, node: impl Into<PathBuf>) -> Self {
        self.nodes.push((vendor_id, product_id, node.into()));
        self
    }
}

impl RawNodeLocator for VirtualRawNodes {
    fn find_raw_node(&self, vendor_id: u16, product_id: u16) -> RawNodeLookup {
        self.nodes
            .iter()
            .find(|(v, p, _)| *v == vendor_id && *p == product_id)
            .map_or(RawNodeLookup::NotFound, |(_, _, node)| {
                RawNodeLookup::Found(node.clone())
            })
    }
}
