//! Connection strategy.
//!
//! Opening a controller goes through a fixed, ordered list of routes until
//! one yields a handle:
//!
//! 1. [`Route::Path`]: the descriptor's own path.
//! 2. [`Route::VendorProduct`]: first interface matching vendor/product.
//!    May land on a different interface than the one enumerated.
//! 3. DualShock 4 only, [`Route::RawNode`]: the OS raw HID node found by
//!    the [`RawNodeLocator`] for the same vendor/product.
//! 4. Everything else, [`Route::VendorProductRetry`]: route 2 once more.
//!
//! A failed route is logged and recorded, never fatal by itself. Only running
//! out of routes is a [`PairError::Connect`].

use crate::backends::raw_node::{RawNodeLocator, RawNodeLookup};
use crate::catalog::ControllerKind;
use crate::device::{HidHandle, HidTransport, TransportError};
use crate::error::PairError;
use crate::manager::ControllerRecord;
use crate::metadata::DeviceDescriptor;
use log::{debug, info};
use serde::Serialize;
use std::fmt;

/// One way of opening a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Route {
    Path,
    VendorProduct,
    RawNode,
    VendorProductRetry,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Route::Path => "path",
            Route::VendorProduct => "vendor/product",
            Route::RawNode => "raw device node",
            Route::VendorProductRetry => "direct connection",
        })
    }
}

/// Record of one route tried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub route: Route,
    /// `None` when this route produced the handle.
    pub error: Option<String>,
}

impl Attempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Routes for a controller kind, in order.
pub fn plan(kind: ControllerKind) -> [Route; 3] {
    if kind.is_dualshock4() {
        [Route::Path, Route::VendorProduct, Route::RawNode]
    } else {
        [Route::Path, Route::VendorProduct, Route::VendorProductRetry]
    }
}

/// An open controller interface.
///
/// Owns the transport handle; the interface is closed exactly once, when this
/// value is dropped or passed to [`DeviceHandle::close`].
pub struct DeviceHandle<H: HidHandle> {
    inner: H,
    kind: ControllerKind,
    route: Route,
    attempts: Vec<Attempt>,
    label: String,
}

impl<H: HidHandle> DeviceHandle<H> {
    /// Wrap an already open handle, e.g. one obtained outside the strategy.
    pub fn new(inner: H, kind: ControllerKind, route: Route) -> Self {
        Self {
            inner,
            kind,
            route,
            attempts: vec![Attempt { route, error: None }],
            label: kind.name().to_string(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    /// Route that produced this handle.
    #[inline]
    pub fn route(&self) -> Route {
        self.route
    }

    /// Every route tried, the successful one last.
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn descriptor(&self) -> Option<DeviceDescriptor> {
        self.inner.descriptor()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error()
    }

    pub fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.inner.get_feature_report(buf)
    }

    pub fn send_feature_report(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.inner.send_feature_report(data)
    }

    /// Close now instead of at end of scope.
    pub fn close(self) {}
}

impl<H: HidHandle> Drop for DeviceHandle<H> {
    fn drop(&mut self) {
        debug!("closing {} (opened via {})", self.label, self.route);
    }
}

fn open_route<T: HidTransport + ?Sized>(
    transport: &T,
    record: &ControllerRecord,
    raw_nodes: &dyn RawNodeLocator,
    route: Route,
) -> Result<T::Handle, TransportError> {
    let d = &record.descriptor;
    match route {
        Route::Path => transport.open_path(&d.path),
        Route::VendorProduct | Route::VendorProductRetry => {
            transport.open(d.vendor_id, d.product_id)
        }
        Route::RawNode => match raw_nodes.find_raw_node(d.vendor_id, d.product_id) {
            RawNodeLookup::Found(node) => {
                info!("trying raw device node {}", node.display());
                transport.open_path(&node.to_string_lossy())
            }
            RawNodeLookup::NotFound => Err(TransportError::NotFound),
            RawNodeLookup::Unsupported => Err(TransportError::Unsupported),
        },
    }
}

/// Open `record` by trying each route of [`plan`] in turn.
pub fn connect<T: HidTransport + ?Sized>(
    transport: &T,
    record: &ControllerRecord,
    raw_nodes: &dyn RawNodeLocator,
) -> Result<DeviceHandle<T::Handle>, PairError> {
    let name = record.name();
    info!(
        "connecting to {} (interface {})",
        name, record.descriptor.interface_number
    );

    let mut attempts = Vec::new();
    for route in plan(record.kind) {
        match open_route(transport, record, raw_nodes, route) {
            Ok(inner) => {
                info!("connected to {name} via {route}");
                attempts.push(Attempt { route, error: None });
                return Ok(DeviceHandle {
                    inner,
                    kind: record.kind,
                    route,
                    attempts,
                    label: name.to_string(),
                });
            }
            Err(e) => {
                debug!("{route} route failed for {name}: {e}");
                attempts.push(Attempt {
                    route,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Err(PairError::Connect {
        name: name.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dualshock4_plan_ends_with_raw_node() {
        assert_eq!(
            plan(ControllerKind::DualShock4),
            [Route::Path, Route::VendorProduct, Route::RawNode]
        );
    }

    #[test]
    fn other_plans_retry_vendor_product() {
        for kind in [ControllerKind::SixAxis, ControllerKind::Move] {
            assert_eq!(
                plan(kind),
                [Route::Path, Route::VendorProduct, Route::VendorProductRetry]
            );
        }
    }
}
