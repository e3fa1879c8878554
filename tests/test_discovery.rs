//! Enumeration and controller discovery against the virtual transport.

mod common;

use common::*;
use sixpair::backends::virtual_hid::{TransportCall, VirtualController, VirtualTransport};
use sixpair::catalog::{ControllerKind, SONY_VENDOR_ID};
use sixpair::manager::{enumerate, find_controllers};
use sixpair::PairError;

#[test]
fn test_preferred_interfaces_come_first() {
    init_logger();
    let mut transport = VirtualTransport::new();
    transport
        .add_device(ds4("/dev/hidraw0", 0), VirtualController::new())
        .add_device(sixaxis("/dev/hidraw1"), VirtualController::new())
        .add_device(ds4("/dev/hidraw2", 3), VirtualController::new());

    let scan = find_controllers(&mut transport, 10).unwrap();
    let paths: Vec<_> = scan.controllers.iter().map(|r| r.path()).collect();
    assert_eq!(paths, ["/dev/hidraw2", "/dev/hidraw0", "/dev/hidraw1"]);
    assert!(scan.controllers[0].preferred);
    assert!(!scan.controllers[1].preferred);
    assert_eq!(scan.controllers[2].kind, ControllerKind::SixAxis);
    assert_eq!(scan.omitted, 0);
    assert!(!scan.is_capped());
}

#[test]
fn test_scan_filters_by_sony_vendor() {
    let mut transport = VirtualTransport::new();
    transport
        .add_listing(keyboard("/dev/hidraw0"))
        .add_device(move_motion("/dev/hidraw1"), VirtualController::new());
    let log = transport.log();

    let scan = find_controllers(&mut transport, 10).unwrap();
    assert_eq!(scan.controllers.len(), 1);
    assert_eq!(scan.controllers[0].name(), "Move Motion Controller");
    assert_eq!(
        log.calls(),
        vec![TransportCall::Enumerate {
            vendor_id: SONY_VENDOR_ID,
            product_id: 0
        }]
    );
}

#[test]
fn test_cap_is_signalled_not_silent() {
    let mut transport = VirtualTransport::new();
    transport
        .add_device(sixaxis("/dev/hidraw0"), VirtualController::new())
        .add_device(sixaxis("/dev/hidraw1"), VirtualController::new())
        .add_device(ds4("/dev/hidraw2", 3), VirtualController::new());

    let scan = find_controllers(&mut transport, 2).unwrap();
    assert_eq!(scan.controllers.len(), 2);
    assert_eq!(scan.omitted, 1);
    assert!(scan.is_capped());
    // The preferred interface survives the cap.
    assert_eq!(scan.controllers[0].path(), "/dev/hidraw2");
    assert_eq!(scan.controllers[1].path(), "/dev/hidraw0");
}

#[test]
fn test_unsupported_sony_devices_are_kept() {
    let mut transport = VirtualTransport::new();
    transport
        .add_listing(dualsense("/dev/hidraw0"))
        .add_listing(keyboard("/dev/hidraw1"));

    let scan = find_controllers(&mut transport, 10).unwrap();
    assert!(scan.is_empty());
    assert_eq!(scan.unsupported, vec![dualsense("/dev/hidraw0")]);
    match scan.require_any() {
        Err(PairError::UnsupportedModel { devices }) => {
            assert_eq!(devices.len(), 1);
            assert_eq!(devices[0].product_id, 0x0ce6);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_zero_cap_is_not_reported_as_missing_controller() {
    let mut transport = VirtualTransport::new();
    transport.add_device(sixaxis("/dev/hidraw0"), VirtualController::new());

    let scan = find_controllers(&mut transport, 0).unwrap();
    assert!(scan.is_empty());
    assert_eq!(scan.omitted, 1);
    let err = scan.require_any().unwrap_err();
    assert!(matches!(err, PairError::Capped { omitted: 1 }));
    assert_eq!(err.hint(), Some("raise max_controllers in the config"));
}

#[test]
fn test_nothing_attached_is_no_controller() {
    let mut transport = VirtualTransport::new();
    transport.add_listing(keyboard("/dev/hidraw0"));

    let scan = find_controllers(&mut transport, 10).unwrap();
    assert!(scan.unsupported.is_empty());
    assert!(matches!(scan.require_any(), Err(PairError::NoController)));
}

#[test]
fn test_records_own_their_descriptor() {
    let mut transport = VirtualTransport::new();
    let original = ds4("/dev/hidraw4", 3);
    transport.add_device(original.clone(), VirtualController::new());

    let scan = find_controllers(&mut transport, 10).unwrap();
    drop(transport);
    assert_eq!(scan.controllers[0].descriptor, original);
}

#[test]
fn test_enumerate_without_filter_lists_everything() {
    let mut transport = VirtualTransport::new();
    transport
        .add_listing(keyboard("/dev/hidraw0"))
        .add_listing(dualsense("/dev/hidraw1"));

    assert_eq!(enumerate(&mut transport, None).unwrap().len(), 2);
    let sony = enumerate(&mut transport, Some(SONY_VENDOR_ID)).unwrap();
    assert_eq!(sony.len(), 1);
    assert_eq!(sony[0].path, "/dev/hidraw1");
}
