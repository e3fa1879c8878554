//! End-to-end command runs with in-memory streams and the virtual transport.

mod common;

use common::*;
use sixpair::backends::raw_node::UnsupportedRawNodes;
use sixpair::backends::virtual_hid::{VirtualController, VirtualTransport};
use sixpair::catalog::{SIXAXIS_PRODUCT_ID, SONY_VENDOR_ID};
use sixpair::cli::{self, Command, Console, EXIT_FAILURE, EXIT_OK};
use sixpair::config::{OutputFormat, PairerConfig};
use sixpair::{ControllerRecord, MacAddress, Pairer};
use std::io::Cursor;

struct Outcome {
    code: i32,
    out: String,
    err: String,
    pairer: Pairer<VirtualTransport>,
}

fn run_with(
    args: &[&str],
    transport: VirtualTransport,
    config: &PairerConfig,
    input: &str,
    interactive: bool,
) -> Outcome {
    init_logger();
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let mut input = Cursor::new(input.as_bytes().to_vec());
    let mut pairer = Pairer::new(transport, Box::new(UnsupportedRawNodes))
        .with_max_controllers(config.max_controllers);
    let mut console = Console {
        out: &mut out,
        err: &mut err,
        input: &mut input,
        interactive,
        palette: Default::default(),
        program: "sixpair".into(),
    };
    let code = match Command::from_args(args) {
        Ok(command) => cli::run(command, &mut pairer, config, &mut console),
        Err(e) => cli::usage_failure(&e, &mut console),
    };
    Outcome {
        code,
        out: String::from_utf8(out).unwrap(),
        err: String::from_utf8(err).unwrap(),
        pairer,
    }
}

fn run(args: &[&str], transport: VirtualTransport) -> Outcome {
    run_with(args, transport, &PairerConfig::default(), "", false)
}

fn one_sixaxis() -> VirtualTransport {
    let mut transport = VirtualTransport::new();
    transport.add_device(
        sixaxis("/dev/hidraw0"),
        VirtualController::new().paired_to([9, 8, 7, 6, 5, 4]),
    );
    transport
}

#[test]
fn test_help_exits_zero() {
    let r = run(&["-h"], VirtualTransport::new());
    assert_eq!(r.code, EXIT_OK);
    assert!(r.out.contains("PlayStation Controller Pairer Usage"));
    assert!(r.err.is_empty());
}

#[test]
fn test_unknown_option_prints_usage_on_stderr() {
    let r = run(&["-x"], VirtualTransport::new());
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.err.contains("[ERROR] unknown option `-x`"));
    assert!(r.err.contains("Usage"));
    assert!(r.out.is_empty());
}

#[test]
fn test_invalid_mac_is_rejected_before_any_device_io() {
    let transport = one_sixaxis();
    let log = transport.log();
    let r = run(&["00:11:22:33:44"], transport);
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.err.contains("invalid MAC address `00:11:22:33:44`"));
    assert!(log.calls().is_empty());
}

#[test]
fn test_show_prints_current_pairing() {
    let r = run(&[], one_sixaxis());
    assert_eq!(r.code, EXIT_OK, "stderr: {}", r.err);
    assert!(r
        .out
        .contains("[SUCCESS] Current MAC address of SixAxis Controller: 09:08:07:06:05:04"));
}

#[test]
fn test_pair_writes_the_register() {
    let config = PairerConfig {
        mac_separators: false,
        ..Default::default()
    };
    let r = run_with(&["AA:BB:CC:DD:EE:FF"], one_sixaxis(), &config, "", false);
    assert_eq!(r.code, EXIT_OK, "stderr: {}", r.err);
    assert!(r.out.contains("[SUCCESS] MAC address set to aabbccddeeff"));

    let stored = r.pairer.transport().controller("/dev/hidraw0").unwrap();
    assert_eq!(
        stored.reports[&0xF5],
        vec![0xF5, 0x00, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
    );
}

#[test]
fn test_missing_controller_fails_with_hint() {
    let mut transport = VirtualTransport::new();
    transport.add_listing(keyboard("/dev/hidraw9"));
    let r = run(&[], transport);
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.err.contains("[ERROR] no PlayStation controllers found"));
    assert!(r.err.contains("[INFO] make sure the controller is connected"));
    assert!(!r.out.contains("All USB HID Devices"));
}

#[test]
fn test_missing_controller_offers_list_all_when_interactive() {
    let mut transport = VirtualTransport::new();
    transport.add_listing(keyboard("/dev/hidraw9"));
    let r = run_with(&[], transport, &PairerConfig::default(), "y\n", true);
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.out.contains("[PROMPT] Would you like to list all USB HID devices?"));
    assert!(r.out.contains("=== All USB HID Devices ==="));
    assert!(r.out.contains("USB Keyboard"));
}

#[test]
fn test_unsupported_sony_model_is_reported_distinctly() {
    let mut transport = VirtualTransport::new();
    transport.add_listing(dualsense("/dev/hidraw2"));
    let r = run(&[], transport);
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.err.contains("found 1 Sony device(s), but none match"));
    assert!(!r.err.contains("no PlayStation controllers found"));
    // The unsupported interface is described so the user can identify it.
    assert!(r.err.contains("┌─ Device 1"));
    assert!(r.err.contains("Product ID:      0x0ce6"));
    assert!(r.err.contains("/dev/hidraw2"));
}

#[test]
fn test_zero_controller_limit_fails_with_capped_error() {
    let config = PairerConfig {
        max_controllers: 0,
        ..Default::default()
    };
    let r = run_with(&[], one_sixaxis(), &config, "", false);
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.err.contains("controller limit excluded all of them"));
    assert!(!r.err.contains("make sure the controller is connected"));
}

#[test]
fn test_connect_failure_lists_attempts_and_permissions_hint() {
    let mut transport = one_sixaxis();
    transport
        .deny_path("/dev/hidraw0")
        .deny_vendor_product(SONY_VENDOR_ID, SIXAXIS_PRODUCT_ID);
    let log = transport.log();
    let r = run(&[], transport);
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.err.contains("could not connect to SixAxis Controller after 3 attempt(s)"));
    assert!(r.err.contains("1. path: permission denied: /dev/hidraw0"));
    assert!(r.err.contains("3. direct connection:"));
    assert!(r.err.contains("permissions problem"));
    assert_eq!(log.closes(), 0);
}

#[test]
fn test_interactive_selection_picks_the_chosen_controller() {
    let mut transport = one_sixaxis();
    transport.add_device(
        move_motion("/dev/hidraw1"),
        VirtualController::new().paired_to([1, 2, 3, 4, 5, 6]),
    );
    let r = run_with(&[], transport, &PairerConfig::default(), "7\n2\n", true);
    assert_eq!(r.code, EXIT_OK, "stderr: {}", r.err);
    assert!(r.out.contains("┌─ Controller 2"));
    assert!(r.out.contains("Select controller (1-2) [1]: "));
    assert!(r.out.contains("[WARN] Invalid selection `7`."));
    assert!(r.out.contains("Move Motion Controller: 01:02:03:04:05:06"));
}

#[test]
fn test_non_interactive_runs_use_the_first_controller() {
    let mut transport = one_sixaxis();
    transport.add_device(
        move_motion("/dev/hidraw1"),
        VirtualController::new().paired_to([1, 2, 3, 4, 5, 6]),
    );
    let r = run(&[], transport);
    assert_eq!(r.code, EXIT_OK);
    assert!(!r.out.contains("[PROMPT]"));
    assert!(r.out.contains("SixAxis Controller: 09:08:07:06:05:04"));
}

#[test]
fn test_list_sony_probes_reports() {
    let mut transport = one_sixaxis();
    transport
        .add_listing(keyboard("/dev/hidraw9"))
        .add_listing(dualsense("/dev/hidraw2"));
    let r = run(&["-l"], transport);
    assert_eq!(r.code, EXIT_OK);
    assert!(r.out.contains("=== Sony USB Devices ==="));
    assert!(r.out.contains("Report 0xf5: Supported (f5 00 09 08 07 06 05 04)"));
    assert!(r.out.contains("Report 0x81: Not supported"));
    assert!(r.out.contains("Could not open device"));
    assert!(!r.out.contains("USB Keyboard"));
    assert!(r.out.contains("Found 2 Sony device(s)."));
}

#[test]
fn test_list_all_as_json() {
    let mut transport = one_sixaxis();
    transport.add_listing(keyboard("/dev/hidraw9"));
    let config = PairerConfig {
        output: OutputFormat::Json,
        probe_on_list: false,
        ..Default::default()
    };
    let r = run_with(&["-a"], transport, &config, "", false);
    assert_eq!(r.code, EXIT_OK);

    let rows: serde_json::Value = serde_json::from_str(&r.out).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["vendor_id"], 0x054c);
    assert_eq!(rows[0]["supported"], true);
    assert_eq!(rows[0]["model"], "SixAxis Controller");
    assert_eq!(rows[1]["supported"], false);
    assert!(rows[1].get("model").is_none());
    assert!(rows[0].get("reports").is_none());
}

#[test]
fn test_dump_shows_diagnostics() {
    let mut transport = VirtualTransport::new();
    transport.add_device(
        ds4("/dev/hidraw3", 3),
        VirtualController::new()
            .paired_to([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])
            .with_report(0xF2, &[0xF2, 0x01, 0x08, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
    );
    let log = transport.log();
    let r = run(&["-d"], transport);
    assert_eq!(r.code, EXIT_OK, "stderr: {}", r.err);
    assert!(r.out.contains("Connected to DualShock 4 [CUH-ZCT2x] via path"));
    assert!(r.out.contains("Firmware Version: 1.8"));
    assert!(r.out.contains("Paired MAC:       aa:bb:cc:dd:ee:ff"));
    assert!(r.out.contains("No additional report IDs found"));
    assert_eq!(log.closes(), 1);
}

#[test]
fn test_dump_without_controller_fails() {
    let r = run(&["-d"], VirtualTransport::new());
    assert_eq!(r.code, EXIT_FAILURE);
    assert!(r.err.contains("no PlayStation controllers found"));
}

#[test]
fn test_written_address_reads_back() {
    let r = run(&["001122334455"], one_sixaxis());
    assert_eq!(r.code, EXIT_OK);
    let record = ControllerRecord::from_descriptor(&sixaxis("/dev/hidraw0")).unwrap();
    let mac = r.pairer.read_pairing(&record).unwrap();
    assert_eq!(mac, MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
}
