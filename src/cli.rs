//! Command-line front end.
//!
//! [`Command::from_args`] parses the argument list; [`run`] executes a
//! command against a [`Pairer`] and returns the process exit code. All
//! terminal I/O goes through a [`Console`], so the whole flow runs against
//! in-memory buffers in tests.

use crate::catalog::{self, ControllerKind, SONY_VENDOR_ID};
use crate::config::{OutputFormat, PairerConfig};
use crate::connect::{DeviceHandle, Route};
use crate::device::HidTransport;
use crate::diagnostics::{self, DiagnosticDump, ProbedReport, LIST_PROBE_IDS};
use crate::error::PairError;
use crate::mac::{self, MacAddress};
use crate::manager::{ControllerRecord, ControllerScan, Pairer};
use crate::metadata::DeviceDescriptor;
use crate::ui::{self, Palette, ProbeView};
use log::debug;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Exit status for success.
pub const EXIT_OK: i32 = 0;
/// Exit status for any reported failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Read and print the current pairing address.
    Show,
    /// Write a new pairing address (unparsed user input).
    Pair(String),
    Help,
    ListSony,
    ListAll,
    Dump,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("expected at most one argument, got {0}")]
    TooManyArguments(usize),
}

impl Command {
    /// Parse the arguments after the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        match args.as_slice() {
            [] => Ok(Command::Show),
            [one] => match one.as_str() {
                "-h" | "--help" => Ok(Command::Help),
                "-l" => Ok(Command::ListSony),
                "-a" => Ok(Command::ListAll),
                "-d" => Ok(Command::Dump),
                opt if opt.starts_with('-') => Err(UsageError::UnknownOption(opt.to_string())),
                mac => Ok(Command::Pair(mac.to_string())),
            },
            more => Err(UsageError::TooManyArguments(more.len())),
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Pair(#[from] PairError),
    #[error("output failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terminal streams plus presentation settings.
pub struct Console<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub input: &'a mut dyn BufRead,
    /// Whether prompts may be shown (stdin is a terminal).
    pub interactive: bool,
    pub palette: Palette,
    /// Program name for the usage text.
    pub program: String,
}

impl Console<'_> {
    /// Print a prompt and read one trimmed line; `None` on end of input.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.out, "{} {question}", self.palette.prompt())?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Print the usage error and usage text to stderr.
pub fn usage_failure(err: &UsageError, console: &mut Console<'_>) -> i32 {
    let p = console.palette;
    // Nothing useful to do if stderr itself fails.
    let _ = writeln!(console.err, "{} {err}", p.error())
        .and_then(|()| ui::write_usage(console.err, &p, &console.program));
    EXIT_FAILURE
}

/// Execute `command` and return the exit code.
pub fn run<T: HidTransport>(
    command: Command,
    pairer: &mut Pairer<T>,
    config: &PairerConfig,
    console: &mut Console<'_>,
) -> i32 {
    debug!("running {command:?}");
    match execute(&command, pairer, config, console) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            let _ = report(console, &e);
            if matches!(e, CliError::Pair(PairError::NoController)) && console.interactive {
                if let Err(e) = offer_list_all(pairer, config, console) {
                    let _ = report(console, &e);
                }
            }
            EXIT_FAILURE
        }
    }
}

fn execute<T: HidTransport>(
    command: &Command,
    pairer: &mut Pairer<T>,
    config: &PairerConfig,
    console: &mut Console<'_>,
) -> Result<(), CliError> {
    match command {
        Command::Help => {
            let p = console.palette;
            ui::write_usage(console.out, &p, &console.program)?;
            Ok(())
        }
        Command::ListSony => list(pairer, config, console, Some(SONY_VENDOR_ID)),
        Command::ListAll => list(pairer, config, console, None),
        Command::Dump => dump(pairer, config, console),
        Command::Show => show(pairer, config, console),
        Command::Pair(input) => {
            // Validate before touching any device.
            let mac = mac::parse(input).map_err(|source| PairError::InvalidMac {
                input: input.clone(),
                source,
            })?;
            pair(pairer, config, console, &mac)
        }
    }
}

fn report(console: &mut Console<'_>, err: &CliError) -> io::Result<()> {
    let p = console.palette;
    writeln!(console.err, "{} {err}", p.error())?;
    if let CliError::Pair(e) = err {
        match e {
            PairError::Connect { attempts, .. } => ui::write_attempts(console.err, &p, attempts)?,
            PairError::UnsupportedModel { devices } => {
                for (n, d) in devices.iter().enumerate() {
                    ui::write_descriptor(console.err, &p, n + 1, d, ProbeView::Skipped)?;
                }
            }
            _ => {}
        }
        if let Some(hint) = e.hint() {
            writeln!(console.err, "{} {hint}", p.info())?;
        }
    }
    Ok(())
}

fn offer_list_all<T: HidTransport>(
    pairer: &mut Pairer<T>,
    config: &PairerConfig,
    console: &mut Console<'_>,
) -> Result<(), CliError> {
    let answer = console.ask("Would you like to list all USB HID devices? (y/n): ")?;
    match answer {
        Some(a) if a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes") => {
            list(pairer, config, console, None)
        }
        _ => Ok(()),
    }
}

/// One row of a JSON listing.
#[derive(Serialize)]
struct ListedDevice<'a> {
    #[serde(flatten)]
    descriptor: &'a DeviceDescriptor,
    supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reports: Option<Vec<ProbedReport>>,
}

/// Open `d` by path and run the listing probe; `None` if it cannot be opened.
fn probe_descriptor<T: HidTransport>(
    pairer: &Pairer<T>,
    d: &DeviceDescriptor,
) -> Option<Vec<ProbedReport>> {
    match pairer.transport().open_path(&d.path) {
        Ok(inner) => {
            let kind = ControllerKind::from_product(d.product_id);
            let mut handle = DeviceHandle::new(inner, kind, Route::Path);
            Some(diagnostics::probe_reports(&mut handle, &LIST_PROBE_IDS))
        }
        Err(e) => {
            debug!("probe: cannot open {}: {e}", d.path);
            None
        }
    }
}

fn list<T: HidTransport>(
    pairer: &mut Pairer<T>,
    config: &PairerConfig,
    console: &mut Console<'_>,
    vendor_filter: Option<u16>,
) -> Result<(), CliError> {
    let devices = pairer.list_devices(vendor_filter)?;
    let sony_only = vendor_filter == Some(SONY_VENDOR_ID);
    let probe = |d: &DeviceDescriptor| {
        (config.probe_on_list && d.vendor_id == SONY_VENDOR_ID).then(|| probe_descriptor(pairer, d))
    };

    if config.output == OutputFormat::Json {
        let rows: Vec<ListedDevice<'_>> = devices
            .iter()
            .map(|d| {
                let supported = catalog::is_supported(d.vendor_id, d.product_id);
                ListedDevice {
                    descriptor: d,
                    supported,
                    model: supported.then(|| catalog::name_for(d.product_id)),
                    reports: probe(d).flatten(),
                }
            })
            .collect();
        serde_json::to_writer_pretty(&mut *console.out, &rows)?;
        writeln!(console.out)?;
        return Ok(());
    }

    let p = console.palette;
    let title = if sony_only {
        "Sony USB Devices"
    } else {
        "All USB HID Devices"
    };
    writeln!(console.out, "{}", p.heading(title))?;
    for (n, d) in devices.iter().enumerate() {
        let probed = probe(d);
        let view = match &probed {
            None => ProbeView::Skipped,
            Some(None) => ProbeView::Unavailable,
            Some(Some(reports)) => ProbeView::Reports(reports),
        };
        ui::write_descriptor(console.out, &p, n + 1, d, view)?;
    }

    if devices.is_empty() {
        let what = if sony_only { "Sony" } else { "USB HID" };
        writeln!(console.out, "{} No {what} devices found.", p.warn())?;
        if sony_only && console.interactive {
            return offer_list_all(pairer, config, console);
        }
    } else {
        writeln!(
            console.out,
            "{} Found {} {} device(s).",
            p.info(),
            devices.len(),
            if sony_only { "Sony" } else { "USB HID" }
        )?;
    }
    Ok(())
}

/// Scan and report how many controllers were found.
fn scan_controllers<T: HidTransport>(
    pairer: &mut Pairer<T>,
    console: &mut Console<'_>,
) -> Result<ControllerScan, CliError> {
    let scan = pairer.scan()?.require_any()?;
    let p = console.palette;
    writeln!(
        console.out,
        "{} Found {} PlayStation controller interface(s).",
        p.info(),
        scan.controllers.len()
    )?;
    if scan.is_capped() {
        writeln!(
            console.out,
            "{} {} more controller interface(s) not shown; raise max_controllers to see them.",
            p.warn(),
            scan.omitted
        )?;
    }
    Ok(scan)
}

/// The first record, or the user's choice when several exist and prompting is possible.
fn select<'s>(
    scan: &'s ControllerScan,
    console: &mut Console<'_>,
) -> Result<&'s ControllerRecord, CliError> {
    let records = &scan.controllers;
    let first = records.first().ok_or(PairError::NoController)?;
    if records.len() == 1 || !console.interactive {
        return Ok(first);
    }

    let p = console.palette;
    for (n, record) in records.iter().enumerate() {
        ui::write_controller(console.out, &p, n + 1, record)?;
    }
    loop {
        let question = format!("Select controller (1-{}) [1]: ", records.len());
        let Some(answer) = console.ask(&question)? else {
            return Ok(first);
        };
        if answer.is_empty() {
            return Ok(first);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=records.len()).contains(&n) => return Ok(&records[n - 1]),
            _ => writeln!(console.out, "{} Invalid selection `{answer}`.", p.warn())?,
        }
    }
}

fn show<T: HidTransport>(
    pairer: &mut Pairer<T>,
    config: &PairerConfig,
    console: &mut Console<'_>,
) -> Result<(), CliError> {
    let scan = scan_controllers(pairer, console)?;
    let record = select(&scan, console)?;
    let mac = pairer.read_pairing(record)?;
    let p = console.palette;
    writeln!(
        console.out,
        "{} Current MAC address of {}: {}",
        p.success(),
        p.name(record.name()),
        ui::fmt_mac(&p, &mac, config.mac_separators)
    )?;
    Ok(())
}

fn pair<T: HidTransport>(
    pairer: &mut Pairer<T>,
    config: &PairerConfig,
    console: &mut Console<'_>,
    mac: &MacAddress,
) -> Result<(), CliError> {
    let scan = scan_controllers(pairer, console)?;
    let record = select(&scan, console)?;
    let p = console.palette;
    writeln!(
        console.out,
        "{} Setting MAC address of {} to {}",
        p.info(),
        p.name(record.name()),
        ui::fmt_mac(&p, mac, config.mac_separators)
    )?;
    pairer.write_pairing(record, mac)?;
    writeln!(
        console.out,
        "{} MAC address set to {}",
        p.success(),
        ui::fmt_mac(&p, mac, config.mac_separators)
    )?;
    Ok(())
}

#[derive(Serialize)]
struct DumpReport<'a> {
    controllers: &'a [ControllerRecord],
    selected: &'a ControllerRecord,
    route: Route,
    dump: &'a DiagnosticDump,
}

fn dump<T: HidTransport>(
    pairer: &mut Pairer<T>,
    config: &PairerConfig,
    console: &mut Console<'_>,
) -> Result<(), CliError> {
    let scan = pairer.scan()?.require_any()?;
    let p = console.palette;
    let json = config.output == OutputFormat::Json;
    if !json {
        writeln!(console.out, "{}", p.heading("PlayStation Controllers"))?;
        for (n, record) in scan.controllers.iter().enumerate() {
            ui::write_controller(console.out, &p, n + 1, record)?;
        }
    }

    let record = scan.controllers.first().ok_or(PairError::NoController)?;
    let mut handle = pairer.connect(record)?;
    let result = diagnostics::dump(&mut handle, &config.scan_report_ids);
    let route = handle.route();
    handle.close();

    if json {
        let report = DumpReport {
            controllers: &scan.controllers,
            selected: record,
            route,
            dump: &result,
        };
        serde_json::to_writer_pretty(&mut *console.out, &report)?;
        writeln!(console.out)?;
    } else {
        writeln!(
            console.out,
            "{} Connected to {} via {route}",
            p.success(),
            p.name(record.name())
        )?;
        ui::write_dump(console.out, &p, &result, config.mac_separators)?;
    }
    Ok(())
}
