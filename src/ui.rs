//! Terminal output.
//!
//! Pure formatting: every function takes a [`Palette`] and writes to any
//! `io::Write`. Nothing here touches global state or the HID transport.

use crate::catalog::{self, SONY_VENDOR_ID};
use crate::config::{ColorMode, CONFIG_ENV, LOG_ENV};
use crate::connect::Attempt;
use crate::diagnostics::{DiagnosticDump, ProbedReport};
use crate::mac::MacAddress;
use crate::manager::ControllerRecord;
use crate::metadata::DeviceDescriptor;
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};

const RULE: &str = "─────────────────────────────────────";
const FOOTER: &str = "└───────────────────────────────────────────────";

/// Whether and how to color output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    pub enabled: bool,
}

impl Palette {
    pub const PLAIN: Palette = Palette { enabled: false };

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Resolve a config color mode; `Auto` honors `NO_COLOR` and the terminal check.
    pub fn resolve(mode: ColorMode, is_terminal: bool) -> Self {
        let enabled = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => is_terminal && std::env::var_os("NO_COLOR").is_none(),
        };
        Self { enabled }
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn info(&self) -> String {
        self.paint("[INFO]", Style::new().blue())
    }

    pub fn success(&self) -> String {
        self.paint("[SUCCESS]", Style::new().green())
    }

    pub fn warn(&self) -> String {
        self.paint("[WARN]", Style::new().yellow())
    }

    pub fn error(&self) -> String {
        self.paint("[ERROR]", Style::new().red())
    }

    pub fn prompt(&self) -> String {
        self.paint("[PROMPT]", Style::new().magenta())
    }

    pub fn heading(&self, title: &str) -> String {
        self.paint(&format!("=== {title} ==="), Style::new().bold().yellow())
    }

    pub fn highlight(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan())
    }

    pub fn name(&self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }

    fn border(&self, text: &str) -> String {
        self.paint(text, Style::new().magenta())
    }

    fn box_top(&self, title: &str) -> String {
        self.paint(&format!("┌─ {title} {RULE}"), Style::new().bold().magenta())
    }

    fn row(&self, label: &str, value: impl std::fmt::Display) -> String {
        format!("{}  {:<17}{}", self.border("│"), format!("{label}:"), value)
    }
}

pub fn write_usage(out: &mut dyn Write, p: &Palette, program: &str) -> io::Result<()> {
    writeln!(out, "{}", p.heading("PlayStation Controller Pairer Usage"))?;
    let rows = [
        ("", "Show current controller MAC address"),
        (
            "[mac]",
            "Set controller MAC address (format: AABBCCDDEEFF or AA:BB:CC:DD:EE:FF)",
        ),
        ("-l", "List all connected Sony USB devices"),
        ("-a", "List all connected USB devices (not just Sony)"),
        ("-d", "Dump all available information from connected controller"),
        ("-h", "Show this help message"),
    ];
    for (arg, text) in rows {
        writeln!(out, "\t{program} {}- {text}", p.highlight(&format!("{arg:<8}")))?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Set {CONFIG_ENV} to a TOML file to change defaults, {LOG_ENV}=debug for a trace."
    )
}

/// Feature-report probe section of a device box.
#[derive(Clone, Copy, Debug)]
pub enum ProbeView<'a> {
    Skipped,
    /// The interface could not be opened for probing.
    Unavailable,
    Reports(&'a [ProbedReport]),
}

/// Box describing one enumerated interface.
pub fn write_descriptor(
    out: &mut dyn Write,
    p: &Palette,
    index: usize,
    d: &DeviceDescriptor,
    probe: ProbeView<'_>,
) -> io::Result<()> {
    writeln!(out, "{}", p.box_top(&format!("Device {index}")))?;
    let sony = if d.vendor_id == SONY_VENDOR_ID {
        format!(" {}", p.name("(Sony)"))
    } else {
        String::new()
    };
    writeln!(out, "{}", p.row("Vendor ID", format!("0x{:04x}{sony}", d.vendor_id)))?;
    let supported = catalog::is_supported(d.vendor_id, d.product_id);
    let model = if supported {
        format!(" {}", p.name(&format!("({})", catalog::name_for(d.product_id))))
    } else {
        String::new()
    };
    writeln!(out, "{}", p.row("Product ID", format!("0x{:04x}{model}", d.product_id)))?;
    writeln!(out, "{}", p.row("Manufacturer", text_or(&d.manufacturer, "(Unknown)")))?;
    writeln!(out, "{}", p.row("Product", text_or(&d.product, "(Unknown)")))?;
    writeln!(out, "{}", p.row("Serial Number", text_or(&d.serial_number, "(None)")))?;
    let preferred = if catalog::is_preferred_interface(d.product_id, d.interface_number) {
        format!(" {}", p.paint("(HID Interface - Preferred)", Style::new().green()))
    } else {
        String::new()
    };
    writeln!(out, "{}", p.row("Interface", format!("{}{preferred}", d.interface_number)))?;
    writeln!(out, "{}", p.row("Path", &d.path))?;
    writeln!(out, "{}", p.row("Release Number", d.release_string()))?;
    writeln!(out, "{}", p.row("Usage Page", format!("0x{:04x}", d.usage_page)))?;
    writeln!(out, "{}", p.row("Usage", format!("0x{:04x}", d.usage)))?;
    if supported {
        writeln!(
            out,
            "{}  {}",
            p.border("│"),
            p.paint("** This is a supported PlayStation controller **", Style::new().green())
        )?;
    }
    match probe {
        ProbeView::Skipped => {}
        ProbeView::Unavailable => writeln!(
            out,
            "{}  {}",
            p.border("│"),
            p.paint("Could not open device for feature report tests", Style::new().red())
        )?,
        ProbeView::Reports(reports) => write_probe(out, p, reports)?,
    }
    writeln!(out, "{}", p.border(FOOTER))?;
    writeln!(out)
}

/// Per-ID feature-report probe lines inside a device box.
pub fn write_probe(out: &mut dyn Write, p: &Palette, reports: &[ProbedReport]) -> io::Result<()> {
    writeln!(out, "{}  Feature Report Tests:", p.border("│"))?;
    for r in reports {
        if r.supported() {
            let mut bytes = hex_bytes(&r.data[..r.data.len().min(8)]);
            if r.data.len() > 8 {
                bytes.push_str(" ...");
            }
            writeln!(
                out,
                "{}    Report 0x{:02x}: {} ({bytes})",
                p.border("│"),
                r.id,
                p.paint("Supported", Style::new().green())
            )?;
        } else {
            writeln!(
                out,
                "{}    Report 0x{:02x}: {}",
                p.border("│"),
                r.id,
                p.paint("Not supported", Style::new().red())
            )?;
        }
    }
    Ok(())
}

/// Shorter box for a recognized controller.
pub fn write_controller(
    out: &mut dyn Write,
    p: &Palette,
    index: usize,
    record: &ControllerRecord,
) -> io::Result<()> {
    let d = &record.descriptor;
    writeln!(out, "{}", p.box_top(&format!("Controller {index}")))?;
    writeln!(out, "{}", p.row("Type", p.name(record.name())))?;
    writeln!(out, "{}", p.row("Vendor ID", format!("0x{:04x} (Sony)", d.vendor_id)))?;
    writeln!(out, "{}", p.row("Product ID", format!("0x{:04x}", d.product_id)))?;
    writeln!(out, "{}", p.row("Manufacturer", text_or(&d.manufacturer, "(Unknown)")))?;
    writeln!(out, "{}", p.row("Product", text_or(&d.product, "(Unknown)")))?;
    let preferred = if record.preferred {
        format!(" {}", p.paint("(Preferred)", Style::new().green()))
    } else {
        String::new()
    };
    writeln!(out, "{}", p.row("Interface", format!("{}{preferred}", d.interface_number)))?;
    writeln!(out, "{}", p.row("Path", &d.path))?;
    writeln!(out, "{}", p.border(FOOTER))?;
    writeln!(out)
}

pub fn write_attempts(out: &mut dyn Write, p: &Palette, attempts: &[Attempt]) -> io::Result<()> {
    for (n, a) in attempts.iter().enumerate() {
        let outcome = match &a.error {
            None => p.paint("ok", Style::new().green()),
            Some(e) => p.paint(e, Style::new().red()),
        };
        writeln!(out, "        {}. {}: {outcome}", n + 1, a.route)?;
    }
    Ok(())
}

pub fn write_dump(
    out: &mut dyn Write,
    p: &Palette,
    dump: &DiagnosticDump,
    separators: bool,
) -> io::Result<()> {
    writeln!(out)?;
    let title = p.paint("=== Detailed Device Information ===", Style::new().bold().green());
    writeln!(out, "{title}")?;
    if let Some(d) = &dump.descriptor {
        writeln!(out, "{}", p.box_top("Basic Device Information"))?;
        let sony = if d.vendor_id == SONY_VENDOR_ID { " (Sony)" } else { "" };
        writeln!(out, "{}", p.row("Vendor ID", format!("0x{:04x}{sony}", d.vendor_id)))?;
        writeln!(out, "{}", p.row("Product ID", format!("0x{:04x}", d.product_id)))?;
        writeln!(out, "{}", p.row("Manufacturer", text_or(&d.manufacturer, "(Unknown)")))?;
        writeln!(out, "{}", p.row("Product", text_or(&d.product, "(Unknown)")))?;
        writeln!(out, "{}", p.row("Serial Number", text_or(&d.serial_number, "(None)")))?;
        writeln!(out, "{}", p.row("Interface", d.interface_number))?;
        writeln!(out, "{}", p.row("Path", &d.path))?;
        writeln!(out, "{}", p.row("Release Number", d.release_string()))?;
        writeln!(out, "{}", p.row("Usage Page", format!("0x{:04x}", d.usage_page)))?;
        writeln!(out, "{}", p.row("Usage", format!("0x{:04x}", d.usage)))?;
        writeln!(out, "{}", p.border(FOOTER))?;
        writeln!(out)?;
    }

    let bar = p.border("│");
    writeln!(out, "{}", p.box_top("Controller-Specific Information"))?;
    if let Some(info) = &dump.controller_info {
        writeln!(out, "{bar}  [Report 0xF2] Controller Information:")?;
        writeln!(out, "{bar}    Firmware Version: {}.{}", info.firmware.0, info.firmware.1)?;
        writeln!(
            out,
            "{bar}    Bluetooth MAC:    {}",
            fmt_mac(p, &info.bluetooth_address, separators)
        )?;
    }
    if let Some(mac) = &dump.pairing {
        writeln!(out, "{bar}  [Report 0xF5] Current MAC Pairing:")?;
        writeln!(out, "{bar}    Paired MAC:       {}", fmt_mac(p, mac, separators))?;
    }
    if let Some(status) = &dump.status {
        writeln!(out, "{bar}  [Report 0xA3] Controller Status:")?;
        writeln!(out, "{bar}    Data: {} ...", hex_bytes(&status[..status.len().min(9)]))?;
    }
    if let Some(caps) = &dump.capabilities {
        writeln!(out, "{bar}  [Report 0x01] Controller Capabilities:")?;
        writeln!(out, "{bar}    Data: {} ...", hex_bytes(&caps[..caps.len().min(9)]))?;
    }
    writeln!(out, "{bar}  [Report Discovery] Scanning for additional report IDs:")?;
    if dump.additional.is_empty() {
        writeln!(out, "{bar}    No additional report IDs found")?;
    }
    for r in &dump.additional {
        let payload = r.payload();
        writeln!(
            out,
            "{bar}    [Report 0x{:02x}] Data: {} ...",
            r.id,
            hex_bytes(&payload[..payload.len().min(7)])
        )?;
    }
    writeln!(out, "{}", p.border(FOOTER))
}

fn text_or<'a>(value: &'a Option<String>, missing: &'a str) -> &'a str {
    value.as_deref().unwrap_or(missing)
}

pub fn fmt_mac(p: &Palette, mac: &MacAddress, separators: bool) -> String {
    p.highlight(&mac.to_string_with(separators))
}

pub fn hex_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
