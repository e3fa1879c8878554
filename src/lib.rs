//! # sixpair
//!
//! Read and rewrite the Bluetooth pairing address of PlayStation controllers
//! (SixAxis / DualShock 3, Move Motion, DualShock 4) attached over USB HID.
//!
//! The library is layered leaf to root:
//! - [`mac`] and [`catalog`]: address codec and the supported-model table.
//! - [`device`]: the [`HidTransport`] / [`HidHandle`] seam, with backends in
//!   [`backends`] (`hidapi` for hardware, `virtual_hid` for tests).
//! - [`manager`]: enumeration, controller discovery and the [`Pairer`] session.
//! - [`connect`]: the ordered open strategy yielding a [`DeviceHandle`].
//! - [`pairing`] and [`diagnostics`]: feature-report reads and writes.
//! - [`config`], [`ui`] and [`cli`]: the command-line tool around it.
//!
//! ```no_run
//! # #[cfg(feature = "hid")]
//! # fn demo() -> Result<(), sixpair::PairError> {
//! use sixpair::backends::{hid::HidapiTransport, raw_node::platform_raw_nodes};
//! use sixpair::Pairer;
//!
//! let mut pairer = Pairer::new(HidapiTransport::new()?, platform_raw_nodes());
//! let scan = pairer.scan()?.require_any()?;
//! let mac = pairer.read_pairing(&scan.controllers[0])?;
//! println!("paired to {mac}");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod connect;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod mac;
pub mod manager;
pub mod metadata;
pub mod pairing;
pub mod ui;

pub use catalog::ControllerKind;
pub use config::PairerConfig;
pub use connect::{Attempt, DeviceHandle, Route};
pub use device::*;
pub use error::PairError;
pub use mac::{MacAddress, MacParseError};
pub use manager::*;
pub use metadata::DeviceDescriptor;
