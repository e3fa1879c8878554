//! Crate-level error type.

use crate::config::ConfigError;
use crate::connect::Attempt;
use crate::mac::MacParseError;
use crate::metadata::DeviceDescriptor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairError {
    /// The HID library could not start.
    #[error("failed to initialize HID API: {0}")]
    Init(String),

    #[error("HID enumeration failed: {0}")]
    Enumerate(String),

    #[error("invalid MAC address `{input}` ({source}); expected AABBCCDDEEFF or AA:BB:CC:DD:EE:FF")]
    InvalidMac {
        input: String,
        #[source]
        source: MacParseError,
    },

    #[error("no PlayStation controllers found")]
    NoController,

    /// Sony interfaces were found, none of them a supported model.
    #[error(
        "found {} Sony device(s), but none match the supported PlayStation controllers",
        .devices.len()
    )]
    UnsupportedModel { devices: Vec<DeviceDescriptor> },

    /// Controllers were found but the discovery cap left none of them.
    #[error(
        "found {omitted} controller interface(s), \
         but the controller limit excluded all of them"
    )]
    Capped { omitted: usize },

    /// Every connection route failed. Usually a permissions problem on the
    /// raw HID node.
    #[error("could not connect to {name} after {} attempt(s)", .attempts.len())]
    Connect { name: String, attempts: Vec<Attempt> },

    #[error("failed to read MAC address: {detail}")]
    Read { detail: String },

    #[error("failed to set MAC address: {detail}")]
    Write { detail: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PairError {
    /// Hint printed under the error, when there is a useful one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PairError::Connect { .. } => Some(
                "this is usually a permissions problem: run with sudo \
                 or add a udev rule granting access to /dev/hidraw*",
            ),
            PairError::NoController => {
                Some("make sure the controller is connected via USB and powered on")
            }
            PairError::UnsupportedModel { .. } => {
                Some("the controller might be a different model or in an unsupported mode")
            }
            PairError::Capped { .. } => Some("raise max_controllers in the config"),
            _ => None,
        }
    }
}
