//! Report payload: the server status snapshot and its binary encoding.

pub mod descriptor;
pub mod encoder;
pub mod wire;

pub use descriptor::{GameMode, ModControlMode, ParseModeError, ServerDescriptor, WarpMode};
pub use encoder::{DecodedReport, decode_report, encode_report};
pub use wire::{DecodeError, EncodeError, PayloadReader, PayloadWriter};
