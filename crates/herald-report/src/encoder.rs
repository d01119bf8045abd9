//! Report payload encoding.
//!
//! The field order below is the wire contract for protocol id 2. Any change
//! to order or width needs a new protocol id in the frame header.

use crate::descriptor::{GameMode, ModControlMode, ServerDescriptor, WarpMode};
use crate::wire::{DecodeError, EncodeError, PayloadReader, PayloadWriter};

/// Encode `descriptor` for the server identified by `identity`.
///
/// Pure: the same inputs always produce the same bytes.
pub fn encode_report(
    identity: &str,
    descriptor: &ServerDescriptor,
) -> Result<Vec<u8>, EncodeError> {
    let d = descriptor;
    let mut w = PayloadWriter::new();
    w.write_str("identity", identity)?;
    w.write_str("server_name", &d.server_name)?;
    w.write_str("description", &d.description)?;
    w.write_i32(d.port);
    w.write_str("game_address", &d.game_address)?;
    w.write_i32(d.protocol_version);
    w.write_str("program_version", &d.program_version)?;
    w.write_i32(d.max_players);
    w.write_i32(d.mod_control.ordinal());
    w.write_str("mod_control_sha", &d.mod_control_sha)?;
    w.write_i32(d.game_mode.ordinal());
    w.write_bool(d.cheats);
    w.write_i32(d.warp_mode.ordinal());
    w.write_i64(d.universe_size);
    w.write_str("banner", &d.banner)?;
    w.write_str("homepage", &d.homepage)?;
    w.write_i32(d.http_port);
    w.write_str("admin", &d.admin)?;
    w.write_str("team", &d.team)?;
    w.write_str("location", &d.location)?;
    w.write_bool(d.fixed_ip);
    w.write_str_list("players", &d.players)?;
    Ok(w.into_bytes())
}

/// A report as seen by a receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReport {
    /// Identity hash of the reporting server.
    pub identity: String,
    /// Reported status.
    pub descriptor: ServerDescriptor,
}

/// Decode a report payload produced by [`encode_report`].
pub fn decode_report(payload: &[u8]) -> Result<DecodedReport, DecodeError> {
    let mut r = PayloadReader::new(payload);
    let identity = r.read_string("identity")?;
    let descriptor = ServerDescriptor {
        server_name: r.read_string("server_name")?,
        description: r.read_string("description")?,
        port: r.read_i32("port")?,
        game_address: r.read_string("game_address")?,
        protocol_version: r.read_i32("protocol_version")?,
        program_version: r.read_string("program_version")?,
        max_players: r.read_i32("max_players")?,
        mod_control: ordinal(&mut r, "mod_control", ModControlMode::from_ordinal)?,
        mod_control_sha: r.read_string("mod_control_sha")?,
        game_mode: ordinal(&mut r, "game_mode", GameMode::from_ordinal)?,
        cheats: r.read_bool("cheats")?,
        warp_mode: ordinal(&mut r, "warp_mode", WarpMode::from_ordinal)?,
        universe_size: r.read_i64("universe_size")?,
        banner: r.read_string("banner")?,
        homepage: r.read_string("homepage")?,
        http_port: r.read_i32("http_port")?,
        admin: r.read_string("admin")?,
        team: r.read_string("team")?,
        location: r.read_string("location")?,
        fixed_ip: r.read_bool("fixed_ip")?,
        players: r.read_string_list("players")?,
    };
    r.finish()?;
    Ok(DecodedReport {
        identity,
        descriptor,
    })
}

fn ordinal<T>(
    r: &mut PayloadReader<'_>,
    field: &'static str,
    map: fn(i32) -> Option<T>,
) -> Result<T, DecodeError> {
    let value = r.read_i32(field)?;
    map(value).ok_or(DecodeError::UnknownOrdinal { field, value })
}
