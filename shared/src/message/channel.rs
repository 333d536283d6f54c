//! Typed channel keys
//!
//! Channels used to be ad-hoc strings (`mesa-3`, `mesero-3`) which lets a
//! table and a waiter with the same id collide. The typed union keeps the
//! entity namespaces apart; the string form exists only at the wire edge.

use serde::{Deserialize, Serialize};

/// A named audience that sessions join to receive events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ChannelKey {
    /// All kitchen displays
    Kitchen,
    /// All manager dashboards
    Admin,
    /// One waiter's devices
    Staff(i64),
    /// Devices viewing one table
    Table(i64),
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelKey::Kitchen => write!(f, "kitchen"),
            ChannelKey::Admin => write!(f, "admin"),
            ChannelKey::Staff(id) => write!(f, "staff:{}", id),
            ChannelKey::Table(id) => write!(f, "table:{}", id),
        }
    }
}

impl std::str::FromStr for ChannelKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kitchen" => return Ok(ChannelKey::Kitchen),
            "admin" => return Ok(ChannelKey::Admin),
            _ => {}
        }
        let parse_id = |raw: &str| {
            raw.parse::<i64>()
                .map_err(|_| format!("invalid channel id in '{}'", s))
        };
        if let Some(raw) = s.strip_prefix("staff:") {
            return Ok(ChannelKey::Staff(parse_id(raw)?));
        }
        if let Some(raw) = s.strip_prefix("table:") {
            return Ok(ChannelKey::Table(parse_id(raw)?));
        }
        Err(format!("unknown channel: {}", s))
    }
}
