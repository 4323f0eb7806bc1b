//! # KiCad Clearance
//!
//! **Netclass and design-rule clearance resolution for KiCad board items.**
//! Answers "how far apart must these two copper items be on this layer, and
//! which setting says so?" the way pcbnew's connected items do.
//!
//! Resolution is a strict cascade:
//!
//! | Level | Source | Combination |
//! | --- | --- | --- |
//! | 1 | Local clearance overrides (pads, footprints, zones) | max of both items, returned when positive |
//! | 2 | Design rules | first match wins, even when smaller than level 3 |
//! | 3 | Board minimum, effective netclasses, board edge, local clearances | max of all |
//!
//! ## Quickstart
//!
//! ```
//! use kicad_clearance::{Board, BoardDesignSettings, BoardLayer, ConnectedItem, NetClass};
//!
//! # fn main() -> Result<(), kicad_clearance::ClearanceError> {
//! let settings = BoardDesignSettings::builder().min_clearance(150_000).build()?;
//! let mut board = Board::new(settings);
//! board.add_netclass(NetClass::builder("Power").clearance(300_000).build()?)?;
//! board.add_net(1, "VCC", Some("Power"))?;
//!
//! let mut track = ConnectedItem::track(BoardLayer::F_CU);
//! board.attach(&mut track);
//! board.assign_net(&mut track, 1)?;
//!
//! let clearance = board.clearance_with_source(&track, None, BoardLayer::F_CU);
//! assert_eq!(clearance.value_nm, 300_000);
//! assert_eq!(clearance.source_label().as_deref(), Some("'Power' netclass"));
//! # Ok(())
//! # }
//! ```
//!
//! Enable the `tracing` feature to get `trace` events naming the level that
//! decided each clearance.

#![warn(missing_docs)]

/// Board container: settings, netclasses, nets and rules.
pub mod board;
/// Error types returned by this crate.
pub mod error;
mod log;
/// Layers, nets, netclasses and board items.
pub mod model;
/// The clearance cascade.
pub mod resolver;
/// Design rules and constraint lookup.
pub mod rules;
/// Board-wide design settings.
pub mod settings;

pub use crate::board::{Board, BoardId};
pub use crate::error::ClearanceError;
pub use crate::model::item::{BoardItem, ConnectedItem, ConnectedKind, GraphicItem, GraphicKind};
pub use crate::model::layer::{BoardLayer, LayerSet};
pub use crate::model::net::{NetInfo, NetRef, NetRegistry, FORCE_ORPHANED, ORPHANED, UNCONNECTED};
pub use crate::model::netclass::{
    NetClass, NetClassBuilder, NetClassId, NetClasses, DEFAULT_NETCLASS_NAME,
};
pub use crate::resolver::{Clearance, ClearanceSource};
pub use crate::rules::{
    Condition, Constraint, ConstraintKind, DesignRule, MinOptMax, NetContext, RuleLabel,
    RuleMatch, RuleSet, Side,
};
pub use crate::settings::{BoardDesignSettings, DesignSettingsBuilder};
