//! Clearance resolution between connected board items.
//!
//! Clearances exist in a hierarchy; once a level yields a value the lower
//! levels are not consulted:
//!
//! 1. local overrides on either item (pads, footprints, zones),
//! 2. the first matching design rule,
//! 3. the maximum of the board minimum, both effective netclasses, the board
//!    edge clearance (second item on `Edge.Cuts` only) and both items' local
//!    clearances.

use crate::board::Board;
use crate::log::trace_event;
use crate::model::item::{BoardItem, ConnectedItem};
use crate::model::layer::BoardLayer;
use crate::model::netclass::NetClass;
use crate::rules::RuleLabel;

/// Setting that produced a clearance value.
#[derive(Clone, Copy, Debug)]
pub enum ClearanceSource<'a> {
    /// Local clearance override of an item.
    LocalOverride(&'a ConnectedItem),
    /// A design rule.
    Rule(RuleLabel<'a>),
    /// Board minimum clearance.
    BoardMinimum,
    /// An effective netclass.
    NetClass(&'a NetClass),
    /// Copper to board edge clearance.
    BoardEdge,
    /// Local clearance of an item.
    LocalClearance(&'a ConnectedItem),
}

impl std::fmt::Display for ClearanceSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalOverride(item) | Self::LocalClearance(item) => match item.name() {
                Some(name) => write!(f, "{} {name}", item.kind()),
                None => write!(f, "{}", item.kind()),
            },
            Self::Rule(label) => write!(f, "{label}"),
            Self::BoardMinimum => write!(f, "board minimum"),
            Self::NetClass(class) => write!(f, "'{}' netclass", class.name()),
            Self::BoardEdge => write!(f, "board edge"),
        }
    }
}

/// A resolved clearance in nanometres and, when any setting was positive, its
/// provenance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clearance<'a> {
    /// Clearance in nm.
    pub value_nm: i64,
    /// `None` when nothing was positive.
    pub source: Option<ClearanceSource<'a>>,
}

impl<'a> Clearance<'a> {
    /// Replaces the running value only when `value_nm` is strictly greater.
    fn raise(&mut self, value_nm: i64, source: ClearanceSource<'a>) {
        if value_nm > self.value_nm {
            self.value_nm = value_nm;
            self.source = Some(source);
        }
    }

    /// Human-readable source, as shown in DRC reports.
    pub fn source_label(&self) -> Option<String> {
        self.source.map(|source| source.to_string())
    }
}

impl Board {
    /// Minimum clearance between `a` and the optional `b` on `layer`.
    ///
    /// Returns 0 when `a` is not attached to this board or when nothing
    /// constrains the pair.
    pub fn clearance(&self, a: &ConnectedItem, b: Option<BoardItem<'_>>, layer: BoardLayer) -> i64 {
        self.clearance_with_source(a, b, layer).value_nm
    }

    /// Same as [`Board::clearance`], also reporting which setting won.
    pub fn clearance_with_source<'a>(
        &'a self,
        a: &'a ConnectedItem,
        b: Option<BoardItem<'a>>,
        layer: BoardLayer,
    ) -> Clearance<'a> {
        let mut clearance = Clearance::default();

        // No netclass is resolvable until the item is on a board.
        if !self.owns(a) {
            trace_event!(kind = %a.kind(), "item is not attached to this board; no clearance");
            return clearance;
        }

        let second = b.and_then(BoardItem::as_connected);

        clearance.raise(a.local_clearance_override(), ClearanceSource::LocalOverride(a));
        if let Some(second) = second {
            clearance.raise(
                second.local_clearance_override(),
                ClearanceSource::LocalOverride(second),
            );
        }

        if clearance.value_nm > 0 {
            trace_event!(value_nm = clearance.value_nm, "clearance from local override");
            return clearance;
        }

        if let Some(rule) = self.find_clearance_rule(a, b, layer) {
            trace_event!(
                value_nm = rule.value_nm(),
                rule = rule.rule_name(),
                "clearance from design rule"
            );
            return Clearance {
                value_nm: rule.value_nm().max(0),
                source: Some(ClearanceSource::Rule(rule.label())),
            };
        }

        let settings = self.design_settings();
        clearance.raise(settings.min_clearance_nm, ClearanceSource::BoardMinimum);

        if let Some(class) = self.effective_netclass(a) {
            clearance.raise(class.clearance_nm, ClearanceSource::NetClass(class));
        }

        if let Some(class) = second.and_then(|second| self.effective_netclass(second)) {
            clearance.raise(class.clearance_nm, ClearanceSource::NetClass(class));
        }

        if b.is_some_and(|b| b.layer() == BoardLayer::EDGE_CUTS) {
            clearance.raise(settings.copper_edge_clearance_nm, ClearanceSource::BoardEdge);
        }

        clearance.raise(a.local_clearance(), ClearanceSource::LocalClearance(a));
        if let Some(second) = second {
            clearance.raise(
                second.local_clearance(),
                ClearanceSource::LocalClearance(second),
            );
        }

        trace_event!(
            value_nm = clearance.value_nm,
            source = ?clearance.source_label(),
            "clearance from accumulated settings"
        );

        clearance
    }
}
