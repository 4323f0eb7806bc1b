use std::str::FromStr;

use crate::board::BoardId;
use crate::model::layer::{BoardLayer, LayerSet};
use crate::model::net::NetRef;

/// Board items that carry a net.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConnectedKind {
    /// Straight track segment.
    Track,
    /// Arc track segment.
    Arc,
    /// Via through one or more copper layers.
    Via,
    /// Footprint pad.
    Pad,
    /// Copper zone.
    Zone,
}

impl FromStr for ConnectedKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "track" => Ok(Self::Track),
            "arc" => Ok(Self::Arc),
            "via" => Ok(Self::Via),
            "pad" => Ok(Self::Pad),
            "zone" => Ok(Self::Zone),
            _ => Err(format!(
                "unknown connected item kind `{value}`; expected one of: track, arc, via, pad, zone"
            )),
        }
    }
}

impl std::fmt::Display for ConnectedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Track => "track",
            Self::Arc => "arc",
            Self::Via => "via",
            Self::Pad => "pad",
            Self::Zone => "zone",
        };

        write!(f, "{value}")
    }
}

/// Board items without net identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GraphicKind {
    /// Drawn line, arc, circle or polygon.
    Shape,
    /// Free or footprint text.
    Text,
    /// Dimension annotation.
    Dimension,
}

/// A track, arc, via, pad or zone.
///
/// Items are created detached; [`crate::Board::attach`] links them to a board
/// and [`crate::Board::assign_net`] gives them a net.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectedItem {
    kind: ConnectedKind,
    layer: BoardLayer,
    layers: LayerSet,
    net: NetRef,
    local_clearance_override_nm: Option<i64>,
    local_clearance_nm: Option<i64>,
    name: Option<String>,
    pub(crate) board: Option<BoardId>,
}

impl ConnectedItem {
    /// Detached, orphaned item on `layers`, with `layer` as its primary layer.
    pub fn new(kind: ConnectedKind, layer: BoardLayer, layers: LayerSet) -> Self {
        Self {
            kind,
            layer,
            layers,
            net: NetRef::Orphaned,
            local_clearance_override_nm: None,
            local_clearance_nm: None,
            name: None,
            board: None,
        }
    }

    /// Track on a single copper layer.
    pub fn track(layer: BoardLayer) -> Self {
        Self::new(ConnectedKind::Track, layer, LayerSet::single(layer))
    }

    /// Arc on a single copper layer.
    pub fn arc(layer: BoardLayer) -> Self {
        Self::new(ConnectedKind::Arc, layer, LayerSet::single(layer))
    }

    /// Through via spanning every copper layer.
    pub fn via() -> Self {
        Self::new(ConnectedKind::Via, BoardLayer::F_CU, LayerSet::all_copper())
    }

    /// Pad `number` on `layers`. The first copper layer becomes the primary one.
    pub fn pad(number: impl Into<String>, layers: LayerSet) -> Self {
        let layer = layers.copper().iter().next().unwrap_or(BoardLayer::F_CU);
        Self::new(ConnectedKind::Pad, layer, layers).with_name(number)
    }

    /// Zone `name` filling `layer`.
    pub fn zone(name: impl Into<String>, layer: BoardLayer) -> Self {
        Self::new(ConnectedKind::Zone, layer, LayerSet::single(layer)).with_name(name)
    }

    /// Reference shown in clearance labels (pad number, zone name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override that short-circuits rule and netclass lookup when positive.
    pub fn with_local_clearance_override(mut self, value_nm: i64) -> Self {
        self.local_clearance_override_nm = Some(value_nm);
        self
    }

    /// Weaker local value that only joins the netclass/board maximum.
    pub fn with_local_clearance(mut self, value_nm: i64) -> Self {
        self.local_clearance_nm = Some(value_nm);
        self
    }

    /// Item kind.
    pub fn kind(&self) -> ConnectedKind {
        self.kind
    }

    /// Primary layer.
    pub fn layer(&self) -> BoardLayer {
        self.layer
    }

    /// Every layer the item occupies.
    pub fn layers(&self) -> LayerSet {
        self.layers
    }

    /// Replaces the item's layers. Leaving copper entirely orphans the item.
    pub fn set_layers(&mut self, layers: LayerSet) {
        if !layers.has_copper() {
            self.net = NetRef::Orphaned;
        }
        self.layers = layers;
    }

    /// Whether any of the item's layers is copper.
    pub fn is_on_copper_layer(&self) -> bool {
        self.layers.has_copper()
    }

    /// Raw net handle; resolve it through the owning [`crate::Board`].
    pub fn net(&self) -> NetRef {
        self.net
    }

    pub(crate) fn set_net(&mut self, net: NetRef) {
        self.net = net;
    }

    /// Pad number or zone name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Level-one override in nm, or 0 when unset.
    pub fn local_clearance_override(&self) -> i64 {
        self.local_clearance_override_nm.unwrap_or(0).max(0)
    }

    /// Always-considered local clearance in nm, or 0 when unset.
    pub fn local_clearance(&self) -> i64 {
        self.local_clearance_nm.unwrap_or(0).max(0)
    }

    /// Sets or clears the local clearance override.
    pub fn set_local_clearance_override(&mut self, value_nm: Option<i64>) {
        self.local_clearance_override_nm = value_nm;
    }

    /// Sets or clears the local clearance.
    pub fn set_local_clearance(&mut self, value_nm: Option<i64>) {
        self.local_clearance_nm = value_nm;
    }

    /// Board the item is attached to.
    pub fn board(&self) -> Option<BoardId> {
        self.board
    }

    /// Whether the item is on any board.
    pub fn is_attached(&self) -> bool {
        self.board.is_some()
    }
}

/// A non-connected board item (graphic shape, text, dimension).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GraphicItem {
    kind: GraphicKind,
    layer: BoardLayer,
}

impl GraphicItem {
    /// Graphic item of `kind` on `layer`.
    pub fn new(kind: GraphicKind, layer: BoardLayer) -> Self {
        Self { kind, layer }
    }

    /// Board outline segment.
    pub fn edge_cut() -> Self {
        Self::new(GraphicKind::Shape, BoardLayer::EDGE_CUTS)
    }

    /// Item kind.
    pub fn kind(&self) -> GraphicKind {
        self.kind
    }

    /// Layer the item is drawn on.
    pub fn layer(&self) -> BoardLayer {
        self.layer
    }
}

/// Borrowed view of any board item, used for the optional second item of a
/// clearance query. Only the `Connected` variant has net identity.
#[derive(Clone, Copy, Debug)]
pub enum BoardItem<'a> {
    /// Item with a net.
    Connected(&'a ConnectedItem),
    /// Item without a net, such as a board outline segment.
    Graphic(&'a GraphicItem),
}

impl<'a> BoardItem<'a> {
    /// Primary layer of either variant.
    pub fn layer(self) -> BoardLayer {
        match self {
            Self::Connected(item) => item.layer(),
            Self::Graphic(item) => item.layer(),
        }
    }

    /// The connected item, if this is one.
    pub fn as_connected(self) -> Option<&'a ConnectedItem> {
        match self {
            Self::Connected(item) => Some(item),
            Self::Graphic(_) => None,
        }
    }
}

impl<'a> From<&'a ConnectedItem> for BoardItem<'a> {
    fn from(item: &'a ConnectedItem) -> Self {
        Self::Connected(item)
    }
}

impl<'a> From<&'a GraphicItem> for BoardItem<'a> {
    fn from(item: &'a GraphicItem) -> Self {
        Self::Graphic(item)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{BoardItem, ConnectedItem, ConnectedKind, GraphicItem};
    use crate::model::layer::{BoardLayer, LayerSet};
    use crate::model::net::NetRef;

    #[test]
    fn new_items_are_detached_and_orphaned() {
        let track = ConnectedItem::track(BoardLayer::F_CU);
        assert!(!track.is_attached());
        assert_eq!(track.net(), NetRef::Orphaned);
        assert_eq!(track.local_clearance_override(), 0);
        assert_eq!(track.local_clearance(), 0);
    }

    #[test]
    fn pad_uses_first_copper_layer_as_primary() {
        let layers = LayerSet::single(BoardLayer::F_MASK).with(BoardLayer::B_CU);
        let pad = ConnectedItem::pad("3", layers);
        assert_eq!(pad.layer(), BoardLayer::B_CU);
        assert_eq!(pad.name(), Some("3"));
        assert!(pad.is_on_copper_layer());
    }

    #[test]
    fn leaving_copper_orphans_the_item() {
        let mut pad = ConnectedItem::pad("1", LayerSet::all_copper());
        pad.set_net(NetRef::Code(4));

        pad.set_layers(LayerSet::single(BoardLayer::B_CU));
        assert_eq!(pad.net(), NetRef::Code(4));

        pad.set_layers(LayerSet::single(BoardLayer::F_MASK));
        assert_eq!(pad.net(), NetRef::Orphaned);
        assert!(!pad.is_on_copper_layer());
    }

    #[test]
    fn negative_local_values_read_as_zero() {
        let via = ConnectedItem::via()
            .with_local_clearance_override(-10)
            .with_local_clearance(-20);
        assert_eq!(via.local_clearance_override(), 0);
        assert_eq!(via.local_clearance(), 0);
    }

    #[test]
    fn board_item_exposes_net_capability_only_for_connected_items() {
        let zone = ConnectedItem::zone("GND", BoardLayer::B_CU);
        let edge = GraphicItem::edge_cut();

        let connected = BoardItem::from(&zone);
        assert!(connected.as_connected().is_some());
        assert_eq!(connected.layer(), BoardLayer::B_CU);

        let graphic = BoardItem::from(&edge);
        assert!(graphic.as_connected().is_none());
        assert_eq!(graphic.layer(), BoardLayer::EDGE_CUTS);
    }

    #[test]
    fn connected_kind_round_trips_names() {
        for kind in [
            ConnectedKind::Track,
            ConnectedKind::Arc,
            ConnectedKind::Via,
            ConnectedKind::Pad,
            ConnectedKind::Zone,
        ] {
            let parsed = ConnectedKind::from_str(&kind.to_string()).expect("kind should parse");
            assert_eq!(parsed, kind);
        }
        assert!(ConnectedKind::from_str("footprint").is_err());
    }
}
