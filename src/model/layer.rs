use std::str::FromStr;

use crate::error::ClearanceError;

const INNER_COPPER_COUNT: u8 = 30;
const LAYER_COUNT: u8 = 50;

/// A board layer, numbered the way KiCad numbers `PCB_LAYER_ID`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BoardLayer(u8);

impl BoardLayer {
    /// `F.Cu`
    pub const F_CU: Self = Self(0);
    /// `B.Cu`
    pub const B_CU: Self = Self(31);
    /// `B.Adhes`
    pub const B_ADHES: Self = Self(32);
    /// `F.Adhes`
    pub const F_ADHES: Self = Self(33);
    /// `B.Paste`
    pub const B_PASTE: Self = Self(34);
    /// `F.Paste`
    pub const F_PASTE: Self = Self(35);
    /// `B.SilkS`
    pub const B_SILKS: Self = Self(36);
    /// `F.SilkS`
    pub const F_SILKS: Self = Self(37);
    /// `B.Mask`
    pub const B_MASK: Self = Self(38);
    /// `F.Mask`
    pub const F_MASK: Self = Self(39);
    /// `Dwgs.User`
    pub const DWGS_USER: Self = Self(40);
    /// `Cmts.User`
    pub const CMTS_USER: Self = Self(41);
    /// `Eco1.User`
    pub const ECO1_USER: Self = Self(42);
    /// `Eco2.User`
    pub const ECO2_USER: Self = Self(43);
    /// `Edge.Cuts`
    pub const EDGE_CUTS: Self = Self(44);
    /// `Margin`
    pub const MARGIN: Self = Self(45);
    /// `B.CrtYd`
    pub const B_CRTYD: Self = Self(46);
    /// `F.CrtYd`
    pub const F_CRTYD: Self = Self(47);
    /// `B.Fab`
    pub const B_FAB: Self = Self(48);
    /// `F.Fab`
    pub const F_FAB: Self = Self(49);

    /// Inner copper layer `In{index}.Cu`, for `index` in `1..=30`.
    pub const fn inner_cu(index: u8) -> Option<Self> {
        if index >= 1 && index <= INNER_COPPER_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Layer with KiCad id `id`, if it is one of the known layers.
    pub const fn from_id(id: u8) -> Option<Self> {
        if id < LAYER_COUNT {
            Some(Self(id))
        } else {
            None
        }
    }

    /// KiCad layer id.
    pub const fn id(self) -> u8 {
        self.0
    }

    /// `F.Cu`, `B.Cu` and the inner copper layers.
    pub const fn is_copper(self) -> bool {
        self.0 <= Self::B_CU.0
    }

    /// KiCad layer name, e.g. `In3.Cu`.
    pub fn name(self) -> std::borrow::Cow<'static, str> {
        let fixed = match self {
            Self::F_CU => "F.Cu",
            Self::B_CU => "B.Cu",
            Self::B_ADHES => "B.Adhes",
            Self::F_ADHES => "F.Adhes",
            Self::B_PASTE => "B.Paste",
            Self::F_PASTE => "F.Paste",
            Self::B_SILKS => "B.SilkS",
            Self::F_SILKS => "F.SilkS",
            Self::B_MASK => "B.Mask",
            Self::F_MASK => "F.Mask",
            Self::DWGS_USER => "Dwgs.User",
            Self::CMTS_USER => "Cmts.User",
            Self::ECO1_USER => "Eco1.User",
            Self::ECO2_USER => "Eco2.User",
            Self::EDGE_CUTS => "Edge.Cuts",
            Self::MARGIN => "Margin",
            Self::B_CRTYD => "B.CrtYd",
            Self::F_CRTYD => "F.CrtYd",
            Self::B_FAB => "B.Fab",
            Self::F_FAB => "F.Fab",
            Self(inner) => return format!("In{inner}.Cu").into(),
        };

        fixed.into()
    }

    fn all() -> impl Iterator<Item = Self> {
        (0..LAYER_COUNT).map(Self)
    }
}

impl FromStr for BoardLayer {
    type Err = ClearanceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(index) = value
            .strip_prefix("In")
            .and_then(|rest| rest.strip_suffix(".Cu"))
        {
            return index
                .parse::<u8>()
                .ok()
                .and_then(Self::inner_cu)
                .ok_or_else(|| ClearanceError::UnknownLayer {
                    name: value.to_string(),
                });
        }

        Self::all()
            .filter(|layer| !(1..=INNER_COPPER_COUNT).contains(&layer.0))
            .find(|layer| layer.name() == value)
            .ok_or_else(|| ClearanceError::UnknownLayer {
                name: value.to_string(),
            })
    }
}

impl std::fmt::Display for BoardLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// Bit set of board layers, one bit per [`BoardLayer::id`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct LayerSet(u64);

impl LayerSet {
    const COPPER_MASK: u64 = (1 << (BoardLayer::B_CU.0 as u64 + 1)) - 1;

    /// Set with no layers.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every copper layer.
    pub const fn all_copper() -> Self {
        Self(Self::COPPER_MASK)
    }

    /// Outer copper only (`F.Cu` and `B.Cu`).
    pub const fn external_copper() -> Self {
        Self((1 << BoardLayer::F_CU.0) | (1 << BoardLayer::B_CU.0))
    }

    /// Set with only `layer`.
    pub const fn single(layer: BoardLayer) -> Self {
        Self(1 << layer.0)
    }

    /// Copy of the set with `layer` added.
    pub const fn with(self, layer: BoardLayer) -> Self {
        Self(self.0 | (1 << layer.0))
    }

    /// Adds `layer`.
    pub fn insert(&mut self, layer: BoardLayer) {
        self.0 |= 1 << layer.0;
    }

    /// Removes `layer`.
    pub fn remove(&mut self, layer: BoardLayer) {
        self.0 &= !(1 << layer.0);
    }

    /// Whether `layer` is in the set.
    pub const fn contains(self, layer: BoardLayer) -> bool {
        self.0 & (1 << layer.0) != 0
    }

    /// Whether the collection is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any copper layer is in the set.
    pub const fn has_copper(self) -> bool {
        self.0 & Self::COPPER_MASK != 0
    }

    /// Copper layers of the set only.
    pub const fn copper(self) -> Self {
        Self(self.0 & Self::COPPER_MASK)
    }

    /// Layers in id order.
    pub fn iter(self) -> impl Iterator<Item = BoardLayer> {
        BoardLayer::all().filter(move |layer| self.contains(*layer))
    }
}

impl FromIterator<BoardLayer> for LayerSet {
    fn from_iter<I: IntoIterator<Item = BoardLayer>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, layer| set.with(layer))
    }
}

impl From<BoardLayer> for LayerSet {
    fn from(layer: BoardLayer) -> Self {
        Self::single(layer)
    }
}
