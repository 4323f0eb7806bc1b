use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ClearanceError;
use crate::log::{trace_event, warn_event};
use crate::model::item::{BoardItem, ConnectedItem};
use crate::model::layer::BoardLayer;
use crate::model::net::{NetInfo, NetRef, NetRegistry};
use crate::model::netclass::{NetClass, NetClassId, NetClasses};
use crate::rules::{NetContext, RuleMatch, RuleSet};
use crate::settings::BoardDesignSettings;

static NEXT_BOARD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Board`], recorded on the items attached to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BoardId(u64);

impl BoardId {
    fn next() -> Self {
        Self(NEXT_BOARD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Constraint data of one open board: design settings, netclasses, nets and
/// design rules.
///
/// Items are owned by the caller and reference the board through
/// [`ConnectedItem::board`]; every query here is a pure read.
#[derive(Debug)]
pub struct Board {
    id: BoardId,
    settings: BoardDesignSettings,
    netclasses: NetClasses,
    nets: NetRegistry,
    rules: RuleSet,
}

impl Board {
    /// Empty board with only the Default netclass and net 0.
    pub fn new(settings: BoardDesignSettings) -> Self {
        Self {
            id: BoardId::next(),
            settings,
            netclasses: NetClasses::new(),
            nets: NetRegistry::new(),
            rules: RuleSet::new(),
        }
    }

    /// Identity recorded on attached items.
    pub fn id(&self) -> BoardId {
        self.id
    }

    /// Board-wide design settings.
    pub fn design_settings(&self) -> &BoardDesignSettings {
        &self.settings
    }

    /// Mutable board-wide design settings.
    pub fn design_settings_mut(&mut self) -> &mut BoardDesignSettings {
        &mut self.settings
    }

    /// Netclasses defined on this board.
    pub fn netclasses(&self) -> &NetClasses {
        &self.netclasses
    }

    /// Mutable netclass list.
    pub fn netclasses_mut(&mut self) -> &mut NetClasses {
        &mut self.netclasses
    }

    /// Net registry.
    pub fn nets(&self) -> &NetRegistry {
        &self.nets
    }

    /// Design rules, in match order.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Mutable design rules.
    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// Adds a netclass; names must be unique.
    pub fn add_netclass(&mut self, class: NetClass) -> Result<NetClassId, ClearanceError> {
        self.netclasses.add(class)
    }

    /// Registers a net, optionally placing it in an existing netclass.
    pub fn add_net(
        &mut self,
        code: i32,
        name: impl Into<String>,
        netclass: Option<&str>,
    ) -> Result<NetRef, ClearanceError> {
        let class_id = netclass.map(|name| self.netclass_id(name)).transpose()?;
        let net = self.nets.add(NetInfo::new(code, name))?;
        self.nets.set_netclass(code, class_id)?;
        Ok(net)
    }

    /// Moves an existing net into a netclass (`None` clears the assignment).
    pub fn assign_netclass(
        &mut self,
        code: i32,
        netclass: Option<&str>,
    ) -> Result<(), ClearanceError> {
        let class_id = netclass.map(|name| self.netclass_id(name)).transpose()?;
        self.nets.set_netclass(code, class_id)
    }

    fn netclass_id(&self, name: &str) -> Result<NetClassId, ClearanceError> {
        self.netclasses
            .find(name)
            .ok_or_else(|| ClearanceError::UnknownNetClass {
                name: name.to_string(),
            })
    }

    /// Links `item` to this board. An item coming from another board loses
    /// its net, since net handles only resolve in the registry that issued them.
    pub fn attach(&self, item: &mut ConnectedItem) {
        if item.board != Some(self.id) {
            item.set_net(NetRef::Orphaned);
        }
        item.board = Some(self.id);
    }

    /// Unlinks `item` from whatever board it was on and orphans it.
    pub fn detach(item: &mut ConnectedItem) {
        item.board = None;
        item.set_net(NetRef::Orphaned);
    }

    /// Whether `item` is attached to this board.
    pub fn owns(&self, item: &ConnectedItem) -> bool {
        item.board == Some(self.id)
    }

    /// Assigns `code` to `item`.
    ///
    /// Items off copper, items not on this board and negative codes
    /// ([`crate::ORPHANED`], [`crate::FORCE_ORPHANED`]) get the orphaned net.
    /// A non-negative code must exist in the registry; otherwise the item is
    /// left unchanged.
    pub fn assign_net(&self, item: &mut ConnectedItem, code: i32) -> Result<(), ClearanceError> {
        if !item.is_on_copper_layer() || code < 0 || !self.owns(item) {
            item.set_net(NetRef::Orphaned);
            return Ok(());
        }

        if self.nets.find(code).is_none() {
            return Err(ClearanceError::UnknownNet { code });
        }

        item.set_net(NetRef::Code(code));
        Ok(())
    }

    /// Net record behind `item`.
    ///
    /// Items of other boards and items without copper read as orphaned.
    pub fn net_info(&self, item: &ConnectedItem) -> &NetInfo {
        if !self.owns(item) || !item.is_on_copper_layer() {
            return self.nets.orphaned();
        }

        match self.nets.resolve(item.net()) {
            Some(net) => net,
            None => {
                debug_assert!(false, "net handle {:?} is not in this board", item.net());
                warn_event!(net = ?item.net(), "item references an unknown net; treating as orphaned");
                self.nets.orphaned()
            }
        }
    }

    fn class_by_id(&self, id: NetClassId) -> &NetClass {
        match self.netclasses.get(id) {
            Some(class) => class,
            None => {
                debug_assert!(false, "netclass handle {id:?} is not in this board");
                warn_event!(netclass = id.index(), "net references an unknown netclass; using Default");
                self.netclasses.default_class()
            }
        }
    }

    /// Netclass of the item's net, or Default when the net has none.
    ///
    /// Unlike [`Board::effective_netclass`] this honours a netclass stored on
    /// the unconnected net. `None` when the item is not on this board.
    pub fn netclass(&self, item: &ConnectedItem) -> Option<&NetClass> {
        if !self.owns(item) {
            return None;
        }

        let class = match self.net_info(item).netclass() {
            Some(id) => self.class_by_id(id),
            None => self.netclasses.default_class(),
        };

        Some(class)
    }

    /// Netclass that governs `item` for rule and clearance decisions.
    ///
    /// Net code 0 always maps to Default. `None` only when the item is not on
    /// this board.
    pub fn effective_netclass(&self, item: &ConnectedItem) -> Option<&NetClass> {
        if !self.owns(item) {
            return None;
        }

        if self.net_info(item).code() == 0 {
            return Some(self.netclasses.default_class());
        }

        self.netclass(item)
    }

    /// Name of [`Board::netclass`].
    pub fn netclass_name(&self, item: &ConnectedItem) -> Option<&str> {
        self.netclass(item).map(NetClass::name)
    }

    /// Name of the item's net; empty for orphaned items.
    pub fn net_name(&self, item: &ConnectedItem) -> &str {
        self.net_info(item).name()
    }

    /// Code of the item's net; 0 for orphaned items.
    pub fn net_code(&self, item: &ConnectedItem) -> i32 {
        self.net_info(item).code()
    }

    /// First design rule with a clearance constraint matching `a`, `b` on `layer`.
    pub fn find_clearance_rule(
        &self,
        a: &ConnectedItem,
        b: Option<BoardItem<'_>>,
        layer: BoardLayer,
    ) -> Option<RuleMatch<'_>> {
        let found = self.rules.find_clearance_rule(self, a, b, layer);
        if found.is_none() {
            trace_event!(%layer, "no clearance rule matched");
        }

        found
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardDesignSettings::default())
    }
}

impl NetContext for Board {
    fn net_code(&self, item: &ConnectedItem) -> i32 {
        Board::net_code(self, item)
    }

    fn net_name(&self, item: &ConnectedItem) -> Option<&str> {
        Some(Board::net_name(self, item))
    }

    fn effective_netclass_name(&self, item: &ConnectedItem) -> Option<&str> {
        self.effective_netclass(item).map(NetClass::name)
    }
}
