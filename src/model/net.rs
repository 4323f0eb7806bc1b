use std::collections::BTreeMap;

use crate::error::ClearanceError;
use crate::model::netclass::NetClassId;

/// Net code of the unconnected net every board carries.
pub const UNCONNECTED: i32 = 0;
/// Net code reported for items that have no net record at all.
pub const ORPHANED: i32 = -1;
/// Request code that detaches an item from any net.
pub const FORCE_ORPHANED: i32 = -2;

/// One electrical net.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetInfo {
    code: i32,
    name: String,
    netclass: Option<NetClassId>,
}

impl NetInfo {
    /// Net `code` named `name`, without a netclass.
    pub fn new(code: i32, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            netclass: None,
        }
    }

    /// Net code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Net name; empty for the unconnected net.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw netclass handle. May be stale for the unconnected net; use
    /// [`crate::Board::effective_netclass`] for rule decisions.
    pub fn netclass(&self) -> Option<NetClassId> {
        self.netclass
    }
}

/// Non-owning handle from an item to a net in its board's registry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum NetRef {
    /// The shared orphaned record.
    #[default]
    Orphaned,
    /// A net of the board's registry, by code.
    Code(i32),
}

/// The nets of one board, plus the shared orphaned record.
#[derive(Clone, Debug)]
pub struct NetRegistry {
    nets: BTreeMap<i32, NetInfo>,
    orphaned: NetInfo,
}

impl NetRegistry {
    /// Registry holding only the unconnected net.
    pub fn new() -> Self {
        let mut nets = BTreeMap::new();
        nets.insert(UNCONNECTED, NetInfo::new(UNCONNECTED, ""));

        Self {
            nets,
            orphaned: NetInfo::new(UNCONNECTED, ""),
        }
    }

    /// Registers `net`. Codes must be unique and non-negative.
    pub fn add(&mut self, net: NetInfo) -> Result<NetRef, ClearanceError> {
        if net.code < 0 {
            return Err(ClearanceError::Config {
                reason: format!("net `{}` has negative code {}", net.name, net.code),
            });
        }

        if self.nets.contains_key(&net.code) {
            return Err(ClearanceError::DuplicateNet { code: net.code });
        }

        let code = net.code;
        self.nets.insert(code, net);
        Ok(NetRef::Code(code))
    }

    /// Looks up by code.
    pub fn find(&self, code: i32) -> Option<&NetInfo> {
        self.nets.get(&code)
    }

    /// Looks up by net name.
    pub fn find_by_name(&self, name: &str) -> Option<&NetInfo> {
        self.nets.values().find(|net| net.name == name)
    }

    /// Resolves a handle. `None` means the handle was issued by another board.
    pub fn resolve(&self, net: NetRef) -> Option<&NetInfo> {
        match net {
            NetRef::Orphaned => Some(&self.orphaned),
            NetRef::Code(code) => self.nets.get(&code),
        }
    }

    /// Record shared by every orphaned item: code 0, no name, no netclass.
    pub fn orphaned(&self) -> &NetInfo {
        &self.orphaned
    }

    /// Sets or clears the netclass of net `code`.
    pub fn set_netclass(
        &mut self,
        code: i32,
        netclass: Option<NetClassId>,
    ) -> Result<(), ClearanceError> {
        let net = self
            .nets
            .get_mut(&code)
            .ok_or(ClearanceError::UnknownNet { code })?;
        net.netclass = netclass;
        Ok(())
    }

    /// Number of nets, including the unconnected net.
    pub fn len(&self) -> usize {
        self.nets.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// Nets in code order.
    pub fn iter(&self) -> impl Iterator<Item = &NetInfo> {
        self.nets.values()
    }
}

impl Default for NetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{NetInfo, NetRef, NetRegistry, UNCONNECTED};
    use crate::error::ClearanceError;
    use crate::model::netclass::NetClassId;

    #[test]
    fn registry_starts_with_unconnected_net() {
        let registry = NetRegistry::new();
        assert_eq!(registry.len(), 1);
        let unconnected = registry.find(UNCONNECTED).expect("net 0 always exists");
        assert_eq!(unconnected.name(), "");
    }

    #[test]
    fn orphaned_handle_resolves_to_shared_record() {
        let registry = NetRegistry::new();
        let orphaned = registry
            .resolve(NetRef::Orphaned)
            .expect("orphaned record always resolves");
        assert!(std::ptr::eq(orphaned, registry.orphaned()));
        assert_eq!(orphaned.code(), UNCONNECTED);
        assert!(orphaned.netclass().is_none());
    }

    #[test]
    fn add_rejects_duplicates_and_negative_codes() {
        let mut registry = NetRegistry::new();
        let gnd = registry.add(NetInfo::new(1, "GND")).expect("new net");
        assert_eq!(gnd, NetRef::Code(1));

        assert!(matches!(
            registry.add(NetInfo::new(1, "VCC")),
            Err(ClearanceError::DuplicateNet { code: 1 })
        ));
        assert!(matches!(
            registry.add(NetInfo::new(-3, "BAD")),
            Err(ClearanceError::Config { .. })
        ));
    }

    #[test]
    fn unknown_codes_do_not_resolve() {
        let registry = NetRegistry::new();
        assert!(registry.resolve(NetRef::Code(42)).is_none());
        assert!(registry.find_by_name("GND").is_none());
    }

    #[test]
    fn set_netclass_updates_existing_nets_only() {
        let mut registry = NetRegistry::new();
        registry.add(NetInfo::new(7, "CLK")).expect("new net");
        registry
            .set_netclass(7, Some(NetClassId(2)))
            .expect("net 7 exists");
        assert_eq!(
            registry.find_by_name("CLK").and_then(NetInfo::netclass),
            Some(NetClassId(2))
        );
        assert!(matches!(
            registry.set_netclass(8, None),
            Err(ClearanceError::UnknownNet { code: 8 })
        ));
    }
}
