/// Connected and graphic board items.
pub mod item;
/// Board layer identifiers and layer sets.
pub mod layer;
/// Nets and the per-board net registry.
pub mod net;
/// Netclasses and their per-board list.
pub mod netclass;
