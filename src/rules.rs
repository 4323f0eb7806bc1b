//! Design rules and first-match constraint lookup.
//!
//! Rules are stored in priority order as compiled by the caller; the first rule
//! whose layer restriction, condition and constraint kind all match wins. No
//! aggregation happens across rules.

use crate::log::trace_event;
use crate::model::item::{BoardItem, ConnectedItem, ConnectedKind};
use crate::model::layer::{BoardLayer, LayerSet};

/// What a constraint limits.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConstraintKind {
    /// Copper to copper.
    Clearance,
    /// Copper to board edge.
    EdgeClearance,
    /// Hole to copper.
    HoleClearance,
    /// Track width.
    TrackWidth,
    /// Via diameter.
    ViaDiameter,
    /// Drill size.
    HoleSize,
    /// Differential pair gap.
    DiffPairGap,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Clearance => "clearance",
            Self::EdgeClearance => "edge_clearance",
            Self::HoleClearance => "hole_clearance",
            Self::TrackWidth => "track_width",
            Self::ViaDiameter => "via_diameter",
            Self::HoleSize => "hole_size",
            Self::DiffPairGap => "diff_pair_gap",
        };

        write!(f, "{value}")
    }
}

/// Optional min/opt/max bounds, in nanometres.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MinOptMax {
    /// Minimum bound.
    pub min: Option<i64>,
    /// Preferred value.
    pub opt: Option<i64>,
    /// Maximum bound.
    pub max: Option<i64>,
}

impl MinOptMax {
    /// Only a minimum bound.
    pub fn min(value_nm: i64) -> Self {
        Self {
            min: Some(value_nm),
            ..Self::default()
        }
    }
}

/// One bound set of a design rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Constraint {
    /// What is limited.
    pub kind: ConstraintKind,
    /// Bounds.
    pub value: MinOptMax,
}

impl Constraint {
    /// Constraint of `kind` with bounds `value`.
    pub fn new(kind: ConstraintKind, value: MinOptMax) -> Self {
        Self { kind, value }
    }

    /// Clearance constraint with minimum `min_nm`.
    pub fn clearance(min_nm: i64) -> Self {
        Self::new(ConstraintKind::Clearance, MinOptMax::min(min_nm))
    }
}

/// Which item of the (A, B) pair a condition inspects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    /// The item being resolved.
    A,
    /// The optional second item.
    B,
    /// Either item.
    Either,
}

/// Pre-compiled rule selector over an item pair.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// Matches every pair.
    Always,
    /// Effective netclass name.
    NetClass {
        /// Item inspected.
        side: Side,
        /// Netclass name.
        name: String,
    },
    /// Net name.
    Net {
        /// Item inspected.
        side: Side,
        /// Net name.
        name: String,
    },
    /// Connected item kind. Graphic items never match.
    Kind {
        /// Item inspected.
        side: Side,
        /// Required kind.
        kind: ConnectedKind,
    },
    /// Item occupies `layer`.
    OnLayer {
        /// Item inspected.
        side: Side,
        /// Required layer.
        layer: BoardLayer,
    },
    /// Both items carry the same real (non-zero) net.
    SameNet,
    /// Every sub-condition matches.
    All(Vec<Condition>),
    /// At least one sub-condition matches.
    Any(Vec<Condition>),
    /// Negation.
    Not(Box<Condition>),
}

/// Net lookups a condition needs. Implemented by [`crate::Board`].
pub trait NetContext {
    /// Net code; 0 for orphaned items and items of other boards.
    fn net_code(&self, item: &ConnectedItem) -> i32;

    /// Net name, if the net has one.
    fn net_name(&self, item: &ConnectedItem) -> Option<&str>;

    /// Name of the effective netclass.
    fn effective_netclass_name(&self, item: &ConnectedItem) -> Option<&str>;
}

impl Condition {
    /// Effective netclass of `side` is `name`.
    pub fn netclass(side: Side, name: impl Into<String>) -> Self {
        Self::NetClass {
            side,
            name: name.into(),
        }
    }

    /// Net of `side` is `name`.
    pub fn net(side: Side, name: impl Into<String>) -> Self {
        Self::Net {
            side,
            name: name.into(),
        }
    }

    /// Evaluates the condition for item `a` and optional item `b`.
    pub fn matches<C: NetContext + ?Sized>(
        &self,
        ctx: &C,
        a: &ConnectedItem,
        b: Option<BoardItem<'_>>,
    ) -> bool {
        let first = BoardItem::Connected(a);

        match self {
            Self::Always => true,
            Self::NetClass { side, name } => on_side(*side, first, b, |item| {
                item.as_connected()
                    .and_then(|item| ctx.effective_netclass_name(item))
                    == Some(name.as_str())
            }),
            Self::Net { side, name } => on_side(*side, first, b, |item| {
                item.as_connected()
                    .and_then(|item| ctx.net_name(item))
                    == Some(name.as_str())
            }),
            Self::Kind { side, kind } => on_side(*side, first, b, |item| {
                item.as_connected().map(ConnectedItem::kind) == Some(*kind)
            }),
            Self::OnLayer { side, layer } => on_side(*side, first, b, |item| match item {
                BoardItem::Connected(item) => item.layers().contains(*layer),
                BoardItem::Graphic(item) => item.layer() == *layer,
            }),
            Self::SameNet => {
                let Some(second) = b.and_then(BoardItem::as_connected) else {
                    return false;
                };
                let code = ctx.net_code(a);
                code > 0 && code == ctx.net_code(second)
            }
            Self::All(conditions) => conditions
                .iter()
                .all(|condition| condition.matches(ctx, a, b)),
            Self::Any(conditions) => conditions
                .iter()
                .any(|condition| condition.matches(ctx, a, b)),
            Self::Not(condition) => !condition.matches(ctx, a, b),
        }
    }
}

fn on_side<'a>(
    side: Side,
    a: BoardItem<'a>,
    b: Option<BoardItem<'a>>,
    predicate: impl Fn(BoardItem<'a>) -> bool,
) -> bool {
    match side {
        Side::A => predicate(a),
        Side::B => b.is_some_and(&predicate),
        Side::Either => predicate(a) || b.is_some_and(&predicate),
    }
}

/// A named, optionally layer-restricted rule with its constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct DesignRule {
    name: String,
    layers: Option<LayerSet>,
    condition: Condition,
    constraints: Vec<Constraint>,
}

impl DesignRule {
    /// Rule `name` applying on every layer.
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            layers: None,
            condition,
            constraints: Vec::new(),
        }
    }

    /// Restricts the rule to queries on these layers.
    pub fn on_layers(mut self, layers: LayerSet) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Adds a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Rule name, used in clearance labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selector.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// All constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// First constraint of `kind`.
    pub fn constraint(&self, kind: ConstraintKind) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|constraint| constraint.kind == kind)
    }

    /// Whether the rule is active on `layer`.
    pub fn applies_to_layer(&self, layer: BoardLayer) -> bool {
        self.layers.map_or(true, |layers| layers.contains(layer))
    }
}

/// A matched rule and the constraint it contributed.
#[derive(Clone, Copy, Debug)]
pub struct RuleMatch<'r> {
    rule: &'r DesignRule,
    constraint: &'r Constraint,
}

impl<'r> RuleMatch<'r> {
    /// The matched rule.
    pub fn rule(&self) -> &'r DesignRule {
        self.rule
    }

    /// The matched constraint.
    pub fn constraint(&self) -> &'r Constraint {
        self.constraint
    }

    /// Name of the matched rule.
    pub fn rule_name(&self) -> &'r str {
        self.rule.name()
    }

    /// Minimum bound of the constraint; an unset bound reads as zero.
    pub fn value_nm(&self) -> i64 {
        self.constraint.value.min.unwrap_or(0)
    }

    /// Provenance label, e.g. `'HV spacing' rule`.
    pub fn label(&self) -> RuleLabel<'r> {
        RuleLabel(self.rule.name())
    }
}

/// Display form of a rule source: `'name' rule`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RuleLabel<'r>(&'r str);

impl std::fmt::Display for RuleLabel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' rule", self.0)
    }
}

/// Ordered design rules of one board.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<DesignRule>,
}

impl RuleSet {
    /// Empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule at the lowest priority.
    pub fn push(&mut self, rule: DesignRule) {
        self.rules.push(rule);
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in match order.
    pub fn iter(&self) -> impl Iterator<Item = &DesignRule> {
        self.rules.iter()
    }

    /// First rule on `layer` whose condition matches and which has a `kind` constraint.
    pub fn find_constraint<C: NetContext + ?Sized>(
        &self,
        ctx: &C,
        kind: ConstraintKind,
        a: &ConnectedItem,
        b: Option<BoardItem<'_>>,
        layer: BoardLayer,
    ) -> Option<RuleMatch<'_>> {
        self.rules.iter().find_map(|rule| {
            if !rule.applies_to_layer(layer) {
                return None;
            }

            let constraint = rule.constraint(kind)?;
            if !rule.condition.matches(ctx, a, b) {
                return None;
            }

            trace_event!(rule = rule.name(), %kind, %layer, "design rule matched");
            Some(RuleMatch { rule, constraint })
        })
    }

    /// [`RuleSet::find_constraint`] for [`ConstraintKind::Clearance`].
    pub fn find_clearance_rule<C: NetContext + ?Sized>(
        &self,
        ctx: &C,
        a: &ConnectedItem,
        b: Option<BoardItem<'_>>,
        layer: BoardLayer,
    ) -> Option<RuleMatch<'_>> {
        self.find_constraint(ctx, ConstraintKind::Clearance, a, b, layer)
    }
}

impl FromIterator<DesignRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = DesignRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Condition, Constraint, ConstraintKind, DesignRule, MinOptMax, NetContext, RuleSet, Side,
    };
    use crate::model::item::{BoardItem, ConnectedItem, ConnectedKind, GraphicItem};
    use crate::model::layer::{BoardLayer, LayerSet};

    /// Net names are taken from the item name; netclass is `HV` for names
    /// starting with `HV`.
    struct NamedNets;

    impl NetContext for NamedNets {
        fn net_code(&self, item: &ConnectedItem) -> i32 {
            match item.name() {
                Some("GND") => 1,
                Some("HV1") => 2,
                _ => 0,
            }
        }

        fn net_name(&self, item: &ConnectedItem) -> Option<&str> {
            match item.name() {
                Some("GND") => Some("GND"),
                Some("HV1") => Some("HV1"),
                _ => None,
            }
        }

        fn effective_netclass_name(&self, item: &ConnectedItem) -> Option<&str> {
            match item.name() {
                Some(name) if name.starts_with("HV") => Some("HV"),
                _ => Some("Default"),
            }
        }
    }

    fn track(name: &str) -> ConnectedItem {
        ConnectedItem::track(BoardLayer::F_CU).with_name(name)
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules: RuleSet = [
            DesignRule::new("hv", Condition::netclass(Side::Either, "HV"))
                .with_constraint(Constraint::clearance(500)),
            DesignRule::new("catch-all", Condition::Always)
                .with_constraint(Constraint::clearance(50)),
        ]
        .into_iter()
        .collect();

        let hv = track("HV1");
        let gnd = track("GND");

        let found = rules
            .find_clearance_rule(&NamedNets, &gnd, Some((&hv).into()), BoardLayer::F_CU)
            .expect("hv rule matches via side B");
        assert_eq!(found.rule_name(), "hv");
        assert_eq!(found.value_nm(), 500);
        assert_eq!(found.label().to_string(), "'hv' rule");

        let found = rules
            .find_clearance_rule(&NamedNets, &gnd, None, BoardLayer::F_CU)
            .expect("catch-all matches");
        assert_eq!(found.rule_name(), "catch-all");
    }

    #[test]
    fn rules_without_clearance_constraint_are_skipped() {
        let rules: RuleSet = [
            DesignRule::new("width", Condition::Always).with_constraint(Constraint::new(
                ConstraintKind::TrackWidth,
                MinOptMax::min(200),
            )),
            DesignRule::new("spacing", Condition::Always)
                .with_constraint(Constraint::clearance(120)),
        ]
        .into_iter()
        .collect();

        let item = track("GND");
        let clearance = rules
            .find_clearance_rule(&NamedNets, &item, None, BoardLayer::F_CU)
            .expect("spacing rule matches");
        assert_eq!(clearance.rule_name(), "spacing");

        let width = rules
            .find_constraint(
                &NamedNets,
                ConstraintKind::TrackWidth,
                &item,
                None,
                BoardLayer::F_CU,
            )
            .expect("width rule matches");
        assert_eq!(width.value_nm(), 200);
    }

    #[test]
    fn layer_restricted_rules_only_match_their_layers() {
        let mut rules = RuleSet::new();
        rules.push(
            DesignRule::new("outer", Condition::Always)
                .on_layers(LayerSet::external_copper())
                .with_constraint(Constraint::clearance(300)),
        );

        let item = track("GND");
        assert!(rules
            .find_clearance_rule(&NamedNets, &item, None, BoardLayer::B_CU)
            .is_some());
        let inner = BoardLayer::inner_cu(2).expect("valid inner layer");
        assert!(rules
            .find_clearance_rule(&NamedNets, &item, None, inner)
            .is_none());
    }

    #[test]
    fn side_b_conditions_fail_without_second_item() {
        let condition = Condition::net(Side::B, "GND");
        let item = track("GND");
        assert!(!condition.matches(&NamedNets, &item, None));
        assert!(Condition::net(Side::A, "GND").matches(&NamedNets, &item, None));
    }

    #[test]
    fn graphic_second_items_only_satisfy_layer_conditions() {
        let edge = GraphicItem::edge_cut();
        let item = track("GND");
        let second = Some(BoardItem::from(&edge));

        let on_edge = Condition::OnLayer {
            side: Side::B,
            layer: BoardLayer::EDGE_CUTS,
        };
        assert!(on_edge.matches(&NamedNets, &item, second));

        let kind = Condition::Kind {
            side: Side::B,
            kind: ConnectedKind::Track,
        };
        assert!(!kind.matches(&NamedNets, &item, second));
        assert!(!Condition::SameNet.matches(&NamedNets, &item, second));
    }

    #[test]
    fn compound_conditions_combine() {
        let gnd = track("GND");
        let other = track("GND");
        let hv = track("HV1");

        let same_gnd = Condition::All(vec![
            Condition::SameNet,
            Condition::net(Side::A, "GND"),
        ]);
        assert!(same_gnd.matches(&NamedNets, &gnd, Some((&other).into())));
        assert!(!same_gnd.matches(&NamedNets, &gnd, Some((&hv).into())));

        let not_hv = Condition::Not(Box::new(Condition::netclass(Side::Either, "HV")));
        assert!(not_hv.matches(&NamedNets, &gnd, Some((&other).into())));
        assert!(!not_hv.matches(&NamedNets, &gnd, Some((&hv).into())));

        let any = Condition::Any(vec![
            Condition::net(Side::A, "nope"),
            Condition::Kind {
                side: Side::A,
                kind: ConnectedKind::Track,
            },
        ]);
        assert!(any.matches(&NamedNets, &gnd, None));
    }

    #[test]
    fn unset_minimum_reads_as_zero() {
        let rules: RuleSet = [DesignRule::new("max-only", Condition::Always).with_constraint(
            Constraint::new(
                ConstraintKind::Clearance,
                MinOptMax {
                    max: Some(900),
                    ..MinOptMax::default()
                },
            ),
        )]
        .into_iter()
        .collect();

        let item = track("GND");
        let found = rules
            .find_clearance_rule(&NamedNets, &item, None, BoardLayer::F_CU)
            .expect("rule matches");
        assert_eq!(found.value_nm(), 0);
    }
}
