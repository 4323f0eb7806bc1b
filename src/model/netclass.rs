use crate::error::{ensure_non_negative, ClearanceError};

/// Name of the netclass every board carries.
pub const DEFAULT_NETCLASS_NAME: &str = "Default";

/// Index of a netclass inside a board's [`NetClasses`] list.
///
/// Handles are only meaningful for the board that issued them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NetClassId(pub(crate) usize);

impl NetClassId {
    /// Handle of the Default netclass.
    pub const DEFAULT: Self = Self(0);

    /// Position in the netclass list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Electrical defaults shared by a group of nets. All lengths in nanometres.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetClass {
    name: String,
    /// Copper clearance between items of this class.
    pub clearance_nm: i64,
    /// Default track width.
    pub track_width_nm: i64,
    /// Default via diameter.
    pub via_diameter_nm: i64,
    /// Default via drill.
    pub via_drill_nm: i64,
    /// Default microvia diameter.
    pub microvia_diameter_nm: i64,
    /// Default microvia drill.
    pub microvia_drill_nm: i64,
    /// Differential pair track width.
    pub diff_pair_width_nm: i64,
    /// Differential pair gap.
    pub diff_pair_gap_nm: i64,
}

impl NetClass {
    /// Starts a netclass named `name` with the Default values.
    pub fn builder(name: impl Into<String>) -> NetClassBuilder {
        NetClassBuilder::new(name)
    }

    /// The `Default` netclass with KiCad's stock values.
    pub fn default_class() -> Self {
        Self {
            name: DEFAULT_NETCLASS_NAME.to_string(),
            clearance_nm: 200_000,
            track_width_nm: 250_000,
            via_diameter_nm: 800_000,
            via_drill_nm: 400_000,
            microvia_diameter_nm: 300_000,
            microvia_drill_nm: 100_000,
            diff_pair_width_nm: 200_000,
            diff_pair_gap_nm: 250_000,
        }
    }

    /// Netclass name, unique per board.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the Default netclass.
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_NETCLASS_NAME
    }
}

/// Validating builder for [`NetClass`].
#[derive(Clone, Debug)]
pub struct NetClassBuilder {
    class: NetClass,
}

impl NetClassBuilder {
    /// Starts from the Default netclass values under a new name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: NetClass {
                name: name.into(),
                ..NetClass::default_class()
            },
        }
    }

    /// Copper clearance.
    pub fn clearance(mut self, value_nm: i64) -> Self {
        self.class.clearance_nm = value_nm;
        self
    }

    /// Track width.
    pub fn track_width(mut self, value_nm: i64) -> Self {
        self.class.track_width_nm = value_nm;
        self
    }

    /// Via diameter and drill.
    pub fn via(mut self, diameter_nm: i64, drill_nm: i64) -> Self {
        self.class.via_diameter_nm = diameter_nm;
        self.class.via_drill_nm = drill_nm;
        self
    }

    /// Microvia diameter and drill.
    pub fn microvia(mut self, diameter_nm: i64, drill_nm: i64) -> Self {
        self.class.microvia_diameter_nm = diameter_nm;
        self.class.microvia_drill_nm = drill_nm;
        self
    }

    /// Differential pair width and gap.
    pub fn diff_pair(mut self, width_nm: i64, gap_nm: i64) -> Self {
        self.class.diff_pair_width_nm = width_nm;
        self.class.diff_pair_gap_nm = gap_nm;
        self
    }

    /// Rejects an empty name and negative lengths.
    pub fn build(self) -> Result<NetClass, ClearanceError> {
        let class = self.class;
        if class.name.trim().is_empty() {
            return Err(ClearanceError::Config {
                reason: "netclass name must not be empty".to_string(),
            });
        }

        ensure_non_negative("clearance", class.clearance_nm)?;
        ensure_non_negative("track_width", class.track_width_nm)?;
        ensure_non_negative("via_diameter", class.via_diameter_nm)?;
        ensure_non_negative("via_drill", class.via_drill_nm)?;
        ensure_non_negative("microvia_diameter", class.microvia_diameter_nm)?;
        ensure_non_negative("microvia_drill", class.microvia_drill_nm)?;
        ensure_non_negative("diff_pair_width", class.diff_pair_width_nm)?;
        ensure_non_negative("diff_pair_gap", class.diff_pair_gap_nm)?;

        Ok(class)
    }
}

/// The netclasses of one board. Slot 0 always holds the Default netclass.
#[derive(Clone, Debug)]
pub struct NetClasses {
    classes: Vec<NetClass>,
}

impl NetClasses {
    /// List holding only the stock Default netclass.
    pub fn new() -> Self {
        Self::with_default(NetClass::default_class())
    }

    /// Uses `default` as the Default netclass, renaming it if needed.
    pub fn with_default(mut default: NetClass) -> Self {
        default.name = DEFAULT_NETCLASS_NAME.to_string();
        Self {
            classes: vec![default],
        }
    }

    /// Appends a netclass; names must be unique.
    pub fn add(&mut self, class: NetClass) -> Result<NetClassId, ClearanceError> {
        if self.find(class.name()).is_some() {
            return Err(ClearanceError::DuplicateNetClass {
                name: class.name().to_string(),
            });
        }

        self.classes.push(class);
        Ok(NetClassId(self.classes.len() - 1))
    }

    /// Looks up by code.
    pub fn find(&self, name: &str) -> Option<NetClassId> {
        self.classes
            .iter()
            .position(|class| class.name() == name)
            .map(NetClassId)
    }

    /// Looks up by handle.
    pub fn get(&self, id: NetClassId) -> Option<&NetClass> {
        self.classes.get(id.0)
    }

    /// The Default netclass.
    pub fn default_class(&self) -> &NetClass {
        &self.classes[NetClassId::DEFAULT.0]
    }

    /// Mutable Default netclass.
    pub fn default_class_mut(&mut self) -> &mut NetClass {
        &mut self.classes[NetClassId::DEFAULT.0]
    }

    /// Number of netclasses, Default included.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false: Default is never removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates with handles.
    pub fn iter(&self) -> impl Iterator<Item = (NetClassId, &NetClass)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(index, class)| (NetClassId(index), class))
    }
}

impl Default for NetClasses {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{NetClass, NetClassId, NetClasses, DEFAULT_NETCLASS_NAME};
    use crate::error::ClearanceError;

    #[test]
    fn netclasses_always_start_with_default() {
        let classes = NetClasses::new();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes.default_class().name(), DEFAULT_NETCLASS_NAME);
        assert_eq!(classes.find(DEFAULT_NETCLASS_NAME), Some(NetClassId::DEFAULT));
    }

    #[test]
    fn with_default_forces_default_name() {
        let custom = NetClass::builder("Signal")
            .clearance(123)
            .build()
            .expect("valid netclass");
        let classes = NetClasses::with_default(custom);
        assert!(classes.default_class().is_default());
        assert_eq!(classes.default_class().clearance_nm, 123);
    }

    #[test]
    fn add_rejects_duplicate_names() {
        let mut classes = NetClasses::new();
        let power = NetClass::builder("Power")
            .clearance(300_000)
            .build()
            .expect("valid netclass");
        let id = classes.add(power.clone()).expect("first add succeeds");
        assert_eq!(classes.get(id).map(NetClass::name), Some("Power"));

        let err = classes.add(power).expect_err("duplicate add fails");
        assert!(matches!(err, ClearanceError::DuplicateNetClass { name } if name == "Power"));
    }

    #[test]
    fn builder_rejects_negative_values_and_empty_names() {
        assert!(NetClass::builder("HV").clearance(-5).build().is_err());
        assert!(NetClass::builder("HV").via(-1, 100).build().is_err());
        assert!(NetClass::builder("  ").build().is_err());
    }

    #[test]
    fn builder_inherits_default_values() {
        let class = NetClass::builder("USB")
            .diff_pair(90_000, 120_000)
            .build()
            .expect("valid netclass");
        let default = NetClass::default_class();
        assert_eq!(class.clearance_nm, default.clearance_nm);
        assert_eq!(class.track_width_nm, default.track_width_nm);
        assert_eq!(class.diff_pair_width_nm, 90_000);
        assert_eq!(class.diff_pair_gap_nm, 120_000);
    }
}
