use crate::error::{ensure_non_negative, ClearanceError};

/// Board-wide scalar defaults. All lengths in nanometres.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoardDesignSettings {
    /// Floor for every copper clearance.
    pub min_clearance_nm: i64,
    /// Copper to `Edge.Cuts` clearance.
    pub copper_edge_clearance_nm: i64,
    /// Default track width.
    pub track_width_nm: i64,
    /// Default via diameter.
    pub via_diameter_nm: i64,
    /// Default via drill.
    pub via_drill_nm: i64,
}

impl BoardDesignSettings {
    /// Starts a builder from the defaults.
    pub fn builder() -> DesignSettingsBuilder {
        DesignSettingsBuilder::new()
    }
}

impl Default for BoardDesignSettings {
    fn default() -> Self {
        Self {
            min_clearance_nm: 0,
            copper_edge_clearance_nm: 10_000,
            track_width_nm: 250_000,
            via_diameter_nm: 800_000,
            via_drill_nm: 400_000,
        }
    }
}

/// Validating builder for [`BoardDesignSettings`].
#[derive(Clone, Debug)]
pub struct DesignSettingsBuilder {
    settings: BoardDesignSettings,
}

impl DesignSettingsBuilder {
    /// Starts from [`BoardDesignSettings::default`].
    pub fn new() -> Self {
        Self {
            settings: BoardDesignSettings::default(),
        }
    }

    /// Board minimum clearance.
    pub fn min_clearance(mut self, value_nm: i64) -> Self {
        self.settings.min_clearance_nm = value_nm;
        self
    }

    /// Copper to board edge clearance.
    pub fn copper_edge_clearance(mut self, value_nm: i64) -> Self {
        self.settings.copper_edge_clearance_nm = value_nm;
        self
    }

    /// Track width.
    pub fn track_width(mut self, value_nm: i64) -> Self {
        self.settings.track_width_nm = value_nm;
        self
    }

    /// Via diameter and drill.
    pub fn via(mut self, diameter_nm: i64, drill_nm: i64) -> Self {
        self.settings.via_diameter_nm = diameter_nm;
        self.settings.via_drill_nm = drill_nm;
        self
    }

    /// Rejects negative lengths and a drill wider than the diameter.
    pub fn build(self) -> Result<BoardDesignSettings, ClearanceError> {
        let settings = self.settings;
        ensure_non_negative("min_clearance", settings.min_clearance_nm)?;
        ensure_non_negative("copper_edge_clearance", settings.copper_edge_clearance_nm)?;
        ensure_non_negative("track_width", settings.track_width_nm)?;
        ensure_non_negative("via_diameter", settings.via_diameter_nm)?;
        ensure_non_negative("via_drill", settings.via_drill_nm)?;

        if settings.via_drill_nm > settings.via_diameter_nm {
            return Err(ClearanceError::Config {
                reason: format!(
                    "via drill {} nm exceeds via diameter {} nm",
                    settings.via_drill_nm, settings.via_diameter_nm
                ),
            });
        }

        Ok(settings)
    }
}

impl Default for DesignSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::BoardDesignSettings;
    use crate::error::ClearanceError;

    #[test]
    fn builder_applies_overrides() {
        let settings = BoardDesignSettings::builder()
            .min_clearance(150)
            .copper_edge_clearance(250)
            .build()
            .expect("valid settings");
        assert_eq!(settings.min_clearance_nm, 150);
        assert_eq!(settings.copper_edge_clearance_nm, 250);
        assert_eq!(
            settings.track_width_nm,
            BoardDesignSettings::default().track_width_nm
        );
    }

    #[test]
    fn builder_rejects_negative_clearance() {
        let result = BoardDesignSettings::builder().min_clearance(-1).build();
        assert!(matches!(result, Err(ClearanceError::Config { .. })));
    }

    #[test]
    fn builder_rejects_drill_larger_than_via() {
        let result = BoardDesignSettings::builder().via(300_000, 400_000).build();
        let err = result.expect_err("oversized drill should be rejected");
        assert!(err.to_string().contains("via drill"));
    }
}
