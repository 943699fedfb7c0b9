use thiserror::Error;

/// Settings that shape a locator's replies: search radius, result cap,
/// segment budget, and header wording.
///
/// Construct through [`LocateConfig::builder`] to get validation, or rely on
/// [`LocateConfig::default`] which is always valid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocateConfig {
    /// Search radius around each query postal code, in statute miles.
    pub radius_miles: f64,
    /// Maximum number of resources reported per query postal code.
    pub max_per_query: usize,
    /// Character budget per reply segment before a new segment is started.
    pub segment_budget: usize,
    /// What the reply header calls the records, e.g. "shelters".
    pub resource_kind: String,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            radius_miles: 20.0,
            max_per_query: 4,
            segment_budget: 800,
            resource_kind: "shelters".to_string(),
        }
    }
}

impl LocateConfig {
    /// Create a builder with the default configuration.
    pub fn builder() -> LocateConfigBuilder {
        LocateConfigBuilder::new()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Search radius in miles must be non-negative and finite, got {0}")]
    InvalidRadius(f64),
    #[error("Maximum results per query must be at least 1")]
    ZeroMaxPerQuery,
    #[error("Segment budget must be at least 1 character")]
    ZeroSegmentBudget,
    #[error("Resource kind must not be blank")]
    BlankResourceKind,
}

/// Builder for creating locate configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct LocateConfigBuilder {
    config: LocateConfig,
}

impl LocateConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: LocateConfig::default(),
        }
    }

    /// Create a builder tuned for dense areas (tighter radius, shorter replies)
    pub fn nearby() -> Self {
        let mut builder = Self::new();
        builder.config.radius_miles = 10.0;
        builder.config.max_per_query = 3;
        builder
    }

    /// Create a builder tuned for sparse rural coverage (wider radius)
    pub fn wide_area() -> Self {
        let mut builder = Self::new();
        builder.config.radius_miles = 50.0;
        builder.config.max_per_query = 5;
        builder
    }

    /// Set the search radius in miles around each query postal code
    pub fn radius_miles(mut self, miles: f64) -> Self {
        self.config.radius_miles = miles;
        self
    }

    /// Set the maximum number of resources reported per query postal code
    pub fn max_per_query(mut self, max: usize) -> Self {
        self.config.max_per_query = max;
        self
    }

    /// Set the per-segment character budget
    pub fn segment_budget(mut self, chars: usize) -> Self {
        self.config.segment_budget = chars;
        self
    }

    /// Set the noun used in reply headers, e.g. "shelters" or "water stations"
    pub fn resource_kind(mut self, kind: impl Into<String>) -> Self {
        self.config.resource_kind = kind.into();
        self
    }

    /// Validate and build the final configuration
    pub fn build(self) -> Result<LocateConfig, ConfigError> {
        let config = self.config;
        if !config.radius_miles.is_finite() || config.radius_miles < 0.0 {
            return Err(ConfigError::InvalidRadius(config.radius_miles));
        }
        if config.max_per_query == 0 {
            return Err(ConfigError::ZeroMaxPerQuery);
        }
        if config.segment_budget == 0 {
            return Err(ConfigError::ZeroSegmentBudget);
        }
        if config.resource_kind.trim().is_empty() {
            return Err(ConfigError::BlankResourceKind);
        }
        Ok(config)
    }
}
