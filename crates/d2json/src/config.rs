//! Configuration types for d2json conversion.
//!
//! All types implement [`serde::Deserialize`] and every section is optional,
//! so an empty TOML document yields [`AppConfig::default`].
//!
//! - [`AppConfig`] - Top-level configuration combining layout and output settings.
//! - [`LayoutConfig`] - Selects the external [`LayoutEngine`] and its spacing.
//! - [`OutputConfig`] - Controls how the JSON document is written.
//!
//! # Example
//!
//! ```
//! # use d2json::config::{AppConfig, LayoutEngine};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().engine(), LayoutEngine::Sugiyama);
//! assert!(config.output().pretty());
//! ```

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// External layout engines that may position nodes before the fallback runs.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutEngine {
    /// Layered layout using the Sugiyama method (default)
    #[default]
    Sugiyama,
    /// No external engine; only the tiered fallback positions nodes
    None,
}

impl FromStr for LayoutEngine {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sugiyama" => Ok(Self::Sugiyama),
            "none" => Ok(Self::None),
            _ => Err("Unsupported layout engine"),
        }
    }
}

impl From<LayoutEngine> for &'static str {
    fn from(val: LayoutEngine) -> Self {
        match val {
            LayoutEngine::Sugiyama => "sugiyama",
            LayoutEngine::None => "none",
        }
    }
}

impl Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, output: OutputConfig) -> Self {
        Self { layout, output }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the layout configuration for modification.
    pub fn layout_mut(&mut self) -> &mut LayoutConfig {
        &mut self.layout
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the output configuration for modification.
    pub fn output_mut(&mut self) -> &mut OutputConfig {
        &mut self.output
    }
}

/// External layout engine selection and spacing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    engine: LayoutEngine,
    horizontal_spacing: f32,
    vertical_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::default(),
            horizontal_spacing: 50.0,
            vertical_spacing: 80.0,
        }
    }
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    ///
    /// # Arguments
    ///
    /// * `engine` - External engine to run before the fallback.
    /// * `horizontal_spacing` - Gap between nodes in the same rank.
    /// * `vertical_spacing` - Gap between ranks.
    pub fn new(engine: LayoutEngine, horizontal_spacing: f32, vertical_spacing: f32) -> Self {
        Self {
            engine,
            horizontal_spacing,
            vertical_spacing,
        }
    }

    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    pub fn set_engine(&mut self, engine: LayoutEngine) {
        self.engine = engine;
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }
}

/// JSON output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl OutputConfig {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Whether JSON is written with two-space indentation.
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn set_pretty(&mut self, pretty: bool) {
        self.pretty = pretty;
    }
}
