//! d2json - Flattens D2 diagrams into positioned JSON.
//!
//! Parses the supported D2 subset, optionally runs an external layout engine,
//! fills in every position and size the engine left unset with a
//! deterministic tiered fallback, and writes nodes and edges as JSON.

pub mod config;
pub mod layout;
pub mod output;

mod error;

pub use d2json_core::{geometry, graph, identifier};

pub use error::D2JsonError;

use log::{debug, info, trace};

use d2json_core::graph::Graph;

use config::AppConfig;
use layout::EngineBuilder;
use output::OutputDiagram;

/// Builder for converting D2 diagrams into positioned JSON.
///
/// # Examples
///
/// ```rust
/// use d2json::{Converter, config::AppConfig};
///
/// let source = "client_browser -> api_server: HTTPS\napi_server -> db_primary";
///
/// let converter = Converter::new(AppConfig::default());
/// let diagram = converter.convert_source(source)
///     .expect("Failed to convert");
/// assert_eq!(diagram.nodes.len(), 3);
///
/// let json = converter.to_json(&diagram)
///     .expect("Failed to serialize");
/// assert!(json.contains("\"Source\": \"client_browser\""));
///
/// // Or use default config
/// let converter = Converter::default();
/// ```
#[derive(Default)]
pub struct Converter {
    config: AppConfig,
}

impl Converter {
    /// Create a new converter with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse D2 source into a graph.
    ///
    /// # Errors
    ///
    /// Returns `D2JsonError::Parse` for lexical, syntax or semantic errors in
    /// the source.
    pub fn parse(&self, source: &str) -> Result<Graph, D2JsonError> {
        info!("Parsing diagram");

        let graph = d2json_parser::parse(source)
            .map_err(|err| D2JsonError::new_parse_error(err, source))?;

        debug!("Diagram parsed successfully");
        trace!(graph:?; "Parsed graph");

        Ok(graph)
    }

    /// Lay out `graph` and flatten it into output records.
    ///
    /// The configured external engine runs first and writes its geometry into
    /// `graph`. A failing engine is logged and skipped. The fallback layout
    /// then fills every field that is still unset, so this never fails.
    pub fn convert(&self, graph: &mut Graph) -> OutputDiagram {
        let layout_config = self.config.layout();
        let mut engine_builder = EngineBuilder::new()
            .with_horizontal_spacing(layout_config.horizontal_spacing())
            .with_vertical_spacing(layout_config.vertical_spacing());

        if let Some(engine) = engine_builder.external_engine(layout_config.engine()) {
            info!(engine:% = layout_config.engine(); "Running external layout");
            layout::apply_external_layout(graph, engine);
        }

        let diagram = output::flatten(graph);
        info!(
            nodes = diagram.nodes.len(),
            edges = diagram.edges.len();
            "Diagram converted"
        );
        diagram
    }

    /// Parse `source` and convert it in one step.
    ///
    /// # Errors
    ///
    /// Returns `D2JsonError::Parse` if the source does not parse.
    pub fn convert_source(&self, source: &str) -> Result<OutputDiagram, D2JsonError> {
        let mut graph = self.parse(source)?;
        Ok(self.convert(&mut graph))
    }

    /// Encode `diagram` as JSON using the configured output settings.
    ///
    /// # Errors
    ///
    /// Returns `D2JsonError::Serialize` if encoding fails.
    pub fn to_json(&self, diagram: &OutputDiagram) -> Result<String, D2JsonError> {
        diagram.to_json(self.config.output().pretty())
    }
}
