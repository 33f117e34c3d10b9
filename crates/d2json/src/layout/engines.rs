//! External layout engines.
//!
//! An external engine writes positions and sizes directly into the
//! [`Graph`] before the fallback runs. Engines are selected with
//! [`LayoutEngine`] and created through [`EngineBuilder`], which carries the
//! spacing configuration and caches engines by kind.
//!
//! Engines are allowed to fail: [`apply_external_layout`] runs an engine on a
//! copy of the graph and only keeps the result if the engine returned `Ok`
//! without panicking.

mod sugiyama;

use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
};

use log::{debug, trace, warn};

use d2json_core::graph::Graph;

use crate::{config::LayoutEngine, error::D2JsonError};

/// Interface for engines that compute geometry for a whole graph.
pub trait ExternalEngine {
    /// Writes top-left positions and sizes into the objects the engine
    /// places. Objects it cannot place keep their current geometry.
    ///
    /// # Errors
    /// Returns `D2JsonError::Layout` if the engine fails to calculate
    /// positions.
    fn apply(&self, graph: &mut Graph) -> Result<(), D2JsonError>;
}

/// Builder for creating and configuring external layout engines.
#[derive(Default)]
pub struct EngineBuilder {
    // Cache for reusing engines with the same configuration
    engines: HashMap<LayoutEngine, Box<dyn ExternalEngine>>,

    horizontal_spacing: f32,
    vertical_spacing: f32,
}

impl EngineBuilder {
    /// Create a new engine builder with an empty engine cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal spacing between nodes of the same rank
    pub fn with_horizontal_spacing(mut self, spacing: f32) -> Self {
        self.horizontal_spacing = spacing;
        self
    }

    /// Set the vertical spacing between ranks
    pub fn with_vertical_spacing(mut self, spacing: f32) -> Self {
        self.vertical_spacing = spacing;
        self
    }

    /// Get the engine of the specified kind, or `None` for
    /// [`LayoutEngine::None`].
    pub fn external_engine(&mut self, engine_type: LayoutEngine) -> Option<&dyn ExternalEngine> {
        let engine = match engine_type {
            LayoutEngine::None => return None,
            LayoutEngine::Sugiyama => self.engines.entry(engine_type).or_insert_with(|| {
                let mut e = sugiyama::Engine::new();
                // Configure the layered engine
                e.set_horizontal_spacing(self.horizontal_spacing);
                e.set_vertical_spacing(self.vertical_spacing);
                let engine: Box<dyn ExternalEngine> = Box::new(e);
                engine
            }),
        };

        trace!(engine_type:%; "Selected external layout engine");
        Some(&**engine)
    }
}

/// Runs `engine` against `graph`, containing any failure.
///
/// The engine works on a copy of the graph. On success the copy replaces
/// `graph`; on an error or a panic the failure is logged and `graph` is left
/// untouched. Returns whether the engine's geometry was kept.
pub fn apply_external_layout(graph: &mut Graph, engine: &dyn ExternalEngine) -> bool {
    let mut staged = graph.clone();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.apply(&mut staged)));

    match outcome {
        Ok(Ok(())) => {
            *graph = staged;
            debug!("External layout applied");
            true
        }
        Ok(Err(err)) => {
            warn!(err:%; "External layout failed, using fallback layout");
            false
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| payload.downcast_ref::<&str>().copied())
                .unwrap_or("unknown panic");
            warn!(message; "External layout panicked, using fallback layout");
            false
        }
    }
}
