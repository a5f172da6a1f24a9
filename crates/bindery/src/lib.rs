//! Bindery - placement validation and module installation for annotation-driven
//! dependency injection.
//!
//! A processing round validates every element carrying the binds-instance
//! marker, reads module declarations from annotated types, and resolves the
//! effective module set of each component with test-only replacements applied.

pub mod config;
pub mod manifest;
pub mod type_expr;

mod error;

pub use bindery_core::{element, identifier, marker, model, module};
pub use bindery_validate::{ComponentModules, error::Diagnostic};

pub use error::BinderyError;

use log::{debug, info, trace};

use bindery_core::{
    model::ElementModel,
    module::{InstallationEdge, ModuleDeclaration},
};
use bindery_validate::{
    DispatchStep, ModuleInstallationResolver, ProcessingStep, error::DiagnosticCollector,
    extract_module_declarations,
};

use config::AppConfig;
use manifest::Round;

/// Runs processing rounds with a fixed configuration.
///
/// # Examples
///
/// ```rust
/// use bindery::{RoundProcessor, config::AppConfig};
///
/// let source = r#"
///     [[types]]
///     name = "AppModule"
///     annotations = [
///         { name = "dagger.Module" },
///         { name = "dagger.hilt.InstallIn", components = ["SingletonComponent"] },
///     ]
/// "#;
///
/// let processor = RoundProcessor::new(AppConfig::default());
/// let round = processor.load(source).expect("Failed to load manifest");
/// let outcome = processor.process(&round).expect("Round failed");
///
/// assert!(!outcome.has_errors());
/// assert_eq!(outcome.modules().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RoundProcessor {
    config: AppConfig,
}

impl RoundProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load a round from manifest text.
    ///
    /// # Errors
    ///
    /// Returns `BinderyError::Manifest` if the manifest cannot be read into an
    /// element model.
    pub fn load(&self, source: &str) -> Result<Round, BinderyError> {
        info!("Loading round manifest");
        manifest::load_round(source).map_err(|err| BinderyError::new_manifest_error(err, source))
    }

    /// Process a loaded round.
    ///
    /// # Errors
    ///
    /// Returns `BinderyError::Internal` if an annotated element could not be
    /// dispatched. Validation findings are never errors here; they are part
    /// of the returned [`RoundOutcome`].
    pub fn process(&self, round: &Round) -> Result<RoundOutcome, BinderyError> {
        self.process_model(round.model(), round.modules())
    }

    /// Process an element model plus modules declared outside of it.
    ///
    /// # Errors
    ///
    /// See [`RoundProcessor::process`].
    pub fn process_model(
        &self,
        model: &ElementModel,
        extra_modules: &[ModuleDeclaration],
    ) -> Result<RoundOutcome, BinderyError> {
        let markers = self.config.markers();
        let variant = self.config.resolver().variant();
        info!(elements = model.len(), variant:% = variant; "Processing round");

        let mut collector = DiagnosticCollector::new();

        let step = DispatchStep::binds_instance(markers);
        let claimed = step.claimed_elements(model);
        let (dispatchable, misplaced) = step.screen_placements(model, &claimed);
        misplaced.print_to(&mut collector);
        let validated = step.process(model, &dispatchable, &mut collector)?;
        debug!(validated, findings = collector.len(); "Placement validation finished");

        let (mut declarations, report) = extract_module_declarations(model, markers);
        report.print_to(&mut collector);
        declarations.extend(extra_modules.iter().cloned());

        let (modules, edges, report) = ModuleInstallationResolver::new(variant)
            .resolve(&declarations)
            .into_parts();
        report.print_to(&mut collector);
        trace!(modules:% = modules; "Resolved component modules");

        info!(
            components = modules.len(),
            findings = collector.len(),
            has_errors = collector.has_errors();
            "Round processed"
        );

        Ok(RoundOutcome {
            modules,
            edges,
            diagnostics: collector.into_diagnostics(),
        })
    }
}

/// Everything a round produced: the resolved modules and every finding.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    modules: ComponentModules,
    edges: Vec<InstallationEdge>,
    diagnostics: Vec<Diagnostic>,
}

impl RoundOutcome {
    pub fn modules(&self) -> &ComponentModules {
        &self.modules
    }

    /// Replacements applied or attempted during resolution.
    pub fn edges(&self) -> &[InstallationEdge] {
        &self.edges
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }

    /// Gate the round on its findings.
    ///
    /// # Errors
    ///
    /// Returns `BinderyError::Validation` carrying every diagnostic if any of
    /// them is an error.
    pub fn into_result(self) -> Result<ComponentModules, BinderyError> {
        if self.has_errors() {
            Err(bindery_validate::error::ValidationError::new(self.diagnostics).into())
        } else {
            Ok(self.modules)
        }
    }
}
