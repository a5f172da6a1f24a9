//! Module installation resolution.
//!
//! Partitions module declarations by install target and applies test-only
//! replacements inside each partition. Every rule violation becomes a
//! finding; resolution itself never fails and always returns partitions.
//!
//! # Algorithm
//!
//! 1. Index declarations by name. A repeated name is reported and the later
//!    copy ignored.
//! 2. Drop test-only modules entirely for [`BuildVariant::Production`].
//! 3. Partition modules by install target, in first-seen order.
//! 4. Validate every declared replacement and turn each valid one into one
//!    [`InstallationEdge`] per shared component.
//! 5. Apply the edges per partition. A replaced module with exactly one
//!    claimant is swapped for it; with several claimants the original stays
//!    and every conflicting claimant is left out of that partition.

use std::{collections::HashSet, fmt, str::FromStr};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace};
use serde::Deserialize;

use bindery_core::{
    identifier::Id,
    module::{ComponentId, InstallationEdge, ModuleDeclaration},
};

use crate::error::{Diagnostic, ErrorCode, ValidationReport};

/// Which modules take part in resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    /// Test builds: test-only modules are installed and replacements apply.
    #[default]
    Test,
    /// Production builds: test-only modules are ignored.
    Production,
}

impl BuildVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVariant::Test => "test",
            BuildVariant::Production => "production",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(BuildVariant::Test),
            "production" => Ok(BuildVariant::Production),
            other => Err(format!(
                "unknown build variant `{other}`, expected `test` or `production`"
            )),
        }
    }
}

/// The effective module set of every component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentModules {
    partitions: IndexMap<ComponentId, Vec<Id>>,
}

impl ComponentModules {
    /// Modules installed in `component`, in resolution order.
    pub fn get(&self, component: &ComponentId) -> Option<&[Id]> {
        self.partitions.get(component).map(Vec::as_slice)
    }

    pub fn contains(&self, component: &ComponentId, module: Id) -> bool {
        self.get(component)
            .is_some_and(|modules| modules.contains(&module))
    }

    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.partitions.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &[Id])> {
        self.partitions
            .iter()
            .map(|(component, modules)| (*component, modules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl fmt::Display for ComponentModules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (component, modules) in &self.partitions {
            write!(f, "{component}:")?;
            for module in modules {
                write!(f, " {module}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    modules: ComponentModules,
    edges: Vec<InstallationEdge>,
    report: ValidationReport,
}

impl Resolution {
    pub fn modules(&self) -> &ComponentModules {
        &self.modules
    }

    /// Replacement edges that passed validation, before conflicts are applied.
    pub fn edges(&self) -> &[InstallationEdge] {
        &self.edges
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn into_parts(self) -> (ComponentModules, Vec<InstallationEdge>, ValidationReport) {
        (self.modules, self.edges, self.report)
    }
}

/// Resolves which modules end up installed in which component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleInstallationResolver {
    variant: BuildVariant,
}

impl ModuleInstallationResolver {
    pub fn new(variant: BuildVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> BuildVariant {
        self.variant
    }

    /// Resolve `declarations` into per-component module sets.
    ///
    /// Resolution is fail-soft: invalid replacements are reported and left
    /// out, and the partitions are returned regardless.
    pub fn resolve(&self, declarations: &[ModuleDeclaration]) -> Resolution {
        info!(modules = declarations.len(), variant:% = self.variant; "Resolving module installations");

        let mut report = ValidationReport::new();
        let index = index_declarations(declarations, &mut report);

        let active: Vec<&ModuleDeclaration> = index
            .values()
            .copied()
            .filter(|module| match self.variant {
                BuildVariant::Test => true,
                BuildVariant::Production => {
                    if module.is_test_only() {
                        debug!(module:% = module.name(); "Skipping test-only module in production build");
                    }
                    !module.is_test_only()
                }
            })
            .collect();

        let mut partitions: IndexMap<ComponentId, Vec<Id>> = IndexMap::new();
        for module in &active {
            for component in module.install_targets() {
                partitions.entry(*component).or_default().push(module.name());
            }
        }

        let edges = collect_edges(&active, &index, &mut report);
        for (component, modules) in partitions.iter_mut() {
            apply_replacements(*component, modules, &edges, &index, &mut report);
        }

        info!(
            components = partitions.len(),
            edges = edges.len(),
            findings = report.len();
            "Module installations resolved"
        );

        Resolution {
            modules: ComponentModules { partitions },
            edges,
            report,
        }
    }
}

fn index_declarations<'a>(
    declarations: &'a [ModuleDeclaration],
    report: &mut ValidationReport,
) -> IndexMap<Id, &'a ModuleDeclaration> {
    let mut index: IndexMap<Id, &ModuleDeclaration> = IndexMap::with_capacity(declarations.len());
    for module in declarations {
        if let Some(first) = index.get(&module.name()) {
            report.push(
                Diagnostic::error(format!("module `{}` is declared more than once", module.name()))
                    .with_code(ErrorCode::E305)
                    .with_optional_label(module.origin(), "duplicate declaration")
                    .with_optional_secondary_label(first.origin(), "first declared here")
                    .with_help("only the first declaration is used"),
            );
            continue;
        }
        index.insert(module.name(), module);
    }
    index
}

/// Validate every declared replacement and expand the valid ones per component.
fn collect_edges(
    active: &[&ModuleDeclaration],
    index: &IndexMap<Id, &ModuleDeclaration>,
    report: &mut ValidationReport,
) -> Vec<InstallationEdge> {
    let mut edges = Vec::new();

    for replacement in active {
        for &replaced_name in replacement.replaces() {
            let Some(replaced) = index.get(&replaced_name).copied() else {
                report.push(
                    Diagnostic::error(format!(
                        "module `{}` replaces unknown module `{replaced_name}`",
                        replacement.name()
                    ))
                    .with_code(ErrorCode::E304)
                    .with_optional_label(replacement.origin(), "declares the replacement"),
                );
                continue;
            };

            if let Some(diagnostic) = check_replacement(replacement, replaced) {
                report.push(diagnostic);
                continue;
            }

            for component in replacement.install_targets() {
                let edge = InstallationEdge::new(replacement.name(), replaced_name, *component);
                debug!(edge:% = edge; "Replacement accepted");
                edges.push(edge);
            }
        }
    }

    edges
}

/// Checks a single `replacement -> replaced` declaration, first failure wins.
fn check_replacement(
    replacement: &ModuleDeclaration,
    replaced: &ModuleDeclaration,
) -> Option<Diagnostic> {
    let (m, r) = (replacement.name(), replaced.name());

    if !replacement.is_installed() || !replaced.is_installed() {
        let uninstalled = if replacement.is_installed() { r } else { m };
        return Some(
            Diagnostic::error(format!(
                "module `{m}` replaces `{r}`, but `{uninstalled}` is not installed in any component"
            ))
            .with_code(ErrorCode::E302)
            .with_optional_label(replacement.origin(), "declares the replacement")
            .with_optional_secondary_label(replaced.origin(), "replaced module"),
        );
    }

    if replacement.install_targets() != replaced.install_targets() {
        return Some(
            Diagnostic::error(format!(
                "module `{m}` is installed in {} but replaces `{r}`, which is installed in {}",
                format_components(replacement.install_targets()),
                format_components(replaced.install_targets()),
            ))
            .with_code(ErrorCode::E300)
            .with_optional_label(replacement.origin(), "declares the replacement")
            .with_optional_secondary_label(replaced.origin(), "replaced module")
            .with_help("a replacement must be installed in exactly the components of the module it replaces"),
        );
    }

    if !replacement.is_test_only() {
        return Some(
            Diagnostic::error(format!(
                "module `{m}` replaces `{r}`, but only test-only modules may replace other modules"
            ))
            .with_code(ErrorCode::E306)
            .with_optional_label(replacement.origin(), "production module"),
        );
    }

    if replaced.is_test_only() {
        return Some(
            Diagnostic::error(format!(
                "module `{m}` replaces `{r}`, which is itself a test-only module"
            ))
            .with_code(ErrorCode::E303)
            .with_optional_label(replacement.origin(), "declares the replacement")
            .with_optional_secondary_label(replaced.origin(), "test-only module"),
        );
    }

    None
}

/// Rewrite one partition in place according to the edges scoped to it.
fn apply_replacements(
    component: ComponentId,
    modules: &mut Vec<Id>,
    edges: &[InstallationEdge],
    index: &IndexMap<Id, &ModuleDeclaration>,
    report: &mut ValidationReport,
) {
    let mut claims: IndexMap<Id, IndexSet<Id>> = IndexMap::new();
    for edge in edges.iter().filter(|edge| edge.component() == component) {
        claims
            .entry(edge.replaced())
            .or_default()
            .insert(edge.replacement());
    }
    if claims.is_empty() {
        return;
    }

    let claimants: HashSet<Id> = claims.values().flatten().copied().collect();
    let mut conflicted: HashSet<Id> = HashSet::new();
    for (replaced, replacements) in &claims {
        if replacements.len() > 1 {
            let names: Vec<String> = replacements.iter().map(|name| format!("`{name}`")).collect();
            let mut diagnostic = Diagnostic::error(format!(
                "module `{replaced}` is replaced by more than one module in `{component}`: {}",
                names.join(", ")
            ))
            .with_code(ErrorCode::E301)
            .with_optional_label(
                index.get(replaced).and_then(|module| module.origin()),
                "replaced module",
            )
            .with_help(conflict_help(component, *replaced, replacements, &claims));
            for name in replacements {
                diagnostic = diagnostic.with_optional_secondary_label(
                    index.get(name).and_then(|module| module.origin()),
                    "conflicting replacement",
                );
            }
            report.push(diagnostic);
            conflicted.extend(replacements.iter().copied());
        }
    }

    let winners: IndexMap<Id, Id> = claims
        .iter()
        .filter(|(_, replacements)| replacements.len() == 1)
        .filter_map(|(replaced, replacements)| {
            replacements
                .first()
                .filter(|winner| !conflicted.contains(*winner))
                .map(|winner| (*replaced, *winner))
        })
        .collect();

    let mut resolved = Vec::with_capacity(modules.len());
    for &module in modules.iter() {
        if let Some(&winner) = winners.get(&module) {
            if !resolved.contains(&winner) {
                resolved.push(winner);
            }
        } else if !claimants.contains(&module) {
            resolved.push(module);
        }
    }

    trace!(component:% = component, before = modules.len(), after = resolved.len(); "Partition rewritten");
    *modules = resolved;
}

/// Help for a conflict on `replaced`. A conflicting claimant leaves the
/// partition, so replacements it would otherwise win there are withdrawn too.
fn conflict_help(
    component: ComponentId,
    replaced: Id,
    replacements: &IndexSet<Id>,
    claims: &IndexMap<Id, IndexSet<Id>>,
) -> String {
    let mut help = format!("`{replaced}` is kept in `{component}`");
    for claimant in replacements {
        let withdrawn: Vec<String> = claims
            .iter()
            .filter(|(other, others)| {
                **other != replaced && others.len() == 1 && others.contains(claimant)
            })
            .map(|(other, _)| format!("`{other}`"))
            .collect();
        if !withdrawn.is_empty() {
            help.push_str(&format!(
                "; `{claimant}` is left out of `{component}`, so its replacement of {} is not applied",
                withdrawn.join(", ")
            ));
        }
    }
    help
}

fn format_components(components: &IndexSet<ComponentId>) -> String {
    let names: Vec<String> = components.iter().map(ToString::to_string).collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn c(name: &str) -> ComponentId {
        ComponentId::new(name)
    }

    fn module(name: &str, components: &[&str]) -> ModuleDeclaration {
        components
            .iter()
            .fold(ModuleDeclaration::new(name), |module, component| {
                module.installed_in(c(component))
            })
    }

    fn codes(resolution: &Resolution) -> Vec<ErrorCode> {
        resolution
            .report()
            .findings()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    fn modules_in<'a>(resolution: &'a Resolution, component: &str) -> Vec<String> {
        resolution
            .modules()
            .get(&c(component))
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_partitions_without_replacement() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C", "D"]),
            module("B", &["D"]),
        ]);

        assert!(resolution.report().is_clean());
        assert_eq!(modules_in(&resolution, "C"), vec!["A"]);
        assert_eq!(modules_in(&resolution, "D"), vec!["A", "B"]);
        assert_eq!(
            resolution.modules().components().collect::<Vec<_>>(),
            vec![c("C"), c("D")]
        );
    }

    #[test]
    fn test_single_replacement_takes_slot() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("B", &["C"]).replacing("A").test_only(),
        ]);

        assert!(resolution.report().is_clean());
        assert_eq!(modules_in(&resolution, "C"), vec!["B"]);
        assert_eq!(
            resolution.edges(),
            &[InstallationEdge::new(Id::new("B"), Id::new("A"), c("C"))]
        );
    }

    #[test]
    fn test_replacement_keeps_position() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("First", &["C"]),
            module("A", &["C"]),
            module("Last", &["C"]),
            module("B", &["C"]).replacing("A").test_only(),
        ]);
        assert_eq!(modules_in(&resolution, "C"), vec!["First", "B", "Last"]);
    }

    #[test]
    fn test_target_mismatch_is_error_and_keeps_original() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("B", &["D"]).replacing("A").test_only(),
        ]);

        assert_eq!(codes(&resolution), vec![ErrorCode::E300]);
        let message = resolution.report().findings()[0].message();
        assert!(message.contains("`B`") && message.contains("`A`"));
        assert!(message.contains("[C]") && message.contains("[D]"));
        assert_eq!(modules_in(&resolution, "C"), vec!["A"]);
        assert_eq!(modules_in(&resolution, "D"), vec!["B"]);
    }

    #[test]
    fn test_target_superset_is_mismatch() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("B", &["C", "D"]).replacing("A").test_only(),
        ]);
        assert_eq!(codes(&resolution), vec![ErrorCode::E300]);
        assert!(resolution.edges().is_empty());
    }

    #[test]
    fn test_target_order_does_not_matter() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C", "D"]),
            module("B", &["D", "C"]).replacing("A").test_only(),
        ]);
        assert!(resolution.report().is_clean());
        assert_eq!(modules_in(&resolution, "C"), vec!["B"]);
        assert_eq!(modules_in(&resolution, "D"), vec!["B"]);
    }

    #[test]
    fn test_conflicting_replacements_keep_original() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("B1", &["C"]).replacing("A").test_only(),
            module("B2", &["C"]).replacing("A").test_only(),
        ]);

        assert_eq!(codes(&resolution), vec![ErrorCode::E301]);
        let message = resolution.report().findings()[0].message();
        assert!(message.contains("`B1`") && message.contains("`B2`"));
        assert_eq!(modules_in(&resolution, "C"), vec!["A"]);
    }

    #[test]
    fn test_conflict_withdraws_other_replacements_of_claimant() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("X", &["C"]),
            module("B1", &["C"]).replacing("A").replacing("X").test_only(),
            module("B2", &["C"]).replacing("A").test_only(),
        ]);

        assert_eq!(codes(&resolution), vec![ErrorCode::E301]);
        assert_eq!(modules_in(&resolution, "C"), vec!["A", "X"]);

        let help = resolution.report().findings()[0].help().unwrap();
        assert!(help.contains("`A` is kept in `C`"));
        assert!(help.contains("`B1` is left out of `C`, so its replacement of `X` is not applied"));
        assert!(!help.contains("`B2` is left out"));
    }

    #[test]
    fn test_conflict_reported_per_component() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C", "D"]),
            module("B1", &["C", "D"]).replacing("A").test_only(),
            module("B2", &["C", "D"]).replacing("A").test_only(),
        ]);
        assert_eq!(codes(&resolution), vec![ErrorCode::E301, ErrorCode::E301]);
        assert_eq!(modules_in(&resolution, "D"), vec!["A"]);
    }

    #[test]
    fn test_uninstalled_module_in_replacement() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            ModuleDeclaration::new("A"),
            module("B", &["C"]).replacing("A").test_only(),
        ]);
        assert_eq!(codes(&resolution), vec![ErrorCode::E302]);
        assert_eq!(modules_in(&resolution, "C"), vec!["B"]);
    }

    #[test]
    fn test_replacing_test_only_module() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]).test_only(),
            module("B", &["C"]).replacing("A").test_only(),
        ]);
        assert_eq!(codes(&resolution), vec![ErrorCode::E303]);
        assert_eq!(modules_in(&resolution, "C"), vec!["A", "B"]);
    }

    #[test]
    fn test_replacing_unknown_module() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("B", &["C"]).replacing("Missing").test_only(),
        ]);
        assert_eq!(codes(&resolution), vec![ErrorCode::E304]);
        assert_eq!(modules_in(&resolution, "C"), vec!["B"]);
    }

    #[test]
    fn test_duplicate_declaration_ignores_later_copy() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("A", &["D"]),
        ]);
        assert_eq!(codes(&resolution), vec![ErrorCode::E305]);
        assert_eq!(modules_in(&resolution, "C"), vec!["A"]);
        assert!(resolution.modules().get(&c("D")).is_none());
    }

    #[test]
    fn test_production_module_cannot_replace() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("B", &["C"]).replacing("A"),
        ]);
        assert_eq!(codes(&resolution), vec![ErrorCode::E306]);
        assert_eq!(modules_in(&resolution, "C"), vec!["A", "B"]);
    }

    #[test]
    fn test_production_variant_ignores_test_modules() {
        let declarations = [
            module("A", &["C"]),
            module("B", &["C"]).replacing("A").test_only(),
            module("Fixtures", &["T"]).test_only(),
        ];
        let resolution = ModuleInstallationResolver::new(BuildVariant::Production).resolve(&declarations);

        assert!(resolution.report().is_clean());
        assert_eq!(modules_in(&resolution, "C"), vec!["A"]);
        assert!(resolution.modules().get(&c("T")).is_none());
        assert!(resolution.edges().is_empty());
    }

    #[test]
    fn test_display_lists_components() {
        let resolution = ModuleInstallationResolver::default().resolve(&[
            module("A", &["C"]),
            module("B", &["C", "D"]),
        ]);
        assert_eq!(resolution.modules().to_string(), "C: A B\nD: B\n");
    }

    #[test]
    fn test_build_variant_from_str() {
        assert_eq!("test".parse::<BuildVariant>(), Ok(BuildVariant::Test));
        assert_eq!("production".parse::<BuildVariant>(), Ok(BuildVariant::Production));
        assert!("release".parse::<BuildVariant>().is_err());
    }

    mod proptest_tests {
        use super::*;

        const NAMES: [&str; 5] = ["A", "B", "C", "D", "E"];
        const COMPONENTS: [&str; 3] = ["Singleton", "Activity", "Fragment"];

        fn arb_declaration() -> impl Strategy<Value = ModuleDeclaration> {
            (
                0..NAMES.len(),
                prop::collection::vec(0..COMPONENTS.len(), 0..3),
                prop::collection::vec(0..NAMES.len(), 0..2),
                any::<bool>(),
            )
                .prop_map(|(name, components, replaces, test_only)| {
                    let mut module = ModuleDeclaration::new(NAMES[name]);
                    for component in components {
                        module = module.installed_in(ComponentId::new(COMPONENTS[component]));
                    }
                    for replaced in replaces {
                        module = module.replacing(NAMES[replaced]);
                    }
                    if test_only { module.test_only() } else { module }
                })
        }

        fn arb_declarations() -> impl Strategy<Value = Vec<ModuleDeclaration>> {
            prop::collection::vec(arb_declaration(), 0..8)
        }

        fn check_idempotent(declarations: &[ModuleDeclaration]) -> Result<(), TestCaseError> {
            let resolver = ModuleInstallationResolver::default();
            prop_assert_eq!(resolver.resolve(declarations), resolver.resolve(declarations));
            Ok(())
        }

        fn check_partitions_unique(declarations: &[ModuleDeclaration]) -> Result<(), TestCaseError> {
            let resolution = ModuleInstallationResolver::default().resolve(declarations);
            for (component, modules) in resolution.modules().iter() {
                let unique: HashSet<&Id> = modules.iter().collect();
                prop_assert_eq!(unique.len(), modules.len(), "duplicate module in {}", component);
            }
            Ok(())
        }

        fn check_no_test_modules_in_production(
            declarations: &[ModuleDeclaration],
        ) -> Result<(), TestCaseError> {
            let resolution =
                ModuleInstallationResolver::new(BuildVariant::Production).resolve(declarations);
            let test_only: HashSet<Id> = declarations
                .iter()
                .filter(|module| module.is_test_only())
                .map(ModuleDeclaration::name)
                .collect();
            let production: HashSet<Id> = declarations
                .iter()
                .filter(|module| !module.is_test_only())
                .map(ModuleDeclaration::name)
                .collect();
            for (_, modules) in resolution.modules().iter() {
                for module in modules {
                    prop_assert!(!test_only.contains(module) || production.contains(module));
                }
            }
            Ok(())
        }

        proptest! {
            #[test]
            fn resolution_is_idempotent(declarations in arb_declarations()) {
                check_idempotent(&declarations)?;
            }

            #[test]
            fn partitions_hold_each_module_once(declarations in arb_declarations()) {
                check_partitions_unique(&declarations)?;
            }

            #[test]
            fn production_excludes_test_modules(declarations in arb_declarations()) {
                check_no_test_modules_in_production(&declarations)?;
            }
        }
    }
}
