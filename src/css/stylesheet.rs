//! Stylesheet registry: compiled artifacts, custom properties and the cascade.
//!
//! Stylesheets are registered under an id and compiled once: every rule gets
//! a registry-wide sequence number, its selectors' specificities, and its
//! declarations with `var()` references substituted. Registration is
//! idempotent per id; only [`StylesheetRegistry::reset`] forgets a sheet.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::css::matching;
use crate::css::model::{Declaration, PseudoElement, Selector, StyleSheet};
use crate::css::parser::{parse_css, ParseError};
use crate::css::properties::apply_declaration;
use crate::css::specificity::{CascadeKey, Origin, Specificity};
use crate::css::styles::Styles;
use crate::css::variables::VariableScope;
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

/// One rule with pre-computed specificity and substituted declarations.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub selectors: Vec<Selector>,
    /// Specificity of each selector, parallel to `selectors`.
    pub specificities: Vec<Specificity>,
    /// Declarations after `var()` substitution.
    pub declarations: Vec<Declaration>,
    /// Registry-wide insertion sequence number.
    pub sequence: u64,
    /// Declarations as written, kept for re-substitution.
    raw: Vec<Declaration>,
}

/// A registered stylesheet.
#[derive(Debug, Clone)]
pub struct StylesheetArtifact {
    pub id: String,
    pub origin: Origin,
    pub rules: Vec<CompiledRule>,
    /// Rules dropped by the parser's error recovery.
    pub dropped_rules: usize,
}

/// All registered stylesheets plus the custom properties they define.
#[derive(Debug, Default)]
pub struct StylesheetRegistry {
    artifacts: Vec<StylesheetArtifact>,
    by_id: HashMap<String, usize>,
    next_sequence: u64,
    variables: VariableScope,
}

impl StylesheetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an author stylesheet under `id`.
    ///
    /// A second registration under the same id returns the existing artifact
    /// without re-parsing. A stylesheet that fails to parse is not stored.
    pub fn register_stylesheet(
        &mut self,
        id: &str,
        css: &str,
    ) -> Result<&StylesheetArtifact, ParseError> {
        self.register_with_origin(id, css, Origin::Author)
    }

    /// Register a user-agent stylesheet. Its rules rank below every author
    /// rule of the same importance.
    pub fn register_user_agent(
        &mut self,
        id: &str,
        css: &str,
    ) -> Result<&StylesheetArtifact, ParseError> {
        self.register_with_origin(id, css, Origin::UserAgent)
    }

    fn register_with_origin(
        &mut self,
        id: &str,
        css: &str,
        origin: Origin,
    ) -> Result<&StylesheetArtifact, ParseError> {
        if let Some(&index) = self.by_id.get(id) {
            debug!(id, "stylesheet already registered");
            return Ok(&self.artifacts[index]);
        }

        let sheet = parse_css(css).inspect_err(|err| {
            warn!(id, error = %err, "stylesheet rejected");
        })?;

        let changed = self.collect_variables(&sheet);
        if changed {
            self.recompile_all();
        }

        let artifact = self.compile(id, origin, sheet);
        debug!(
            id,
            ?origin,
            rules = artifact.rules.len(),
            dropped = artifact.dropped_rules,
            "registered stylesheet"
        );
        let index = self.artifacts.len();
        self.artifacts.push(artifact);
        self.by_id.insert(id.to_string(), index);
        Ok(&self.artifacts[index])
    }

    /// Record every `--name` declaration. Returns whether any value changed.
    fn collect_variables(&mut self, sheet: &StyleSheet) -> bool {
        let mut changed = false;
        for decl in sheet.rules.iter().flat_map(|r| &r.declarations) {
            if decl.is_custom_property() {
                changed |= self.variables.set(decl.property.clone(), decl.value.clone());
            }
        }
        changed
    }

    fn compile(&mut self, id: &str, origin: Origin, sheet: StyleSheet) -> StylesheetArtifact {
        let mut rules = Vec::with_capacity(sheet.rules.len());
        for rule in sheet.rules {
            let specificities = rule.selectors.iter().map(Specificity::from_selector).collect();
            let declarations = self.substitute(&rule.declarations);
            rules.push(CompiledRule {
                selectors: rule.selectors,
                specificities,
                declarations,
                sequence: self.next_sequence,
                raw: rule.declarations,
            });
            self.next_sequence += 1;
        }
        StylesheetArtifact {
            id: id.to_string(),
            origin,
            rules,
            dropped_rules: sheet.dropped_rules,
        }
    }

    /// Re-substitute stored rules after the variable set changed.
    fn recompile_all(&mut self) {
        let variables = &self.variables;
        for rule in self.artifacts.iter_mut().flat_map(|a| a.rules.iter_mut()) {
            rule.declarations = substitute_with(variables, &rule.raw);
        }
    }

    fn substitute(&self, declarations: &[Declaration]) -> Vec<Declaration> {
        substitute_with(&self.variables, declarations)
    }

    /// Look up a registered stylesheet.
    pub fn artifact(&self, id: &str) -> Option<&StylesheetArtifact> {
        self.by_id.get(id).map(|&i| &self.artifacts[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Registered stylesheets in registration order.
    pub fn artifacts(&self) -> &[StylesheetArtifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Custom properties collected from all registered sheets.
    pub fn variables(&self) -> &VariableScope {
        &self.variables
    }

    /// Forget every stylesheet and custom property.
    pub fn reset(&mut self) {
        debug!(sheets = self.artifacts.len(), "resetting stylesheet registry");
        self.artifacts.clear();
        self.by_id.clear();
        self.variables.clear();
        self.next_sequence = 0;
    }

    /// Cascaded style for `node` from rules without a pseudo-element.
    ///
    /// Inherited properties are not filled in here; the paint pipeline
    /// inherits from the parent's computed style.
    pub fn compute_style(&self, dom: &Dom, node: NodeId) -> Styles {
        self.cascade(dom, node, |selector| {
            selector.pseudo_element().is_none() && matching::matches(dom, node, selector)
        })
    }

    /// Cascaded style for the `pseudo` element of `node`.
    pub fn compute_pseudo_style(&self, dom: &Dom, node: NodeId, pseudo: &PseudoElement) -> Styles {
        self.cascade(dom, node, |selector| {
            matching::matches_pseudo(dom, node, selector, pseudo)
        })
    }

    /// Whether any rule targets `pseudo` on `node`.
    pub fn has_pseudo_rules(&self, dom: &Dom, node: NodeId, pseudo: &PseudoElement) -> bool {
        self.artifacts
            .iter()
            .flat_map(|a| &a.rules)
            .flat_map(|r| &r.selectors)
            .any(|selector| matching::matches_pseudo(dom, node, selector, pseudo))
    }

    fn cascade(&self, dom: &Dom, node: NodeId, matches: impl Fn(&Selector) -> bool) -> Styles {
        if !dom.is_element(node) {
            return Styles::new();
        }

        let mut winners: Vec<(CascadeKey, &Declaration)> = Vec::new();
        for artifact in &self.artifacts {
            for rule in &artifact.rules {
                // The most specific matching selector of the list applies.
                let specificity = rule
                    .selectors
                    .iter()
                    .zip(&rule.specificities)
                    .filter(|(selector, _)| matches(selector))
                    .map(|(_, s)| *s)
                    .max_by_key(Specificity::packed);
                let Some(specificity) = specificity else {
                    continue;
                };
                for decl in &rule.declarations {
                    let key =
                        CascadeKey::new(decl.important, artifact.origin, specificity, rule.sequence);
                    winners.push((key, decl));
                }
            }
        }

        // Stable: declarations of one rule keep their written order.
        winners.sort_by_key(|(key, _)| *key);

        let mut styles = Styles::new();
        for (_, decl) in winners {
            if let Err(err) = apply_declaration(&mut styles, &decl.property, &decl.value) {
                warn!(property = %decl.property, value = %decl.value, error = %err, "dropping declaration");
            }
        }
        styles
    }
}

fn substitute_with(variables: &VariableScope, declarations: &[Declaration]) -> Vec<Declaration> {
    declarations
        .iter()
        .map(|decl| {
            if VariableScope::has_references(&decl.value) {
                Declaration::new(decl.property.clone(), variables.resolve(&decl.value), decl.important)
            } else {
                decl.clone()
            }
        })
        .collect()
}
