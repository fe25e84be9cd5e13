//! Schema policies.
//!
//! A policy decides, for each `<schema>` block, the canonical name, the
//! nominal module and the base schemata. The parser receives the policy to
//! use as a parameter; [`PolicyRegistry`] keeps named policies for callers
//! that select one by name.

use std::collections::HashMap;
use std::sync::Arc;
use supermodel_core::{ParseError, Schema, SchemaModel, XmlNode};

/// Module assigned by [`DefaultPolicy`].
pub const DEFAULT_MODULE: &str = "supermodel.generated";

/// Attribute listing base schema names, whitespace separated.
pub const BASES_ATTR: &str = "bases";

/// Resolves base schema names during a parse.
///
/// Names are looked up among the schemata already parsed from the current
/// document, then in the externally supplied list. Since a schema can only
/// see schemata that exist before it, base chains can never loop.
pub struct BaseLookup<'a> {
    parsed: &'a SchemaModel,
    external: &'a [Arc<Schema>],
}

impl<'a> BaseLookup<'a> {
    /// Creates a lookup over parsed and external schemata.
    #[must_use]
    pub fn new(parsed: &'a SchemaModel, external: &'a [Arc<Schema>]) -> Self {
        Self { parsed, external }
    }

    /// Finds a schema by canonical name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<Schema>> {
        self.parsed
            .schema(name)
            .cloned()
            .or_else(|| self.external.iter().find(|s| s.name == name).cloned())
    }
}

/// Strategy for naming and placing parsed schemata.
pub trait SchemaPolicy: Send + Sync {
    /// Returns the module the schema nominally belongs to.
    ///
    /// # Arguments
    /// * `schema_name` - Name declared on the block, empty when absent
    /// * `tree` - The `<schema>` element
    fn module(&self, schema_name: &str, tree: &XmlNode) -> String;

    /// Returns the base schemata, in order.
    ///
    /// # Arguments
    /// * `schema_name` - Name declared on the block, empty when absent
    /// * `tree` - The `<schema>` element
    /// * `lookup` - Resolver for schemata visible to this block
    ///
    /// # Errors
    /// Returns `ParseError::UnresolvedBase` if a referenced base does not exist.
    fn bases(
        &self,
        schema_name: &str,
        tree: &XmlNode,
        lookup: &BaseLookup<'_>,
    ) -> Result<Vec<Arc<Schema>>, ParseError>;

    /// Returns the canonical schema name.
    ///
    /// # Arguments
    /// * `schema_name` - Name declared on the block, empty when absent
    /// * `tree` - The `<schema>` element
    fn name(&self, schema_name: &str, tree: &XmlNode) -> String;
}

/// Policy used when the caller does not pick one.
///
/// Keeps the declared name, places every schema in [`DEFAULT_MODULE`] and
/// reads bases from the `bases` attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl SchemaPolicy for DefaultPolicy {
    fn module(&self, _schema_name: &str, _tree: &XmlNode) -> String {
        DEFAULT_MODULE.to_string()
    }

    fn bases(
        &self,
        schema_name: &str,
        tree: &XmlNode,
        lookup: &BaseLookup<'_>,
    ) -> Result<Vec<Arc<Schema>>, ParseError> {
        resolve_declared_bases(schema_name, tree, lookup)
    }

    fn name(&self, schema_name: &str, _tree: &XmlNode) -> String {
        schema_name.to_string()
    }
}

/// Base names listed in the `bases` attribute of a schema element.
#[must_use]
pub fn declared_bases(tree: &XmlNode) -> Vec<&str> {
    tree.attr(BASES_ATTR)
        .map(|v| v.split_whitespace().collect())
        .unwrap_or_default()
}

/// Resolves every name in the `bases` attribute.
///
/// # Errors
/// Returns `ParseError::UnresolvedBase` for the first name that cannot be
/// found, or `ParseError::MalformedSchema` if a name is listed twice.
pub fn resolve_declared_bases(
    schema_name: &str,
    tree: &XmlNode,
    lookup: &BaseLookup<'_>,
) -> Result<Vec<Arc<Schema>>, ParseError> {
    let names = declared_bases(tree);
    let mut bases = Vec::with_capacity(names.len());

    for (idx, name) in names.iter().enumerate() {
        if names[..idx].contains(name) {
            return Err(ParseError::MalformedSchema {
                schema: schema_name.to_string(),
                reason: format!("base '{name}' listed twice"),
            });
        }
        let base = lookup
            .resolve(name)
            .ok_or_else(|| ParseError::UnresolvedBase {
                schema: schema_name.to_string(),
                base: (*name).to_string(),
            })?;
        bases.push(base);
    }

    Ok(bases)
}

/// Named schema policies.
///
/// The empty name always maps to a policy; a fresh registry binds it to
/// [`DefaultPolicy`].
#[derive(Clone)]
pub struct PolicyRegistry {
    policies: HashMap<String, Arc<dyn SchemaPolicy>>,
}

impl PolicyRegistry {
    /// Creates a registry holding only the default policy.
    #[must_use]
    pub fn new() -> Self {
        let mut policies: HashMap<String, Arc<dyn SchemaPolicy>> = HashMap::new();
        policies.insert(String::new(), Arc::new(DefaultPolicy));
        Self { policies }
    }

    /// Registers a policy under a name, replacing any previous binding.
    pub fn register<P: SchemaPolicy + 'static>(&mut self, name: impl Into<String>, policy: P) {
        let name = name.into();
        if self
            .policies
            .insert(name.clone(), Arc::new(policy))
            .is_some()
        {
            tracing::debug!("Replaced schema policy '{}'", name);
        }
    }

    /// Looks up a policy by name.
    ///
    /// # Errors
    /// Returns `ParseError::UnknownPolicy` if nothing is registered under
    /// the name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn SchemaPolicy>, ParseError> {
        self.policies
            .get(name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownPolicy {
                name: name.to_string(),
            })
    }

    /// Returns true if a policy is registered under the name.
    #[must_use]
    pub fn has_policy(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("names", &self.names())
            .finish()
    }
}
