//! File loading with a per-path model cache.
//!
//! Relative paths resolve against the loader's base directory, never the
//! process working directory. Loaded models are cached by canonical path and
//! policy name, so repeated loads of the same file share one
//! [`SchemaModel`].

use crate::error::LoadError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use supermodel_core::{Schema, SchemaModel};
use supermodel_fields::FieldRegistry;
use supermodel_schema::{Parser, PolicyRegistry};

type CacheKey = (PathBuf, String);

#[derive(Default)]
struct Cache {
    models: HashMap<CacheKey, Arc<SchemaModel>>,
    /// Path as requested (joined with the base directory) to canonical path.
    aliases: HashMap<PathBuf, PathBuf>,
}

/// Loads schema documents from disk.
pub struct Loader {
    base_dir: PathBuf,
    fields: FieldRegistry,
    policies: PolicyRegistry,
    cache: RwLock<Cache>,
}

impl Loader {
    /// Creates a loader with the built-in field handlers and policies.
    ///
    /// # Arguments
    /// * `base_dir` - Directory relative paths are resolved against
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            fields: FieldRegistry::with_builtins(),
            policies: PolicyRegistry::new(),
            cache: RwLock::new(Cache::default()),
        }
    }

    /// Replaces the field registry.
    #[must_use]
    pub fn with_fields(mut self, fields: FieldRegistry) -> Self {
        self.fields = fields;
        self
    }

    /// Replaces the policy registry.
    #[must_use]
    pub fn with_policies(mut self, policies: PolicyRegistry) -> Self {
        self.policies = policies;
        self
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Loads a schema document.
    ///
    /// # Arguments
    /// * `path` - Document path, absolute or relative to the base directory
    /// * `reload` - Bypass the cache and replace its entry
    /// * `policy` - Name of the schema policy to parse with
    ///
    /// # Errors
    /// Returns `LoadError::Io` if the file cannot be read and
    /// `LoadError::Parse` if the document is invalid or the policy unknown.
    /// A failed load leaves the cache untouched.
    pub fn load_file(
        &self,
        path: impl AsRef<Path>,
        reload: bool,
        policy: &str,
    ) -> Result<Arc<SchemaModel>, LoadError> {
        let resolved = self.resolve(path.as_ref());
        let canonical = resolved
            .canonicalize()
            .map_err(|e| LoadError::io(&resolved, e))?;
        let key = (canonical, policy.to_string());

        if !reload {
            let hit = self.cache.read().models.get(&key).cloned();
            if let Some(model) = hit {
                tracing::debug!("Schema cache hit for {}", key.0.display());
                self.remember_alias(resolved, &key.0);
                return Ok(model);
            }
        }

        let policy_impl = self.policies.get(policy)?;
        let text = std::fs::read_to_string(&key.0).map_err(|e| LoadError::io(&key.0, e))?;
        let parsed = Parser::new(&self.fields, policy_impl.as_ref()).parse(&text)?;
        let model = Arc::new(parsed.model);

        tracing::info!(
            "Loaded {} schemata from {} ({} widget warnings)",
            model.len(),
            key.0.display(),
            parsed.warnings.len()
        );

        let mut cache = self.cache.write();
        cache.aliases.insert(resolved, key.0.clone());
        cache.models.insert(key, Arc::clone(&model));
        Ok(model)
    }

    /// Loads one schema out of a document.
    ///
    /// Uses the cache like [`load_file`](Self::load_file) without reload.
    ///
    /// # Arguments
    /// * `path` - Document path, absolute or relative to the base directory
    /// * `schema` - Schema name; `""` selects the default schema
    /// * `policy` - Name of the schema policy to parse with
    ///
    /// # Errors
    /// Returns `LoadError::SchemaNotFound` if the document has no such
    /// schema, or any error from loading the document.
    pub fn xml_schema(
        &self,
        path: impl AsRef<Path>,
        schema: &str,
        policy: &str,
    ) -> Result<Arc<Schema>, LoadError> {
        let model = self.load_file(path, false, policy)?;
        model
            .schema(schema)
            .cloned()
            .ok_or_else(|| LoadError::SchemaNotFound {
                name: schema.to_string(),
            })
    }

    /// Drops every cached model for a path.
    ///
    /// The path may be spelled any way it was loaded with, and the file no
    /// longer needs to exist. Returns true if anything was removed.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        let resolved = self.resolve(path.as_ref());

        let mut cache = self.cache.write();
        let canonical = match resolved.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => match cache.aliases.get(&resolved) {
                Some(canonical) => canonical.clone(),
                None => resolved,
            },
        };

        let before = cache.models.len();
        cache.models.retain(|(cached, _), _| *cached != canonical);
        cache.aliases.retain(|_, target| *target != canonical);
        before != cache.models.len()
    }

    /// Drops all cached models.
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        cache.models.clear();
        cache.aliases.clear();
    }

    /// Returns the number of cached models.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.read().models.len()
    }

    fn remember_alias(&self, resolved: PathBuf, canonical: &Path) {
        if self.cache.read().aliases.get(&resolved).map(PathBuf::as_path) == Some(canonical) {
            return;
        }
        self.cache
            .write()
            .aliases
            .insert(resolved, canonical.to_path_buf());
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("base_dir", &self.base_dir)
            .field("fields", &self.fields)
            .field("policies", &self.policies)
            .field("cached", &self.cached_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use supermodel_core::{ParseError, XmlNode};
    use supermodel_fields::CustomHandler;
    use supermodel_schema::{BaseLookup, SchemaPolicy};

    const PAGE_SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model xmlns="http://namespaces.supermodel.dev/schema">
    <schema>
        <textline name="title" required="true"/>
    </schema>
    <schema name="Teaser">
        <text name="summary" max_length="200"/>
    </schema>
</model>"#;

    struct UpperPolicy;

    impl SchemaPolicy for UpperPolicy {
        fn module(&self, _schema_name: &str, _tree: &XmlNode) -> String {
            "site.pages".to_string()
        }

        fn bases(
            &self,
            _schema_name: &str,
            _tree: &XmlNode,
            _lookup: &BaseLookup<'_>,
        ) -> Result<Vec<Arc<Schema>>, ParseError> {
            Ok(Vec::new())
        }

        fn name(&self, schema_name: &str, _tree: &XmlNode) -> String {
            schema_name.to_uppercase()
        }
    }

    fn fixture() -> (tempfile::TempDir, Loader) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("page.xml"), PAGE_SCHEMA).expect("Failed to write fixture");
        let loader = Loader::new(dir.path());
        (dir, loader)
    }

    #[test]
    fn test_load_file_relative_to_base_dir() {
        let (_dir, loader) = fixture();

        let model = loader.load_file("page.xml", false, "").expect("Failed to load");
        assert_eq!(model.len(), 2);
        assert!(model.default_schema().expect("default").has_field("title"));
        assert_eq!(loader.cached_len(), 1);
    }

    #[test]
    fn test_load_file_absolute_path() {
        let (dir, loader) = fixture();
        let elsewhere = Loader::new("/nonexistent-base");

        let absolute = dir.path().join("page.xml");
        assert!(elsewhere.load_file(&absolute, false, "").is_ok());
        assert!(loader.load_file(&absolute, false, "").is_ok());
    }

    #[test]
    fn test_load_file_is_cached() {
        let (dir, loader) = fixture();

        let first = loader.load_file("page.xml", false, "").expect("first load");
        let second = loader
            .load_file(dir.path().join("page.xml"), false, "")
            .expect("second load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached_len(), 1);
    }

    #[test]
    fn test_load_file_reload_refreshes_cache() {
        let (dir, loader) = fixture();

        let first = loader.load_file("page.xml", false, "").expect("first load");
        fs::write(
            dir.path().join("page.xml"),
            r#"<model><schema><bool name="draft"/></schema></model>"#,
        )
        .expect("Failed to rewrite fixture");

        let stale = loader.load_file("page.xml", false, "").expect("cached load");
        assert!(Arc::ptr_eq(&first, &stale));

        let fresh = loader.load_file("page.xml", true, "").expect("reload");
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert!(fresh.default_schema().expect("default").has_field("draft"));

        let cached = loader.load_file("page.xml", false, "").expect("cached load");
        assert!(Arc::ptr_eq(&fresh, &cached));
    }

    #[test]
    fn test_load_file_missing() {
        let (_dir, loader) = fixture();

        let err = loader.load_file("missing.xml", false, "").unwrap_err();
        assert!(matches!(err, LoadError::Io { ref path, .. } if path.ends_with("missing.xml")));
        assert_eq!(loader.cached_len(), 0);
    }

    #[test]
    fn test_load_file_invalid_document_not_cached() {
        let (dir, loader) = fixture();
        fs::write(dir.path().join("bad.xml"), "<model><schema></model>").expect("write");

        let err = loader.load_file("bad.xml", false, "").unwrap_err();
        assert!(matches!(err, LoadError::Parse(ref e) if e.is_syntax_error()));
        assert_eq!(loader.cached_len(), 0);
    }

    #[test]
    fn test_load_file_unknown_policy() {
        let (_dir, loader) = fixture();

        assert!(matches!(
            loader.load_file("page.xml", false, "strict"),
            Err(LoadError::Parse(ParseError::UnknownPolicy { .. }))
        ));
    }

    #[test]
    fn test_load_file_per_policy() {
        let (_dir, loader) = fixture();
        let mut policies = PolicyRegistry::new();
        policies.register("upper", UpperPolicy);
        let loader = loader.with_policies(policies);

        let plain = loader.load_file("page.xml", false, "").expect("default load");
        let upper = loader.load_file("page.xml", false, "upper").expect("upper load");

        assert!(plain.has_schema("Teaser"));
        assert!(upper.has_schema("TEASER"));
        assert_eq!(upper.schema("TEASER").expect("TEASER").module, "site.pages");
        assert_eq!(loader.cached_len(), 2);
    }

    #[test]
    fn test_load_file_with_custom_fields() {
        let (dir, loader) = fixture();
        fs::write(
            dir.path().join("rich.xml"),
            r#"<model><schema><richtext name="body"/></schema></model>"#,
        )
        .expect("write");

        assert!(loader.load_file("rich.xml", false, "").is_err());

        let mut fields = FieldRegistry::with_builtins();
        fields.register("richtext", CustomHandler);
        let loader = loader.with_fields(fields);
        assert!(loader.load_file("rich.xml", false, "").is_ok());
    }

    #[test]
    fn test_xml_schema() {
        let (_dir, loader) = fixture();

        let teaser = loader.xml_schema("page.xml", "Teaser", "").expect("Teaser");
        assert!(teaser.has_field("summary"));

        let default = loader.xml_schema("page.xml", "", "").expect("default");
        assert!(default.has_field("title"));
        assert_eq!(loader.cached_len(), 1);

        let err = loader.xml_schema("page.xml", "Missing", "").unwrap_err();
        assert!(matches!(err, LoadError::SchemaNotFound { ref name } if name == "Missing"));
    }

    #[cfg(unix)]
    #[test]
    fn test_invalidate_after_removal_through_symlink() {
        let (dir, loader) = fixture();
        fs::create_dir(dir.path().join("real")).expect("mkdir");
        fs::write(dir.path().join("real/page.xml"), PAGE_SCHEMA).expect("write");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link"))
            .expect("symlink");

        loader.load_file("link/page.xml", false, "").expect("load");
        loader.load_file("real/page.xml", false, "").expect("load");
        assert_eq!(loader.cached_len(), 1);

        fs::remove_file(dir.path().join("real/page.xml")).expect("remove");
        assert!(loader.invalidate("link/page.xml"));
        assert_eq!(loader.cached_len(), 0);
        assert!(!loader.invalidate("real/page.xml"));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (_dir, loader) = fixture();
        let mut policies = PolicyRegistry::new();
        policies.register("upper", UpperPolicy);
        let loader = loader.with_policies(policies);

        loader.load_file("page.xml", false, "").expect("load");
        loader.load_file("page.xml", false, "upper").expect("load");
        assert_eq!(loader.cached_len(), 2);

        assert!(loader.invalidate("page.xml"));
        assert!(!loader.invalidate("page.xml"));
        assert_eq!(loader.cached_len(), 0);

        loader.load_file("page.xml", false, "").expect("load");
        loader.clear();
        assert_eq!(loader.cached_len(), 0);
    }
}
