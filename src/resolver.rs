//! Configuration Resolver
//!
//! Composes a root document with the documents named in its `defaults` list (depth-first,
//! in list order, the document's own body last unless `_self_` says otherwise), applies
//! overrides, then substitutes interpolation expressions against the merged result.
//!
//! Resolution is a pure function of the documents the loader serves: no caches, no global
//! state. Independent roots can be resolved concurrently from the same loader.

use crate::document::{
    group_dir_of, normalize_name, ConfigDocument, DefaultEntry, PackageDirective,
};
use crate::error::ConfigError;
use crate::interpolation::Interpolator;
use crate::loader::DocumentLoader;
use crate::overrides::{apply_overrides, Override};
use crate::resolved::ResolvedConfig;
use crate::value::Value;
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Merged tree of a root document before interpolation.
#[derive(Debug, Clone)]
pub struct Composition {
    pub name: String,
    pub package: Vec<String>,
    pub tree: Value,
    /// Documents merged, in merge order.
    pub sources: Vec<String>,
}

/// Resolves config documents served by a [`DocumentLoader`].
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    loader: &'a dyn DocumentLoader,
}

impl<'a> Resolver<'a> {
    pub fn new(loader: &'a dyn DocumentLoader) -> Self {
        Self { loader }
    }

    /// Resolve a root document by logical name (`data/era5_hpx32`).
    pub fn resolve(&self, name: &str) -> Result<ResolvedConfig, ConfigError> {
        self.resolve_with_overrides(name, &[])
    }

    /// Resolve a root document, applying overrides after composition and before interpolation.
    pub fn resolve_with_overrides(
        &self,
        name: &str,
        overrides: &[Override],
    ) -> Result<ResolvedConfig, ConfigError> {
        let Composition {
            name,
            package,
            mut tree,
            sources,
        } = self.compose(name)?;

        apply_overrides(&mut tree, &package, overrides)?;

        let resolved = Interpolator::new(&tree, &package, &name).resolve_all()?;
        let Value::Mapping(root) = resolved else {
            return Err(ConfigError::malformed(&name, "resolved document is not a mapping"));
        };
        debug!(document = %name, sources = sources.len(), keys = root.len(), "Resolved config");
        Ok(ResolvedConfig::new(name, package, root, sources))
    }

    /// Merge a root document with its defaults, without interpolating.
    pub fn compose(&self, name: &str) -> Result<Composition, ConfigError> {
        let name = normalize_name(name);
        let mut composer = Composer::new(self.loader);
        let root = composer
            .load_document(&name)?
            .ok_or_else(|| ConfigError::DocumentNotFound(name.clone()))?;

        let package = match root.package() {
            PackageDirective::Path(path) => path.clone(),
            PackageDirective::Here | PackageDirective::Group => group_dir_of(&name)
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        };

        composer.collect_choices(&root)?;
        let tree = composer.compose(&root)?;
        composer.check_overrides_used()?;

        Ok(Composition {
            name,
            package,
            tree,
            sources: composer.sources,
        })
    }
}

/// Resolve `name` with `loader`.
pub fn resolve(loader: &dyn DocumentLoader, name: &str) -> Result<ResolvedConfig, ConfigError> {
    Resolver::new(loader).resolve(name)
}

/// Group choice set by an `override group: variant` entry, keyed by full group path.
struct Choice {
    variant: Option<String>,
    declared_in: String,
    used: bool,
}

/// Per-call composition state.
struct Composer<'a> {
    loader: &'a dyn DocumentLoader,
    stack: Vec<String>,
    sources: Vec<String>,
    choices: IndexMap<String, Choice>,
}

impl<'a> Composer<'a> {
    fn new(loader: &'a dyn DocumentLoader) -> Self {
        Self {
            loader,
            stack: Vec::new(),
            sources: Vec::new(),
            choices: IndexMap::new(),
        }
    }

    fn load_document(&self, name: &str) -> Result<Option<ConfigDocument>, ConfigError> {
        self.loader
            .load(name)?
            .map(ConfigDocument::from_loaded)
            .transpose()
    }

    fn exists(&self, name: &str) -> Result<bool, ConfigError> {
        Ok(self.loader.load(name)?.is_some())
    }

    /// Find a referenced document: beside the referencing document first, then at the root.
    /// A leading `/` skips the relative lookup.
    fn locate(&self, parent_dir: &str, reference: &str) -> Result<Option<ConfigDocument>, ConfigError> {
        let absolute = reference.starts_with('/');
        let reference = normalize_name(reference);
        if !absolute && !parent_dir.is_empty() {
            let relative = format!("{}/{}", parent_dir, reference);
            if let Some(doc) = self.load_document(&relative)? {
                return Ok(Some(doc));
            }
        }
        self.load_document(&reference)
    }

    /// Full path of `group` as referenced from a document in `parent_dir`.
    ///
    /// Relative groups live beside the referencing document unless only the root holds
    /// `variant`; a leading `/` always means the root.
    fn group_path(
        &self,
        parent_dir: &str,
        group: &str,
        variant: Option<&str>,
    ) -> Result<String, ConfigError> {
        if group.starts_with('/') {
            return Ok(normalize_name(group));
        }
        let group = normalize_name(group);
        if parent_dir.is_empty() {
            return Ok(group);
        }
        let relative = format!("{}/{}", parent_dir, group);
        if let Some(variant) = variant {
            let variant = normalize_name(variant);
            if !self.exists(&format!("{}/{}", relative, variant))?
                && self.exists(&format!("{}/{}", group, variant))?
            {
                return Ok(group);
            }
        }
        Ok(relative)
    }

    /// Record every `override` entry reachable through the defaults tree.
    ///
    /// Repeats until no walk adds a choice, since an override can select a document that
    /// declares overrides of its own. The first declaration of a group path wins.
    fn collect_choices(&mut self, root: &ConfigDocument) -> Result<(), ConfigError> {
        loop {
            let before = self.choices.len();
            let mut visiting = Vec::new();
            self.collect_from(root, &mut visiting)?;
            if self.choices.len() == before {
                return Ok(());
            }
        }
    }

    fn collect_from(
        &mut self,
        doc: &ConfigDocument,
        visiting: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        if visiting.iter().any(|name| name == doc.name()) {
            return Ok(());
        }
        visiting.push(doc.name().to_string());

        for entry in doc.defaults() {
            if let DefaultEntry::Override { group, variant } = entry {
                let path = self.group_path(doc.group_dir(), group, variant.as_deref())?;
                if !self.choices.contains_key(&path) {
                    trace!(document = %doc.name(), group = %path, "Registered group override");
                    self.choices.insert(
                        path,
                        Choice {
                            variant: variant.clone(),
                            declared_in: doc.display_location(),
                            used: false,
                        },
                    );
                }
            }
        }

        for entry in doc.defaults() {
            let child = match entry {
                DefaultEntry::Group { group, variant, .. } => {
                    let path = self.group_path(doc.group_dir(), group, Some(variant.as_str()))?;
                    let variant = match self.choices.get(&path) {
                        Some(choice) => match &choice.variant {
                            Some(variant) => variant.clone(),
                            None => continue,
                        },
                        None => variant.clone(),
                    };
                    self.locate(doc.group_dir(), &format!("{}/{}", group, variant))?
                }
                DefaultEntry::Named(reference) => self.locate(doc.group_dir(), reference)?,
                _ => continue,
            };
            // Missing documents are reported by the merge pass.
            if let Some(child) = child {
                self.collect_from(&child, visiting)?;
            }
        }

        visiting.pop();
        Ok(())
    }

    /// Variant to use for the group at `path`, honoring `override` entries.
    /// `None` means the group was disabled.
    fn choose(&mut self, path: &str, variant: &str) -> Option<String> {
        match self.choices.get_mut(path) {
            Some(choice) => {
                choice.used = true;
                choice.variant.clone()
            }
            None => Some(variant.to_string()),
        }
    }

    fn compose(&mut self, doc: &ConfigDocument) -> Result<Value, ConfigError> {
        let name = doc.name().to_string();
        if self.stack.contains(&name) {
            let mut chain = self.stack.clone();
            chain.push(name);
            return Err(ConfigError::DefaultsCycle { chain });
        }
        self.stack.push(name.clone());
        debug!(document = %name, defaults = doc.defaults().len(), "Composing config document");

        let mut merged = Value::empty_mapping();
        let mut self_merged = false;

        for entry in doc.defaults() {
            match entry {
                DefaultEntry::SelfBody => {
                    merged.merge(Value::Mapping(doc.body().clone()));
                    self_merged = true;
                }
                DefaultEntry::Override { .. } => {}
                DefaultEntry::Disabled { group } => {
                    trace!(document = %name, group = %group, "Skipping disabled default");
                }
                DefaultEntry::Group {
                    group,
                    variant,
                    optional,
                } => {
                    let path = self.group_path(doc.group_dir(), group, Some(variant.as_str()))?;
                    let Some(variant) = self.choose(&path, variant) else {
                        trace!(document = %name, group = %path, "Default disabled by override");
                        continue;
                    };
                    let reference = format!("{}/{}", group, variant);
                    match self.locate(doc.group_dir(), &reference)? {
                        Some(child) => {
                            let content = self.compose(&child)?;
                            merged.merge(place(content, child.package(), group));
                        }
                        None if *optional => {
                            debug!(document = %name, group = %group, variant = %variant, "Optional default not found");
                        }
                        None => {
                            return Err(ConfigError::MissingDefault {
                                group: group.clone(),
                                variant,
                                referenced_from: doc.display_location(),
                            })
                        }
                    }
                }
                DefaultEntry::Named(reference) => match self.locate(doc.group_dir(), reference)? {
                    Some(child) => {
                        let content = self.compose(&child)?;
                        merged.merge(place(content, child.package(), group_dir_of(reference)));
                    }
                    None => {
                        let normalized = normalize_name(reference);
                        let (group, variant) = match normalized.rsplit_once('/') {
                            Some((group, variant)) => (group.to_string(), variant.to_string()),
                            None => (String::new(), normalized.clone()),
                        };
                        return Err(ConfigError::MissingDefault {
                            group,
                            variant,
                            referenced_from: doc.display_location(),
                        });
                    }
                },
            }
        }

        if !self_merged {
            merged.merge(Value::Mapping(doc.body().clone()));
        }

        self.stack.pop();
        self.sources.push(name);
        Ok(merged)
    }

    fn check_overrides_used(&self) -> Result<(), ConfigError> {
        match self.choices.iter().find(|(_, choice)| !choice.used) {
            Some((group, choice)) => Err(ConfigError::malformed(
                &choice.declared_in,
                format!("override of '{}' matched no defaults entry", group),
            )),
            None => Ok(()),
        }
    }
}

/// Position a default's content according to its package directive.
fn place(content: Value, package: &PackageDirective, group: &str) -> Value {
    match package {
        PackageDirective::Here => content,
        PackageDirective::Group => {
            let segments: Vec<String> = group
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            content.nest_under(&segments)
        }
        PackageDirective::Path(path) => content.nest_under(path),
    }
}
