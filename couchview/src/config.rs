//! Loading of view definitions from JSON and YAML files.

use std::{collections::BTreeMap, ffi::OsStr, fs, path::Path, str::FromStr};

use eyre::{Result, WrapErr};
use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{Error, Language, QueryOptions, ViewOptions, ViewSpec};

/// The file formats from which definitions can be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupportedFormat {
    Json,
    Yaml,
}

impl FromStr for SupportedFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Ok(match lower.as_ref() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => return Err(Error::UnsupportedFileType(s.to_string())),
        })
    }
}

impl SupportedFormat {
    /// Determine the format of the given file from its extension.
    pub fn of_file(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_else(|| Error::CannotDetermineFileType(path.to_path_buf()))?;
        Self::from_str(ext).map_err(|e| Error::LoadFromFile(path.to_path_buf(), Box::new(e)))
    }

    /// Parse the given content in this format.
    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<T, Error> {
        Ok(match self {
            Self::Json => serde_json::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
        })
    }
}

/// Load a value of arbitrary type from the given file, detecting its format
/// from the file's extension.
pub fn load_from_file<T, P>(path: P) -> Result<T, Error>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let fmt = SupportedFormat::of_file(path)?;
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
    fmt.parse(&content)
        .map_err(|e| Error::LoadFromFile(path.to_path_buf(), Box::new(e)))
}

/// The definition of a single view within a [`DesignDefinition`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewDefinition {
    pub view: ViewOptions,
    pub query: QueryOptions,
}

/// The definitions of all of the views over a single model's documents.
///
/// ```yaml
/// model: User
/// views:
///   by_name:
///     view:
///       key: [last_name, first_name]
///     query:
///       include_docs: true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignDefinition {
    /// The class name with which the model's documents are tagged.
    pub model: String,
    #[serde(default)]
    pub views: BTreeMap<String, ViewDefinition>,
}

impl DesignDefinition {
    /// Load a design definition from the given JSON or YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let def: Self = load_from_file(path)?;
        debug!(
            "Loaded {} view(s) for {} from {}",
            def.views.len(),
            def.model,
            path.display()
        );
        Ok(def)
    }

    /// Build the spec for the view with the given name.
    pub fn view_spec<N: AsRef<str>>(&self, name: N) -> Result<ViewSpec, Error> {
        let name = name.as_ref();
        let def = self
            .views
            .get(name)
            .ok_or_else(|| Error::NoSuchView(self.model.clone(), name.to_string()))?;
        Ok(ViewSpec::new(
            &self.model,
            name,
            def.view.clone(),
            def.query.clone(),
        ))
    }

    /// Build the specs for all of this model's views, ordered by view name.
    pub fn view_specs(&self) -> Vec<ViewSpec> {
        self.views
            .iter()
            .map(|(name, def)| ViewSpec::new(&self.model, name, def.view.clone(), def.query.clone()))
            .collect()
    }

    /// Build the specs of the views that can be evaluated locally.
    ///
    /// If a view name is given, only that view's spec is returned, whatever
    /// its language. Otherwise views in languages other than JavaScript are
    /// skipped.
    pub fn evaluable_specs(&self, name: Option<&str>) -> Result<Vec<ViewSpec>, Error> {
        if let Some(name) = name {
            return Ok(vec![self.view_spec(name)?]);
        }
        Ok(self
            .view_specs()
            .into_iter()
            .filter(|spec| {
                if spec.language() == Language::JavaScript {
                    return true;
                }
                warn!(
                    "Skipping view {} of {}: {} map functions cannot be evaluated locally",
                    spec.view_name(),
                    self.model,
                    spec.language()
                );
                false
            })
            .collect())
    }
}

/// Load the design definitions from all files matching the given glob
/// patterns.
pub fn load_definitions<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<DesignDefinition>> {
    let mut defs = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let paths = glob::glob(pattern)
            .map_err(|e| Error::SourceFilePattern(pattern.to_string(), e))?;
        for entry in paths {
            let path = entry.map_err(Error::SourceIter)?;
            if !path.is_file() {
                continue;
            }
            let def = DesignDefinition::load_from_file(&path)
                .wrap_err_with(|| format!("failed to load definitions from {}", path.display()))?;
            defs.push(def);
        }
    }
    Ok(defs)
}
