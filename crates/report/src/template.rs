//! Templates: the ordered plot configurations of a report, without results.

use crate::config::PlotConfig;
use crate::error::{ReportError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Template file encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Json,
    Yaml,
}

impl TemplateFormat {
    /// Pick the format from a file extension: `yaml`/`yml` or JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => TemplateFormat::Yaml,
            _ => TemplateFormat::Json,
        }
    }
}

/// An ordered list of plot configurations that can be replayed against a
/// new dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template {
    configs: Vec<PlotConfig>,
}

impl Template {
    pub fn new(configs: Vec<PlotConfig>) -> Self {
        Self { configs }
    }

    pub fn configs(&self) -> &[PlotConfig] {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let template: Self = serde_json::from_str(json)?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let template: Self = serde_yaml::from_str(yaml)?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load a template, choosing the format by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let template = match TemplateFormat::from_path(path) {
            TemplateFormat::Json => Self::from_json(&content)?,
            TemplateFormat::Yaml => Self::from_yaml(&content)?,
        };
        info!(path = %path.display(), entries = template.len(), "loaded template");
        Ok(template)
    }

    /// Save the template, choosing the format by extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match TemplateFormat::from_path(path) {
            TemplateFormat::Json => self.to_json()?,
            TemplateFormat::Yaml => self.to_yaml()?,
        };
        fs::write(path, content)?;
        info!(path = %path.display(), entries = self.len(), "saved template");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (index, config) in self.configs.iter().enumerate() {
            if config.column_dimensions.is_empty() {
                return Err(ReportError::Template(format!(
                    "entry {index} ('{}') has no column dimensions",
                    config.row_dimension
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<PlotConfig> for Template {
    fn from_iter<I: IntoIterator<Item = PlotConfig>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Download name of a template: `{name}_{ddmmyyyy}.json`.
pub fn template_file_name(name: &str, date: NaiveDate) -> String {
    format!("{name}_{}.json", date.format("%d%m%Y"))
}
