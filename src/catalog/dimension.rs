//! Dimension and dimension field types

use std::hash::{Hash, Hasher};
use serde::Deserialize;

/// A grouping dimension with its selectable display fields
///
/// Identity is the dimension name: two dimensions with the same name are the
/// same dimension as far as request sets and maps are concerned.
#[derive(Debug, Deserialize)]
pub struct Dimension {
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Either an explicit field list or the name of a catalog field set
    pub fields: DimensionFields,
    /// Fields shown when a request has no show clause. Defaults to all fields.
    #[serde(rename = "defaultFields")]
    pub default_fields: Option<Vec<String>>,
    /// Non-aggregatable dimensions must be grouped or filtered to one value
    #[serde(default = "default_aggregatable")]
    pub aggregatable: bool,
}

fn default_aggregatable() -> bool {
    true
}

/// Field configuration of a dimension
///
/// In YAML this is either a string naming a field set template:
///
/// ```yaml
/// fields: standard
/// ```
///
/// or an explicit list of names or `{name, description}` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DimensionFields {
    Template(String),
    List(Vec<DimensionField>),
}

/// A single display field of a dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "FieldConfig")]
pub struct DimensionField {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldConfig {
    Name(String),
    Full {
        name: String,
        description: Option<String>,
    },
}

impl From<FieldConfig> for DimensionField {
    fn from(config: FieldConfig) -> Self {
        match config {
            FieldConfig::Name(name) => DimensionField { name, description: None },
            FieldConfig::Full { name, description } => DimensionField { name, description },
        }
    }
}

impl DimensionField {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None }
    }
}

impl Dimension {
    /// Get all fields in declaration order
    ///
    /// Empty for a dimension whose template has not been linked yet.
    pub fn fields(&self) -> &[DimensionField] {
        match &self.fields {
            DimensionFields::List(fields) => fields,
            DimensionFields::Template(_) => &[],
        }
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&DimensionField> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Fields shown when no show clause is given
    pub fn default_fields(&self) -> Vec<&DimensionField> {
        match &self.default_fields {
            Some(names) => names.iter().filter_map(|n| self.get_field(n)).collect(),
            None => self.fields().iter().collect(),
        }
    }

    /// Get all field names
    pub fn field_names(&self) -> Vec<&str> {
        self.fields().iter().map(|f| f.name.as_str()).collect()
    }

    pub fn is_aggregatable(&self) -> bool {
        self.aggregatable
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Dimension {}

impl Hash for Dimension {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_shorthand_and_objects() {
        let yaml = r#"
name: region
fields:
  - id
  - name: desc
    description: Region description
defaultFields: [id]
"#;
        let dim: Dimension = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(dim.field_names(), vec!["id", "desc"]);
        assert_eq!(dim.get_field("desc").unwrap().description.as_deref(), Some("Region description"));
        assert_eq!(dim.default_fields(), vec![&DimensionField::new("id")]);
        assert!(dim.is_aggregatable());
    }

    #[test]
    fn test_default_fields_fall_back_to_all() {
        let dim: Dimension = serde_yaml::from_str("name: product\nfields: [id, desc]").unwrap();
        assert_eq!(dim.default_fields().len(), 2);
    }

    #[test]
    fn test_template_has_no_fields_until_linked() {
        let dim: Dimension = serde_yaml::from_str("name: product\nfields: standard").unwrap();
        assert!(matches!(dim.fields, DimensionFields::Template(ref t) if t == "standard"));
        assert!(dim.fields().is_empty());
    }
}
