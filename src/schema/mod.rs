mod load;

use serde::Deserialize;

pub use load::{SchemaError, SchemaSource, load_schema};

const RELATION_MARKER: &str = "@relation";
const MANY_MARKER: &str = "[]";
const OPTIONAL_MARKER: &str = "?";
const PRIMARY_KEY_ATTRIBUTE: &str = "@id";
const UNIQUE_ATTRIBUTE: &str = "@unique";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub models: Vec<Model>,
}

impl Schema {
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.model(name).is_some()
    }

    pub fn field_count(&self) -> usize {
        self.models.iter().map(|model| model.fields.len()).sum()
    }

    pub fn relation_count(&self) -> usize {
        self.models.iter().map(|model| model.relations.len()).sum()
    }

    /// Models whose name or any field name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        self.models
            .iter()
            .filter(|model| {
                model.name.to_lowercase().contains(&needle)
                    || model
                        .fields
                        .iter()
                        .any(|field| field.name.to_lowercase().contains(&needle))
            })
            .map(|model| model.name.as_str())
            .collect()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub unique_constraints: Vec<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diagrams: Vec<Diagram>,
}

impl Model {
    pub fn primary_key(&self) -> &str {
        self.fields
            .iter()
            .find(|field| field.is_primary_key())
            .map(|field| field.name.as_str())
            .unwrap_or("id")
    }

    pub fn overview(&self) -> String {
        self.description.clone().unwrap_or_else(|| {
            format!(
                "The {} model is part of the database schema. It contains fields for storing data and relationships with other models.",
                self.name
            )
        })
    }

    pub fn diagrams_or_default(&self) -> Vec<Diagram> {
        if !self.diagrams.is_empty() {
            return self.diagrams.clone();
        }

        vec![Diagram {
            title: format!("{} Entity Diagram", self.name),
            description: format!(
                "Basic entity relationship diagram for the {} model and its direct relationships.",
                self.name
            ),
        }]
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Field {
    pub fn is_primary_key(&self) -> bool {
        self.attributes
            .iter()
            .any(|attribute| attribute.contains(PRIMARY_KEY_ATTRIBUTE))
    }

    pub fn is_unique(&self) -> bool {
        self.attributes
            .iter()
            .any(|attribute| attribute.contains(UNIQUE_ATTRIBUTE))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Relation {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub attribute: String,
}

impl Relation {
    pub fn is_graph_relation(&self) -> bool {
        self.attribute.contains(RELATION_MARKER)
    }

    /// Target model name with every cardinality marker removed.
    pub fn target(&self) -> String {
        self.ty.replace(MANY_MARKER, "").replace(OPTIONAL_MARKER, "")
    }

    pub fn cardinality(&self) -> Cardinality {
        Cardinality::from_type(&self.ty)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Diagram {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ToMany,
    OptionalToOne,
    ToOne,
}

impl Cardinality {
    pub fn from_type(ty: &str) -> Self {
        if ty.contains(MANY_MARKER) {
            Self::ToMany
        } else if ty.contains(OPTIONAL_MARKER) {
            Self::OptionalToOne
        } else {
            Self::ToOne
        }
    }

    pub fn is_to_many(self) -> bool {
        self == Self::ToMany
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ToMany => "One-to-Many",
            Self::OptionalToOne => "One-to-One (Optional)",
            Self::ToOne => "One-to-One",
        }
    }
}

/// Coarse family of a declared field type, used for coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClass {
    Text,
    Numeric,
    Temporal,
    Boolean,
    Enumeration,
    List,
    Other,
}

impl TypeClass {
    pub fn of(ty: &str) -> Self {
        if ty.contains("String") {
            Self::Text
        } else if ["Int", "Float", "number", "int"]
            .iter()
            .any(|marker| ty.contains(marker))
        {
            Self::Numeric
        } else if ty.contains("Date") {
            Self::Temporal
        } else if ty.contains("Boolean") || ty.contains("boolean") {
            Self::Boolean
        } else if ty.starts_with('\'') || ty.contains('|') {
            Self::Enumeration
        } else if ty.contains(MANY_MARKER) {
            Self::List
        } else {
            Self::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(ty: &str, attribute: &str) -> Relation {
        Relation {
            name: "link".to_owned(),
            ty: ty.to_owned(),
            attribute: attribute.to_owned(),
        }
    }

    #[test]
    fn cardinality_follows_type_markers() {
        assert_eq!(Cardinality::from_type("Post[]"), Cardinality::ToMany);
        assert_eq!(Cardinality::from_type("Profile?"), Cardinality::OptionalToOne);
        assert_eq!(Cardinality::from_type("User"), Cardinality::ToOne);
        assert_eq!(Cardinality::from_type(""), Cardinality::ToOne);
    }

    #[test]
    fn relation_target_strips_markers() {
        assert_eq!(relation("Post[]", "").target(), "Post");
        assert_eq!(relation("Profile?", "").target(), "Profile");
        assert_eq!(relation("Team[]?", "").target(), "Team");
    }

    #[test]
    fn only_marked_relations_are_graphed() {
        assert!(relation("User", "@relation(fields: [userId])").is_graph_relation());
        assert!(!relation("User", "").is_graph_relation());
    }

    #[test]
    fn primary_key_falls_back_to_id() {
        let mut model = Model {
            name: "Branch".to_owned(),
            fields: vec![Field {
                name: "code".to_owned(),
                ty: "String".to_owned(),
                attributes: vec!["@unique".to_owned()],
            }],
            ..Model::default()
        };
        assert_eq!(model.primary_key(), "id");
        assert!(model.fields[0].is_unique());

        model.fields.push(Field {
            name: "branchId".to_owned(),
            ty: "Int".to_owned(),
            attributes: vec!["@id".to_owned(), "@default(autoincrement())".to_owned()],
        });
        assert_eq!(model.primary_key(), "branchId");
    }

    #[test]
    fn overview_and_diagrams_have_fallbacks() {
        let model = Model {
            name: "TaxCenter".to_owned(),
            ..Model::default()
        };
        assert!(model.overview().starts_with("The TaxCenter model"));
        let diagrams = model.diagrams_or_default();
        assert_eq!(diagrams.len(), 1);
        assert_eq!(diagrams[0].title, "TaxCenter Entity Diagram");
    }

    #[test]
    fn type_classes() {
        assert_eq!(TypeClass::of("String?"), TypeClass::Text);
        assert_eq!(TypeClass::of("Int"), TypeClass::Numeric);
        assert_eq!(TypeClass::of("DateTime"), TypeClass::Temporal);
        assert_eq!(TypeClass::of("Boolean"), TypeClass::Boolean);
        assert_eq!(TypeClass::of("'ACTIVE' | 'INACTIVE'"), TypeClass::Enumeration);
        assert_eq!(TypeClass::of("Employee[]"), TypeClass::List);
        assert_eq!(TypeClass::of("Json"), TypeClass::Other);
    }

    #[test]
    fn search_matches_model_and_field_names() {
        let schema = Schema {
            models: vec![
                Model {
                    name: "Employee".to_owned(),
                    fields: vec![Field {
                        name: "salary".to_owned(),
                        ty: "Float".to_owned(),
                        attributes: Vec::new(),
                    }],
                    ..Model::default()
                },
                Model {
                    name: "Branch".to_owned(),
                    ..Model::default()
                },
            ],
        };

        assert_eq!(schema.search("EMP"), vec!["Employee"]);
        assert_eq!(schema.search("sal"), vec!["Employee"]);
        assert_eq!(schema.search("an"), vec!["Branch"]);
        assert!(schema.search("zz").is_empty());
    }
}
