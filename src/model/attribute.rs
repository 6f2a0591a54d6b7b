// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Attribute fields: in-memory, per-document values.
//!
//! Derivation asks two things of them: is this field an attribute (which
//! decides between index-field and attribute-field native tables), and which
//! attributes are tensors (their types are emitted as rank properties).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Collection kind of an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    #[default]
    Single,
    Array,
    WeightedSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub collection: CollectionType,
    #[serde(default = "default_value_type")]
    pub value_type: String,
    /// Set for tensor attributes, e.g. `tensor<float>(x[128])`.
    #[serde(default)]
    pub tensor_type: Option<String>,
}

fn default_value_type() -> String {
    "string".to_string()
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: CollectionType::Single,
            value_type: default_value_type(),
            tensor_type: None,
        }
    }

    pub fn tensor(name: impl Into<String>, tensor_type: impl Into<String>) -> Self {
        Self {
            tensor_type: Some(tensor_type.into()),
            value_type: "tensor".to_string(),
            ..Self::new(name)
        }
    }
}

/// All attributes of a schema, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct AttributeFields {
    attributes: BTreeMap<String, Attribute>,
}

impl AttributeFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attribute: Attribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn is_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Tensor attributes and their types, sorted by name.
    pub fn tensor_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .values()
            .filter_map(|a| a.tensor_type.as_deref().map(|t| (a.name.as_str(), t)))
    }
}

impl FromIterator<Attribute> for AttributeFields {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut fields = Self::new();
        for attribute in iter {
            fields.add(attribute);
        }
        fields
    }
}

impl From<Vec<Attribute>> for AttributeFields {
    fn from(attributes: Vec<Attribute>) -> Self {
        attributes.into_iter().collect()
    }
}

impl From<AttributeFields> for Vec<Attribute> {
    fn from(fields: AttributeFields) -> Self {
        fields.attributes.into_values().collect()
    }
}
