//! Material records and their create/update payloads.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{Error, Result};

/// A stored catalog material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    #[cfg_attr(feature = "openapi", schema(example = "0b9e7a52-3f1c-4d55-9a57-2f4f5f1f0c11"))]
    pub id: String,
    #[cfg_attr(feature = "openapi", schema(example = "MAT-1001"))]
    pub material_id: String,
    pub style_no: String,
    pub style_name: String,
    pub vendor: String,
    pub tat: String,
    pub imported: String,
    pub location: String,
    #[cfg_attr(feature = "openapi", schema(example = "Cotton Knit Blend"))]
    pub material_composition: String,
    pub weight: String,
    pub cost: String,
    pub moq: String,
    #[serde(rename = "type")]
    pub material_type: String,
    pub subtype: String,
    pub segment: String,
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub features: Vec<String>,
}

impl Material {
    /// Build a stored record from a create payload and a fresh identifier.
    pub fn from_new(id: String, new: NewMaterial) -> Self {
        Self {
            id,
            material_id: new.material_id,
            style_no: new.style_no,
            style_name: new.style_name,
            vendor: new.vendor,
            tat: new.tat,
            imported: new.imported,
            location: new.location,
            material_composition: new.material_composition,
            weight: new.weight,
            cost: new.cost,
            moq: new.moq,
            material_type: new.material_type,
            subtype: new.subtype,
            segment: new.segment,
            images: new.images,
            colors: new.colors,
            features: new.features,
        }
    }

    /// Values held by `column`. Scalar columns yield a single element.
    pub fn values(&self, column: Column) -> &[String] {
        match column {
            Column::MaterialId => std::slice::from_ref(&self.material_id),
            Column::StyleNo => std::slice::from_ref(&self.style_no),
            Column::StyleName => std::slice::from_ref(&self.style_name),
            Column::Vendor => std::slice::from_ref(&self.vendor),
            Column::Tat => std::slice::from_ref(&self.tat),
            Column::Imported => std::slice::from_ref(&self.imported),
            Column::Location => std::slice::from_ref(&self.location),
            Column::MaterialComposition => std::slice::from_ref(&self.material_composition),
            Column::Weight => std::slice::from_ref(&self.weight),
            Column::Cost => std::slice::from_ref(&self.cost),
            Column::Moq => std::slice::from_ref(&self.moq),
            Column::Type => std::slice::from_ref(&self.material_type),
            Column::Subtype => std::slice::from_ref(&self.subtype),
            Column::Segment => std::slice::from_ref(&self.segment),
            Column::Images => &self.images,
            Column::Colors => &self.colors,
            Column::Features => &self.features,
        }
    }

    /// Merge the fields present in `patch` into this record.
    pub fn apply(&mut self, patch: MaterialPatch) {
        fn merge<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        merge(&mut self.material_id, patch.material_id);
        merge(&mut self.style_no, patch.style_no);
        merge(&mut self.style_name, patch.style_name);
        merge(&mut self.vendor, patch.vendor);
        merge(&mut self.tat, patch.tat);
        merge(&mut self.imported, patch.imported);
        merge(&mut self.location, patch.location);
        merge(&mut self.material_composition, patch.material_composition);
        merge(&mut self.weight, patch.weight);
        merge(&mut self.cost, patch.cost);
        merge(&mut self.moq, patch.moq);
        merge(&mut self.material_type, patch.material_type);
        merge(&mut self.subtype, patch.subtype);
        merge(&mut self.segment, patch.segment);
        merge(&mut self.images, patch.images);
        merge(&mut self.colors, patch.colors);
        merge(&mut self.features, patch.features);
    }
}

/// Payload for creating a material. Omitted attributes default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct NewMaterial {
    #[cfg_attr(feature = "openapi", schema(example = "MAT-1001"))]
    #[serde(deserialize_with = "lenient_string")]
    pub material_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub style_no: String,
    #[serde(deserialize_with = "lenient_string")]
    pub style_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub vendor: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tat: String,
    #[serde(deserialize_with = "lenient_string")]
    pub imported: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub material_composition: String,
    #[serde(deserialize_with = "lenient_string")]
    pub weight: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cost: String,
    #[serde(deserialize_with = "lenient_string")]
    pub moq: String,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "lenient_string")]
    pub material_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub subtype: String,
    #[serde(deserialize_with = "lenient_string")]
    pub segment: String,
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub features: Vec<String>,
}

impl NewMaterial {
    /// Shorthand used by tests and seeding code.
    pub fn with_id(material_id: impl Into<String>) -> Self {
        Self {
            material_id: material_id.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_material_id(&self.material_id)
    }
}

/// Partial update: only the fields present are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub material_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub style_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub style_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub tat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub imported: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub material_composition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub moq: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub material_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient_opt_string")]
    pub segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl MaterialPatch {
    pub fn validate(&self) -> Result<()> {
        match &self.material_id {
            Some(material_id) => validate_material_id(material_id),
            None => Ok(()),
        }
    }
}

fn validate_material_id(material_id: &str) -> Result<()> {
    if material_id.trim().is_empty() {
        return Err(Error::Validation("materialId must not be empty".into()));
    }
    Ok(())
}

/// Text attributes accept JSON numbers and booleans as well as strings, so
/// `"weight": 12` stores `"12"`. `null` reads as empty.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

/// As [`lenient_string`], with `null` meaning "leave unchanged".
fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(de::Error::custom(format!("expected a string, found {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_material_defaults_missing_fields() {
        let new: NewMaterial = serde_json::from_value(json!({
            "materialId": "MAT-1",
            "type": "Knit",
            "colors": ["red"],
            "unknownField": 42
        }))
        .unwrap();

        assert_eq!(new.material_id, "MAT-1");
        assert_eq!(new.material_type, "Knit");
        assert_eq!(new.colors, vec!["red"]);
        assert!(new.vendor.is_empty());
        assert!(new.features.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_material_id() {
        assert!(NewMaterial::with_id("  ").validate().is_err());
        assert!(NewMaterial::with_id("MAT-1").validate().is_ok());

        let patch = MaterialPatch {
            material_id: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(MaterialPatch::default().validate().is_ok());
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut material = Material::from_new(
            "id-1".into(),
            NewMaterial {
                vendor: "Acme".into(),
                colors: vec!["red".into()],
                ..NewMaterial::with_id("MAT-1")
            },
        );

        material.apply(MaterialPatch {
            style_name: Some("Jersey".into()),
            colors: Some(vec!["blue".into(), "green".into()]),
            ..Default::default()
        });

        assert_eq!(material.id, "id-1");
        assert_eq!(material.material_id, "MAT-1");
        assert_eq!(material.vendor, "Acme");
        assert_eq!(material.style_name, "Jersey");
        assert_eq!(material.colors, vec!["blue", "green"]);
    }

    #[test]
    fn test_serializes_camel_case_with_underscore_id() {
        let material = Material::from_new("id-1".into(), NewMaterial::with_id("MAT-1"));
        let value = serde_json::to_value(&material).unwrap();

        assert_eq!(value["_id"], "id-1");
        assert_eq!(value["materialId"], "MAT-1");
        assert!(value.get("type").is_some());
        assert!(value.get("materialComposition").is_some());
    }

    #[test]
    fn test_values_by_column() {
        let material = Material::from_new(
            "id-1".into(),
            NewMaterial {
                segment: "Womens".into(),
                features: vec!["stretch".into(), "breathable".into()],
                ..NewMaterial::with_id("MAT-1")
            },
        );

        assert_eq!(material.values(Column::Segment), ["Womens"]);
        assert_eq!(material.values(Column::Features), ["stretch", "breathable"]);
        assert_eq!(material.values(Column::MaterialId), ["MAT-1"]);
    }

    #[test]
    fn test_scalar_numbers_read_as_text() {
        let new: NewMaterial = serde_json::from_value(json!({
            "materialId": 1001,
            "weight": 12,
            "cost": 4.5,
            "imported": true,
            "moq": null
        }))
        .unwrap();

        assert_eq!(new.material_id, "1001");
        assert_eq!(new.weight, "12");
        assert_eq!(new.cost, "4.5");
        assert_eq!(new.imported, "true");
        assert_eq!(new.moq, "");

        let patch: MaterialPatch = serde_json::from_value(json!({"weight": 14, "cost": null})).unwrap();
        assert_eq!(patch.weight.as_deref(), Some("14"));
        assert_eq!(patch.cost, None);

        assert!(serde_json::from_value::<NewMaterial>(json!({"weight": {"kg": 1}})).is_err());
        assert!(serde_json::from_value::<MaterialPatch>(json!({"vendor": ["Acme"]})).is_err());
    }
}
