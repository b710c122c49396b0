//! Airtable metadata API shapes (tables, fields, views).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub views: Vec<ViewSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Option<Value>,
}

impl FieldSchema {
    /// Choice names of a single/multiple select field.
    pub fn select_choices(&self) -> Option<Vec<String>> {
        if self.field_type != "singleSelect" && self.field_type != "multipleSelects" {
            return None;
        }
        let choices = self.options.as_ref()?.get("choices")?.as_array()?;
        Some(
            choices
                .iter()
                .filter_map(|c| c.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_required(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.get("isRequired"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Decimal places configured on a number field (`precision`, else `decimals`).
    pub fn decimals(&self) -> Option<u64> {
        let options = self.options.as_ref()?;
        options
            .get("precision")
            .and_then(Value::as_u64)
            .or_else(|| options.get("decimals").and_then(Value::as_u64))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSchema {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub visible_field_ids: Option<Vec<String>>,
    #[serde(default)]
    pub view_column_specs: Option<Vec<Value>>,
}

impl ViewSchema {
    /// Visible field ids embedded in the table listing, when Airtable includes them.
    pub fn embedded_field_ids(&self) -> Option<Vec<String>> {
        if let Some(ids) = self.visible_field_ids.as_ref().filter(|ids| !ids.is_empty()) {
            return Some(ids.clone());
        }
        let specs = self.view_column_specs.as_ref().filter(|s| !s.is_empty())?;
        let ids: Vec<String> = specs
            .iter()
            .filter_map(|spec| {
                spec.get("fieldId")
                    .or_else(|| spec.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect();
        Some(ids)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMetadata {
    #[serde(default)]
    pub visible_field_ids: Vec<String>,
    #[serde(default)]
    pub visible_fields: Vec<Value>,
}

impl ViewMetadata {
    pub fn field_ids(&self) -> Vec<String> {
        if !self.visible_field_ids.is_empty() {
            return self.visible_field_ids.clone();
        }
        self.visible_fields
            .iter()
            .filter_map(|vf| match vf {
                Value::String(id) => Some(id.clone()),
                other => other.get("id").and_then(Value::as_str).map(str::to_string),
            })
            .collect()
    }
}
