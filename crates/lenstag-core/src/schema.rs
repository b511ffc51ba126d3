//! Tag schemas: the prompt sent to the model and the shape its reply must have.
//!
//! The model is only *asked* to produce a given JSON shape, so every reply is
//! checked against the schema before it reaches a caller. Each schema carries
//! a version string that is reported by `/health` and bumped whenever the
//! prompt or the required fields change.

use crate::error::OutputError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Available output contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Flat fashion tags: `tags`, `category`, eight attributes
    Basic,
    /// Catalog listing: category, sub-category, eleven attributes, auto tags, SEO copy
    Catalog,
}

impl SchemaKind {
    /// Versioned identifier of the contract.
    pub fn version(self) -> &'static str {
        match self {
            SchemaKind::Basic => "basic/v1",
            SchemaKind::Catalog => "catalog/v1",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Basic => "basic",
            SchemaKind::Catalog => "catalog",
        }
    }

    /// Instruction prompt describing the required output.
    pub fn prompt(self) -> &'static str {
        match self {
            SchemaKind::Basic => BASIC_PROMPT,
            SchemaKind::Catalog => CATALOG_PROMPT,
        }
    }

    /// Top-level keys a reply must contain.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            SchemaKind::Basic => &["tags", "category", "attributes"],
            SchemaKind::Catalog => &["category", "attributes", "auto_tags"],
        }
    }

    /// Check a parsed reply against this schema and normalize it.
    ///
    /// Missing top-level keys are rejected. Missing or `null` attribute
    /// values become empty strings, tags are trimmed and de-duplicated, and
    /// catalog auto tags are lowercased.
    pub fn validate(self, value: Value) -> Result<TagDocument, OutputError> {
        let Some(object) = value.as_object() else {
            return Err(self.violation(format!(
                "expected a JSON object, got {}",
                json_type_name(&value)
            )));
        };

        let missing: Vec<&str> = self
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !object.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(self.violation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        match self {
            SchemaKind::Basic => serde_json::from_value::<BasicTags>(value)
                .map(|doc| TagDocument::Basic(doc.normalized())),
            SchemaKind::Catalog => serde_json::from_value::<CatalogTags>(value)
                .map(|doc| TagDocument::Catalog(doc.normalized())),
        }
        .map_err(|e| self.violation(e.to_string()))
    }

    fn violation(self, message: String) -> OutputError {
        OutputError::SchemaViolation {
            schema: self.version(),
            message,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(SchemaKind::Basic),
            "catalog" => Ok(SchemaKind::Catalog),
            other => Err(format!("Unknown schema: {other} (expected basic or catalog)")),
        }
    }
}

const BASIC_PROMPT: &str = r#"You are LensTag, an advanced AI that extracts eCommerce tags & attributes.

Return JSON only in the EXACT format below:

{
  "tags": ["tag1", "tag2", "..."],
  "category": "main_category",
  "attributes": {
    "color": "",
    "pattern": "",
    "material": "",
    "sleeve": "",
    "neck": "",
    "fit": "",
    "style": "",
    "occasion": ""
  }
}

Rules:
- Do NOT include explanations.
- Do NOT wrap the JSON in markdown code fences.
- Category must be a single high-level fashion category (e.g., tshirt, shirt, saree, kurta, jeans, footwear, handbag, dress, top, jacket, shorts).
- Keep tags short (5-15).
- If unsure of an attribute, return empty string.
"#;

const CATALOG_PROMPT: &str = r#"You are LensTag, a product cataloguing assistant for an online store.
Look at the product in the image and describe it for a catalog listing.

Return ONLY a JSON object with EXACTLY these fields:

{
  "category": "",
  "sub_category": "",
  "attributes": {
    "color": "",
    "material": "",
    "pattern": "",
    "style": "",
    "gender": "",
    "occasion": "",
    "segment": "",
    "metal_type": "",
    "closing_type": "",
    "shape": "",
    "craft": ""
  },
  "auto_tags": ["tag1", "tag2", "..."],
  "seo_description": ""
}

Rules:
- Output raw JSON only: no markdown, no code fences, no explanations.
- Do not add or remove fields.
- "category" is the broad product family (e.g., apparel, footwear, jewellery, bags, home decor); "sub_category" is the specific product type.
- "auto_tags" must contain 10-15 short lowercase search tags.
- "seo_description" is one or two plain sentences suitable for a product page.
- If an attribute does not apply or you are unsure, use an empty string.
"#;

/// Reply shape of the basic schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicTags {
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    pub attributes: BasicAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicAttributes {
    #[serde(deserialize_with = "lenient_string")]
    pub color: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pattern: String,
    #[serde(deserialize_with = "lenient_string")]
    pub material: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sleeve: String,
    #[serde(deserialize_with = "lenient_string")]
    pub neck: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fit: String,
    #[serde(deserialize_with = "lenient_string")]
    pub style: String,
    #[serde(deserialize_with = "lenient_string")]
    pub occasion: String,
}

impl BasicTags {
    fn normalized(mut self) -> Self {
        self.tags = clean_tags(self.tags, false);
        self.category = self.category.trim().to_string();
        self
    }
}

/// Reply shape of the catalog schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTags {
    #[serde(deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sub_category: String,
    pub attributes: CatalogAttributes,
    pub auto_tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub seo_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogAttributes {
    #[serde(deserialize_with = "lenient_string")]
    pub color: String,
    #[serde(deserialize_with = "lenient_string")]
    pub material: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pattern: String,
    #[serde(deserialize_with = "lenient_string")]
    pub style: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(deserialize_with = "lenient_string")]
    pub occasion: String,
    #[serde(deserialize_with = "lenient_string")]
    pub segment: String,
    #[serde(deserialize_with = "lenient_string")]
    pub metal_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub closing_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub shape: String,
    #[serde(deserialize_with = "lenient_string")]
    pub craft: String,
}

impl CatalogTags {
    fn normalized(mut self) -> Self {
        self.auto_tags = clean_tags(self.auto_tags, true);
        self.category = self.category.trim().to_string();
        self.sub_category = self.sub_category.trim().to_string();
        self.seo_description = self.seo_description.trim().to_string();
        self
    }
}

/// A validated reply. Serializes to exactly the schema's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagDocument {
    Basic(BasicTags),
    Catalog(CatalogTags),
}

impl TagDocument {
    pub fn schema(&self) -> SchemaKind {
        match self {
            TagDocument::Basic(_) => SchemaKind::Basic,
            TagDocument::Catalog(_) => SchemaKind::Catalog,
        }
    }

    /// The document's tag list, whichever field holds it.
    pub fn tags(&self) -> &[String] {
        match self {
            TagDocument::Basic(doc) => &doc.tags,
            TagDocument::Catalog(doc) => &doc.auto_tags,
        }
    }
}

/// Accept strings as-is, `null` as empty, and scalars via their JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {}",
            json_type_name(&other)
        ))),
    }
}

fn clean_tags(tags: Vec<String>, lowercase: bool) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let tag = if lowercase {
            tag.to_lowercase()
        } else {
            tag.to_string()
        };
        if !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
