use crate::{
    config::MAX_IMAGE_SIZE,
    error::{ImageGenError, Result},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MAX_STYLE_CHARS: usize = 300;
pub const MAX_DESCRIPTION_CHARS: usize = 256;

const FIELD_ORDER: [&str; 5] = ["prompt", "width", "height", "style", "referenceImages"];

/// Body of `POST /v1/images/generate`.
///
/// Numeric fields are decoded as `i64` so out-of-range values reach
/// [`GenerateImagePayload::validate`] and are reported alongside every other
/// violation instead of failing deserialization on their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImagePayload {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_images: Option<Vec<ReferenceImageInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImageInput {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ReferenceImageInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

impl GenerateImagePayload {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: i64, height: i64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_reference(mut self, reference: ReferenceImageInput) -> Self {
        self.reference_images
            .get_or_insert_with(Vec::new)
            .push(reference);
        self
    }

    /// Decodes a JSON body field by field so that type mismatches are
    /// reported together with every range violation.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(body) = value.as_object() else {
            return Err(ImageGenError::Validation(vec![
                "request body must be a JSON object".to_string(),
            ]));
        };

        let mut issues = TypeIssues::default();
        let payload = GenerateImagePayload {
            prompt: issues
                .field(body, "prompt", "prompt".to_string(), || {
                    "prompt must be a string".to_string()
                })
                .unwrap_or_default(),
            width: issues.field(body, "width", "width".to_string(), || dimension_message("width")),
            height: issues.field(body, "height", "height".to_string(), || {
                dimension_message("height")
            }),
            style: issues.field(body, "style", "style".to_string(), || {
                "style must be a string".to_string()
            }),
            reference_images: issues.references(body),
        };

        let mut problems: Vec<String> = payload
            .violations()
            .into_iter()
            .filter(|message| !issues.covers(message))
            .collect();
        problems.extend(issues.problems);
        problems.sort_by_key(|message| message_order(message));

        if problems.is_empty() {
            Ok(payload)
        } else {
            Err(ImageGenError::Validation(problems))
        }
    }

    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<()> {
        let problems = self.violations();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ImageGenError::Validation(problems))
        }
    }

    fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.prompt.is_empty() {
            problems.push("prompt must contain at least 1 character".to_string());
        }

        for (field, value) in [("width", self.width), ("height", self.height)] {
            if let Some(value) = value {
                if value < 1 || value > i64::from(MAX_IMAGE_SIZE) {
                    problems.push(dimension_message(field));
                }
            }
        }

        if let Some(style) = &self.style {
            if style.chars().count() > MAX_STYLE_CHARS {
                problems.push(format!("style must be at most {} characters", MAX_STYLE_CHARS));
            }
        }

        for (idx, reference) in self.reference_images.iter().flatten().enumerate() {
            if url::Url::parse(&reference.url).is_err() {
                problems.push(format!("referenceImages[{}].url must be a valid URL", idx));
            }
            if let Some(description) = &reference.description {
                if description.chars().count() > MAX_DESCRIPTION_CHARS {
                    problems.push(format!(
                        "referenceImages[{}].description must be at most {} characters",
                        idx, MAX_DESCRIPTION_CHARS
                    ));
                }
            }
        }

        problems
    }
}

fn dimension_message(field: &str) -> String {
    format!("{} must be an integer between 1 and {}", field, MAX_IMAGE_SIZE)
}

/// Sort key matching the order fields are declared in the body:
/// top-level field, then reference index, then the reference's own field.
fn message_order(message: &str) -> (usize, usize, usize) {
    let field = FIELD_ORDER
        .iter()
        .position(|field| message.starts_with(field))
        .unwrap_or(FIELD_ORDER.len());

    let Some(rest) = message.strip_prefix("referenceImages[") else {
        return (field, 0, 0);
    };
    let Some((index, rest)) = rest.split_once(']') else {
        return (field, 0, 0);
    };
    let sub_field = if rest.starts_with(".url") {
        1
    } else if rest.starts_with(".description") {
        2
    } else if rest.starts_with(".mimeType") {
        3
    } else {
        0
    };
    (field, index.parse().unwrap_or(usize::MAX), sub_field)
}

/// Fields whose JSON type was wrong. Range checks on those paths are
/// suppressed since the decoded value is only a placeholder.
#[derive(Default)]
struct TypeIssues {
    problems: Vec<String>,
    failed_paths: Vec<String>,
}

impl TypeIssues {
    fn field<T, M>(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: String,
        message: M,
    ) -> Option<T>
    where
        T: DeserializeOwned,
        M: FnOnce() -> String,
    {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => match T::deserialize(value) {
                Ok(decoded) => Some(decoded),
                Err(_) => {
                    self.fail(path, message());
                    None
                }
            },
        }
    }

    fn references(&mut self, body: &Map<String, Value>) -> Option<Vec<ReferenceImageInput>> {
        let items = match body.get("referenceImages") {
            None | Some(Value::Null) => return None,
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.fail(
                    "referenceImages".to_string(),
                    "referenceImages must be an array".to_string(),
                );
                return None;
            }
        };

        let references = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let path = format!("referenceImages[{}]", idx);
                let Some(object) = item.as_object() else {
                    self.fail(path.clone(), format!("{} must be an object", path));
                    return ReferenceImageInput::default();
                };
                ReferenceImageInput {
                    url: self
                        .field(object, "url", format!("{}.url", path), || {
                            format!("{}.url must be a valid URL", path)
                        })
                        .unwrap_or_default(),
                    description: self.field(
                        object,
                        "description",
                        format!("{}.description", path),
                        || format!("{}.description must be a string", path),
                    ),
                    mime_type: self.field(
                        object,
                        "mimeType",
                        format!("{}.mimeType", path),
                        || format!("{}.mimeType must be a string", path),
                    ),
                }
            })
            .collect();
        Some(references)
    }

    fn fail(&mut self, path: String, message: String) {
        self.problems.push(message);
        self.failed_paths.push(path);
    }

    /// True when `message` is about a path that already failed its type check.
    fn covers(&self, message: &str) -> bool {
        self.failed_paths.iter().any(|path| {
            message
                .strip_prefix(path.as_str())
                .map_or(false, |rest| rest.starts_with(' ') || rest.starts_with('.'))
        })
    }
}
