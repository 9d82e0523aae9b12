//! # Registration Types
//!
//! The inbound form, the validated record written to storage and what the
//! storage backend hands back.

use crate::error::{EnrollError, EnrollResult};
use crate::pricing::{CourseModule, Price, PriceTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registration form as posted by the site.
///
/// Fields are kept as raw JSON so that validation can tell "absent" from
/// "present but unusable" and echo the original module value back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default, rename = "nome")]
    pub name: Option<Value>,
    #[serde(default, rename = "whatsapp")]
    pub contact_number: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default, rename = "curso")]
    pub course: Option<Value>,
    #[serde(default, rename = "modulo")]
    pub module: Option<Value>,
}

impl RegistrationForm {
    /// Parse a request body. An empty body is an empty form; anything but a
    /// JSON object is an error.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            object @ Value::Object(_) => serde_json::from_value(object),
            other => Err(serde::de::Error::custom(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn has_name(&self) -> bool {
        text_value(&self.name).is_some()
    }

    pub fn has_contact_number(&self) -> bool {
        text_value(&self.contact_number).is_some()
    }

    pub fn has_email(&self) -> bool {
        text_value(&self.email).is_some()
    }

    pub fn course_text(&self) -> Option<String> {
        text_value(&self.course)
    }

    pub fn module_text(&self) -> Option<String> {
        text_value(&self.module)
    }

    /// Check required fields, then price the module.
    pub fn validate(self, prices: &PriceTable) -> EnrollResult<NewRegistration> {
        let name = text_value(&self.name);
        let contact_number = text_value(&self.contact_number);
        let email = text_value(&self.email);
        let course = text_value(&self.course);
        let module = text_value(&self.module);

        let missing: Vec<&'static str> = [
            ("nome", name.is_none()),
            ("whatsapp", contact_number.is_none()),
            ("email", email.is_none()),
            ("curso", course.is_none()),
            ("modulo", module.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        let (Some(name), Some(contact_number), Some(email), Some(course), Some(module)) =
            (name, contact_number, email, course, module)
        else {
            return Err(EnrollError::IncompleteData { missing });
        };

        // Only identity fields are trimmed; the module must match a label exactly
        let module_key = match &self.module {
            Some(Value::String(raw)) => raw.as_str(),
            _ => module.as_str(),
        };

        let (module, price) =
            prices
                .resolve(module_key)
                .ok_or_else(|| EnrollError::InvalidModule {
                    received: self.module.clone().unwrap_or(Value::Null),
                })?;

        Ok(NewRegistration {
            name,
            contact_number,
            email,
            course,
            module,
            price,
        })
    }
}

/// Usable text of a form field, `None` when absent or falsy.
///
/// Numbers are accepted as their decimal text since WhatsApp numbers are
/// sometimes posted unquoted; zero counts as empty. Booleans, arrays and
/// objects are never usable text, and neither is a whitespace-only string.
fn text_value(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => {
            let is_zero = n.as_f64().map(|f| f == 0.0).unwrap_or(false);
            (!is_zero).then(|| n.to_string())
        }
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validated registration, serialized with the storage column names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRegistration {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "whatsapp")]
    pub contact_number: String,
    pub email: String,
    #[serde(rename = "curso")]
    pub course: String,
    #[serde(rename = "modulo")]
    pub module: CourseModule,
    #[serde(rename = "valor")]
    pub price: Price,
}

impl NewRegistration {
    /// Line item title, e.g. "Python – Intermediário"
    pub fn checkout_title(&self) -> String {
        format!("{} \u{2013} {}", self.course, self.module.label())
    }
}

/// Primary key of a stored registration (serial or uuid column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

/// Row returned by the storage backend after an insert
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredRegistration {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    created_at: Option<String>,
}

impl StoredRegistration {
    pub fn with_id(id: RecordId) -> Self {
        Self {
            id: Some(id),
            created_at: None,
        }
    }

    /// Creation timestamp, when the backend sent a parseable one
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}
