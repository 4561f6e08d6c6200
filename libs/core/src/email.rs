use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EspError;

/// One or many addresses, as accepted by [`Email::new`].
///
/// A single address and a one-element list normalize to the same sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AddressList {
    #[default]
    Empty,
    One(String),
    Many(Vec<String>),
}

impl AddressList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            AddressList::Empty => Vec::new(),
            AddressList::One(address) => vec![address],
            AddressList::Many(addresses) => addresses,
        }
    }
}

impl From<&str> for AddressList {
    fn from(value: &str) -> Self {
        AddressList::One(value.to_string())
    }
}

impl From<String> for AddressList {
    fn from(value: String) -> Self {
        AddressList::One(value)
    }
}

impl From<Vec<String>> for AddressList {
    fn from(value: Vec<String>) -> Self {
        AddressList::Many(value)
    }
}

impl From<Vec<&str>> for AddressList {
    fn from(value: Vec<&str>) -> Self {
        AddressList::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AddressList {
    fn from(value: [&str; N]) -> Self {
        AddressList::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Option<String>> for AddressList {
    fn from(value: Option<String>) -> Self {
        value.map(AddressList::One).unwrap_or_default()
    }
}

/// Plain field set accepted by [`Email::new`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmailFields {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: AddressList,
    #[serde(default)]
    pub cc: AddressList,
    #[serde(default)]
    pub bcc: AddressList,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Normalized, immutable message shared by callers and every adapter.
///
/// ```
/// use esp_core::{Email, EmailFields};
///
/// let single = Email::new(EmailFields {
///     from: "ops@example.com".into(),
///     to: "jane@example.com".into(),
///     ..Default::default()
/// });
/// let list = Email::new(EmailFields {
///     from: "ops@example.com".into(),
///     to: vec!["jane@example.com"].into(),
///     ..Default::default()
/// });
/// assert_eq!(single, list);
/// assert_eq!(single.to(), ["jane@example.com"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Email {
    from: String,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Email {
    pub fn new(fields: EmailFields) -> Self {
        Self {
            from: fields.from,
            to: fields.to.into_vec(),
            cc: fields.cc.into_vec(),
            bcc: fields.bcc.into_vec(),
            subject: fields.subject,
            html: fields.html,
            text: fields.text,
        }
    }

    /// Builds an email from loosely typed data (JSON, YAML, CLI input).
    pub fn from_value(value: &Value) -> Result<Self, EspError> {
        if !value.is_object() {
            return Err(EspError::invalid_email());
        }
        let fields = EmailFields::deserialize(value)
            .map_err(|err| EspError::invalid_email().with_source(err))?;
        Ok(Self::new(fields))
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &[String] {
        &self.to
    }

    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Total number of recipients across `to`, `cc` and `bcc`.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn absent_lists_normalize_to_empty() {
        let email = Email::new(EmailFields {
            from: "ops@example.com".into(),
            to: "jane@example.com".into(),
            ..Default::default()
        });
        assert!(email.cc().is_empty());
        assert!(email.bcc().is_empty());
        assert_eq!(email.recipient_count(), 1);
        assert_eq!(email.subject(), None);
    }

    #[test]
    fn equality_compares_lists_in_order() {
        let a = Email::new(EmailFields {
            from: "ops@example.com".into(),
            to: ["a@example.com", "b@example.com"].into(),
            ..Default::default()
        });
        let b = Email::new(EmailFields {
            from: "ops@example.com".into(),
            to: ["b@example.com", "a@example.com"].into(),
            ..Default::default()
        });
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn from_value_accepts_string_or_array() {
        let single = Email::from_value(&json!({
            "from": "ops@example.com",
            "to": "jane@example.com",
            "cc": ["cc@example.com"],
            "subject": "hi",
        }))
        .unwrap();
        let list = Email::from_value(&json!({
            "from": "ops@example.com",
            "to": ["jane@example.com"],
            "cc": "cc@example.com",
            "subject": "hi",
        }))
        .unwrap();
        assert_eq!(single, list);
        assert_eq!(single.cc(), ["cc@example.com"]);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        for value in [json!(null), json!("email"), json!([1, 2]), json!({ "to": 5 })] {
            let err = Email::from_value(&value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
            assert_eq!(
                err.message(),
                "`email` should be of an object of prototype Email."
            );
        }
    }
}
