//! Input forms and their validation rules.
//!
//! Every field is `#[serde(default)]` so that a missing field is validated as
//! blank instead of rejecting the whole request. Failed validation is turned
//! into [`FormErrors`], which the page templates show next to each field.
//! Each form also carries the hidden CSRF field, checked by [`check`].

use crate::csrf::{CsrfToken, CSRF_COOKIE};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const EMAIL_MESSAGE: &str = "This field requires a valid email address";

/// Rejects empty and whitespace-only input.
fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::Borrowed(REQUIRED_MESSAGE));
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default, skip_serializing)]
    pub csrf_token: String,
    #[serde(default)]
    #[validate(custom = "validate_required", email(message = "This field requires a valid email address"))]
    pub email: String,
    #[serde(default, skip_serializing)]
    #[validate(custom = "validate_required")]
    pub password: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default, skip_serializing)]
    pub csrf_token: String,
    #[serde(default)]
    #[validate(custom = "validate_required")]
    pub name: String,
    #[serde(default)]
    #[validate(custom = "validate_required", email(message = "This field requires a valid email address"))]
    pub email: String,
    #[serde(default, skip_serializing)]
    #[validate(custom = "validate_required")]
    pub password: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct AddListForm {
    #[serde(default, skip_serializing)]
    pub csrf_token: String,
    /// Name of the new list.
    #[serde(default)]
    #[validate(custom = "validate_required")]
    pub list: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct AddTaskForm {
    #[serde(default, skip_serializing)]
    pub csrf_token: String,
    /// Text of the new task.
    #[serde(default)]
    #[validate(custom = "validate_required")]
    pub task: String,
}

/// Forms that carry the hidden CSRF field.
pub trait CsrfProtected {
    fn csrf_token(&self) -> &str;
}

macro_rules! csrf_protected {
    ($($form:ty),*) => {
        $(impl CsrfProtected for $form {
            fn csrf_token(&self) -> &str {
                &self.csrf_token
            }
        })*
    };
}

csrf_protected!(LoginForm, RegisterForm, AddListForm, AddTaskForm);

/// Inline error messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn add(&mut self, field: &str, message: &str) {
        self.0.entry(field.to_string()).or_default().push(message.to_string());
    }
}

impl From<&ValidationErrors> for FormErrors {
    /// A blank field reports only "required", not also "invalid email".
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, field_errors) in errors.field_errors() {
            let blank = field_errors.iter().any(|error| error.code == "required");
            let messages = field_errors
                .iter()
                .filter(|error| !blank || error.code == "required")
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        FormErrors(fields)
    }
}

fn validate_fields<F: Validate>(form: &F) -> Result<(), FormErrors> {
    form.validate().map_err(|errors| FormErrors::from(&errors))
}

/// Runs the form's validators and checks its CSRF field against `csrf`.
pub fn check<F: Validate + CsrfProtected>(form: &F, csrf: &CsrfToken) -> Result<(), FormErrors> {
    let mut errors = validate_fields(form).err().unwrap_or_default();
    if let Err(message) = csrf.check(form.csrf_token()) {
        errors.add(CSRF_COOKIE, message);
    }

    if errors.0.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csrf::{MISSING_TOKEN, TOKENS_DO_NOT_MATCH};
    use pretty_assertions::assert_eq;

    const SECRET: &str = "forms-test-secret";

    fn session_csrf() -> CsrfToken {
        let minted = CsrfToken::mint(SECRET).unwrap();
        CsrfToken::from_cookie(minted.value(), SECRET).unwrap()
    }

    #[test]
    fn test_login_form_validation() {
        let valid = LoginForm {
            email: "a@x.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert!(validate_fields(&valid).is_ok());

        let bad_email = LoginForm {
            email: "ax.com".to_string(),
            ..valid.clone()
        };
        let errors = validate_fields(&bad_email).unwrap_err();
        assert_eq!(errors.field("email").to_vec(), vec![EMAIL_MESSAGE.to_string()]);
        assert!(errors.field("password").is_empty());
    }

    #[test]
    fn test_blank_email_reports_only_required() {
        let form = LoginForm::default();
        let errors = validate_fields(&form).unwrap_err();
        assert_eq!(errors.field("email").to_vec(), vec![REQUIRED_MESSAGE.to_string()]);
        assert_eq!(errors.field("password").to_vec(), vec![REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_register_form_validation() {
        let valid = RegisterForm {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert!(validate_fields(&valid).is_ok());

        let missing_name = RegisterForm {
            name: "   ".to_string(),
            ..valid.clone()
        };
        let errors = validate_fields(&missing_name).unwrap_err();
        assert_eq!(errors.field("name").to_vec(), vec![REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_list_and_task_forms_require_text() {
        assert!(validate_fields(&AddListForm {
            list: "Groceries".to_string(),
            ..Default::default()
        })
        .is_ok());
        assert!(validate_fields(&AddListForm::default()).is_err());

        assert!(validate_fields(&AddTaskForm {
            task: "Milk".to_string(),
            ..Default::default()
        })
        .is_ok());
        assert!(validate_fields(&AddTaskForm {
            task: "\t".to_string(),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_check_requires_matching_csrf_token() {
        let csrf = session_csrf();
        let mut form = AddListForm {
            list: "Groceries".to_string(),
            csrf_token: csrf.value().to_string(),
        };
        assert!(check(&form, &csrf).is_ok());

        form.csrf_token = String::new();
        let errors = check(&form, &csrf).unwrap_err();
        assert_eq!(errors.field("csrf_token").to_vec(), vec![MISSING_TOKEN.to_string()]);
        assert!(errors.field("list").is_empty());

        form.csrf_token = session_csrf().value().to_string();
        let errors = check(&form, &csrf).unwrap_err();
        assert_eq!(errors.field("csrf_token").to_vec(), vec![TOKENS_DO_NOT_MATCH.to_string()]);
    }

    #[test]
    fn test_check_reports_field_and_csrf_errors_together() {
        let errors = check(&AddTaskForm::default(), &session_csrf()).unwrap_err();
        assert_eq!(errors.field("task").to_vec(), vec![REQUIRED_MESSAGE.to_string()]);
        assert_eq!(errors.field("csrf_token").to_vec(), vec![MISSING_TOKEN.to_string()]);
    }

    #[test]
    fn test_missing_fields_deserialize_as_blank() {
        let form: RegisterForm = serde_json::from_str(r#"{"email": "a@x.com"}"#).unwrap();
        assert_eq!(form.name, "");
        assert_eq!(form.password, "");
        assert_eq!(form.csrf_token, "");
    }

    #[test]
    fn test_password_and_csrf_field_are_never_echoed() {
        let form = LoginForm {
            email: "a@x.com".to_string(),
            password: "hunter2".to_string(),
            csrf_token: "token".to_string(),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("csrf_token").is_none());
        assert_eq!(json["email"], "a@x.com");
    }
}
