use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Error code for an empty required field. When a field reports it, the field's
/// other errors are dropped since they only restate the same problem.
pub const REQUIRED: &str = "required";

/// Rejects values that are empty or only whitespace.
pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new(REQUIRED);
        error.message = Some(Cow::Borrowed("This field is required."));
        return Err(error);
    }
    Ok(())
}

/// Field name to error messages, in the shape form pages render them.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Runs the declarative checks of `form`.
    pub fn validate(form: &impl Validate) -> Self {
        form.validate().err().map(Self::from).unwrap_or_default()
    }

    /// Records an error found outside the declarative checks, like a uniqueness conflict.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `field` already has at least one error.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, field_errors)| {
                let required = field_errors.iter().find(|error| error.code == REQUIRED);
                let messages = match required {
                    Some(error) => vec![error.to_string()],
                    None => field_errors.iter().map(ToString::to_string).collect(),
                };
                (field.to_string(), messages)
            })
            .collect();
        Self(fields)
    }
}

/// Values submitted alongside a form's errors, so a rejected form can be redrawn as the user left it.
#[derive(Serialize)]
pub struct FormView<T> {
    pub form: T,
    pub errors: FormErrors,
}

impl<T> FormView<T> {
    pub fn new(form: T, errors: FormErrors) -> Self {
        Self { form, errors }
    }

    pub fn fresh(form: T) -> Self {
        Self::new(form, FormErrors::default())
    }
}
