use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationErrors>;

/// Every validation message produced for one input, in discovery order.
///
/// Displays as the first message; callers surface that one and may log the rest.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", self.first().unwrap_or("Validation failed"))]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.messages.extend(other.messages);
    }

    pub fn first(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_first_message() {
        let mut errors = ValidationErrors::new();
        errors.push("title is required");
        errors.push("author is required");

        assert_eq!(errors.to_string(), "title is required");
        assert_eq!(errors.len(), 2);
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_empty_is_ok() {
        assert_eq!(ValidationErrors::new().into_result(5), Ok(5));
    }
}
