/// Value kinds accepted in write payloads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    /// Trimmed string.
    Text,
    /// Whole number, from a JSON number or a numeric string.
    Integer,
    /// Finite number, from a JSON number or a numeric string.
    Float,
    /// Identifier of another document.
    Reference,
}

/// Declarative description of one writable field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: String,
    pub field_type: FieldType,
    /// Must be present (and non-empty for text) on create.
    pub required: bool,
    /// May not appear in an update payload.
    pub immutable: bool,
    /// Maximum length in characters, text only.
    pub max_length: Option<usize>,
    /// Inclusive bounds, numeric only.
    pub range: Option<(f64, f64)>,
    /// Decimal places kept after validation, float only.
    pub decimals: Option<u32>,
    /// Value used on create when absent and when cleared with null.
    pub default: Option<serde_json::Value>,
    /// Replaces the generated out-of-range message.
    pub range_message: Option<String>,
}

impl Field {
    /// Create a new field with minimal configuration
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            field_type,
            required: false,
            immutable: false,
            max_length: None,
            range: None,
            decimals: None,
            default: None,
            range_message: None,
        }
    }

    pub fn text(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::Text)
    }

    pub fn integer(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::Integer)
    }

    pub fn float(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::Float)
    }

    pub fn reference(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::Reference)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn decimals(mut self, places: u32) -> Self {
        self.decimals = Some(places);
        self
    }

    pub fn default_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn range_message(mut self, message: impl Into<String>) -> Self {
        self.range_message = Some(message.into());
        self
    }

    /// Message reported for a value outside `range` or of the wrong kind.
    pub fn out_of_range_message(&self) -> String {
        if let Some(message) = &self.range_message {
            return message.clone();
        }
        match self.range {
            Some((min, max)) => format!("{} must be between {} and {}", self.id, min, max),
            None => format!("{} must be a number", self.id),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.field_type, FieldType::Integer | FieldType::Float)
    }
}
