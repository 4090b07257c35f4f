use serde::Serialize;

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Value submitted back by the UI.
    pub id: String,
    /// Text shown to the agent.
    pub text: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Widget type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "choices", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Text,
    Email,
    Number,
    SingleChoice(Vec<Choice>),
    MultiChoice(Vec<Choice>),
}

/// Validation rule beyond the field's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Must look like an email address.
    Email,
    /// Must contain exactly this many digits once non-digits are removed.
    DigitCount { digits: usize },
    /// Number must be greater than zero.
    Positive,
    /// Becomes required when another field holds the given value.
    RequiredWhen { field: String, equals: String },
}

/// Typed description of one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            hidden: false,
            placeholder: None,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Choices offered by a choice field, empty for other kinds.
    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            FieldKind::SingleChoice(choices) | FieldKind::MultiChoice(choices) => choices,
            _ => &[],
        }
    }
}
