use serde::{Deserialize, Serialize};

use crate::params::ParameterCollection;

/// How a command's text is interpreted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Literal SQL text.
    Text,
    /// Name of a stored procedure; bound parameters become its arguments.
    StoredProcedure,
}

/// Outcome of the last statement request against a command descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatementState {
    /// The descriptor had no text; the requested text was adopted as is.
    #[default]
    Unset,
    /// The requested text matches the bound text; the statement was reset and rebound.
    SameText,
    /// The requested text differs from the bound text; it was adopted after a reset and
    /// must not be pre-compiled.
    ChangedText,
}

impl StatementState {
    /// Whether the executor may pre-compile (and cache) the statement.
    #[must_use]
    pub fn is_prepared(self) -> bool {
        matches!(self, StatementState::Unset | StatementState::SameText)
    }
}

/// The statement to run next: text, interpretation and bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    text: String,
    kind: CommandKind,
    parameters: ParameterCollection,
    state: StatementState,
}

impl Command {
    #[must_use]
    pub fn new(kind: CommandKind) -> Self {
        Self {
            text: String::new(),
            kind,
            parameters: ParameterCollection::new(),
            state: StatementState::Unset,
        }
    }

    /// Standalone command with text already adopted, mostly useful for custom providers'
    /// tests.
    #[must_use]
    pub fn with_text(text: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            text: text.into(),
            ..Self::new(kind)
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn parameters(&self) -> &ParameterCollection {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterCollection {
        &mut self.parameters
    }

    #[must_use]
    pub fn state(&self) -> StatementState {
        self.state
    }

    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.state.is_prepared()
    }

    pub(crate) fn adopt(&mut self, text: &str, kind: CommandKind, state: StatementState) {
        text.clone_into(&mut self.text);
        self.kind = kind;
        self.state = state;
    }

    /// Fresh descriptor of `kind` that carries over this one's pending bindings.
    pub(crate) fn reset_keeping_parameters(&mut self, kind: CommandKind) {
        let parameters = std::mem::take(&mut self.parameters);
        *self = Self {
            parameters,
            ..Self::new(kind)
        };
    }
}
