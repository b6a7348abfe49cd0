/// Errors raised while registering an option.
///
/// These are fatal to the registration call: `OptionParser::on` consumes the
/// parser, so a malformed option set cannot be parsed against.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Attempt to add duplicate option: {0}")]
    DuplicateOption(String),

    #[error("Can't use choice for bool option: {0}")]
    ChoiceOnBool(String),

    #[error("negatable option is not implemented: {0}")]
    NegationUnsupported(String),

    #[error("choice list is empty for option: {0}")]
    EmptyChoices(String),

    #[error("option has neither a short nor a long token")]
    MissingToken,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors found while resolving the value of a matched option.
///
/// These never escape `parse`; they are handed to the error handler or
/// reported through the default path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("{param} required for \"{option}\"!")]
    RequiredValueMissing { param: String, option: String },

    #[error("Invalid {param} for \"{option}\": {value}")]
    InvalidChoiceValue {
        param: String,
        option: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_message() {
        let err = ResolveError::RequiredValueMissing {
            param: "VALUE".to_string(),
            option: "choice".to_string(),
        };
        assert_eq!(err.to_string(), "VALUE required for \"choice\"!");
    }

    #[test]
    fn invalid_choice_message() {
        let err = ResolveError::InvalidChoiceValue {
            param: "VALUE".to_string(),
            option: "choice".to_string(),
            value: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid VALUE for \"choice\": bogus");
    }

    #[test]
    fn duplicate_message() {
        let err = ConfigError::DuplicateOption("--switch".to_string());
        assert_eq!(err.to_string(), "Attempt to add duplicate option: --switch");
    }
}
