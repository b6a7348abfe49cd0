use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::option::OptionRecord;

/// Token → option lookup. Both tokens of a record resolve to the same entry.
#[derive(Debug, Default)]
pub struct OptionRegistry {
    records: Vec<OptionRecord>,
    tokens: HashMap<String, usize>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record under each of its tokens.
    ///
    /// Fails without modifying the registry if any token is already taken.
    pub fn insert(&mut self, record: OptionRecord) -> Result<()> {
        let tokens: Vec<String> = record.tokens().map(str::to_string).collect();
        for (i, token) in tokens.iter().enumerate() {
            if self.tokens.contains_key(token) || tokens[..i].contains(token) {
                return Err(ConfigError::DuplicateOption(token.clone()));
            }
        }

        let idx = self.records.len();
        debug!(tokens = ?tokens, index = idx, "registered option");
        for token in tokens {
            self.tokens.insert(token, idx);
        }
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, token: &str) -> Option<&OptionRecord> {
        self.tokens.get(token).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    /// Distinct records, in registration order.
    pub fn records(&self) -> impl Iterator<Item = &OptionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::classify;

    #[test]
    fn both_tokens_share_one_record() {
        let mut reg = OptionRegistry::new();
        reg.insert(classify(["-c", "--choice VALUE"]).unwrap())
            .unwrap();
        let by_abbr = reg.get("-c").unwrap();
        let by_full = reg.get("--choice").unwrap();
        assert!(std::ptr::eq(by_abbr, by_full));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_token_rejected() {
        let mut reg = OptionRegistry::new();
        reg.insert(classify(["-s", "--switch"]).unwrap()).unwrap();
        let err = reg.insert(classify(["-x", "--switch"]).unwrap()).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateOption("--switch".to_string()));
    }

    #[test]
    fn failed_insert_leaves_registry_unchanged() {
        let mut reg = OptionRegistry::new();
        reg.insert(classify(["--switch"]).unwrap()).unwrap();
        assert!(reg.insert(classify(["-n", "--switch"]).unwrap()).is_err());
        assert!(!reg.contains("-n"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn records_in_registration_order() {
        let mut reg = OptionRegistry::new();
        reg.insert(classify(["-b", "--beta"]).unwrap()).unwrap();
        reg.insert(classify(["-a", "--alpha"]).unwrap()).unwrap();
        let order: Vec<_> = reg.records().map(|r| r.label().to_string()).collect();
        assert_eq!(order, vec!["beta", "alpha"]);
    }

    #[test]
    fn unknown_token() {
        let reg = OptionRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.get("--missing").is_none());
    }
}
