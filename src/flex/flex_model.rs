use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;

use super::flex_errors::FlexError;

/// One account's Flex statement for a period, as decoded from the report
/// XML.
///
/// Leaf fields live under `@`-prefixed attribute keys. A section whose
/// collection holds a single row collapses to a bare object instead of a
/// one-element array; [`FlexStatement::section_items`] normalizes that quirk
/// in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexStatement(pub Value);

impl FlexStatement {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Account id attribute, when the statement carries one.
    pub fn account_id(&self) -> Option<&str> {
        self.0.get("@accountId").and_then(Value::as_str)
    }

    /// Rows of `section.item`, whether the collection arrived as an array,
    /// a collapsed single object, or not at all.
    pub fn section_items(&self, section: &str, item: &str) -> Vec<&Value> {
        match self.0.get(section).and_then(|s| s.get(item)) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(row @ Value::Object(_)) => vec![row],
            _ => Vec::new(),
        }
    }
}

/// Statements from one fetch. The service returns a bare statement when the
/// query covers a single account and a list when it spans several.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementSet {
    Single(FlexStatement),
    Many(Vec<FlexStatement>),
}

impl StatementSet {
    pub(crate) fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                StatementSet::Many(items.into_iter().map(FlexStatement::new).collect())
            }
            other => StatementSet::Single(FlexStatement::new(other)),
        }
    }

    /// All statements in document order.
    pub fn statements(&self) -> Vec<&FlexStatement> {
        match self {
            StatementSet::Single(statement) => vec![statement],
            StatementSet::Many(statements) => statements.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StatementSet::Single(_) => 1,
            StatementSet::Many(statements) => statements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, StatementSet::Many(statements) if statements.is_empty())
    }

    /// Save the raw decoded document as pretty JSON, for debugging and
    /// offline reprocessing.
    pub fn save_json(&self, path: &Path) -> Result<(), FlexError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.to_value())?;
        Ok(())
    }

    fn to_value(&self) -> Value {
        match self {
            StatementSet::Single(statement) => statement.0.clone(),
            StatementSet::Many(statements) => {
                Value::Array(statements.iter().map(|s| s.0.clone()).collect())
            }
        }
    }
}

/// Classified poll response.
///
/// "Statement is not yet ready" is the only signal the service gives that
/// the report job is still running; the string match lives in
/// [`PollOutcome::classify`] alone so a structured status code could replace
/// it in one place.
#[derive(Debug)]
pub enum PollOutcome {
    Ready(StatementSet),
    Pending,
    Failed(String),
}

impl PollOutcome {
    pub(crate) fn classify(envelope: &Value) -> Result<PollOutcome, FlexError> {
        if let Some(response) = envelope.get("FlexQueryResponse") {
            return Ok(PollOutcome::Ready(Self::unwrap_statements(response)?));
        }

        let response = envelope.get("FlexStatementResponse").ok_or_else(|| {
            FlexError::MalformedEnvelope(
                "neither FlexQueryResponse nor FlexStatementResponse present".to_string(),
            )
        })?;

        let status = response
            .get("Status")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if status == "Success" {
            return Ok(PollOutcome::Ready(Self::unwrap_statements(response)?));
        }

        let message = response
            .get("ErrorMessage")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if status == "Fail" && message.contains("Statement is not yet ready") {
            return Ok(PollOutcome::Pending);
        }
        Ok(PollOutcome::Failed(message))
    }

    fn unwrap_statements(response: &Value) -> Result<StatementSet, FlexError> {
        let statement = response
            .get("FlexStatements")
            .and_then(|s| s.get("FlexStatement"))
            .ok_or_else(|| {
                FlexError::MalformedEnvelope("FlexStatements.FlexStatement missing".to_string())
            })?;
        Ok(StatementSet::from_value(statement.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_items_array_and_collapsed_forms_agree() {
        let collapsed = FlexStatement::new(json!({
            "Trades": {"Lot": {"@symbol": "AAPL"}}
        }));
        let listed = FlexStatement::new(json!({
            "Trades": {"Lot": [{"@symbol": "AAPL"}]}
        }));
        assert_eq!(
            collapsed.section_items("Trades", "Lot"),
            listed.section_items("Trades", "Lot")
        );
        assert_eq!(collapsed.section_items("Trades", "Lot").len(), 1);
    }

    #[test]
    fn test_section_items_missing_section_is_empty() {
        let statement = FlexStatement::new(json!({}));
        assert!(statement.section_items("Trades", "Lot").is_empty());
        let null_section = FlexStatement::new(json!({"Trades": null}));
        assert!(null_section.section_items("Trades", "Lot").is_empty());
    }

    #[test]
    fn test_statement_set_from_value() {
        let single = StatementSet::from_value(json!({"@accountId": "U1"}));
        assert!(matches!(single, StatementSet::Single(_)));
        assert_eq!(single.len(), 1);

        let many = StatementSet::from_value(json!([{"@accountId": "U1"}, {"@accountId": "U2"}]));
        assert_eq!(many.len(), 2);
        assert_eq!(many.statements()[1].account_id(), Some("U2"));
    }

    #[test]
    fn test_classify_pending() {
        let envelope = json!({
            "FlexStatementResponse": {
                "Status": "Fail",
                "ErrorMessage": "Statement is not yet ready, please retry"
            }
        });
        assert!(matches!(
            PollOutcome::classify(&envelope).unwrap(),
            PollOutcome::Pending
        ));
    }

    #[test]
    fn test_classify_failed_with_message() {
        let envelope = json!({
            "FlexStatementResponse": {
                "Status": "Fail",
                "ErrorMessage": "Invalid token"
            }
        });
        match PollOutcome::classify(&envelope).unwrap() {
            PollOutcome::Failed(message) => assert_eq!(message, "Invalid token"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_ready_from_statement_response() {
        let envelope = json!({
            "FlexStatementResponse": {
                "Status": "Success",
                "FlexStatements": {
                    "FlexStatement": {"@accountId": "U111"}
                }
            }
        });
        match PollOutcome::classify(&envelope).unwrap() {
            PollOutcome::Ready(set) => {
                assert_eq!(set.statements()[0].account_id(), Some("U111"));
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_ready_from_query_response_with_many_accounts() {
        let envelope = json!({
            "FlexQueryResponse": {
                "FlexStatements": {
                    "FlexStatement": [{"@accountId": "U1"}, {"@accountId": "U2"}]
                }
            }
        });
        match PollOutcome::classify(&envelope).unwrap() {
            PollOutcome::Ready(set) => assert_eq!(set.len(), 2),
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_unknown_envelope_errors() {
        let envelope = json!({"Something": "else"});
        assert!(PollOutcome::classify(&envelope).is_err());
    }

    #[test]
    fn test_save_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statements.json");
        let set = StatementSet::from_value(json!([{"@accountId": "U1"}]));
        set.save_json(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, json!([{"@accountId": "U1"}]));
    }
}
