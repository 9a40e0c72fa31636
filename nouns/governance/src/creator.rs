use {
    alloy::primitives::{Address, Bytes, U256},
    nouns_types::{constants::MIN_PROPOSAL_VOTING_POWER, parse_amount},
    serde::Serialize,
    serde_json::Value,
    std::str::FromStr,
    thiserror::Error,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("description is required")]
    MissingDescription,

    #[error("invalid JSON format in: {}", .0.join(", "))]
    MalformedFields(Vec<&'static str>),

    #[error("you need at least 1 Noun to create a proposal (voting power: {votes})")]
    InsufficientVotingPower { votes: f64 },
}

/// A proposal as typed by its author. The action fields hold JSON arrays as
/// text and may be left empty.
#[derive(Debug, Clone, Default)]
pub struct ProposalDraft {
    pub title: String,
    pub description: String,
    pub targets: String,
    pub values: String,
    pub signatures: String,
    pub calldatas: String,
}

/// A validated draft, ready to be sent to the governor.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProposalSubmission {
    pub description: String,
    pub targets: Vec<Address>,
    pub values: Vec<U256>,
    pub signatures: Vec<String>,
    pub calldatas: Vec<Bytes>,
}

impl ProposalDraft {
    pub fn validate(&self) -> Result<ProposalSubmission, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }

        let mut malformed = Vec::new();

        let targets = parse_field(&self.targets, "targets", &mut malformed, |value| {
            value.as_str()?.parse::<Address>().ok()
        });
        let values = parse_field(&self.values, "values", &mut malformed, parse_value);
        let signatures = parse_field(&self.signatures, "signatures", &mut malformed, |value| {
            value.as_str().map(str::to_string)
        });
        let calldatas = parse_field(&self.calldatas, "calldatas", &mut malformed, |value| {
            Bytes::from_str(value.as_str()?).ok()
        });

        if !malformed.is_empty() {
            return Err(ValidationError::MalformedFields(malformed));
        }

        Ok(ProposalSubmission {
            description: format!("{}\n\n{}", self.title, self.description),
            targets,
            values,
            signatures,
            calldatas,
        })
    }

    /// What would be submitted, once the draft validates.
    pub fn preview(&self) -> Result<ProposalSubmission, ValidationError> {
        self.validate()
    }
}

impl ProposalSubmission {
    /// The governor rejects proposers below the threshold anyway; this only
    /// spares a doomed transaction.
    pub fn ensure_eligible(&self, voting_power: f64) -> Result<(), ValidationError> {
        if voting_power < MIN_PROPOSAL_VOTING_POWER {
            return Err(ValidationError::InsufficientVotingPower {
                votes: voting_power,
            });
        }

        Ok(())
    }

    pub fn action_count(&self) -> usize {
        self.targets.len()
    }
}

/// Parse a JSON array field, converting each element with `convert`. On any
/// failure the field is recorded in `malformed` and an empty list returned.
fn parse_field<T, F>(
    text: &str,
    field: &'static str,
    malformed: &mut Vec<&'static str>,
    convert: F,
) -> Vec<T>
where
    F: Fn(&Value) -> Option<T>,
{
    if text.trim().is_empty() {
        return vec![];
    }

    let parsed = serde_json::from_str::<Vec<Value>>(text)
        .ok()
        .and_then(|elements| elements.iter().map(&convert).collect::<Option<Vec<_>>>());

    parsed.unwrap_or_else(|| {
        malformed.push(field);
        vec![]
    })
}

/// Wei amounts come as JSON integers or decimal strings.
fn parse_value(value: &Value) -> Option<U256> {
    match value {
        Value::Number(number) => number.as_u64().map(U256::from),
        Value::String(text) => parse_amount(text).ok(),
        _ => None,
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*, test_case::test_case};

    fn draft() -> ProposalDraft {
        ProposalDraft {
            title: "Fund a Nouns film".to_string(),
            description: "We will make a film.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn composes_title_and_description() {
        let submission = draft().validate().unwrap();

        assert_that!(submission.description.as_str())
            .is_equal_to("Fund a Nouns film\n\nWe will make a film.");
        assert_that!(submission.targets).is_empty();
    }

    #[test]
    fn keeps_the_author_markdown_verbatim() {
        let submission = ProposalDraft {
            title: "# Fund a Nouns film ".to_string(),
            description: "\n  - shoot\n  - edit\n".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_that!(submission.description.as_str())
            .is_equal_to("# Fund a Nouns film \n\n\n  - shoot\n  - edit\n");
    }

    #[test_case("", "body" => ValidationError::MissingTitle; "missing title")]
    #[test_case("   ", "body" => ValidationError::MissingTitle; "blank title")]
    #[test_case("title", "" => ValidationError::MissingDescription; "missing description")]
    fn required_text(title: &str, description: &str) -> ValidationError {
        ProposalDraft {
            title: title.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap_err()
    }

    #[test]
    fn parses_actions() {
        let submission = ProposalDraft {
            targets: r#"["0x0BC3807Ec262cB779b38D65b38158acC3bfedE10"]"#.to_string(),
            values: r#"["1000000000000000000"]"#.to_string(),
            signatures: r#"["transfer(address,uint256)"]"#.to_string(),
            calldatas: r#"["0x1234"]"#.to_string(),
            ..draft()
        }
        .validate()
        .unwrap();

        assert_that!(submission.action_count()).is_equal_to(1);
        assert_that!(submission.values[0]).is_equal_to(U256::from(10).pow(U256::from(18)));
        assert_that!(submission.calldatas[0].to_vec()).is_equal_to(vec![0x12, 0x34]);
    }

    #[test]
    fn names_every_malformed_field() {
        let err = ProposalDraft {
            targets: "[not json".to_string(),
            values: "[1, 2]".to_string(),
            signatures: "{}".to_string(),
            calldatas: r#"["0xzz"]"#.to_string(),
            ..draft()
        }
        .validate()
        .unwrap_err();

        assert_that!(err).is_equal_to(ValidationError::MalformedFields(vec![
            "targets",
            "signatures",
            "calldatas",
        ]));
        assert_that!(err.to_string().as_str())
            .is_equal_to("invalid JSON format in: targets, signatures, calldatas");
    }

    #[test_case(0.0 => false)]
    #[test_case(0.99 => false)]
    #[test_case(1.0 => true)]
    #[test_case(12.0 => true)]
    fn voting_power_threshold(votes: f64) -> bool {
        draft().validate().unwrap().ensure_eligible(votes).is_ok()
    }
}
