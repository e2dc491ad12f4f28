//! `[x]` field dispatch
//!
//! Encoding picks the candidate whose type code equals the runtime type of
//! the host value. Decoding scans candidates in declaration order and takes
//! the first branch whose presence bit is set; a branch holding a default
//! value (`false`, an empty wrapper) is set like any other.

use crate::config::MultipleBranchPolicy;
use crate::error::{ConversionError, Result};
use crate::path::ElementPath;
use ferrum_models::{HostValue, WireMessage, WireUnion};
use ferrum_schema::{ChoiceCandidate, ChoiceType};
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceResolver {
    policy: MultipleBranchPolicy,
}

impl ChoiceResolver {
    pub fn new(policy: MultipleBranchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MultipleBranchPolicy {
        self.policy
    }

    /// Candidate matching the runtime type of `value`.
    pub fn select_candidate<'c>(
        &self,
        path: &ElementPath,
        choice: &'c ChoiceType,
        value: &HostValue,
    ) -> Result<&'c ChoiceCandidate> {
        let found = value.type_name();
        let candidate = choice
            .candidate_for(found)
            .ok_or_else(|| ConversionError::UnrecognizedVariant {
                path: path.to_string(),
                found: found.to_string(),
            })?;
        trace!(path = %path, branch = %candidate.branch, "encoding choice");
        Ok(candidate)
    }

    /// First set branch in declaration order, with its candidate. Any set
    /// branch that is not a candidate fails the whole union.
    pub fn resolve_branch<'c, 'u>(
        &self,
        path: &ElementPath,
        choice: &'c ChoiceType,
        union: &'u WireUnion,
    ) -> Result<(&'c ChoiceCandidate, &'u WireMessage)> {
        if union.type_name != choice.union_type {
            return Err(ConversionError::mismatch(
                path,
                format!("expected {}, found {}", choice.union_type, union.type_name),
            ));
        }

        let mut set = choice
            .candidates
            .iter()
            .filter_map(|c| union.branch(&c.branch).map(|message| (c, message)));

        let Some((candidate, message)) = set.next() else {
            return Err(ConversionError::UnresolvedChoice {
                path: path.to_string(),
                set_branches: union.set_branches().map(str::to_string).collect(),
            });
        };

        let undeclared: Vec<String> = union
            .set_branches()
            .filter(|b| choice.candidate_for_branch(b).is_none())
            .map(str::to_string)
            .collect();
        if !undeclared.is_empty() {
            return Err(ConversionError::mismatch(
                path,
                format!("undeclared branches {undeclared:?} are set"),
            ));
        }

        let others: Vec<&str> = set.map(|(c, _)| c.branch.as_str()).collect();
        if !others.is_empty() {
            let branches: Vec<String> = std::iter::once(candidate.branch.as_str())
                .chain(others)
                .map(str::to_string)
                .collect();
            match self.policy {
                MultipleBranchPolicy::Reject => {
                    return Err(ConversionError::AmbiguousChoice {
                        path: path.to_string(),
                        branches,
                    })
                }
                MultipleBranchPolicy::FirstDeclared => {
                    warn!(
                        path = %path,
                        chosen = %candidate.branch,
                        ?branches,
                        "several choice branches set, keeping the first declared"
                    );
                }
            }
        }

        trace!(path = %path, branch = %candidate.branch, "decoding choice");
        Ok((candidate, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrum_models::{HostComposite, HostPrimitive, PrimitiveType};

    fn onset() -> ChoiceType {
        ChoiceType {
            union_type: "Condition.OnsetX".to_string(),
            candidates: vec![
                ChoiceCandidate::primitive(PrimitiveType::DateTime),
                ChoiceCandidate::composite("Age"),
                ChoiceCandidate::composite("Period"),
                ChoiceCandidate::composite("Range"),
                ChoiceCandidate::primitive(PrimitiveType::String),
            ],
        }
    }

    fn path() -> ElementPath {
        ElementPath::root("Condition").choice("onset")
    }

    fn union(branches: &[&str]) -> WireUnion {
        let mut builder = WireUnion::builder("Condition.OnsetX");
        for branch in branches {
            builder.set_branch(*branch, WireMessage::default_instance("Any"));
        }
        builder.build()
    }

    #[test]
    fn test_select_by_runtime_type() {
        let resolver = ChoiceResolver::default();
        let choice = onset();

        let value = HostValue::from(HostPrimitive::date_time("2020"));
        assert_eq!(
            resolver.select_candidate(&path(), &choice, &value).unwrap().branch,
            "date_time"
        );

        let value = HostValue::from(HostComposite::new("Period"));
        assert_eq!(
            resolver.select_candidate(&path(), &choice, &value).unwrap().branch,
            "period"
        );

        let value = HostValue::from(HostPrimitive::boolean(true));
        let err = resolver.select_candidate(&path(), &choice, &value).unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnrecognizedVariant {
                path: "Condition.onset[x]".to_string(),
                found: "boolean".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_branch_is_set() {
        let resolver = ChoiceResolver::default();
        let choice = onset();
        let present = union(&["string_value"]);
        let (candidate, message) = resolver
            .resolve_branch(&path(), &choice, &present)
            .unwrap();
        assert_eq!(candidate.type_code, "string");
        assert!(message.is_default_instance());
    }

    #[test]
    fn test_first_declared_wins() {
        let resolver = ChoiceResolver::default();
        let choice = onset();
        // set order differs from both alphabetical and declared order
        let (candidate, _) = resolver
            .resolve_branch(&path(), &choice, &union(&["period", "date_time"]))
            .unwrap();
        assert_eq!(candidate.type_code, "dateTime");
    }

    #[test]
    fn test_reject_policy() {
        let resolver = ChoiceResolver::new(MultipleBranchPolicy::Reject);
        let choice = onset();
        let err = resolver
            .resolve_branch(&path(), &choice, &union(&["period", "date_time"]))
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::AmbiguousChoice {
                path: "Condition.onset[x]".to_string(),
                branches: vec!["date_time".to_string(), "period".to_string()],
            }
        );

        assert!(resolver
            .resolve_branch(&path(), &choice, &union(&["age"]))
            .is_ok());
    }

    #[test]
    fn test_unresolved() {
        let resolver = ChoiceResolver::default();
        let choice = onset();

        let err = resolver
            .resolve_branch(&path(), &choice, &union(&[]))
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnresolvedChoice { ref set_branches, .. } if set_branches.is_empty()));

        let err = resolver
            .resolve_branch(&path(), &choice, &union(&["boolean"]))
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnresolvedChoice {
                path: "Condition.onset[x]".to_string(),
                set_branches: vec!["boolean".to_string()],
            }
        );
    }

    #[test]
    fn test_undeclared_branch_beside_declared_one() {
        for policy in [MultipleBranchPolicy::FirstDeclared, MultipleBranchPolicy::Reject] {
            let err = ChoiceResolver::new(policy)
                .resolve_branch(&path(), &onset(), &union(&["age", "boolean"]))
                .unwrap_err();
            assert!(
                matches!(err, ConversionError::SchemaMismatch { ref message, .. } if message.contains("boolean")),
                "{policy:?}"
            );
        }
    }
}
