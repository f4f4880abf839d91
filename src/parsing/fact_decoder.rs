//! Classification of raw query rows into a closed set of facts.
//!
//! Each [`QueryRecord`] is matched against the configured patterns exactly
//! once; consumers dispatch on the resulting [`Fact`] instead of re-running
//! pattern matches.

use regex::Regex;

use crate::config::{ConfigError, ExtractionConfig, FactPatterns, RoleNames};
use crate::core::QueryRecord;

/// One decoded row. Node-bearing facts keep the node id and the unparsed
/// companion literal; attribute facts keep the unparsed literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Fact {
    RevisionCount { node: Option<String>, companion: Option<String> },
    Size { node: Option<String>, companion: Option<String> },
    BirthDate(String),
    DeathDate(String),
    OfficeTenure(String),
    ContributorCount(String),
    Unrecognized,
}

struct CompiledPatterns {
    rev_per_month: Regex,
    average_size_per_month: Regex,
    birth_date: Regex,
    death_date: Regex,
    office_tenure: Regex,
    unique_contributors: Regex,
    node_id: Regex,
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|source| ConfigError::Pattern { pattern: pattern.to_string(), source })
}

impl CompiledPatterns {
    fn new(patterns: &FactPatterns) -> Result<Self, ConfigError> {
        Ok(Self {
            rev_per_month: compile(&patterns.rev_per_month)?,
            average_size_per_month: compile(&patterns.average_size_per_month)?,
            birth_date: compile(&patterns.birth_date)?,
            death_date: compile(&patterns.death_date)?,
            office_tenure: compile(&patterns.office_tenure)?,
            unique_contributors: compile(&patterns.unique_contributors)?,
            node_id: compile(&patterns.node_id)?,
        })
    }
}

pub struct FactDecoder {
    roles: RoleNames,
    patterns: CompiledPatterns,
}

impl FactDecoder {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        Ok(Self { roles: config.roles.clone(), patterns: CompiledPatterns::new(&config.patterns)? })
    }

    /// Series facts take precedence over attribute facts; a row yields at most one fact.
    pub fn decode(&self, record: &QueryRecord) -> Fact {
        let p = &self.patterns;
        let node = || record.value_of(&self.roles.value).map(str::to_string);
        let companion = || record.value_of(&self.roles.secondary_value).map(str::to_string);

        for value in record.values() {
            if p.rev_per_month.is_match(value) {
                return Fact::RevisionCount { node: node(), companion: companion() };
            }
            if p.average_size_per_month.is_match(value) {
                return Fact::Size { node: node(), companion: companion() };
            }
        }

        if let (Some(predicate), Some(value)) = (
            record.value_of(&self.roles.secondary_predicate),
            record.value_of(&self.roles.secondary_value),
        ) {
            if p.birth_date.is_match(predicate) {
                return Fact::BirthDate(value.to_string());
            }
            if p.death_date.is_match(predicate) {
                return Fact::DeathDate(value.to_string());
            }
            if p.office_tenure.is_match(predicate) {
                return Fact::OfficeTenure(value.to_string());
            }
        }

        if let Some(predicate) = record.value_of(&self.roles.predicate) {
            if p.unique_contributors.is_match(predicate) {
                if let Some(value) = record.value_of(&self.roles.value) {
                    return Fact::ContributorCount(value.to_string());
                }
            }
        }

        Fact::Unrecognized
    }

    pub fn is_node_id(&self, id: &str) -> bool {
        self.patterns.node_id.is_match(id)
    }
}
