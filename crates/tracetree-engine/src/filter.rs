use regex::{Regex, RegexBuilder};
use tracetree_types::{Error, Result, TreeNode};

/// Compiled search-box filter.
///
/// The filter string is a comma-separated list of case-insensitive regex
/// fragments matched against a node's name. A fragment prefixed with `!`
/// excludes matching names. A name passes when it matches any inclusion
/// (or there are none) and no exclusion.
#[derive(Debug, Clone)]
pub struct Filter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl Filter {
    pub fn compile(filter: &str) -> Result<Self> {
        Self::build(filter, compile_clause)
    }

    /// Like [`Filter::compile`], but clauses that are not valid regexes are
    /// matched literally instead of failing (search input is often mid-edit).
    pub fn compile_lossy(filter: &str) -> Self {
        let compiled = Self::build(filter, |clause| {
            compile_clause(clause).or_else(|_| compile_clause(&regex::escape(clause)))
        });
        match compiled {
            Ok(filter) => filter,
            Err(err) => {
                tracing::warn!(%err, "falling back to match-all filter");
                Self::match_all()
            }
        }
    }

    /// Filter that accepts every node
    pub fn match_all() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    fn build(filter: &str, compile: impl Fn(&str) -> Result<Regex>) -> Result<Self> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for clause in filter.split(',') {
            let clause = clause.trim();
            match clause.strip_prefix('!') {
                Some(negated) => exclude.push(compile(negated)?),
                None => include.push(compile(clause)?),
            }
        }

        Ok(Self { include, exclude })
    }

    /// Absence of a node never matches
    pub fn matches<T: TreeNode + ?Sized>(&self, node: Option<&T>) -> bool {
        node.is_some_and(|node| self.matches_name(node.name()))
    }

    pub fn matches_name(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|re| re.is_match(name));
        included && self.exclude.iter().all(|re| !re.is_match(name))
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::match_all()
    }
}

fn compile_clause(clause: &str) -> Result<Regex> {
    RegexBuilder::new(clause)
        .case_insensitive(true)
        .build()
        .map_err(|err| Error::InvalidFilter {
            clause: clause.to_string(),
            reason: err.to_string(),
        })
}
