//! Violations and the validation report.
//!
//! The report is the only output of validation. Its ordering is fixed by
//! the assembler: violations are grouped by [`Phase`] and keep their
//! emission (declaration) order inside a group.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{MalformedInputError, SyntaxDefect};

/// Categories of violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationKind {
    /// The document does not match the input schema.
    MalformedInput,
    /// A foreign key points at an undeclared entity.
    DanglingReference,
    /// Two entities of the same kind share an identifier.
    DuplicateIdentifier,
    /// A precedence edge from a job to itself.
    SelfLoop,
    /// The precedence graph contains a cycle.
    CyclicDependency,
    /// A job has no execution mode.
    UnschedulableJob,
    /// A mode demands more of a resource than its capacity.
    InfeasibleDemand,
    /// A job cannot finish inside its own time window.
    InfeasibleWindow,
    /// A precedence edge pushes a successor past its deadline.
    InfeasiblePrecedenceWindow,
    /// A precedence chain cannot fit within the horizon.
    HorizonExceeded,
}

impl ViolationKind {
    /// The checker that reports this kind.
    pub fn phase(self) -> Phase {
        match self {
            Self::MalformedInput => Phase::Syntactic,
            Self::DanglingReference | Self::DuplicateIdentifier => Phase::Reference,
            Self::SelfLoop | Self::CyclicDependency => Phase::Graph,
            Self::UnschedulableJob
            | Self::InfeasibleDemand
            | Self::InfeasibleWindow
            | Self::InfeasiblePrecedenceWindow
            | Self::HorizonExceeded => Phase::Consistency,
        }
    }

    /// Stable name, as used in serialized reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedInput => "MalformedInput",
            Self::DanglingReference => "DanglingReference",
            Self::DuplicateIdentifier => "DuplicateIdentifier",
            Self::SelfLoop => "SelfLoop",
            Self::CyclicDependency => "CyclicDependency",
            Self::UnschedulableJob => "UnschedulableJob",
            Self::InfeasibleDemand => "InfeasibleDemand",
            Self::InfeasibleWindow => "InfeasibleWindow",
            Self::InfeasiblePrecedenceWindow => "InfeasiblePrecedenceWindow",
            Self::HorizonExceeded => "HorizonExceeded",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checker groups, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Schema-level checks.
    Syntactic,
    /// Identifier uniqueness and foreign keys.
    Reference,
    /// Self-loops and cycles.
    Graph,
    /// Numeric and temporal feasibility.
    Consistency,
}

/// A single defect found in an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Defect category.
    pub kind: ViolationKind,
    /// Identifiers of the offending entities (for cycles: the cycle, in order).
    pub entities: Vec<String>,
    /// Offending field, when the defect is tied to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new<I, S>(kind: ViolationKind, entities: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            entities: entities.into_iter().map(Into::into).collect(),
            field: None,
            message: message.into(),
        }
    }

    /// Attaches the offending field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Phase of this violation's kind.
    pub fn phase(&self) -> Phase {
        self.kind.phase()
    }

    /// Key under which repeated findings collapse.
    ///
    /// Kind and entity ids, plus the role of the offending field. The role is
    /// the field path with its indices removed, so the same finding reached
    /// through a repeated entry (a duplicated edge, say) collapses, while the
    /// two ends of one precedence stay apart. Syntactic defects keep the full
    /// path: each location is a separate defect.
    fn identity(&self) -> (ViolationKind, Vec<String>, Option<String>) {
        let field = match self.kind {
            ViolationKind::MalformedInput => self.field.clone(),
            _ => self.field.as_deref().map(field_role),
        };
        (self.kind, self.entities.clone(), field)
    }
}

/// `modes[3].resource_requirements[0].resource_id` →
/// `modes[].resource_requirements[].resource_id`.
fn field_role(path: &str) -> String {
    let mut role = String::with_capacity(path.len());
    let mut in_index = false;
    for c in path.chars() {
        match c {
            '[' => {
                in_index = true;
                role.push(c);
            }
            ']' => {
                in_index = false;
                role.push(c);
            }
            _ if !in_index => role.push(c),
            _ => {}
        }
    }
    role
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Outcome of validating one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
    is_valid: bool,
}

impl ValidationReport {
    /// Assembles a report from unordered checker output.
    ///
    /// Orders by phase (stable, so emission order survives inside a phase)
    /// and drops repeated findings, keeping the first occurrence.
    pub fn assemble(mut violations: Vec<Violation>) -> Self {
        violations.sort_by_key(Violation::phase);

        let mut seen = HashSet::new();
        violations.retain(|v| seen.insert(v.identity()));

        let is_valid = violations.is_empty();
        Self {
            violations,
            is_valid,
        }
    }

    /// A report with no violations.
    pub fn valid() -> Self {
        Self::assemble(Vec::new())
    }

    /// True iff no violation was found.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// All violations, in report order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Number of violations of one kind.
    pub fn count(&self, kind: ViolationKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Distinct kinds present, in report order.
    pub fn kinds(&self) -> Vec<ViolationKind> {
        let mut kinds: Vec<ViolationKind> = Vec::new();
        for v in &self.violations {
            if !kinds.contains(&v.kind) {
                kinds.push(v.kind);
            }
        }
        kinds
    }

    /// Consumes the report, returning its violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::valid()
    }
}

impl From<MalformedInputError> for ValidationReport {
    fn from(err: MalformedInputError) -> Self {
        Self::assemble(err.defects.into_iter().map(Violation::from).collect())
    }
}

impl From<SyntaxDefect> for Violation {
    fn from(defect: SyntaxDefect) -> Self {
        let message = defect.to_string();
        Violation::new(ViolationKind::MalformedInput, defect.entities, message)
            .with_field(defect.path)
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid {
            return write!(f, "valid");
        }
        for v in &self.violations {
            writeln!(f, "{v}")?;
        }
        Ok(())
    }
}
