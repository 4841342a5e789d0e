//! Stage checking shared by the CLI and library callers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::board::{BoardGraph, BoardStats};
use crate::catalog::ComponentCatalog;
use crate::drc::{DesignRuleChecker, Issue, Severity};
use crate::netlist::{export_netlist, Netlist, NetlistError};
use crate::stage::{load_stage_file, StageError};

#[derive(Debug, thiserror::Error)]
pub enum BoardGraphError {
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),
    #[error("Netlist error: {0}")]
    Netlist(#[from] NetlistError),
}

/// Options for a design-rule check run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Also run strict-only rules
    #[serde(default)]
    pub strict: bool,
    /// Restrict the run to these rule ids; empty runs every rule
    #[serde(default)]
    pub rules: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStats {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl IssueStats {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut stats = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => stats.errors += 1,
                Severity::Warning => stats.warnings += 1,
                Severity::Info => stats.info += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info
    }
}

/// Result of checking one stage
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub issues: Vec<Issue>,
    pub stats: IssueStats,
    pub board: BoardStats,
}

impl CheckResult {
    /// No error-level issues
    pub fn passed(&self) -> bool {
        self.stats.errors == 0
    }

    pub fn has_warnings_or_errors(&self) -> bool {
        self.stats.errors > 0 || self.stats.warnings > 0
    }
}

pub struct BoardCheck;

impl BoardCheck {
    /// Run the default design rules over an already built board
    pub fn check_board(board: &BoardGraph, stage: &str, options: &CheckOptions) -> CheckResult {
        let issues = DesignRuleChecker::with_default_rules().check(board, options);
        let stats = IssueStats::from_issues(&issues);
        tracing::info!(
            stage,
            errors = stats.errors,
            warnings = stats.warnings,
            info = stats.info,
            "checked board"
        );
        CheckResult {
            stage: stage.to_string(),
            file: None,
            issues,
            stats,
            board: board.stats(),
        }
    }

    /// Load a stage file with the builtin catalog and check it
    pub fn check_stage(path: &Path, options: &CheckOptions) -> Result<CheckResult, BoardGraphError> {
        let (spec, board) = load_stage_file(path, &ComponentCatalog::builtin())?;
        let mut result = Self::check_board(&board, &spec.name, options);
        result.file = Some(path.to_path_buf());
        Ok(result)
    }

    /// Load a stage file and export its netlist
    pub fn stage_netlist(path: &Path) -> Result<(String, Netlist), BoardGraphError> {
        let catalog = ComponentCatalog::builtin();
        let (spec, board) = load_stage_file(path, &catalog)?;
        let netlist = export_netlist(&board, &catalog)?;
        Ok((spec.name, netlist))
    }

    /// Load a stage file and return the built board
    pub fn load(path: &Path) -> Result<BoardGraph, BoardGraphError> {
        let (_, board) = load_stage_file(path, &ComponentCatalog::builtin())?;
        Ok(board)
    }
}
