// crates/novyra-preflight/src/plan.rs
// ============================================================================
// Module: Deployment Plan
// Description: The three-step deploy checklist with per-variable status.
// Purpose: Show the operator what is done and what blocks the deploy.
// Dependencies: serde, novyra-config
// ============================================================================

//! ## Overview
//! The deploy is three steps: link the repository to the platform, set the
//! contract variables in the platform dashboard, and trigger the deploy.
//! [`DeploymentPlan::build`] derives each step's status from the snapshot and
//! a preflight report; it never touches the platform.

use novyra_config::DbEngine;
use novyra_config::ENV_CONTRACT;
use novyra_config::EnvOrigin;
use novyra_config::EnvSnapshot;
use novyra_config::EnvVarSpec;
use novyra_config::Requirement;
use novyra_config::keys;
use novyra_config::parse_flag_or;
use serde::Serialize;

use crate::diagnostic::PreflightReport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Status of one plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step is complete.
    Done,
    /// Step still needs operator action.
    Pending,
    /// Deploy may be triggered.
    Ready,
    /// Deploy is blocked by preflight failures.
    Blocked,
}

impl StepStatus {
    /// Returns the stable label used in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Blocked => "blocked",
        }
    }
}

/// Status of one contract variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableStatus {
    /// Set to a non-blank value.
    Set,
    /// Unset; the contract default applies.
    Default,
    /// Unset but required for the current configuration.
    Missing,
    /// Unset, optional, and without a default.
    Unset,
    /// Supplied by the hosting platform.
    Injected,
}

impl VariableStatus {
    /// Returns the stable label used in output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Default => "default",
            Self::Missing => "missing",
            Self::Unset => "unset",
            Self::Injected => "injected",
        }
    }
}

/// One row of the set-variables step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableRow {
    /// Contract variable name.
    pub name: &'static str,
    /// Resolved status.
    pub status: VariableStatus,
    /// Layer that supplied the value, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<EnvOrigin>,
    /// Whether the variable belongs in the secret store.
    pub secret: bool,
}

/// One step of the deployment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    /// Step number, starting at 1.
    pub number: u8,
    /// Stable step identifier.
    pub id: &'static str,
    /// Step status.
    pub status: StepStatus,
}

/// Three-step deployment plan.
///
/// # Invariants
/// - `steps` holds exactly link, variables, deploy, in that order.
/// - `variables` follows contract order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    /// Plan steps.
    pub steps: Vec<PlanStep>,
    /// Per-variable status for the set-variables step.
    pub variables: Vec<VariableRow>,
}

/// Step identifier for linking the repository.
pub const STEP_LINK_REPOSITORY: &str = "link_repository";
/// Step identifier for setting variables.
pub const STEP_SET_VARIABLES: &str = "set_variables";
/// Step identifier for triggering the deploy.
pub const STEP_TRIGGER_DEPLOY: &str = "trigger_deploy";

// ============================================================================
// SECTION: Construction
// ============================================================================

impl DeploymentPlan {
    /// Builds the plan from the snapshot, a report, and manifest presence.
    #[must_use]
    pub fn build(snapshot: &EnvSnapshot, report: &PreflightReport, manifest_present: bool) -> Self {
        let variables: Vec<VariableRow> =
            ENV_CONTRACT.iter().map(|spec| variable_row(snapshot, spec)).collect();
        let variables_done = variables.iter().all(|row| row.status != VariableStatus::Missing);
        let steps = vec![
            PlanStep {
                number: 1,
                id: STEP_LINK_REPOSITORY,
                status: if manifest_present { StepStatus::Done } else { StepStatus::Pending },
            },
            PlanStep {
                number: 2,
                id: STEP_SET_VARIABLES,
                status: if variables_done { StepStatus::Done } else { StepStatus::Pending },
            },
            PlanStep {
                number: 3,
                id: STEP_TRIGGER_DEPLOY,
                status: if report.passed() { StepStatus::Ready } else { StepStatus::Blocked },
            },
        ];
        Self {
            steps,
            variables,
        }
    }

    /// Returns the rows with the given status.
    pub fn variables_with(&self, status: VariableStatus) -> impl Iterator<Item = &VariableRow> {
        self.variables.iter().filter(move |row| row.status == status)
    }
}

/// Classifies one contract variable.
fn variable_row(snapshot: &EnvSnapshot, spec: &EnvVarSpec) -> VariableRow {
    let status = if snapshot.get_nonblank(spec.name).is_some() {
        VariableStatus::Set
    } else if spec.requirement == Requirement::PlatformInjected {
        VariableStatus::Injected
    } else if spec.default.is_some() {
        VariableStatus::Default
    } else if requirement_applies(snapshot, spec.requirement) {
        VariableStatus::Missing
    } else {
        VariableStatus::Unset
    };
    VariableRow {
        name: spec.name,
        status,
        origin: if status == VariableStatus::Set { snapshot.origin(spec.name) } else { None },
        secret: spec.secret,
    }
}

/// Returns true when `requirement` makes the variable mandatory for `snapshot`.
fn requirement_applies(snapshot: &EnvSnapshot, requirement: Requirement) -> bool {
    match requirement {
        Requirement::Required => true,
        Requirement::DatabaseGroup => {
            matches!(DbEngine::parse(snapshot.get(keys::DB_ENGINE)), Ok(DbEngine::PostgreSql))
        }
        Requirement::Assistant => {
            parse_flag_or(keys::USE_DEEPSEEK_AI, snapshot.get(keys::USE_DEEPSEEK_AI), true)
                .unwrap_or(true)
        }
        Requirement::Optional | Requirement::PlatformInjected => false,
    }
}
