//! Utility-maximization selection.
//!
//! The arbitrator decides *whether* a switch is currently admissible and
//! which themes get boosted; the selector owns the max-selection
//! arithmetic: ask every evaluator for its score, pick the best, and ask
//! the winner to install. It is an injected collaborator so hosts can
//! substitute their own selection policy.

use agent_context::{sanitize, AgentContext, DiagnosticEvent, GoalCategory, GoalStatus};

use crate::commitment::{CommitmentManager, SwitchReason, SwitchUrgency};
use crate::config::EvaluatorConfig;
use crate::error::SelectionError;
use crate::evaluator::{EvaluatorSet, InstallEnv, InstallOutcome, ScoringEnv};
use crate::hints::PriorityHints;
use crate::stack::GoalStack;

/// What one selection pass saw and did.
#[derive(Debug)]
pub struct SelectionReport {
    /// Every category's shaped score this pass.
    pub scores: Vec<(GoalCategory, f64)>,
    /// Best positive score, if any category scored above zero.
    pub winner: Option<(GoalCategory, f64)>,
    /// Category actually installed this pass, if a switch happened.
    pub installed: Option<GoalCategory>,
    /// Why the winner was not installed, when it was denied.
    pub denied: Option<SwitchReason>,
    /// Thrash warning raised while recording the switch, if any.
    pub thrash_warning: Option<DiagnosticEvent>,
}

/// Injected selection collaborator.
pub trait GoalSelector {
    /// Scores every evaluator and installs the winner's goal if the
    /// commitment gate admits the switch.
    fn select(
        &mut self,
        ctx: &AgentContext,
        evaluators: &mut EvaluatorSet,
        hints: &PriorityHints,
        urgency: SwitchUrgency,
        stack: &mut dyn GoalStack,
        commitment: &mut CommitmentManager,
        config: &EvaluatorConfig,
    ) -> Result<SelectionReport, SelectionError>;
}

/// Deterministic argmax selection.
#[derive(Debug, Default)]
pub struct MaxUtilitySelector;

impl MaxUtilitySelector {
    pub fn new() -> Self {
        Self
    }
}

impl GoalSelector for MaxUtilitySelector {
    fn select(
        &mut self,
        ctx: &AgentContext,
        evaluators: &mut EvaluatorSet,
        hints: &PriorityHints,
        urgency: SwitchUrgency,
        stack: &mut dyn GoalStack,
        commitment: &mut CommitmentManager,
        config: &EvaluatorConfig,
    ) -> Result<SelectionReport, SelectionError> {
        if evaluators.is_empty() {
            return Err(SelectionError::NoEvaluators);
        }

        let current = stack.current().map(|g| g.category);

        let mut scores = Vec::with_capacity(evaluators.len());
        for evaluator in evaluators.iter_mut() {
            let env = ScoringEnv {
                hints,
                commitment,
                config,
                current_category: current,
            };
            // Belt and braces: individual evaluators already sanitize.
            let score = sanitize(evaluator.desirability(ctx, &env), 0.0).max(0.0);
            scores.push((evaluator.category(), score));
        }

        // Argmax with the incumbent winning exact ties, so equal scores
        // can never flip the active goal.
        let mut winner: Option<(GoalCategory, f64)> = None;
        for &(category, score) in &scores {
            if score <= 0.0 {
                continue;
            }
            let beats = match winner {
                None => true,
                Some((best_cat, best)) => {
                    score > best || (score == best && Some(category) == current && Some(best_cat) != current)
                }
            };
            if beats {
                winner = Some((category, score));
            }
        }

        let mut report = SelectionReport {
            scores,
            winner,
            installed: None,
            denied: None,
            thrash_warning: None,
        };

        let Some((winner_cat, _)) = winner else {
            return Ok(report);
        };
        // Re-selecting the incumbent is a score refresh, not a switch.
        if Some(winner_cat) == current {
            return Ok(report);
        }

        let outcome = {
            let evaluator = evaluators
                .iter_mut()
                .find(|e| e.category() == winner_cat)
                .expect("winner came from this set");
            evaluator.install_goal(
                ctx,
                &mut InstallEnv {
                    stack,
                    commitment,
                    urgency,
                },
            )?
        };

        match outcome {
            InstallOutcome::Installed { thrash_warning } => {
                report.installed = Some(winner_cat);
                report.thrash_warning = thrash_warning;
                // The preempted category starts its cooldown.
                if let Some(prior) = current {
                    if let Some(evaluator) =
                        evaluators.iter_mut().find(|e| e.category() == prior)
                    {
                        evaluator.on_goal_end(ctx.agent_id, GoalStatus::Inactive, &ctx.clock);
                    }
                }
            }
            InstallOutcome::Denied(reason) => {
                report.denied = Some(reason);
            }
        }

        Ok(report)
    }
}
