//! Concrete goal evaluators, one per behavior category.

pub mod combat;
pub mod explore;
pub mod resource;
pub mod survival;

pub use combat::{AttackEvaluator, FlankEvaluator, HuntEvaluator};
pub use explore::ExploreEvaluator;
pub use resource::{GetAmmoEvaluator, GetHealthEvaluator, GetWeaponEvaluator};
pub use survival::{RetreatEvaluator, TakeCoverEvaluator};

use crate::config::EvaluatorConfig;
use crate::evaluator::EvaluatorSet;

/// Builds the full evaluator set with biases taken from the config.
pub fn default_evaluators(config: &EvaluatorConfig) -> EvaluatorSet {
    vec![
        Box::new(AttackEvaluator::new(config)),
        Box::new(GetHealthEvaluator::new(config)),
        Box::new(GetAmmoEvaluator::new(config)),
        Box::new(GetWeaponEvaluator::new(config)),
        Box::new(TakeCoverEvaluator::new(config)),
        Box::new(FlankEvaluator::new(config)),
        Box::new(HuntEvaluator::new(config)),
        Box::new(ExploreEvaluator::new(config)),
        Box::new(RetreatEvaluator::new(config)),
    ]
}
