//! The evaluation session facade.
//!
//! An [`EvaluationSession`] fixes the label set, classifier count and test
//! size, and serves every table of that shape. Axiom sets depend only on
//! those parameters, so the session builds each subset's set once and
//! shares it read-only afterwards.

use crate::{
    alarm::{AlarmReport, ConsistencyAlarm, KeySelection, SafetySpecification},
    config::EngineConfig,
    error::{EngineError, Result},
    report::ComparisonReport,
};

use algeval_axioms::{AnswerKey, AxiomError, AxiomSet, CountAlgebra, LabelSet, Subset, VoteCountTable};
use algeval_evaluators::{
    Evaluator, ExactIndependentEvaluator, ExactReport, MajorityVotingEvaluator,
};
use algeval_variety::{SubsetSimplexSpace, Variety};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Evaluations of one test shape.
///
/// `EvaluationSession` is `Sync`; one session may serve many threads.
///
/// # Example
///
/// ```rust
/// use algeval_axioms::samples;
/// use algeval_core::{EngineConfig, EvaluationSession};
///
/// let table = samples::uci_adult_observed();
/// let session = EvaluationSession::for_table(&table, EngineConfig::default())?;
/// let report = session.compare(&table)?;
/// assert!(report.is_self_alarmed());
/// # Ok::<(), algeval_core::EngineError>(())
/// ```
#[derive(Debug)]
pub struct EvaluationSession {
    algebra: CountAlgebra,
    config: EngineConfig,
    axioms: RwLock<HashMap<Subset, Arc<AxiomSet>>>,
}

impl EvaluationSession {
    /// Creates a session for `classifiers` classifiers over `labels` on a
    /// test of `test_size` items.
    ///
    /// # Errors
    ///
    /// Passes through the algebra's `InvalidSubset` and
    /// `MalformedCountTable` checks.
    pub fn new(
        labels: LabelSet,
        classifiers: usize,
        test_size: u64,
        config: EngineConfig,
    ) -> Result<Self> {
        let algebra = CountAlgebra::new(labels, classifiers, test_size)?;
        info!(
            labels = %algebra.labels(),
            classifiers,
            test_size,
            "evaluation session created"
        );
        Ok(Self {
            algebra,
            config,
            axioms: RwLock::new(HashMap::new()),
        })
    }

    /// A session shaped like `table`.
    pub fn for_table(table: &VoteCountTable, config: EngineConfig) -> Result<Self> {
        Self::new(
            table.labels().clone(),
            table.arity(),
            table.test_size(),
            config,
        )
    }

    /// Algebra fixing (L, N, Q).
    pub fn algebra(&self) -> &CountAlgebra {
        &self.algebra
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fails unless `table` has this session's labels, arity and test size.
    pub fn check_table(&self, table: &VoteCountTable) -> Result<()> {
        if table.labels() != self.algebra.labels() {
            return Err(AxiomError::MalformedCountTable(format!(
                "table labels {} differ from session labels {}",
                table.labels(),
                self.algebra.labels()
            ))
            .into());
        }
        if table.arity() != self.algebra.classifiers() {
            return Err(AxiomError::MalformedCountTable(format!(
                "table covers {} classifiers, session has {}",
                table.arity(),
                self.algebra.classifiers()
            ))
            .into());
        }
        table.check_test_size(self.algebra.test_size())?;
        Ok(())
    }

    /// Axioms of `subset`, built on first use.
    pub fn axioms(&self, subset: &Subset) -> Result<Arc<AxiomSet>> {
        {
            let cache = self.axioms.read().map_err(poisoned)?;
            if let Some(axioms) = cache.get(subset) {
                return Ok(Arc::clone(axioms));
            }
        }

        let built = Arc::new(self.algebra.axioms_for_subset(subset)?);
        let mut cache = self.axioms.write().map_err(poisoned)?;
        // another thread may have won the race; keep its copy
        let axioms = Arc::clone(cache.entry(subset.clone()).or_insert(built));
        debug!(subset = %subset, cached = cache.len(), "axioms cached");
        Ok(axioms)
    }

    /// Number of subsets whose axioms are cached.
    pub fn cached_subsets(&self) -> usize {
        self.axioms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The consistent variety of `subset` at answer key `key`.
    ///
    /// # Errors
    ///
    /// `ResourceBound` when the configured enumeration bound is hit.
    pub fn variety(
        &self,
        subset: &Subset,
        table: &VoteCountTable,
        key: &AnswerKey,
    ) -> Result<Variety> {
        self.check_table(table)?;
        let axioms = self.axioms(subset)?;
        let space = SubsetSimplexSpace::new(self.algebra.clone(), subset.clone())?;
        Ok(space.enumerate_variety(&axioms, table, key, &self.config.enumeration)?)
    }

    /// Runs one evaluator.
    pub fn evaluate(&self, evaluator: &dyn Evaluator, table: &VoteCountTable) -> Result<ExactReport> {
        self.check_table(table)?;
        debug!(evaluator = evaluator.name(), "evaluating table");
        let report = evaluator.evaluation_exact(table)?;
        if report.status.is_falsified() {
            warn!(
                evaluator = evaluator.name(),
                status = %report.status,
                "evaluator falsified its own assumption"
            );
        }
        Ok(report)
    }

    /// The independent and majority evaluators side by side.
    ///
    /// Errors of either evaluator propagate; one never stands in for the other.
    pub fn compare(&self, table: &VoteCountTable) -> Result<ComparisonReport> {
        let independent = self.evaluate(&ExactIndependentEvaluator::new(), table)?;
        let majority = self.evaluate(&MajorityVotingEvaluator::new(), table)?;
        Ok(ComparisonReport::new(independent, majority, self.config.report))
    }

    /// Consistency alarm over every answer key.
    pub fn alarm(&self, table: &VoteCountTable, specification: SafetySpecification) -> Result<AlarmReport> {
        self.alarm_at(table, specification, KeySelection::Sweep)
    }

    /// Consistency alarm over the selected answer keys.
    pub fn alarm_at(
        &self,
        table: &VoteCountTable,
        specification: SafetySpecification,
        keys: KeySelection,
    ) -> Result<AlarmReport> {
        self.check_table(table)?;
        let mut alarm = ConsistencyAlarm::new(
            self.algebra.clone(),
            specification,
            self.config.alarm,
            self.config.enumeration,
        )?;
        alarm.run_with_axioms(table, keys, |subset| self.axioms(subset))
    }
}

fn poisoned<T>(_: PoisonError<T>) -> EngineError {
    EngineError::Internal("axiom cache lock poisoned".to_string())
}
