//! Equilibrium detection for randomly seeded lattices.
//!
//! A trial steps a freshly seeded lattice and watches only its population.
//! Two sliding windows of equal length are maintained:
//!
//! - the *tracker*, holding the most recent populations, and
//! - the *period signal*, holding the number of distinct values in the
//!   tracker after each step.
//!
//! A fixed point gives a signal of 1, and a population cycling through k
//! values tends to k. The trial is settled once the whole signal window is a
//! single value no larger than `max_period`.
//!
//! # Liveness
//!
//! Dynamics whose signal never stabilises at or below `max_period` never
//! settle. Without `max_steps` in [`EquilibriumConfig`] such a trial loops
//! forever; with it the trial fails with [`EquilibriumError::Unsettled`].

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::hash::Hash;

use log::{debug, info, warn};
use serde::Serialize;

use super::{BernoulliSource, CellSource, Lattice, StepEngine};
use crate::schema::{ConfigError, EquilibriumConfig};

/// Errors raised while running equilibrium trials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EquilibriumError {
    #[error("Trial {trial} did not settle within {steps} generations")]
    Unsettled { trial: usize, steps: u64 },
}

/// Window entry. Placeholders are distinct from each other and from every
/// real value, so a window only becomes constant once it is fully observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot<T> {
    Placeholder(usize),
    Value(T),
}

/// Fixed-length window that drops its oldest entry on every push.
#[derive(Debug, Clone)]
struct SlidingWindow<T> {
    slots: VecDeque<Slot<T>>,
}

impl<T: Copy + Eq + Hash> SlidingWindow<T> {
    fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(Slot::Placeholder).collect(),
        }
    }

    fn push(&mut self, value: T) {
        self.slots.pop_front();
        self.slots.push_back(Slot::Value(value));
    }

    fn distinct(&self) -> usize {
        self.slots.iter().collect::<HashSet<_>>().len()
    }

    /// The single value held by every slot, if any.
    fn constant(&self) -> Option<T> {
        match self.slots.front() {
            Some(&Slot::Value(first)) if self.slots.iter().all(|&s| s == Slot::Value(first)) => {
                Some(first)
            }
            _ => None,
        }
    }

    fn is_filled(&self) -> bool {
        self.slots.iter().all(|s| matches!(s, Slot::Value(_)))
    }

    fn values(&self) -> Vec<T> {
        self.slots
            .iter()
            .filter_map(|s| match s {
                Slot::Value(v) => Some(*v),
                Slot::Placeholder(_) => None,
            })
            .collect()
    }
}

/// Progress of a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// The population window still holds placeholders.
    WarmingUp,
    /// Window filled, period signal not yet stable.
    Observing,
    /// Period signal constant and within bounds.
    Settled { period: usize },
}

/// State machine fed one population sample per generation.
#[derive(Debug, Clone)]
pub struct EquilibriumMonitor {
    tracker: SlidingWindow<usize>,
    period_signal: SlidingWindow<usize>,
    window: usize,
    max_period: usize,
    steps: u64,
    phase: Phase,
}

impl EquilibriumMonitor {
    /// Create a monitor with the given window length and period bound.
    pub fn new(window: usize, max_period: usize) -> Self {
        Self {
            tracker: SlidingWindow::new(window),
            period_signal: SlidingWindow::new(window),
            window,
            max_period,
            steps: 0,
            phase: Phase::WarmingUp,
        }
    }

    /// Record the population after one generation and return the new phase.
    pub fn observe(&mut self, population: usize) -> Phase {
        self.steps += 1;
        self.tracker.push(population);
        self.period_signal.push(self.tracker.distinct());

        self.phase = match self.period_signal.constant() {
            Some(period) if period <= self.max_period => Phase::Settled { period },
            _ if self.tracker.is_filled() => Phase::Observing,
            _ => Phase::WarmingUp,
        };
        self.phase
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generations observed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Generations observed beyond the initial window fill.
    pub fn settling_time(&self) -> u64 {
        self.steps.saturating_sub(self.window as u64)
    }

    /// Populations currently in the window, oldest first.
    pub fn window(&self) -> Vec<usize> {
        self.tracker.values()
    }

    /// Mean of the populations in the window.
    pub fn mean_population(&self) -> f64 {
        let values = self.tracker.values();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<usize>() as f64 / values.len() as f64
    }

    /// Sorted distinct populations in the window.
    pub fn signature(&self) -> Vec<usize> {
        let mut values = self.tracker.values();
        values.sort_unstable();
        values.dedup();
        values
    }
}

/// Lattice saved because its population cycles with a long period.
#[derive(Debug, Clone, Serialize)]
pub struct NotableOscillator {
    pub trial: usize,
    /// Sorted distinct populations visited by the cycle.
    pub signature: Vec<usize>,
    pub lattice: Lattice,
}

/// Result of one settled trial.
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    pub trial: usize,
    /// Generations to settle, excluding the window warm-up.
    pub settling_time: u64,
    /// Detected period (distinct populations in the final window).
    pub period: usize,
    /// Final population window, oldest first.
    pub window: Vec<usize>,
    /// Mean of the final window.
    pub settled_population: f64,
    #[serde(skip)]
    pub oscillator: Option<NotableOscillator>,
}

/// Aggregate statistics over all trials.
#[derive(Debug, Clone, Serialize)]
pub struct EquilibriumSummary {
    pub trials: usize,
    pub mean_settling_time: f64,
    pub max_settling_time: u64,
    pub mean_settled_population: f64,
    /// Trial count per detected period.
    pub periods: BTreeMap<usize, usize>,
    pub notable_oscillators: usize,
}

/// Results of a full equilibrium run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EquilibriumReport {
    pub outcomes: Vec<TrialOutcome>,
}

impl EquilibriumReport {
    /// Settling time of every trial, in trial order.
    pub fn settling_times(&self) -> Vec<u64> {
        self.outcomes.iter().map(|o| o.settling_time).collect()
    }

    /// Settled population of every trial, in trial order.
    pub fn settled_populations(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.settled_population).collect()
    }

    /// Trials flagged as notable oscillators.
    pub fn oscillators(&self) -> impl Iterator<Item = &NotableOscillator> {
        self.outcomes.iter().filter_map(|o| o.oscillator.as_ref())
    }

    pub fn summary(&self) -> EquilibriumSummary {
        let trials = self.outcomes.len();
        let denom = trials.max(1) as f64;
        let mut periods = BTreeMap::new();
        for outcome in &self.outcomes {
            *periods.entry(outcome.period).or_insert(0) += 1;
        }

        EquilibriumSummary {
            trials,
            mean_settling_time: self
                .outcomes
                .iter()
                .map(|o| o.settling_time as f64)
                .sum::<f64>()
                / denom,
            max_settling_time: self
                .outcomes
                .iter()
                .map(|o| o.settling_time)
                .max()
                .unwrap_or(0),
            mean_settled_population: self
                .outcomes
                .iter()
                .map(|o| o.settled_population)
                .sum::<f64>()
                / denom,
            periods,
            notable_oscillators: self.oscillators().count(),
        }
    }
}

/// Runs repeated random trials until each settles.
pub struct EquilibriumDetector<S: CellSource = BernoulliSource> {
    config: EquilibriumConfig,
    source: S,
    lattice: Lattice,
    engine: StepEngine,
}

impl EquilibriumDetector<BernoulliSource> {
    /// Create a detector drawing cells from a Bernoulli source.
    pub fn new(config: EquilibriumConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = BernoulliSource::with_optional_seed(config.random_seed, config.density)
            .map_err(|_| ConfigError::InvalidDensity(config.density))?;
        Self::with_source(config, source)
    }
}

impl<S: CellSource> EquilibriumDetector<S> {
    /// Create a detector with an explicit cell source.
    pub fn with_source(config: EquilibriumConfig, source: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let lattice = Lattice::empty(config.size);
        let engine = StepEngine::new(config.size);
        Ok(Self {
            config,
            source,
            lattice,
            engine,
        })
    }

    pub fn config(&self) -> &EquilibriumConfig {
        &self.config
    }

    /// Lattice of the most recent trial.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Reseed the lattice and step it until its population settles.
    pub fn run_trial(&mut self, trial: usize) -> Result<TrialOutcome, EquilibriumError> {
        self.lattice.reseed(&mut self.source);
        settle(&self.config, &mut self.engine, &mut self.lattice, trial)
    }

    /// Step a caller-supplied lattice until its population settles.
    pub fn settle(
        &mut self,
        lattice: &mut Lattice,
        trial: usize,
    ) -> Result<TrialOutcome, EquilibriumError> {
        settle(&self.config, &mut self.engine, lattice, trial)
    }

    /// Run all configured trials.
    pub fn run(&mut self) -> Result<EquilibriumReport, EquilibriumError> {
        self.run_with_callback(|_| {})
    }

    /// Run all configured trials, invoking `callback` after each one.
    pub fn run_with_callback<F>(
        &mut self,
        mut callback: F,
    ) -> Result<EquilibriumReport, EquilibriumError>
    where
        F: FnMut(&TrialOutcome),
    {
        let mut report = EquilibriumReport {
            outcomes: Vec::with_capacity(self.config.trials),
        };

        for trial in 0..self.config.trials {
            let outcome = self.run_trial(trial)?;
            callback(&outcome);
            report.outcomes.push(outcome);
        }

        let summary = report.summary();
        info!(
            "{} trials settled: mean time {:.1}, mean population {:.2}, {} notable oscillators",
            summary.trials,
            summary.mean_settling_time,
            summary.mean_settled_population,
            summary.notable_oscillators
        );

        Ok(report)
    }
}

fn settle(
    config: &EquilibriumConfig,
    engine: &mut StepEngine,
    lattice: &mut Lattice,
    trial: usize,
) -> Result<TrialOutcome, EquilibriumError> {
    let mut monitor = EquilibriumMonitor::new(config.window, config.max_period);

    let period = loop {
        if let Some(cap) = config.max_steps
            && monitor.steps() >= cap
        {
            warn!(
                "trial {} unsettled after {} generations, window {:?}",
                trial,
                monitor.steps(),
                monitor.window()
            );
            return Err(EquilibriumError::Unsettled {
                trial,
                steps: monitor.steps(),
            });
        }

        engine.step(lattice);
        if let Phase::Settled { period } = monitor.observe(lattice.population()) {
            break period;
        }
    };

    let signature = monitor.signature();
    let oscillator = (period > config.notable_period).then(|| {
        info!("trial {} settled into period {} oscillation {:?}", trial, period, signature);
        NotableOscillator {
            trial,
            signature: signature.clone(),
            lattice: lattice.clone(),
        }
    });

    let outcome = TrialOutcome {
        trial,
        settling_time: monitor.settling_time(),
        period,
        window: monitor.window(),
        settled_population: monitor.mean_population(),
        oscillator,
    };
    debug!(
        "trial {}: settled after {} generations at {:.2} (period {})",
        trial, outcome.settling_time, outcome.settled_population, period
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Pattern, Seed};

    fn test_config() -> EquilibriumConfig {
        EquilibriumConfig {
            size: 16,
            trials: 3,
            max_steps: Some(5_000),
            ..Default::default()
        }
    }

    fn feed(monitor: &mut EquilibriumMonitor, values: impl IntoIterator<Item = usize>) -> Phase {
        let mut phase = monitor.phase();
        for v in values {
            phase = monitor.observe(v);
            if matches!(phase, Phase::Settled { .. }) {
                break;
            }
        }
        phase
    }

    #[test]
    fn test_window_placeholders() {
        let mut window = SlidingWindow::<usize>::new(4);
        assert_eq!(window.distinct(), 4);
        assert_eq!(window.constant(), None);

        for _ in 0..3 {
            window.push(0);
        }
        // One placeholder left plus a single value.
        assert_eq!(window.distinct(), 2);
        assert!(!window.is_filled());
        assert_eq!(window.constant(), None);

        window.push(0);
        assert_eq!(window.constant(), Some(0));
        assert_eq!(window.values(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_fixed_point_settles() {
        let mut monitor = EquilibriumMonitor::new(20, 4);
        assert_eq!(monitor.phase(), Phase::WarmingUp);

        let phase = feed(&mut monitor, std::iter::repeat(50).take(100));
        assert_eq!(phase, Phase::Settled { period: 1 });
        // Window fills after 20 steps, the signal window after 19 more.
        assert_eq!(monitor.steps(), 39);
        assert_eq!(monitor.settling_time(), 19);
        assert_eq!(monitor.mean_population(), 50.0);
        assert_eq!(monitor.signature(), vec![50]);
    }

    #[test]
    fn test_phase_progression() {
        let mut monitor = EquilibriumMonitor::new(20, 4);
        for _ in 0..19 {
            assert_eq!(monitor.observe(7), Phase::WarmingUp);
        }
        assert_eq!(monitor.observe(7), Phase::Observing);
    }

    #[test]
    fn test_period_two_settles() {
        let mut monitor = EquilibriumMonitor::new(20, 4);
        let phase = feed(&mut monitor, [12, 15].into_iter().cycle().take(200));
        assert_eq!(phase, Phase::Settled { period: 2 });
        assert_eq!(monitor.steps(), 39);
        assert_eq!(monitor.mean_population(), 13.5);
        assert_eq!(monitor.signature(), vec![12, 15]);
    }

    #[test]
    fn test_long_period_never_settles() {
        let mut monitor = EquilibriumMonitor::new(20, 4);
        let phase = feed(&mut monitor, [1, 2, 3, 4, 5].into_iter().cycle().take(500));
        assert_eq!(phase, Phase::Observing);
        assert_eq!(monitor.steps(), 500);
    }

    #[test]
    fn test_max_period_bound() {
        let mut monitor = EquilibriumMonitor::new(20, 2);
        let phase = feed(&mut monitor, [1, 2, 3].into_iter().cycle().take(200));
        assert_eq!(phase, Phase::Observing);

        let mut monitor = EquilibriumMonitor::new(20, 4);
        let phase = feed(&mut monitor, [1, 2, 3].into_iter().cycle().take(200));
        assert_eq!(phase, Phase::Settled { period: 3 });
    }

    #[test]
    fn test_dead_source_settles_at_zero() {
        let mut detector = EquilibriumDetector::with_source(test_config(), || 0u8).unwrap();
        let report = detector.run().unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.settling_times(), vec![19, 19, 19]);
        assert_eq!(report.settled_populations(), vec![0.0, 0.0, 0.0]);
        assert_eq!(report.oscillators().count(), 0);

        let summary = report.summary();
        assert_eq!(summary.periods.get(&1), Some(&3));
        assert_eq!(summary.mean_settling_time, 19.0);
    }

    #[test]
    fn test_settle_block() {
        let mut detector = EquilibriumDetector::with_source(test_config(), || 0u8).unwrap();
        let seed = Seed {
            pattern: Pattern::Block { origin: (4, 4) },
        };
        let mut lattice = Lattice::from_seed(&seed, 16);

        let outcome = detector.settle(&mut lattice, 0).unwrap();
        assert_eq!(outcome.period, 1);
        assert_eq!(outcome.settled_population, 4.0);
        assert_eq!(outcome.window, vec![4; 20]);
        assert_eq!(lattice.generation(), 39);
    }

    /// Period-3 pulsar in its 48-cell phase, top-left corner at (3, 3).
    fn pulsar(size: usize) -> Lattice {
        let mut cells = Vec::new();
        for r in [0, 5, 7, 12] {
            for c in [2, 3, 4, 8, 9, 10] {
                cells.push((r + 3, c + 3));
                cells.push((c + 3, r + 3));
            }
        }
        let seed = Seed {
            pattern: Pattern::Custom { cells },
        };
        Lattice::from_seed(&seed, size)
    }

    #[test]
    fn test_pulsar_flagged_as_notable() {
        let mut detector = EquilibriumDetector::with_source(test_config(), || 0u8).unwrap();
        let mut lattice = pulsar(20);
        assert_eq!(lattice.population(), 48);

        let outcome = detector.settle(&mut lattice, 6).unwrap();
        assert_eq!(outcome.period, 3);
        assert_eq!(outcome.settling_time, 19);

        let oscillator = outcome.oscillator.expect("period 3 is above the notable period");
        assert_eq!(oscillator.trial, 6);
        assert_eq!(oscillator.signature, vec![48, 56, 72]);
        assert_eq!(oscillator.lattice, lattice);
    }

    #[test]
    fn test_blinker_not_notable() {
        let mut detector = EquilibriumDetector::with_source(test_config(), || 0u8).unwrap();
        let seed = Seed {
            pattern: Pattern::Blinker {
                origin: (5, 5),
                vertical: false,
            },
        };
        let mut lattice = Lattice::from_seed(&seed, 16);

        let outcome = detector.settle(&mut lattice, 0).unwrap();
        assert_eq!(outcome.period, 1);
        assert!(outcome.oscillator.is_none());
    }

    #[test]
    fn test_iteration_cap() {
        // A glider keeps a constant population and would settle after 39
        // generations; the cap stops it first.
        let config = EquilibriumConfig {
            max_steps: Some(10),
            ..test_config()
        };
        let mut detector = EquilibriumDetector::with_source(config, || 0u8).unwrap();
        let mut lattice = Lattice::from_seed(&Seed::default(), 16);

        let err = detector.settle(&mut lattice, 4).unwrap_err();
        assert_eq!(err, EquilibriumError::Unsettled { trial: 4, steps: 10 });
        assert_eq!(lattice.generation(), 10);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = EquilibriumConfig {
            random_seed: Some(1234),
            ..test_config()
        };
        let run = |config: EquilibriumConfig| {
            EquilibriumDetector::new(config)
                .unwrap()
                .run()
                .map(|r| (r.settling_times(), r.settled_populations()))
        };
        assert_eq!(run(config.clone()), run(config));
    }

    #[test]
    fn test_invalid_config() {
        let config = EquilibriumConfig {
            trials: 0,
            ..Default::default()
        };
        assert!(matches!(
            EquilibriumDetector::new(config),
            Err(ConfigError::InvalidTrials)
        ));
    }
}
