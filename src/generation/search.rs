//! # Candidate Search
//!
//! Regenerates with derived seeds until a map passes validation.

use super::{create_rng, DungeonGenerator, GeneratedMap, GenerationConfig, Generator};
use crate::{DelveError, DelveResult, QualityAnalyzer, QualityReport};
use log::{debug, info, warn};

/// Outcome of a candidate search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The chosen candidate
    pub best: GeneratedMap,
    /// Quality of the chosen candidate
    pub quality: QualityReport,
    /// Candidates generated before stopping
    pub attempts: u32,
}

impl SearchOutcome {
    pub fn is_acceptable(&self) -> bool {
        self.best.is_acceptable()
    }
}

/// Tries seeds `seed, seed + 1, ...` and keeps the best candidate.
///
/// The first map with no error-severity violations wins. If none is found,
/// the candidate with the fewest errors is returned, ties going to the
/// higher overall quality.
#[derive(Debug, Clone)]
pub struct CandidateSearch {
    generator: DungeonGenerator,
    analyzer: QualityAnalyzer,
    max_attempts: u32,
}

impl CandidateSearch {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            generator: DungeonGenerator::new(),
            analyzer: QualityAnalyzer::new(),
            max_attempts,
        }
    }

    pub fn with_generator(mut self, generator: DungeonGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Seed used for the given attempt.
    pub fn attempt_seed(base: u64, attempt: u32) -> u64 {
        base.wrapping_add(u64::from(attempt))
    }

    /// Runs the search.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{CandidateSearch, GenerationConfig};
    ///
    /// let outcome = CandidateSearch::new(5).search(&GenerationConfig::for_testing(3)).unwrap();
    /// assert!(outcome.attempts >= 1 && outcome.attempts <= 5);
    /// ```
    pub fn search(&self, config: &GenerationConfig) -> DelveResult<SearchOutcome> {
        config.validate()?;

        let mut best: Option<(GeneratedMap, QualityReport)> = None;
        let mut attempts = 0;

        for attempt in 0..self.max_attempts {
            attempts = attempt + 1;
            let candidate_config = config.with_seed(Self::attempt_seed(config.seed, attempt));
            let mut rng = create_rng(&candidate_config);
            let candidate = self.generator.generate(&candidate_config, &mut rng)?;
            let quality = self.analyzer.analyze(&candidate.map);

            if candidate.is_acceptable() {
                info!(
                    "Accepted seed {} after {} attempts (score {:.1})",
                    candidate.seed, attempts, quality.overall
                );
                return Ok(SearchOutcome {
                    best: candidate,
                    quality,
                    attempts,
                });
            }

            debug!(
                "Rejected seed {}: {} errors",
                candidate.seed,
                candidate.validation.errors().count()
            );

            let better = match &best {
                None => true,
                Some((current, current_quality)) => {
                    let errors = candidate.validation.errors().count();
                    let current_errors = current.validation.errors().count();
                    errors < current_errors
                        || (errors == current_errors && quality.overall > current_quality.overall)
                }
            };
            if better {
                best = Some((candidate, quality));
            }
        }

        match best {
            Some((best, quality)) => {
                warn!(
                    "No acceptable map in {} attempts; keeping seed {} with {} errors",
                    attempts,
                    best.seed,
                    best.validation.errors().count()
                );
                Ok(SearchOutcome {
                    best,
                    quality,
                    attempts,
                })
            }
            None => Err(DelveError::GenerationFailed(format!(
                "candidate search ran {} attempts",
                self.max_attempts
            ))),
        }
    }
}

impl Default for CandidateSearch {
    fn default() -> Self {
        Self::new(10)
    }
}
