use std::env;

use crate::error::ConfigError;

pub const DEFAULT_MAX_EXPANSIONS: usize = 2_000_000;

pub const MAX_EXPANSIONS_VAR: &str = "KLOTSKI_MAX_EXPANSIONS";
pub const DEDUPE_VAR: &str = "KLOTSKI_DEDUPE";

/// Which states the solver treats as already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dedupe {
    /// Every piece is distinct; keyed on [`BoardState::canonical_key`](crate::board::BoardState::canonical_key).
    /// Only practical for boards with few same-shape pieces: the classic
    /// layout does not fit the default budget this way.
    Exact,
    /// Same-shape pieces other than the goal are interchangeable; keyed on
    /// [`BoardState::interchangeable_key`](crate::board::BoardState::interchangeable_key).
    /// Move counts stay optimal and far fewer states are explored.
    #[default]
    Interchangeable,
}

impl std::str::FromStr for Dedupe {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Dedupe::Exact),
            "interchangeable" => Ok(Dedupe::Interchangeable),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Expansions allowed before the search gives up.
    pub max_expansions: usize,
    pub dedupe: Dedupe,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            dedupe: Dedupe::default(),
        }
    }
}

impl SolverConfig {
    /// Defaults, overridden by `KLOTSKI_MAX_EXPANSIONS` and `KLOTSKI_DEDUPE`
    /// when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(MAX_EXPANSIONS_VAR) {
            config.max_expansions = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: MAX_EXPANSIONS_VAR,
                value: value.clone(),
                expected: "expansion count",
            })?;
        }

        if let Some(value) = lookup(DEDUPE_VAR) {
            config.dedupe = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: DEDUPE_VAR,
                value: value.clone(),
                expected: "dedupe mode (exact or interchangeable)",
            })?;
        }

        Ok(config)
    }
}
