// Public API - pure rating math, no I/O
pub use elo::{
    compute_elo, doubles_delta, expected_score, round_half_up, team_average, EloUpdate,
    DEFAULT_ELO_RATING, K_FACTOR,
};

mod elo;
