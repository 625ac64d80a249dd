/// Maximum number of rating points exchanged in a single match.
pub const K_FACTOR: f64 = 32.0;

/// Rating assigned to newly created players.
pub const DEFAULT_ELO_RATING: i32 = 1000;

/// New ratings for both sides of a decided match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EloUpdate {
    pub new_winner_rating: i32,
    pub new_loser_rating: i32,
}

/// Rounds to the nearest integer, with halves going towards positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Probability that a player rated `rating` beats one rated `opponent`.
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(opponent - rating) / 400.0))
}

/// Standard logistic Elo update for a single decided match.
///
/// Both sides are computed explicitly from their own expected score; callers
/// must not assume the winner's gain mirrors the loser's loss.
pub fn compute_elo(winner_rating: i32, loser_rating: i32) -> EloUpdate {
    let expected_winner = expected_score(winner_rating, loser_rating);
    let expected_loser = 1.0 - expected_winner;

    let new_winner_rating =
        round_half_up(f64::from(winner_rating) + K_FACTOR * (1.0 - expected_winner));
    let new_loser_rating =
        round_half_up(f64::from(loser_rating) + K_FACTOR * (0.0 - expected_loser));

    EloUpdate {
        new_winner_rating,
        new_loser_rating,
    }
}

/// Rounded mean of a two-player team's ratings.
pub fn team_average(first: i32, second: i32) -> i32 {
    round_half_up((f64::from(first) + f64::from(second)) / 2.0)
}

/// Rating points each doubles winner gains (and each loser gives up).
///
/// Runs a single update on the team averages and applies the winner-side
/// delta uniformly to all four players.
pub fn doubles_delta(winner_team: [i32; 2], loser_team: [i32; 2]) -> i32 {
    let winner_avg = team_average(winner_team[0], winner_team[1]);
    let loser_avg = team_average(loser_team[0], loser_team[1]);

    compute_elo(winner_avg, loser_avg).new_winner_rating - winner_avg
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::rstest;

    #[rstest]
    #[case::equal_ratings(1000, 1000, 1016, 984)]
    #[case::underdog_wins(1000, 1200, 1024, 1176)]
    #[case::favorite_wins(1200, 1000, 1208, 992)]
    fn test_compute_elo_vectors(
        #[case] winner: i32,
        #[case] loser: i32,
        #[case] expected_winner: i32,
        #[case] expected_loser: i32,
    ) {
        let update = compute_elo(winner, loser);
        assert_eq!(update.new_winner_rating, expected_winner);
        assert_eq!(update.new_loser_rating, expected_loser);
    }

    #[rstest]
    #[case(0.5, 1)]
    #[case(1.5, 2)]
    #[case(2.49, 2)]
    #[case(-0.5, 0)]
    #[case(-1.6, -2)]
    fn test_round_half_up(#[case] value: f64, #[case] expected: i32) {
        assert_eq!(round_half_up(value), expected);
    }

    #[test]
    fn test_expected_score_is_symmetric() {
        let a = expected_score(1300, 1100);
        let b = expected_score(1100, 1300);
        assert!((a + b - 1.0).abs() < 1e-12);
        assert!(a > 0.5);
    }

    #[test]
    fn test_winner_gains_and_loser_drops_for_random_ratings() {
        let mut rng = rand::rng();

        // Past a gap of roughly 720 points the favorite's gain rounds to zero.
        for _ in 0..1000 {
            let winner = rng.random_range(900..1500);
            let loser = rng.random_range(900..1500);

            let update = compute_elo(winner, loser);
            assert!(
                update.new_winner_rating > winner,
                "winner {winner} vs {loser} did not gain"
            );
            assert!(
                update.new_loser_rating < loser,
                "loser {loser} vs {winner} did not drop"
            );
            assert_eq!(update, compute_elo(winner, loser));
        }
    }

    #[test]
    fn test_gain_never_exceeds_k_factor() {
        let update = compute_elo(100, 3000);
        assert!(update.new_winner_rating - 100 <= K_FACTOR as i32);
        assert!(3000 - update.new_loser_rating <= K_FACTOR as i32);
    }

    #[test]
    fn test_lopsided_favorite_win_rounds_to_no_change() {
        assert_eq!(
            compute_elo(3000, 100),
            EloUpdate {
                new_winner_rating: 3000,
                new_loser_rating: 100,
            }
        );
    }

    #[test]
    fn test_team_average_rounds_half_up() {
        assert_eq!(team_average(1200, 1000), 1100);
        assert_eq!(team_average(1001, 1000), 1001);
        assert_eq!(team_average(999, 1000), 1000);
    }

    #[test]
    fn test_doubles_delta_even_teams() {
        assert_eq!(doubles_delta([1200, 1000], [1100, 1100]), 16);
    }

    #[test]
    fn test_doubles_delta_uses_averages_not_pairs() {
        // Averages 1000 vs 1200: same as a single underdog win.
        assert_eq!(doubles_delta([900, 1100], [1300, 1100]), 24);
        assert_eq!(doubles_delta([1300, 1100], [900, 1100]), 8);
    }
}
