//! Answer scoring and end-of-session experience reward.
//!
//! A correct answer earns a flat award plus a bonus that decays linearly with
//! the time used, multiplied by the streak tier and by double-jeopardy.

use serde::{Deserialize, Serialize};

/// Default seconds on the clock for each question.
pub const QUESTION_TIME: u32 = 20;

/// Tunables for the scoring formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Clock units per question.
    pub question_time: u32,
    /// Flat award for any correct answer.
    pub base_points: u64,
    /// Time bonus awarded when the full clock remains.
    pub max_time_bonus: u64,
    /// `(min_streak, multiplier)` tiers. The highest matching tier wins.
    pub streak_tiers: Vec<(u32, u64)>,
    /// Score points per experience point.
    pub experience_divisor: u64,
    /// Experience per step of best streak.
    pub experience_per_streak: u64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            question_time: QUESTION_TIME,
            base_points: 1000,
            max_time_bonus: 500,
            streak_tiers: vec![(3, 2), (5, 3)],
            experience_divisor: 100,
            experience_per_streak: 5,
        }
    }
}

/// Everything the formula looks at for one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreInput {
    pub correct: bool,
    pub time_remaining: u32,
    pub double_jeopardy: bool,
    /// Streak including this answer (0 when incorrect).
    pub streak_after: u32,
}

/// How a question's points were put together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: u64,
    pub time_bonus: u32,
    pub streak_multiplier: u64,
    pub double_jeopardy_multiplier: u64,
    pub total: u64,
}

impl ScoringRules {
    /// Bonus for `time_remaining`: `round(remaining / question_time * max_time_bonus)`.
    pub fn time_bonus(&self, time_remaining: u32) -> u32 {
        if self.question_time == 0 {
            return 0;
        }
        let remaining = u64::from(time_remaining.min(self.question_time));
        let qt = u64::from(self.question_time);
        // round-half-up in integers
        let bonus = (2 * remaining * self.max_time_bonus + qt) / (2 * qt);
        u32::try_from(bonus).unwrap_or(u32::MAX)
    }

    /// Multiplier for a post-answer streak value.
    pub fn streak_multiplier(&self, streak: u32) -> u64 {
        self.streak_tiers
            .iter()
            .filter(|(min, _)| streak >= *min)
            .map(|(_, mult)| *mult)
            .max()
            .unwrap_or(1)
    }

    /// Score one answer.
    pub fn score_answer(&self, input: ScoreInput) -> ScoreBreakdown {
        if !input.correct {
            return ScoreBreakdown {
                base: 0,
                time_bonus: 0,
                streak_multiplier: 1,
                double_jeopardy_multiplier: if input.double_jeopardy { 2 } else { 1 },
                total: 0,
            };
        }

        let time_bonus = self.time_bonus(input.time_remaining);
        let base = self.base_points + u64::from(time_bonus);
        let streak_multiplier = self.streak_multiplier(input.streak_after);
        let double_jeopardy_multiplier = if input.double_jeopardy { 2 } else { 1 };

        ScoreBreakdown {
            base,
            time_bonus,
            streak_multiplier,
            double_jeopardy_multiplier,
            total: base * streak_multiplier * double_jeopardy_multiplier,
        }
    }

    /// Experience for a finished session: `round(total / 100) + best_streak * 5`.
    pub fn experience_reward(&self, total_score: u64, best_streak: u32) -> u64 {
        let from_score = if self.experience_divisor == 0 {
            0
        } else {
            (2 * total_score + self.experience_divisor) / (2 * self.experience_divisor)
        };
        from_score + u64::from(best_streak) * self.experience_per_streak
    }
}
