use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Bell,
    Star,
    Diamond,
    Seven,
}

impl SlotSymbol {
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Cherry => "🍒",
            Self::Lemon => "🍋",
            Self::Bell => "🔔",
            Self::Star => "⭐",
            Self::Diamond => "💎",
            Self::Seven => "7️⃣",
        }
    }

    /// Payout multiple of the stake for three of a kind on a line.
    pub fn payout_multiplier(self) -> i64 {
        match self {
            Self::Cherry => 5,
            Self::Lemon => 10,
            Self::Bell => 20,
            Self::Star => 50,
            Self::Diamond => 100,
            Self::Seven => 200,
        }
    }
}

pub const REEL_COUNT: usize = 3;
pub const ROW_COUNT: usize = 3;
const STRIP_LEN: usize = 20;

use SlotSymbol::{Bell, Cherry, Diamond, Lemon, Seven, Star};

/// Fixed cyclic strips, one per reel. Common symbols dominate; rarer
/// symbols appear once or twice so three of a kind stays uncommon.
const REEL_STRIPS: [[SlotSymbol; STRIP_LEN]; REEL_COUNT] = [
    [
        Cherry, Lemon, Bell, Cherry, Star, Lemon, Cherry, Bell, Lemon, Diamond, Cherry, Bell,
        Lemon, Cherry, Star, Bell, Lemon, Cherry, Seven, Diamond,
    ],
    [
        Lemon, Cherry, Bell, Star, Cherry, Lemon, Bell, Cherry, Diamond, Lemon, Cherry, Seven,
        Bell, Lemon, Cherry, Star, Lemon, Bell, Cherry, Diamond,
    ],
    [
        Bell, Cherry, Lemon, Cherry, Diamond, Bell, Lemon, Star, Cherry, Lemon, Bell, Cherry,
        Seven, Lemon, Star, Cherry, Bell, Lemon, Diamond, Cherry,
    ],
];

/// `grid[row][reel]`; each reel contributes one column.
pub type SlotGrid = [[SlotSymbol; REEL_COUNT]; ROW_COUNT];

/// All 8 paylines: three rows, three columns, two diagonals.
pub const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

pub fn line_name(index: usize) -> &'static str {
    match index {
        0 => "top row",
        1 => "middle row",
        2 => "bottom row",
        3 => "left column",
        4 => "middle column",
        5 => "right column",
        6 => "diagonal ↘",
        7 => "diagonal ↗",
        _ => "unknown line",
    }
}

/// Spin all three reels. Each reel stops independently and shows its
/// stop position plus the next two strip positions, cyclically.
/// Suppressed symbols read as 7️⃣ everywhere on the reels.
pub fn spin(suppressed: &[SlotSymbol], rng: &mut impl Rng) -> SlotGrid {
    let mut grid: SlotGrid = [[Cherry; REEL_COUNT]; ROW_COUNT];
    for reel in 0..REEL_COUNT {
        let strip = &REEL_STRIPS[reel];
        let stop = rng.gen_range(0..strip.len());
        for row in 0..ROW_COUNT {
            let mut symbol = strip[(stop + row) % strip.len()];
            if suppressed.contains(&symbol) {
                symbol = Seven;
            }
            grid[row][reel] = symbol;
        }
    }
    grid
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineWin {
    pub line: usize,
    pub symbol: SlotSymbol,
    pub payout: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotEvaluation {
    pub line_wins: Vec<LineWin>,
    pub total_payout: i64,
}

/// Score every payline; all simultaneous three-of-a-kind lines pay.
pub fn evaluate(grid: &SlotGrid, bet: i64) -> SlotEvaluation {
    let mut line_wins = Vec::new();
    let mut total_payout = 0;
    for (index, line) in LINES.iter().enumerate() {
        let [a, b, c] = line.map(|(row, reel)| grid[row][reel]);
        if a == b && b == c {
            let payout = a.payout_multiplier() * bet;
            total_payout += payout;
            line_wins.push(LineWin { line: index, symbol: a, payout });
        }
    }
    SlotEvaluation { line_wins, total_payout }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{evaluate, spin, SlotGrid, SlotSymbol, LINES, REEL_STRIPS};

    #[test]
    fn payline_count_and_shape() {
        assert_eq!(LINES.len(), 8);
        for line in LINES {
            for (row, reel) in line {
                assert!(row < 3 && reel < 3);
            }
        }
    }

    #[test]
    fn evaluate_scores_a_single_winning_column() {
        use SlotSymbol::{Bell, Diamond, Lemon, Seven, Star};
        let grid: SlotGrid = [
            [Seven, Lemon, Bell],
            [Seven, Star, Diamond],
            [Seven, Bell, Lemon],
        ];
        let result = evaluate(&grid, 10);
        assert_eq!(result.line_wins.len(), 1);
        assert_eq!(result.line_wins[0].line, 3);
        assert_eq!(result.line_wins[0].symbol, Seven);
        assert_eq!(result.total_payout, 200 * 10);
    }

    #[test]
    fn evaluate_pays_multiple_simultaneous_lines() {
        use SlotSymbol::Diamond;
        let grid: SlotGrid = [[Diamond; 3]; 3];
        // 3 rows + 3 columns + 2 diagonals, all diamonds.
        let result = evaluate(&grid, 10);
        assert_eq!(result.line_wins.len(), 8);
        assert_eq!(result.total_payout, 8 * 100 * 10);
    }

    #[test]
    fn evaluate_without_matches_pays_nothing() {
        use SlotSymbol::{Bell, Cherry, Lemon, Star};
        // The center breaks both diagonals; no row or column repeats.
        let grid: SlotGrid = [
            [Cherry, Lemon, Bell],
            [Lemon, Star, Cherry],
            [Bell, Cherry, Lemon],
        ];
        let result = evaluate(&grid, 50);
        assert!(result.line_wins.is_empty());
        assert_eq!(result.total_payout, 0);
    }

    #[test]
    fn spin_reads_consecutive_strip_positions() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = spin(&[], &mut rng);
        for reel in 0..3 {
            let strip = &REEL_STRIPS[reel];
            let column = [grid[0][reel], grid[1][reel], grid[2][reel]];
            let found = (0..strip.len()).any(|stop| {
                (0..3).all(|row| strip[(stop + row) % strip.len()] == column[row])
            });
            assert!(found, "reel {reel} column must come from its strip");
        }
    }

    #[test]
    fn suppression_replaces_symbol_with_seven() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..32 {
            let grid = spin(&[SlotSymbol::Cherry], &mut rng);
            for row in grid {
                assert!(!row.contains(&SlotSymbol::Cherry));
            }
        }
    }
}
