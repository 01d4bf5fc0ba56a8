use crate::config::Grid;
use crate::entity::{Direction, Position};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    HitWall,
    HitSelf,
}

/// What a single call to [`GameState::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// No direction chosen yet, the snake waits.
    Idle,
    Moved,
    Ate,
    Crashed(GameOverReason),
    /// The game is already over; nothing advanced.
    Frozen,
}

/// Read-only view of the game handed to the drawing code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Tail first, head last.
    pub snake: Vec<Position>,
    pub target: Position,
    pub score: u32,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    pub event: TickEvent,
    pub snapshot: Snapshot,
}

pub struct GameState {
    grid: Grid,
    // Tail at the front, head at the back.
    snake: VecDeque<Position>,
    target: Position,
    direction: Option<Direction>,
    pending: Option<Direction>,
    phase: Phase,
    game_over_reason: Option<GameOverReason>,
    rng: StdRng,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self::with_grid(Grid::default(), seed)
    }

    pub fn with_grid(grid: Grid, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let head = random_cell(&mut rng, grid);
        let target = random_cell(&mut rng, grid);

        let mut snake = VecDeque::new();
        snake.push_back(head);

        Self {
            grid,
            snake,
            target,
            direction: None,
            pending: None,
            phase: Phase::Playing,
            game_over_reason: None,
            rng,
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn snake(&self) -> &VecDeque<Position> {
        &self.snake
    }

    pub fn head(&self) -> Position {
        // The body is never empty.
        self.snake[self.snake.len() - 1]
    }

    pub fn target(&self) -> Position {
        self.target
    }

    /// Direction the snake last moved in, `None` before the first move.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn score(&self) -> u32 {
        (self.snake.len() - 1) as u32
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snake: self.snake.iter().copied().collect(),
            target: self.target,
            score: self.score(),
            phase: self.phase,
        }
    }

    /// Queue a turn for the next tick. Reversing onto the current heading is ignored.
    pub fn set_direction(&mut self, requested: Direction) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.direction.map(|d| d.opposite()) == Some(requested) {
            return;
        }
        self.pending = Some(requested);
    }

    pub fn tick(&mut self) -> TickResult {
        let event = self.advance();
        if event != TickEvent::Idle && event != TickEvent::Frozen {
            debug!("tick: {:?}, score {}", event, self.score());
        }
        TickResult {
            event,
            snapshot: self.snapshot(),
        }
    }

    /// Replace this game with a fresh one seeded from the current generator.
    pub fn reset(&mut self) {
        let seed = self.rng.gen();
        *self = Self::with_grid(self.grid, seed);
        info!("game reset");
    }

    fn advance(&mut self) -> TickEvent {
        if self.phase == Phase::GameOver {
            return TickEvent::Frozen;
        }

        if let Some(next) = self.pending.take() {
            self.direction = Some(next);
        }
        let Some(direction) = self.direction else {
            return TickEvent::Idle;
        };

        let next_head = self.head().moved(direction);
        if !self.grid.contains(next_head) {
            return self.end(GameOverReason::HitWall);
        }

        // The tail vacates its cell this tick unless the snake grows.
        let eating = next_head == self.target;
        let hits_self = if eating {
            self.snake.contains(&next_head)
        } else {
            self.snake.iter().skip(1).any(|&cell| cell == next_head)
        };
        if hits_self {
            return self.end(GameOverReason::HitSelf);
        }

        self.snake.push_back(next_head);
        if eating {
            self.relocate_target();
            TickEvent::Ate
        } else {
            self.snake.pop_front();
            TickEvent::Moved
        }
    }

    fn end(&mut self, reason: GameOverReason) -> TickEvent {
        self.phase = Phase::GameOver;
        self.game_over_reason = Some(reason);
        info!("game over ({:?}), final score {}", reason, self.score());
        TickEvent::Crashed(reason)
    }

    // Body cells are not excluded, only the cell just eaten.
    fn relocate_target(&mut self) {
        let eaten = self.target;
        let mut candidate = random_cell(&mut self.rng, self.grid);
        while candidate == eaten && self.grid.cells() > 1 {
            candidate = random_cell(&mut self.rng, self.grid);
        }
        self.target = candidate;
    }
}

fn random_cell(rng: &mut StdRng, grid: Grid) -> Position {
    let cells = grid.cells();
    Position::new(rng.gen_range(0..cells), rng.gen_range(0..cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    fn move_sequence_strategy() -> impl Strategy<Value = Vec<Direction>> {
        prop::collection::vec(direction_strategy(), 1..100)
    }

    /// Build a game with a hand-placed body (tail first) on the default 16x16 grid.
    fn game_with(body: &[Position], direction: Option<Direction>, target: Position) -> GameState {
        let mut game = GameState::new(7);
        game.snake = body.iter().copied().collect();
        game.direction = direction;
        game.target = target;
        game
    }

    fn is_contiguous(snake: &[Position]) -> bool {
        snake
            .windows(2)
            .all(|w| (w[0].x - w[1].x).abs() + (w[0].y - w[1].y).abs() == 1)
    }

    proptest! {
        #[test]
        fn prop_score_is_length_minus_one(
            seed in any::<u64>(),
            moves in move_sequence_strategy(),
        ) {
            let mut game = GameState::new(seed);
            for direction in moves {
                game.set_direction(direction);
                let result = game.tick();
                prop_assert_eq!(result.snapshot.score as usize, result.snapshot.snake.len() - 1);
            }
        }

        #[test]
        fn prop_length_changes_only_by_eating(
            seed in any::<u64>(),
            moves in move_sequence_strategy(),
        ) {
            let mut game = GameState::new(seed);
            for direction in moves {
                let before = game.snake().len();
                game.set_direction(direction);
                let result = game.tick();
                let after = result.snapshot.snake.len();

                match result.event {
                    TickEvent::Ate => prop_assert_eq!(after, before + 1),
                    _ => prop_assert_eq!(after, before),
                }
            }
        }

        #[test]
        fn prop_snake_stays_in_grid_and_contiguous(
            seed in any::<u64>(),
            moves in move_sequence_strategy(),
        ) {
            let mut game = GameState::new(seed);
            let grid = game.grid();
            for direction in moves {
                game.set_direction(direction);
                let result = game.tick();
                prop_assert!(result.snapshot.snake.iter().all(|&cell| grid.contains(cell)));
                prop_assert!(grid.contains(result.snapshot.target));
                prop_assert!(is_contiguous(&result.snapshot.snake));
            }
        }

        #[test]
        fn prop_reverse_never_changes_heading(
            seed in any::<u64>(),
            first in direction_strategy(),
        ) {
            let mut game = GameState::new(seed);
            game.set_direction(first);
            game.tick();
            prop_assume!(game.phase() == Phase::Playing);

            game.set_direction(first.opposite());
            game.tick();
            prop_assert_eq!(game.direction(), Some(first));
        }

        #[test]
        fn prop_game_over_freezes_state(
            seed in any::<u64>(),
            moves in move_sequence_strategy(),
        ) {
            let mut game = GameState::new(seed);
            let mut frozen: Option<Snapshot> = None;
            for direction in moves {
                game.set_direction(direction);
                let result = game.tick();
                if let Some(ref snapshot) = frozen {
                    prop_assert_eq!(result.event, TickEvent::Frozen);
                    prop_assert_eq!(&result.snapshot, snapshot);
                } else if result.snapshot.phase == Phase::GameOver {
                    frozen = Some(result.snapshot);
                }
            }
        }

        #[test]
        fn prop_reset_starts_fresh(
            seed in any::<u64>(),
            moves in move_sequence_strategy(),
        ) {
            let mut game = GameState::new(seed);
            for direction in moves {
                game.set_direction(direction);
                game.tick();
            }
            game.reset();

            prop_assert_eq!(game.phase(), Phase::Playing);
            prop_assert_eq!(game.score(), 0);
            prop_assert_eq!(game.snake().len(), 1);
            prop_assert_eq!(game.direction(), None);
            prop_assert_eq!(game.game_over_reason(), None);
        }
    }

    #[test]
    fn test_new_game_is_waiting() {
        let game = GameState::new(42);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake().len(), 1);
        assert_eq!(game.direction(), None);
        assert!(game.grid().contains(game.head()));
        assert!(game.grid().contains(game.target()));
    }

    #[test]
    fn test_same_seed_same_game() {
        let a = GameState::new(1234);
        let b = GameState::new(1234);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_no_direction_means_no_movement() {
        let mut game = GameState::new(3);
        let before = game.snapshot();

        for _ in 0..5 {
            let result = game.tick();
            assert_eq!(result.event, TickEvent::Idle);
            assert_eq!(result.snapshot, before);
        }
    }

    #[test]
    fn test_single_step_right_keeps_length() {
        let c0 = Position::new(4, 9);
        let mut game = game_with(&[c0], None, Position::new(12, 2));

        game.set_direction(Direction::Right);
        let result = game.tick();

        assert_eq!(result.event, TickEvent::Moved);
        assert_eq!(result.snapshot.snake, vec![Position::new(5, 9)]);
        assert_eq!(result.snapshot.score, 0);
        assert_eq!(result.snapshot.phase, Phase::Playing);
    }

    #[test]
    fn test_eating_grows_and_moves_target() {
        let head = Position::new(6, 6);
        let target = head.moved(Direction::Right);
        let mut game = game_with(&[head], None, target);

        let grid = game.grid();
        let (hx, hy) = grid.to_pixels(head);
        assert_eq!(grid.to_pixels(target), (hx + 50, hy));

        game.set_direction(Direction::Right);
        let result = game.tick();

        assert_eq!(result.event, TickEvent::Ate);
        assert_eq!(result.snapshot.snake, vec![head, target]);
        assert_eq!(result.snapshot.score, 1);
        assert_ne!(result.snapshot.target, target);
    }

    #[test]
    fn test_turning_back_into_body_ends_game() {
        // Length 5 heading right; Down, Left, Up curls the head into its own body.
        let body = [
            Position::new(2, 5),
            Position::new(3, 5),
            Position::new(4, 5),
            Position::new(5, 5),
            Position::new(6, 5),
        ];
        let mut game = game_with(&body, Some(Direction::Right), Position::new(0, 0));

        game.set_direction(Direction::Down);
        assert_eq!(game.tick().event, TickEvent::Moved);
        game.set_direction(Direction::Left);
        assert_eq!(game.tick().event, TickEvent::Moved);
        let before = game.snapshot();

        game.set_direction(Direction::Up);
        let result = game.tick();

        assert_eq!(result.event, TickEvent::Crashed(GameOverReason::HitSelf));
        assert_eq!(result.snapshot.phase, Phase::GameOver);
        assert_eq!(result.snapshot.score, 4);
        assert_eq!(result.snapshot.snake, before.snake);
        assert_eq!(game.game_over_reason(), Some(GameOverReason::HitSelf));
    }

    #[test]
    fn test_can_follow_own_tail() {
        let body = [
            Position::new(4, 5),
            Position::new(4, 4),
            Position::new(5, 4),
            Position::new(5, 5),
        ];
        let mut game = game_with(&body, Some(Direction::Down), Position::new(0, 0));

        game.set_direction(Direction::Left);
        let result = game.tick();

        assert_eq!(result.event, TickEvent::Moved);
        assert_eq!(
            result.snapshot.snake,
            vec![
                Position::new(4, 4),
                Position::new(5, 4),
                Position::new(5, 5),
                Position::new(4, 5),
            ]
        );
    }

    #[test]
    fn test_tail_blocks_when_eating() {
        let body = [
            Position::new(4, 5),
            Position::new(4, 4),
            Position::new(5, 4),
            Position::new(5, 5),
        ];
        // Target sitting on the tail: the tail stays put, so the head collides.
        let mut game = game_with(&body, Some(Direction::Down), Position::new(4, 5));

        game.set_direction(Direction::Left);
        let result = game.tick();

        assert_eq!(result.event, TickEvent::Crashed(GameOverReason::HitSelf));
        assert_eq!(result.snapshot.score, 3);
    }

    #[test]
    fn test_leaving_grid_freezes_snake() {
        let body = [Position::new(14, 3), Position::new(15, 3)];
        let target = Position::new(2, 2);
        let mut game = game_with(&body, Some(Direction::Right), target);

        let result = game.tick();

        assert_eq!(result.event, TickEvent::Crashed(GameOverReason::HitWall));
        assert_eq!(result.snapshot.phase, Phase::GameOver);
        assert_eq!(result.snapshot.snake, body.to_vec());
        assert_eq!(result.snapshot.target, target);
    }

    #[test]
    fn test_leaving_grid_on_every_edge() {
        let cases = [
            (Position::new(0, 8), Direction::Left),
            (Position::new(15, 8), Direction::Right),
            (Position::new(8, 0), Direction::Up),
            (Position::new(8, 15), Direction::Down),
        ];
        for (start, direction) in cases {
            let mut game = game_with(&[start], None, Position::new(3, 3));
            game.set_direction(direction);
            let result = game.tick();
            assert_eq!(result.snapshot.phase, Phase::GameOver, "{:?} from {:?}", direction, start);
            assert_eq!(result.snapshot.snake, vec![start]);
        }
    }

    #[test]
    fn test_ticks_after_game_over_are_frozen() {
        let mut game = game_with(&[Position::new(0, 0)], Some(Direction::Up), Position::new(5, 5));
        game.tick();
        assert_eq!(game.phase(), Phase::GameOver);

        game.set_direction(Direction::Right);
        let result = game.tick();
        assert_eq!(result.event, TickEvent::Frozen);
        assert_eq!(result.snapshot.snake, vec![Position::new(0, 0)]);
        assert_eq!(game.direction(), Some(Direction::Up));
    }

    #[test]
    fn test_cannot_reverse() {
        let mut game = game_with(&[Position::new(8, 8)], Some(Direction::Right), Position::new(0, 0));

        game.set_direction(Direction::Left);
        game.tick();

        assert_eq!(game.direction(), Some(Direction::Right));
        assert_eq!(game.head(), Position::new(9, 8));
    }

    #[test]
    fn test_turns_within_one_tick_cannot_combine_into_reversal() {
        let mut game = game_with(&[Position::new(8, 8)], Some(Direction::Right), Position::new(0, 0));

        // Up is accepted, Left is still the reverse of the committed heading.
        game.set_direction(Direction::Up);
        game.set_direction(Direction::Left);
        game.tick();

        assert_eq!(game.direction(), Some(Direction::Up));
        assert_eq!(game.head(), Position::new(8, 7));
    }

    #[test]
    fn test_first_direction_is_free() {
        for direction in Direction::ALL {
            let mut game = game_with(&[Position::new(8, 8)], None, Position::new(0, 0));
            game.set_direction(direction);
            game.tick();
            assert_eq!(game.direction(), Some(direction));
        }
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut game = game_with(&[Position::new(0, 0)], Some(Direction::Left), Position::new(5, 5));
        game.tick();
        assert_eq!(game.phase(), Phase::GameOver);

        game.reset();

        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake().len(), 1);
        assert_eq!(game.game_over_reason(), None);
    }

    #[test]
    fn test_relocated_target_never_repeats() {
        for seed in 0..200 {
            let mut game = GameState::new(seed);
            let eaten = game.target();
            game.relocate_target();
            assert_ne!(game.target(), eaten);
            assert!(game.grid().contains(game.target()));
        }
    }

    #[test]
    fn test_small_grid_fills_up() {
        // 3x3 cells, walk a lap collecting targets placed ahead of the head.
        let grid = Grid::new(3, 1);
        let mut game = GameState::with_grid(grid, 9);
        game.snake = [Position::new(0, 0)].into_iter().collect();
        game.target = Position::new(1, 0);

        game.set_direction(Direction::Right);
        assert_eq!(game.tick().event, TickEvent::Ate);
        game.target = Position::new(2, 0);
        assert_eq!(game.tick().event, TickEvent::Ate);
        assert_eq!(game.score(), 2);

        let result = game.tick();
        assert_eq!(result.event, TickEvent::Crashed(GameOverReason::HitWall));
        assert_eq!(result.snapshot.score, 2);
    }
}
