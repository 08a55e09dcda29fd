use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::TermInt;
use crate::snake::{Direction, Point, Snake};

/// Random draws tried before falling back to listing every free cell.
const FOOD_SAMPLE_ATTEMPTS: usize = 64;

/// A fixed rectangular grid whose outermost ring of cells is wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: TermInt,
    height: TermInt,
}

impl Board {
    pub fn new(width: TermInt, height: TermInt) -> Self {
        Board { width, height }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }

    pub fn is_interior(&self, pos: Point) -> bool {
        pos.x >= 1 && pos.y >= 1 && pos.x <= self.width - 2 && pos.y <= self.height - 2
    }

    /// Wall cells, and anything past them.
    pub fn is_wall(&self, pos: Point) -> bool {
        !self.is_interior(pos)
    }

    /// Every non-wall cell, row by row.
    pub fn interior(&self) -> impl Iterator<Item = Point> {
        let (w, h) = (self.width, self.height);
        (1..h - 1).flat_map(move |y| (1..w - 1).map(move |x| Point::new(x, y)))
    }

    pub fn interior_size(&self) -> usize {
        (self.width as usize - 2) * (self.height as usize - 2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    Wall,
    SelfCollision,
    /// The snake fills every interior cell, so no food can be placed.
    BoardFull,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    GameOver(EndReason),
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub snake: Snake,
    pub direction: Direction,
    pub food: Point,
    pub score: u64,
    pub status: Status,
}

impl GameState {
    pub fn alive(&self) -> bool {
        self.status == Status::Running
    }
}

pub struct Engine {
    board: Board,
    state: GameState,
    food_reward: u64,
    rng: StdRng,
}

impl Engine {
    /// Starts a game: the snake lies horizontally with its head on the board
    /// center, heading right.
    pub fn new(board: Board, initial_length: usize, food_reward: u64, seed: u64) -> Self {
        let snake = Snake::new(board.center(), initial_length, Direction::Right);
        Self::with_snake(board, snake, Direction::Right, food_reward, seed)
    }

    pub fn with_snake(board: Board, snake: Snake, direction: Direction, food_reward: u64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let (food, status) = match place_food(&board, &snake, &mut rng) {
            Some(food) => (food, Status::Running),
            None => (snake.head(), Status::GameOver(EndReason::BoardFull)),
        };

        let state = GameState { snake, direction, food, score: 0, status };
        Engine { board, state, food_reward, rng }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Turns the snake unless that would reverse it onto its own neck.
    pub fn set_direction(&mut self, requested: Direction) {
        if !self.state.alive() || requested == self.state.direction.opposite() {
            return;
        }

        self.state.direction = requested;
    }

    /// Moves the snake one cell. Once the game is over this does nothing.
    pub fn advance(&mut self) -> &GameState {
        if !self.state.alive() {
            return &self.state;
        }

        let candidate = self.state.snake.head().step(self.state.direction);

        if self.board.is_wall(candidate) {
            self.end(EndReason::Wall);
            return &self.state;
        }

        // The tail still counts: it only moves after the head does
        if self.state.snake.contains(&candidate) {
            self.end(EndReason::SelfCollision);
            return &self.state;
        }

        self.state.snake.push_head(candidate);

        if candidate == self.state.food {
            self.state.score += self.food_reward;
            debug!("food eaten at ({}, {}), score {}", candidate.x, candidate.y, self.state.score);

            match place_food(&self.board, &self.state.snake, &mut self.rng) {
                Some(food) => self.state.food = food,
                None => self.end(EndReason::BoardFull),
            }
        } else {
            self.state.snake.pop_tail();
        }

        &self.state
    }

    fn end(&mut self, reason: EndReason) {
        info!("game over: {:?}, score {}, length {}", reason, self.state.score, self.state.snake.len());
        self.state.status = Status::GameOver(reason);
    }

    #[cfg(test)]
    fn set_food(&mut self, food: Point) {
        self.state.food = food;
    }
}

/// Picks a uniformly random free interior cell, or `None` if the snake covers
/// the whole interior.
pub fn place_food<R: Rng>(board: &Board, snake: &Snake, rng: &mut R) -> Option<Point> {
    if snake.len() >= board.interior_size() {
        return None;
    }

    for _ in 0..FOOD_SAMPLE_ATTEMPTS {
        let pos = Point::new(
            rng.gen_range(1..board.width() - 1),
            rng.gen_range(1..board.height() - 1),
        );

        if !snake.contains(&pos) {
            debug!("food placed at ({}, {})", pos.x, pos.y);
            return Some(pos);
        }
    }

    debug!("food sampling missed {} times, listing free cells", FOOD_SAMPLE_ATTEMPTS);
    let free: Vec<Point> = board.interior().filter(|pos| !snake.contains(pos)).collect();
    free.choose(rng).copied()
}
