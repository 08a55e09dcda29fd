use std::thread::sleep;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;

use crate::config::Config;
use crate::engine::{Board, EndReason, Engine, Status};
use crate::snake::Direction::{self, *};
use crate::term::TermManager;

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = '*';
const DEAD_SNAKE_CHAR: char = 'X';

/// What the player asked for during one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Turn(Direction),
    Pause,
    Quit,
}

/// Keys read since the last tick, folded into what the loop acts on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    pub turn: Option<Direction>,
    pub pause_toggles: usize,
    pub quit: bool,
}

/// How a finished round wants the program to continue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Play,
    Quit,
}

pub struct SnakeGame {
    config: Config,
    board: Board,
    paused: bool,
    games_played: u64,
    term: TermManager,
}

impl SnakeGame {
    pub fn new(config: Config) -> Result<Self> {
        let term = TermManager::new()?;
        let (cols, rows) = term.get_terminal_size();
        config.fit_terminal(cols, rows)?;

        let board = Board::new(config.width, config.height);
        Ok(SnakeGame { config, board, paused: false, games_played: 0, term })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup()?;
        self.term.set_play_area((self.board.width(), self.board.height()));
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()
    }

    /// Shows the controls, then plays rounds until the player quits.
    pub fn run(&mut self) -> Result<()> {
        if self.show_intro()? == Flow::Quit {
            info!("quit from intro screen");
            return Ok(());
        }

        while self.play()? == Flow::Play {
            info!("starting a new round");
        }

        Ok(())
    }

    pub fn show_intro(&mut self) -> Result<Flow> {
        self.term.clear()?;
        self.term.draw_borders((self.board.width(), self.board.height()))?;
        self.term.show_message(&[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "Q or Ctrl+C to quit",
            "",
            "Press any key to begin"
        ])?;

        let key = self.term.read_key_blocking()?;
        self.term.hide_message()?;

        Ok(if map_key(&key) == Some(Input::Quit) {Flow::Quit} else {Flow::Play})
    }

    pub fn play(&mut self) -> Result<Flow> {
        self.term.clear()?;
        self.term.draw_borders((self.board.width(), self.board.height()))?;
        self.paused = false;

        let seed = self.next_seed();
        self.games_played += 1;
        info!("round {} started with seed {}", self.games_played, seed);

        let mut engine = Engine::new(self.board, self.config.initial_length, self.config.food_reward, seed);
        self.render(&engine)?;

        loop {
            sleep(self.config.tick_interval());

            let input = fold_inputs(self.term.read_key_events_queue()?.iter().filter_map(map_key));

            if input.quit {
                info!("quit during play, score {}", engine.state().score);
                return Ok(Flow::Quit);
            }

            for _ in 0..input.pause_toggles {
                self.toggle_pause()?;
            }

            if !self.paused {
                if let Some(dir) = input.turn {
                    engine.set_direction(dir);
                }

                engine.advance();
                self.render(&engine)?;

                if let Status::GameOver(reason) = engine.state().status {
                    return self.game_over(&engine, reason);
                }
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn next_seed(&self) -> u64 {
        match self.config.seed {
            Some(seed) => seed.wrapping_add(self.games_played),
            None => rand::random(),
        }
    }

    fn render(&mut self, engine: &Engine) -> Result<()> {
        let board = engine.board();
        let state = engine.state();
        let inner_width = board.width() as usize - 2;
        let mut frame = vec![' '; board.interior_size()];
        let cell = |x: u16, y: u16| (y as usize - 1) * inner_width + (x as usize - 1);

        let crashed = matches!(
            state.status,
            Status::GameOver(EndReason::Wall) | Status::GameOver(EndReason::SelfCollision)
        );

        // On a full board the food marker sits under the head
        if state.alive() {
            frame[cell(state.food.x, state.food.y)] = FOOD_CHAR;
        }

        let body_char = if crashed {DEAD_SNAKE_CHAR} else {SNAKE_BODY_CHAR};
        for pos in state.snake.body() {
            frame[cell(pos.x, pos.y)] = body_char;
        }

        if !crashed {
            let head = state.snake.head();
            frame[cell(head.x, head.y)] = state.direction.head_char();
        }

        for pos in board.interior() {
            self.term.print_at((pos.x, pos.y), frame[cell(pos.x, pos.y)])?;
        }

        self.term.print_str_at((0, board.height()), &format!("Score: {}", state.score))?;
        self.term.flush()
    }

    fn game_over(&mut self, engine: &Engine, reason: EndReason) -> Result<Flow> {
        let state = engine.state();
        info!("round {} over ({:?}), final score {}", self.games_played, reason, state.score);

        let headline = match reason {
            EndReason::Wall => "Game over! You hit a wall.",
            EndReason::SelfCollision => "Game over! You bit yourself.",
            EndReason::BoardFull => "You won! The board is full.",
        };

        self.term.show_message(&[
            headline,
            &*format!("Final score: {}", state.score),
            "",
            "Press R to play again,",
            "any other key to quit."
        ])?;

        // Keys mashed just before dying should not dismiss the screen
        self.term.read_key_events_queue()?;
        let key = self.term.read_key_blocking()?;

        Ok(if is_restart(&key) {Flow::Play} else {Flow::Quit})
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Q to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        info!("paused: {}", self.paused);
        Ok(())
    }
}

pub fn map_key(ev: &KeyEvent) -> Option<Input> {
    if is_ctrl_c(ev) {
        return Some(Input::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Input::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Input::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Input::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Input::Turn(Right)),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Input::Quit),
        KeyCode::Esc => Some(Input::Pause),
        _ => None,
    }
}

/// Keeps the most recent turn of the tick; any quit wins over everything else.
pub fn fold_inputs<I: IntoIterator<Item = Input>>(inputs: I) -> TickInput {
    let mut tick = TickInput::default();

    for input in inputs {
        match input {
            Input::Turn(dir) => tick.turn = Some(dir),
            Input::Pause => tick.pause_toggles += 1,
            Input::Quit => tick.quit = true,
        }
    }

    tick
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

fn is_restart(ev: &KeyEvent) -> bool {
    matches!(ev.code, KeyCode::Char('r') | KeyCode::Char('R'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn arrows_and_wasd_turn() {
        assert_eq!(map_key(&key(KeyCode::Up)), Some(Input::Turn(Up)));
        assert_eq!(map_key(&key(KeyCode::Char('a'))), Some(Input::Turn(Left)));
        assert_eq!(map_key(&key(KeyCode::Char('S'))), Some(Input::Turn(Down)));
        assert_eq!(map_key(&key(KeyCode::Right)), Some(Input::Turn(Right)));
    }

    #[test]
    fn quit_and_pause_keys() {
        assert_eq!(map_key(&key(KeyCode::Char('q'))), Some(Input::Quit));
        assert_eq!(map_key(&KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL }), Some(Input::Quit));
        assert_eq!(map_key(&key(KeyCode::Char('c'))), None);
        assert_eq!(map_key(&key(KeyCode::Esc)), Some(Input::Pause));
        assert_eq!(map_key(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn latest_turn_wins() {
        let tick = fold_inputs(vec![Input::Turn(Up), Input::Turn(Left)]);
        assert_eq!(tick.turn, Some(Left));
        assert!(!tick.quit);
    }

    #[test]
    fn no_keys_means_no_change() {
        assert_eq!(fold_inputs(Vec::new()), TickInput::default());
    }

    #[test]
    fn quit_and_pauses_are_kept() {
        let tick = fold_inputs(vec![Input::Pause, Input::Turn(Down), Input::Pause, Input::Quit]);
        assert_eq!(tick.pause_toggles, 2);
        assert_eq!(tick.turn, Some(Down));
        assert!(tick.quit);
    }

    #[test]
    fn restart_key() {
        assert!(is_restart(&key(KeyCode::Char('r'))));
        assert!(is_restart(&key(KeyCode::Char('R'))));
        assert!(!is_restart(&key(KeyCode::Char('q'))));
    }
}
