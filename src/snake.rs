use std::collections::VecDeque;

use crate::TermInt;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: TermInt,
    pub y: TermInt,
}

impl Point {
    pub const fn new(x: TermInt, y: TermInt) -> Self {
        Point { x, y }
    }

    /// The neighbouring cell one step towards `dir`. Saturates at 0, which is
    /// always a wall cell, so stepping off the top/left edge still collides.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Point {
            x: offset(self.x, dx),
            y: offset(self.y, dy),
        }
    }
}

fn offset(v: TermInt, d: i8) -> TermInt {
    match d {
        -1 => v.saturating_sub(1),
        1 => v.saturating_add(1),
        _ => v,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    // y grows downwards, like terminal rows
    pub fn delta(self) -> (i8, i8) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// The snake's body, ordered from head (front) to tail (back).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Point>,
}

impl Snake {
    /// Lays out `size` segments with the head at `head` and the rest trailing
    /// behind it, opposite to `direction`.
    pub fn new(head: Point, size: usize, direction: Direction) -> Self {
        let back = direction.opposite();
        let mut body = VecDeque::with_capacity(size);
        let mut pos = head;

        for _ in 0..size {
            body.push_back(pos);
            pos = pos.step(back);
        }

        Snake { body }
    }

    /// Builds a snake from explicit cells, head first.
    #[cfg(test)]
    pub fn from_cells<I: IntoIterator<Item = Point>>(cells: I) -> Self {
        Snake { body: cells.into_iter().collect() }
    }

    pub fn head(&self) -> Point {
        // Never empty: it starts with at least one segment and only pops after a push
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn body(&self) -> impl Iterator<Item = &Point> + '_ {
        self.body.iter()
    }

    pub fn contains(&self, pos: &Point) -> bool {
        self.body.contains(pos)
    }

    pub fn push_head(&mut self, pos: Point) {
        self.body.push_front(pos);
    }

    pub fn pop_tail(&mut self) -> Option<Point> {
        self.body.pop_back()
    }
}
