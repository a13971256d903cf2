use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::geometry::{Direction, Point};

/// Segments owed to the tail for each piece of food eaten.
const GROWTH_PER_FOOD: u32 = 1;

/// Shared handle to the snake's heading.
///
/// The input side only ever writes through it, the ticker only reads it when
/// the snake advances, so a turn lands on the next step and never in the
/// middle of one.
#[derive(Clone, Debug)]
pub struct Steering(Arc<Mutex<Direction>>);

impl Steering {
    fn new(direction: Direction) -> Self {
        Steering(Arc::new(Mutex::new(direction)))
    }

    pub fn turn(&self, direction: Direction) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = direction;
    }

    pub fn direction(&self) -> Direction {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct Snake {
    // Head at the front, tail at the back
    body: VecDeque<Point>,
    heading: Steering,
    pending_growth: u32,
}

impl Snake {
    /// A straight snake of `length` segments whose tail trails away from `direction`.
    pub fn new(head: Point, length: usize, direction: Direction) -> Self {
        assert!(length > 0, "a snake needs at least one segment");

        let back = direction.opposite().delta();
        let body = (0..length as i32)
            .map(|i| Point::new(head.x + back.x * i, head.y + back.y * i))
            .collect();

        Snake { body, heading: Steering::new(direction), pending_growth: 0 }
    }

    /// Builds a snake from explicit segments, head first.
    pub fn from_body(body: Vec<Point>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body: body.into(), heading: Steering::new(direction), pending_growth: 0 }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn body(&self) -> &VecDeque<Point> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.heading.direction()
    }

    pub fn pending_growth(&self) -> u32 {
        self.pending_growth
    }

    /// A handle the input loop can turn the snake with while the ticker owns it.
    pub fn steering(&self) -> Steering {
        self.heading.clone()
    }

    /// Changes heading unconditionally, reversing included. Takes effect on the next advance.
    pub fn turn(&self, direction: Direction) {
        self.heading.turn(direction);
    }

    pub fn advance(&mut self) {
        self.advance_onto(None);
    }

    /// Steps once and eats `food` if the new head lands on it, in which case
    /// the tail stays put this very step. Returns whether it ate.
    pub fn advance_onto(&mut self, food: Option<Point>) -> bool {
        // Read the heading once so a concurrent turn cannot split the step
        let new_head = self.head() + self.heading.direction().delta();
        let ate = food == Some(new_head);
        if ate {
            self.grow();
        }

        self.body.push_front(new_head);

        if self.pending_growth > 0 {
            self.pending_growth -= 1;
        } else {
            self.body.pop_back();
        }

        ate
    }

    pub fn grow(&mut self) {
        self.pending_growth += GROWTH_PER_FOOD;
    }

    /// True when the head sits on any other segment.
    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|&p| p == head)
    }

    pub fn occupies(&self, p: Point) -> bool {
        self.body.contains(&p)
    }
}
