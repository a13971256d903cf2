use log::{debug, info};
use rand::Rng;

use crate::error::{Result, SnakeError};
use crate::geometry::{Point, ScreenSize};
use crate::snake::Snake;

/// What a cell is painted as. The canvas picks the actual colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sprite {
    Snake,
    Food,
}

/// The render boundary the scene draws through.
pub trait Canvas {
    /// Erases the previous frame.
    fn clear(&mut self) -> Result<()>;
    fn draw_cell(&mut self, pos: Point, sprite: Sprite) -> Result<()>;
    /// Makes everything drawn since the last `clear` visible.
    fn present(&mut self) -> Result<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfBite,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Running,
    GameOver(Collision),
}

pub struct Scene<C, R> {
    bounds: ScreenSize,
    snake: Snake,
    food: Option<Point>,
    state: GameState,
    canvas: C,
    rng: R,
}

impl<C: Canvas, R: Rng> Scene<C, R> {
    pub fn new(snake: Snake, bounds: ScreenSize, canvas: C, rng: R) -> Result<Self> {
        if snake.body().iter().any(|&p| !bounds.contains(p)) {
            return Err(SnakeError::GridTooSmall { bounds, length: snake.len() });
        }

        Ok(Scene { bounds, snake, food: None, state: GameState::Running, canvas, rng })
    }

    /// Runs one tick: moves the snake, checks collisions and food, then renders.
    ///
    /// Returns `Ok(true)` on the tick the snake crashes. That frame is not
    /// presented, so the last valid one stays on screen.
    pub fn draw(&mut self) -> Result<bool> {
        if self.state != GameState::Running {
            return Err(SnakeError::GameOver);
        }

        self.canvas.clear()?;
        let ate = self.snake.advance_onto(self.food);

        if let Some(collision) = self.collision() {
            info!("game over: {:?} at {:?}, length {}", collision, self.snake.head(), self.snake.len());
            self.state = GameState::GameOver(collision);
            return Ok(true);
        }

        if ate {
            debug!("food eaten at {:?}, length {}", self.snake.head(), self.snake.len());
            self.food = None;
        }

        if self.food.is_none() {
            self.food = self.spawn_food();
        }

        for &pos in self.snake.body() {
            self.canvas.draw_cell(pos, Sprite::Snake)?;
        }
        if let Some(food) = self.food {
            self.canvas.draw_cell(food, Sprite::Food)?;
        }
        self.canvas.present()?;

        Ok(false)
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Point> {
        self.food
    }

    /// Places food directly. Spots outside the grid or under the snake are refused.
    pub fn set_food(&mut self, pos: Point) -> bool {
        if !self.bounds.contains(pos) || self.snake.occupies(pos) {
            return false;
        }
        self.food = Some(pos);
        true
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn bounds(&self) -> ScreenSize {
        self.bounds
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    ///////////////////////////////////////////////////////////////////////////

    fn collision(&self) -> Option<Collision> {
        if self.snake.bites_itself() {
            Some(Collision::SelfBite)
        } else if !self.bounds.contains(self.snake.head()) {
            Some(Collision::Wall)
        } else {
            None
        }
    }

    // Rejection sampling. Slow on a nearly full board, and gives up on a full one.
    fn spawn_food(&mut self) -> Option<Point> {
        if self.snake.len() >= self.bounds.area() {
            info!("no free cell left for food");
            return None;
        }

        loop {
            let pos = Point::new(
                self.rng.gen_range(0..self.bounds.width),
                self.rng.gen_range(0..self.bounds.height),
            );
            if !self.snake.occupies(pos) {
                debug!("food placed at {:?}", pos);
                return Some(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction::{self, *};
    use rand::{rngs::StdRng, SeedableRng};
    use std::io;

    #[derive(Default)]
    struct Recorder {
        clears: usize,
        presents: usize,
        frame: Vec<(Point, Sprite)>,
        fail: bool,
    }

    impl Canvas for Recorder {
        fn clear(&mut self) -> Result<()> {
            self.clears += 1;
            self.frame.clear();
            Ok(())
        }

        fn draw_cell(&mut self, pos: Point, sprite: Sprite) -> Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone").into());
            }
            self.frame.push((pos, sprite));
            Ok(())
        }

        fn present(&mut self) -> Result<()> {
            self.presents += 1;
            Ok(())
        }
    }

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn scene(coords: &[(i32, i32)], dir: Direction, w: i32, h: i32) -> Scene<Recorder, StdRng> {
        let snake = Snake::from_body(pts(coords), dir);
        Scene::new(snake, ScreenSize::new(w, h), Recorder::default(), StdRng::seed_from_u64(7)).unwrap()
    }

    fn body(scene: &Scene<Recorder, StdRng>) -> Vec<Point> {
        scene.snake().body().iter().copied().collect()
    }

    #[test]
    fn one_tick_moves_the_snake() {
        let mut s = scene(&[(5, 5), (4, 5), (3, 5)], Right, 10, 10);

        assert_eq!(s.draw().unwrap(), false);
        assert_eq!(body(&s), pts(&[(6, 5), (5, 5), (4, 5)]));
        assert_eq!(s.state(), GameState::Running);
    }

    #[test]
    fn eating_grows_and_respawns() {
        let mut s = scene(&[(5, 5), (4, 5), (3, 5)], Right, 10, 10);
        assert!(s.set_food(Point::new(6, 5)));

        assert_eq!(s.draw().unwrap(), false);
        assert_eq!(body(&s), pts(&[(6, 5), (5, 5), (4, 5), (3, 5)]));
        assert_eq!(s.snake().pending_growth(), 0);

        let food = s.food().expect("food respawned");
        assert_ne!(food, Point::new(6, 5));
        assert!(!s.snake().occupies(food));
        assert!(s.bounds().contains(food));

        s.food = Some(Point::new(0, 0));
        assert_eq!(s.draw().unwrap(), false);
        assert_eq!(body(&s), pts(&[(7, 5), (6, 5), (5, 5), (4, 5)]));
    }

    #[test]
    fn turn_between_ticks_steers_the_next_one() {
        let mut s = scene(&[(5, 5), (4, 5), (3, 5)], Right, 10, 10);
        s.set_food(Point::new(0, 0));
        let steering = s.snake().steering();

        steering.turn(Up);
        steering.turn(Down);
        s.draw().unwrap();
        assert_eq!(body(&s), pts(&[(5, 6), (5, 5), (4, 5)]));

        s.draw().unwrap();
        assert_eq!(body(&s), pts(&[(5, 7), (5, 6), (5, 5)]));
    }

    #[test]
    fn wall_collision_on_every_side() {
        let cases: &[(&[(i32, i32)], Direction)] = &[
            (&[(0, 0), (1, 0)], Left),
            (&[(9, 3), (8, 3)], Right),
            (&[(4, 0), (4, 1)], Up),
            (&[(4, 9), (4, 8)], Down),
        ];

        for (coords, dir) in cases {
            let mut s = scene(coords, *dir, 10, 10);
            assert_eq!(s.draw().unwrap(), true);
            assert_eq!(s.state(), GameState::GameOver(Collision::Wall));
        }
    }

    #[test]
    fn wall_collision_freezes_the_frame() {
        let mut s = scene(&[(0, 0), (1, 0)], Left, 10, 10);

        assert!(s.draw().unwrap());
        assert_eq!(body(&s), pts(&[(-1, 0), (0, 0)]));
        assert_eq!(s.canvas().presents, 0);
        assert!(s.canvas().frame.is_empty());
    }

    #[test]
    fn self_collision_stops_the_game() {
        // Head at (2,2) going down into (2,3), which is part of the body
        let mut s = scene(&[(2, 2), (3, 2), (3, 3), (2, 3), (1, 3)], Down, 10, 10);

        assert_eq!(s.draw().unwrap(), true);
        assert_eq!(s.state(), GameState::GameOver(Collision::SelfBite));
    }

    #[test]
    fn chasing_the_tail_is_not_a_collision() {
        // The tail leaves (1,2) on the same step the head enters it
        let mut s = scene(&[(1, 1), (2, 1), (2, 2), (1, 2)], Down, 10, 10);
        s.set_food(Point::new(8, 8));

        assert_eq!(s.draw().unwrap(), false);
        assert_eq!(s.snake().head(), Point::new(1, 2));
    }

    #[test]
    fn draw_after_game_over_is_refused() {
        let mut s = scene(&[(0, 0)], Up, 4, 4);
        assert!(s.draw().unwrap());

        assert!(matches!(s.draw(), Err(SnakeError::GameOver)));
        assert_eq!(body(&s), pts(&[(0, -1)]));
    }

    #[test]
    fn frame_holds_body_and_food() {
        let mut s = scene(&[(5, 5), (4, 5), (3, 5)], Right, 10, 10);
        s.set_food(Point::new(0, 0));
        s.draw().unwrap();

        let canvas = s.canvas();
        assert_eq!(canvas.clears, 1);
        assert_eq!(canvas.presents, 1);

        let snake_cells: Vec<Point> =
            canvas.frame.iter().filter(|(_, sp)| *sp == Sprite::Snake).map(|(p, _)| *p).collect();
        assert_eq!(snake_cells, pts(&[(6, 5), (5, 5), (4, 5)]));
        assert_eq!(
            canvas.frame.iter().filter(|(_, sp)| *sp == Sprite::Food).collect::<Vec<_>>(),
            vec![&(Point::new(0, 0), Sprite::Food)]
        );
    }

    #[test]
    fn food_never_lands_on_the_snake() {
        let mut s = scene(&[(2, 1), (1, 1), (0, 1)], Right, 3, 3);

        for _ in 0..50 {
            s.food = None;
            let food = s.spawn_food().unwrap();
            assert!(!s.snake().occupies(food));
            assert!(s.bounds().contains(food));
        }
    }

    #[test]
    fn full_board_leaves_food_unset() {
        let mut s = scene(&[(0, 0), (1, 0), (1, 1), (0, 1)], Down, 2, 2);
        assert_eq!(s.spawn_food(), None);
    }

    #[test]
    fn length_tracks_food_eaten() {
        let mut s = scene(&[(1, 5), (0, 5)], Right, 20, 10);
        let mut eaten = 0;

        for x in 2..15 {
            // Either right under the next head, or out of the way in a corner
            let food = if x % 3 == 0 { Point::new(x, 5) } else { Point::new(19, 0) };
            s.food = Some(food);
            if food.x == x {
                eaten += 1;
            }
            assert_eq!(s.draw().unwrap(), false);
            assert_eq!(s.snake().len(), 2 + eaten);
        }

        assert_eq!(eaten, 4);
    }

    #[test]
    fn snake_outside_the_grid_is_rejected() {
        let snake = Snake::new(Point::new(1, 1), 3, Right);
        let res = Scene::new(snake, ScreenSize::new(2, 2), Recorder::default(), StdRng::seed_from_u64(1));

        assert!(matches!(res, Err(SnakeError::GridTooSmall { length: 3, .. })));
    }

    #[test]
    fn canvas_errors_are_fatal() {
        let snake = Snake::from_body(pts(&[(5, 5)]), Right);
        let canvas = Recorder { fail: true, ..Recorder::default() };
        let mut s = Scene::new(snake, ScreenSize::new(10, 10), canvas, StdRng::seed_from_u64(3)).unwrap();

        assert!(matches!(s.draw(), Err(SnakeError::Io(_))));
    }
}
