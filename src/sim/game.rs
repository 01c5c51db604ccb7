//! Game loop orchestration
//!
//! Owns the world, the two timers (tick and spawn), the best-time store and
//! the drawing surface, and runs the Running/Stopped state machine.
//!
//! Every callback arrives through [`Game::dispatch`], so the tick and the
//! spawn timer never run at the same time even though their relative order
//! is up to the scheduler.

use super::state::World;
use super::tick::{TickOutcome, tick};
use crate::consts::*;
use crate::error::GameError;
use crate::format_time;
use crate::highscores::{ScoreStore, load_best_time, record_session};
use crate::input::InputState;
use crate::platform::{EventQueue, Scheduler, TimerEvent, TimerHandle};
use crate::render::{Colour, Surface, draw_hud};
use crate::settings::{GameOverPolicy, Settings, validate_max_obstacles, validate_spawn_interval};
use crate::sim::entity::Entity;
use crate::starfield::StarField;

/// Whether ticks are being scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

pub struct Game<S: Scheduler, D: Surface> {
    world: World,
    input: InputState,
    scheduler: S,
    surface: D,
    store: Box<dyn ScoreStore>,
    /// Cached best time; `None` if never set or the store is unreadable
    best_time: Option<f64>,
    policy: GameOverPolicy,
    starfield: Option<StarField>,
    run_state: RunState,
    tick_handle: Option<TimerHandle>,
    spawn_handle: Option<TimerHandle>,
    /// Sessions started so far (including the current one)
    sessions: u32,
}

impl<S: Scheduler, D: Surface> Game<S, D> {
    /// Build a game with a freshly initialised session. The loop is stopped
    /// until [`Game::start`] is called; the spawn timer is already armed.
    pub fn new(
        settings: &Settings,
        seed: u64,
        now_ms: f64,
        scheduler: S,
        surface: D,
        store: Box<dyn ScoreStore>,
    ) -> Result<Self, GameError> {
        settings.validate()?;

        let starfield = settings.starfield.then(|| {
            StarField::new(
                STAR_COUNT,
                STAR_SPEED,
                seed ^ 0x5eed_57a2,
                surface.width(),
                surface.height(),
            )
        });
        let best_time = load_best_time(&*store);

        let mut game = Self {
            world: World::new(seed, settings.max_obstacles, settings.spawn_interval_secs, now_ms),
            input: InputState::default(),
            scheduler,
            surface,
            store,
            best_time,
            policy: settings.on_game_over,
            starfield,
            run_state: RunState::Stopped,
            tick_handle: None,
            spawn_handle: None,
            sessions: 0,
        };
        game.reset_session();
        Ok(game)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Direction flags, flipped by the host's key handlers
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn best_time(&self) -> Option<f64> {
        self.best_time
    }

    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    pub fn policy(&self) -> GameOverPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: GameOverPolicy) {
        self.policy = policy;
    }

    /// Begin ticking. No-op if already running.
    pub fn start(&mut self, now_ms: f64) {
        if self.run_state == RunState::Running {
            return;
        }
        // A halted game over needs a fresh session before play resumes
        if self.world.done {
            self.reset_session();
        }
        self.world.done = false;
        self.world.clock.resync(now_ms);
        self.tick_handle = Some(self.scheduler.schedule_once(TICK_INTERVAL_MS, TimerEvent::Tick));
        self.run_state = RunState::Running;
        log::info!("Game started");
    }

    /// Stop ticking. No-op if already stopped.
    pub fn stop(&mut self) {
        if self.run_state == RunState::Stopped {
            return;
        }
        if let Some(handle) = self.tick_handle.take() {
            self.scheduler.cancel(handle);
        }
        self.run_state = RunState::Stopped;
        log::info!("Game stopped");
    }

    /// Change the obstacle capacity and re-arm the spawn timer
    pub fn set_max_obstacles(&mut self, n: usize) -> Result<(), GameError> {
        self.world.max_obstacles = validate_max_obstacles(n)?;
        self.rearm_spawn_timer();
        log::info!("Max obstacles set to {}", n);
        Ok(())
    }

    /// Change the spawn interval and re-arm the spawn timer
    pub fn set_spawn_interval(&mut self, secs: f64) -> Result<(), GameError> {
        self.world.spawn_interval_secs = validate_spawn_interval(secs)?;
        self.rearm_spawn_timer();
        log::info!("Spawn interval set to {}s", secs);
        Ok(())
    }

    /// Deliver a fired timer. Stale handles (cancelled or superseded) are ignored.
    pub fn dispatch(&mut self, handle: TimerHandle, event: TimerEvent, now_ms: f64) {
        match event {
            TimerEvent::Tick => {
                if self.tick_handle != Some(handle) {
                    log::trace!("Ignoring stale tick {:?}", handle);
                    return;
                }
                self.tick_handle = None;
                self.on_tick(now_ms);
            }
            TimerEvent::Spawn => {
                if self.spawn_handle != Some(handle) {
                    log::trace!("Ignoring stale spawn timer {:?}", handle);
                    return;
                }
                self.spawn_handle = None;
                self.on_spawn_timer();
            }
        }
    }

    /// Repaint the current state
    pub fn render(&mut self) {
        let surface: &mut dyn Surface = &mut self.surface;
        surface.clear(Colour::BACKGROUND);
        if let Some(starfield) = &self.starfield {
            starfield.render(surface);
        }
        self.world.player.render(surface);
        for obstacle in &self.world.obstacles {
            obstacle.render(surface);
        }
        draw_hud(
            surface,
            self.world.obstacles.len(),
            self.world.timer_ms(),
            self.best_time,
        );
    }

    /// Player at center, full obstacle set, timer at zero, spawn timer re-armed
    fn reset_session(&mut self) {
        let (width, height) = (self.surface.width(), self.surface.height());
        self.world.reset_session(width, height);
        self.rearm_spawn_timer();
        self.sessions += 1;
        log::info!(
            "Session {} started with {} obstacles",
            self.sessions,
            self.world.obstacles.len()
        );
    }

    /// Cancel any pending spawn timer and schedule one at the current interval
    fn rearm_spawn_timer(&mut self) {
        if let Some(handle) = self.spawn_handle.take() {
            self.scheduler.cancel(handle);
        }
        let delay = self.world.spawn_interval_ms();
        self.spawn_handle = Some(self.scheduler.schedule_once(delay, TimerEvent::Spawn));
    }

    fn on_spawn_timer(&mut self) {
        let (width, height) = (self.surface.width(), self.surface.height());
        if !self.world.try_spawn(width, height) {
            log::trace!("At capacity ({}), skipping spawn", self.world.max_obstacles);
        }
        self.rearm_spawn_timer();
    }

    fn on_tick(&mut self, now_ms: f64) {
        if self.run_state != RunState::Running {
            return;
        }
        let (width, height) = (self.surface.width(), self.surface.height());

        let outcome = tick(&mut self.world, &self.input, now_ms, width, height);
        if let TickOutcome::Collided {
            obstacle_id,
            timer_ms,
        } = outcome
        {
            log::info!(
                "Game over after {} (hit obstacle {})",
                format_time(timer_ms),
                obstacle_id
            );
            let committed = record_session(&mut *self.store, self.best_time, timer_ms);
            self.best_time = Some(self.best_time.map_or(committed, |best| best.max(committed)));
        }

        if let Some(starfield) = &mut self.starfield {
            starfield.update(width, height);
        }
        self.render();

        if self.world.done {
            match self.policy {
                GameOverPolicy::Restart => self.reset_session(),
                GameOverPolicy::Halt => {
                    self.run_state = RunState::Stopped;
                    log::info!("Game halted");
                    return;
                }
            }
        }
        self.tick_handle = Some(self.scheduler.schedule_once(TICK_INTERVAL_MS, TimerEvent::Tick));
    }
}

impl<D: Surface> Game<EventQueue, D> {
    /// Fire every timer due at or before `now_ms`. Callbacks observe `now_ms`
    /// as the current time, like a host timer reading its clock on entry.
    /// Returns the number of events delivered.
    pub fn pump(&mut self, now_ms: f64) -> usize {
        let mut fired = 0;
        while let Some((handle, event)) = self.scheduler.pop_due(now_ms) {
            self.dispatch(handle, event, now_ms);
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::highscores::MemoryScoreStore;
    use crate::input::Direction;
    use crate::render::{DrawCommand, RecordingSurface};
    use crate::sim::entity::Obstacle;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn game(settings: Settings) -> Game<EventQueue, RecordingSurface> {
        Game::new(
            &settings,
            17,
            0.0,
            EventQueue::new(0.0),
            RecordingSurface::new(800.0, 600.0),
            Box::new(MemoryScoreStore::new()),
        )
        .expect("valid settings")
    }

    fn quiet() -> Settings {
        Settings {
            starfield: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let settings = Settings {
            max_obstacles: 0,
            ..Default::default()
        };
        let result = Game::new(
            &settings,
            1,
            0.0,
            EventQueue::new(0.0),
            RecordingSurface::new(800.0, 600.0),
            Box::new(MemoryScoreStore::new()),
        );
        assert!(matches!(result, Err(GameError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_new_game_is_stopped_with_spawn_timer_armed() {
        let g = game(quiet());
        assert_eq!(g.run_state(), RunState::Stopped);
        assert_eq!(g.world().obstacles.len(), 10);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Spawn), 1);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Tick), 0);
        assert_eq!(g.sessions(), 1);
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut g = game(quiet());
        g.start(0.0);
        g.start(0.0);
        assert!(g.is_running());
        assert_eq!(g.scheduler().pending_of(TimerEvent::Tick), 1);

        g.stop();
        g.stop();
        assert_eq!(g.run_state(), RunState::Stopped);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Tick), 0);
    }

    #[test]
    fn test_setters_reject_non_positive() {
        let mut g = game(quiet());
        assert!(g.set_max_obstacles(0).is_err());
        assert!(g.set_spawn_interval(0.0).is_err());
        assert!(g.set_spawn_interval(-5.0).is_err());
        assert_eq!(g.world().max_obstacles, 10);
        assert_eq!(g.world().spawn_interval_secs, 5.0);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Spawn), 1);
    }

    #[test]
    fn test_sub_millisecond_interval_rejected_and_pump_terminates() {
        let mut g = game(quiet());
        assert!(g.set_spawn_interval(1e-14).is_err());
        assert_eq!(g.world().spawn_interval_secs, 5.0);

        // Shortest accepted interval still lands strictly after `now`
        g.set_spawn_interval(MIN_SPAWN_INTERVAL_SECS).expect("minimum interval");
        assert_eq!(g.pump(1e6), 1);
        assert_eq!(g.pump(1e6), 0);
        assert_eq!(g.scheduler().next_due(), Some(1e6 + 1.0));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut g = game(quiet());
        g.start(0.0);
        g.stop();
        // A handle that was never the live tick
        let mut other = EventQueue::new(0.0);
        let stale = other.schedule_once(0.0, TimerEvent::Tick);
        g.dispatch(stale, TimerEvent::Tick, 16.0);
        assert_eq!(g.surface().frames, 0);
    }

    /// Store shared with the test so commits can be inspected
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryScoreStore>>);

    impl ScoreStore for SharedStore {
        fn best_time(&self) -> Result<Option<f64>, StoreError> {
            self.0.borrow().best_time()
        }

        fn set_best_time(&mut self, millis: f64) -> Result<(), StoreError> {
            self.0.borrow_mut().set_best_time(millis)
        }
    }

    struct OfflineStore;

    impl ScoreStore for OfflineStore {
        fn best_time(&self) -> Result<Option<f64>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn set_best_time(&mut self, _millis: f64) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    /// Game with no obstacles and a spawn timer far in the future
    fn calm(settings: Settings, store: SharedStore) -> Game<EventQueue, RecordingSurface> {
        let mut g = Game::new(
            &settings,
            17,
            0.0,
            EventQueue::new(0.0),
            RecordingSurface::new(800.0, 600.0),
            Box::new(store),
        )
        .expect("valid settings");
        g.world_mut().obstacles.clear();
        g.set_spawn_interval(3600.0).expect("positive interval");
        g
    }

    /// Obstacle sitting on the player's start position
    fn on_player() -> Obstacle {
        Obstacle::new(9999, Vec2::new(400.0, 300.0), 40.0, 0.0, 0.0, 100)
    }

    #[test]
    fn test_tick_renders_frame() {
        let mut g = calm(quiet(), SharedStore::default());
        g.start(0.0);
        assert_eq!(g.pump(10.0), 0);
        assert_eq!(g.pump(16.0), 1);

        assert_eq!(g.world().timer_ms(), 16.0);
        assert_eq!(g.surface().frames, 1);
        let texts: Vec<&str> = g.surface().texts().collect();
        assert_eq!(texts, vec!["Asteroids: 0", "Best time: N/A", "Time: 00:00:016"]);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Tick), 1);
    }

    #[test]
    fn test_input_moves_player_each_tick() {
        let mut g = calm(quiet(), SharedStore::default());
        g.input_mut().set(Direction::Right, true);
        g.start(0.0);
        g.pump(16.0);
        g.pump(32.0);
        assert_eq!(g.world().player.body.pos, Vec2::new(410.0, 300.0));
    }

    #[test]
    fn test_viewport_follows_surface_size() {
        let mut g = calm(quiet(), SharedStore::default());
        g.surface_mut().resize(300.0, 200.0);
        g.start(0.0);
        g.pump(16.0);
        // (400, 300) is past both edges of the smaller viewport
        assert_eq!(g.world().player.body.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_collision_restarts_session() {
        let store = SharedStore::default();
        let settings = Settings {
            max_obstacles: 4,
            ..quiet()
        };
        let mut g = calm(settings, store.clone());
        g.start(0.0);
        g.pump(16.0);
        g.world_mut().obstacles.push(on_player());
        g.pump(32.0);

        assert_eq!(store.0.borrow().best_time(), Ok(Some(32.0)));
        assert_eq!(g.best_time(), Some(32.0));
        assert!(g.surface().texts().any(|t| t == "Best time: 00:00:032"));

        assert_eq!(g.sessions(), 2);
        assert_eq!(g.world().timer_ms(), 0.0);
        assert_eq!(g.world().obstacles.len(), 4);
        assert!(g.world().obstacles.iter().all(|o| o.id != 9999));
        assert_eq!(g.world().player.body.pos, Vec2::new(400.0, 300.0));
        assert!(!g.world().done);
        assert!(g.is_running());
        assert_eq!(g.scheduler().pending_of(TimerEvent::Tick), 1);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Spawn), 1);
    }

    #[test]
    fn test_halt_policy_stops_until_restarted() {
        let settings = Settings {
            on_game_over: GameOverPolicy::Halt,
            max_obstacles: 3,
            ..quiet()
        };
        let mut g = calm(settings, SharedStore::default());
        g.start(0.0);
        g.world_mut().obstacles.push(on_player());
        g.pump(16.0);

        assert_eq!(g.run_state(), RunState::Stopped);
        assert!(g.world().done);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Tick), 0);
        // The losing frame is drawn; nothing is pruned or reset
        assert_eq!(g.surface().frames, 1);
        assert_eq!(g.world().obstacles.len(), 1);
        assert_eq!(g.world().timer_ms(), 16.0);
        assert_eq!(g.pump(100.0), 0);

        g.start(200.0);
        assert!(g.is_running());
        assert!(!g.world().done);
        assert_eq!(g.sessions(), 2);
        assert_eq!(g.world().obstacles.len(), 3);
        assert_eq!(g.world().timer_ms(), 0.0);
    }

    #[test]
    fn test_shorter_session_keeps_stored_best() {
        let store = SharedStore(Rc::new(RefCell::new(MemoryScoreStore::with_best(5000.0))));
        let mut g = calm(quiet(), store.clone());
        assert_eq!(g.best_time(), Some(5000.0));

        g.start(0.0);
        g.world_mut().obstacles.push(on_player());
        g.pump(3000.0);
        assert_eq!(store.0.borrow().best_time(), Ok(Some(5000.0)));
        assert_eq!(g.best_time(), Some(5000.0));
    }

    #[test]
    fn test_longer_session_updates_stored_best() {
        let store = SharedStore(Rc::new(RefCell::new(MemoryScoreStore::with_best(5000.0))));
        let mut g = calm(quiet(), store.clone());

        g.start(0.0);
        g.world_mut().obstacles.push(on_player());
        g.pump(9000.0);
        assert_eq!(store.0.borrow().best_time(), Ok(Some(9000.0)));
        assert_eq!(g.best_time(), Some(9000.0));
    }

    #[test]
    fn test_unavailable_store_does_not_stop_the_loop() {
        let mut g = Game::new(
            &quiet(),
            3,
            0.0,
            EventQueue::new(0.0),
            RecordingSurface::new(800.0, 600.0),
            Box::new(OfflineStore),
        )
        .expect("valid settings");
        assert_eq!(g.best_time(), None);

        g.world_mut().obstacles.clear();
        g.world_mut().obstacles.push(on_player());
        g.start(0.0);
        g.pump(16.0);
        assert_eq!(g.best_time(), Some(16.0));
        assert!(g.is_running());
        assert_eq!(g.sessions(), 2);
    }

    /// Reads fail, writes land in a shared log
    #[derive(Clone, Default)]
    struct WriteOnlyStore(Rc<RefCell<Vec<f64>>>);

    impl ScoreStore for WriteOnlyStore {
        fn best_time(&self) -> Result<Option<f64>, StoreError> {
            Err(StoreError::Corrupt("garbled".to_string()))
        }

        fn set_best_time(&mut self, millis: f64) -> Result<(), StoreError> {
            self.0.borrow_mut().push(millis);
            Ok(())
        }
    }

    #[test]
    fn test_unreadable_store_keeps_longest_session() {
        let store = WriteOnlyStore::default();
        let settings = Settings {
            on_game_over: GameOverPolicy::Halt,
            ..quiet()
        };
        let mut g = Game::new(
            &settings,
            3,
            0.0,
            EventQueue::new(0.0),
            RecordingSurface::new(800.0, 600.0),
            Box::new(store.clone()),
        )
        .expect("valid settings");
        g.set_spawn_interval(3600.0).expect("positive interval");

        // First session: hit after 9 s
        g.world_mut().obstacles.clear();
        g.world_mut().obstacles.push(on_player());
        g.start(0.0);
        g.pump(9000.0);
        assert!(!g.is_running());
        assert_eq!(g.best_time(), Some(9000.0));

        // Second session: hit after 3 s
        g.start(10_000.0);
        g.world_mut().obstacles.clear();
        g.world_mut().obstacles.push(on_player());
        g.pump(13_000.0);
        assert!(!g.is_running());

        assert_eq!(g.best_time(), Some(9000.0));
        assert_eq!(*store.0.borrow(), vec![9000.0]);
    }

    #[test]
    fn test_spawn_timer_respects_capacity() {
        let settings = Settings {
            max_obstacles: 3,
            spawn_interval_secs: 1.0,
            ..quiet()
        };
        let mut g = game(settings);
        assert_eq!(g.world().obstacles.len(), 3);
        assert_eq!(g.pump(1000.0), 1);
        assert_eq!(g.world().obstacles.len(), 3);

        g.world_mut().obstacles.pop();
        assert_eq!(g.pump(2000.0), 1);
        assert_eq!(g.world().obstacles.len(), 3);
        assert_eq!(g.scheduler().pending_of(TimerEvent::Spawn), 1);
    }

    #[test]
    fn test_config_change_rearms_spawn_timer_once() {
        let mut g = game(quiet());
        g.set_spawn_interval(2.0).expect("positive interval");
        g.set_spawn_interval(0.5).expect("positive interval");
        g.set_max_obstacles(12).expect("positive capacity");
        assert_eq!(g.scheduler().pending_of(TimerEvent::Spawn), 1);
        assert_eq!(g.scheduler().next_due(), Some(500.0));

        // 10 live, capacity 12: spawning resumes on the new interval
        assert_eq!(g.pump(500.0), 1);
        assert_eq!(g.world().obstacles.len(), 11);
        assert_eq!(g.pump(999.0), 0);
        assert_eq!(g.pump(1000.0), 1);
        assert_eq!(g.world().obstacles.len(), 12);
        assert_eq!(g.pump(1500.0), 1);
        assert_eq!(g.world().obstacles.len(), 12);
    }

    #[test]
    fn test_stop_cancels_pending_tick() {
        let mut g = calm(quiet(), SharedStore::default());
        g.start(0.0);
        g.stop();
        assert_eq!(g.pump(100.0), 0);
        assert_eq!(g.surface().frames, 0);
        assert_eq!(g.world().timer_ms(), 0.0);
    }

    #[test]
    fn test_stopped_time_is_not_credited() {
        let mut g = calm(quiet(), SharedStore::default());
        g.start(0.0);
        g.pump(16.0);
        g.stop();
        g.start(10_000.0);
        g.pump(10_016.0);
        assert_eq!(g.world().timer_ms(), 32.0);
    }

    #[test]
    fn test_starfield_drawn_behind_entities() {
        let settings = Settings {
            max_obstacles: 1,
            ..Default::default()
        };
        let mut g = game(settings);
        g.render();
        let commands = &g.surface().commands;
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        let lines = commands
            .iter()
            .take_while(|c| !matches!(c, DrawCommand::Rect { .. }))
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert_eq!(lines, STAR_COUNT);
    }

    #[test]
    fn test_same_seed_replays_identically() {
        let run = || {
            let mut g = game(Settings {
                spawn_interval_secs: 0.25,
                ..Default::default()
            });
            g.input_mut().set(Direction::Down, true);
            g.start(0.0);
            for frame in 1..=300 {
                g.pump(frame as f64 * 16.7);
            }
            (
                g.sessions(),
                g.world().timer_ms(),
                g.world().obstacles.clone(),
                g.world().player.clone(),
                g.best_time(),
            )
        };
        assert_eq!(run(), run());
    }
}
