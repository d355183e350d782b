use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action};
use crate::model::{PetKind, Scene, Session};
use crate::render::{draw_create_scene, draw_main_scene, draw_text, Cell, Terminal};
use crate::sim::PetAction;
use std::cmp::min;
use std::time::{Duration, Instant};

// One sim tick per second, matching the mood-decay contract.
const TICK_STEP: Duration = Duration::from_secs(1);

pub(crate) struct App {
    settings: Settings,
    session: Session,
    paths: Paths,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let mut settings = load_settings(&paths.settings_path);

        // ensure deterministic seed exists
        if settings.seed == 0 {
            settings.seed = 0xC0FFEE_u64;
        }

        let session = Session::new(
            settings.seed,
            PetKind::from_id(&settings.default_kind),
            &settings.default_name,
        );
        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            session,
            paths,
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);

        let mut last_frame = Instant::now();
        let mut tick_accum = Duration::ZERO;

        while !self.should_quit {
            let _resized = self.term.resize_if_needed()?;

            // input
            let events = collect_input_nonblocking(frame_dt)?;
            for ev in events {
                if let Some(action) = map_event_to_action(&self.session.scene, ev) {
                    match action {
                        PetAction::Quit => {
                            self.should_quit = true;
                            break;
                        }
                        _ => self.session.apply(action, chrono::Utc::now()),
                    }
                }
            }

            // fixed-step tick cadence; only runs while a pet session is live,
            // and resetting drops the accumulator with the pet
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;

            let Session { pet, rng, .. } = &mut self.session;
            if let Some(pet) = pet {
                tick_accum = tick_accum.saturating_add(real_dt);
                while tick_accum >= TICK_STEP {
                    pet.tick(chrono::Utc::now(), &mut *rng);
                    tick_accum = tick_accum.saturating_sub(TICK_STEP);
                }
                // speech clears within a frame of its deadline
                pet.expire_speech(chrono::Utc::now());
            } else {
                tick_accum = Duration::ZERO;
            }

            self.render_frame()?;

            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        self.settings.default_kind = self.session.selected_kind().id().to_string();
        self.settings.default_name = match &self.session.pet {
            Some(pet) => pet.name.clone(),
            None => self.session.name_edit.clone(),
        };
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = crossterm::style::Color::Black;
        self.term.cur.clear(bg);

        match self.session.scene {
            Scene::Create => draw_create_scene(&mut self.term.cur, &self.session),
            Scene::Main => {
                draw_main_scene(&mut self.term.cur, &self.session, self.settings.enable_color)
            }
            Scene::Help => {
                draw_main_scene(&mut self.term.cur, &self.session, self.settings.enable_color);
                self.draw_center_box(
                    "How to play",
                    "Keep your pet fed and its mood stays up.\n\
    Mood starts at 80 and feeding adds 20 (capped at 100).\n\
    Going more than a minute without food drains mood\n\
    a little every second, down to 0.\n\n\
    The mood bar maps to seven states, from ecstatic\n\
    down to miserable; the art changes to match.\n\
    Sometimes your pet pipes up with a thought of its own.\n\n\
    F Feed | R Reset (new pet) | Q Quit\n\n\
    Esc or H to close help.",
                )?;
            }
        }

        self.term.present(true)?;
        Ok(())
    }

    fn draw_center_box(&mut self, title: &str, body: &str) -> anyhow::Result<()> {
        let w = self.term.cols;
        let h = self.term.rows;

        let bw = min(58, w.saturating_sub(4));
        let bh = min(18, h.saturating_sub(4));

        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;

        let fg = crossterm::style::Color::White;
        let bg = crossterm::style::Color::Black;
        let cell = |ch| Cell { ch, fg, bg };

        for x in x0..x0 + bw {
            self.term.cur.set(x, y0, cell('─'));
            self.term.cur.set(x, y0 + bh - 1, cell('─'));
        }
        for y in y0..y0 + bh {
            self.term.cur.set(x0, y, cell('│'));
            self.term.cur.set(x0 + bw - 1, y, cell('│'));
        }
        self.term.cur.set(x0, y0, cell('┌'));
        self.term.cur.set(x0 + bw - 1, y0, cell('┐'));
        self.term.cur.set(x0, y0 + bh - 1, cell('└'));
        self.term.cur.set(x0 + bw - 1, y0 + bh - 1, cell('┘'));

        // interior blanked so the box reads over the scene behind it
        for y in y0 + 1..y0 + bh - 1 {
            for x in x0 + 1..x0 + bw - 1 {
                self.term.cur.set(x, y, cell(' '));
            }
        }

        draw_text(&mut self.term.cur, x0 + 2, y0 + 1, title, fg, bg);

        let mut yy = y0 + 3;
        for line in body.lines() {
            if yy >= y0 + bh - 1 {
                break;
            }
            draw_text(&mut self.term.cur, x0 + 2, yy, line, fg, bg);
            yy += 1;
        }

        Ok(())
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
