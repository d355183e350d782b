use crate::model::{MoodState, Pet, PetKind, Session};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

pub(crate) const BUBBLE_MIN_WIDTH: usize = 10;
pub(crate) const BUBBLE_MAX_WIDTH: usize = 40;

/* -----------------------------
   Text art: kind x state glyphs
------------------------------ */

pub(crate) fn glyph(kind: PetKind, state: MoodState) -> &'static str {
    match kind {
        PetKind::Cat => match state {
            MoodState::Ecstatic => "=^w^=",
            MoodState::Happy => "=^.^=",
            MoodState::Content => "=^_^=",
            MoodState::Neutral => "=^o^=",
            MoodState::Bored => "=^u^=",
            MoodState::Sad => "=^..^=",
            MoodState::Miserable => "=^;^=",
        },
        PetKind::Dog => match state {
            MoodState::Ecstatic => "U^o^U",
            MoodState::Happy => "U^.^U",
            MoodState::Content => "U^_^U",
            MoodState::Neutral => "Uo_oU",
            MoodState::Bored => "U~o~U",
            MoodState::Sad => "U;_;U",
            MoodState::Miserable => "U...U",
        },
        PetKind::Cow => match state {
            MoodState::Ecstatic => "Moo! ^o^",
            MoodState::Happy => "Moo~ ^.^",
            MoodState::Content => "Moo! :)",
            MoodState::Neutral => "Moo~",
            MoodState::Bored => "Moo... :|",
            MoodState::Sad => "Moo... :(",
            MoodState::Miserable => "Moo... :((",
        },
        PetKind::Bunny => match state {
            MoodState::Ecstatic => "(o>^o^<o)",
            MoodState::Happy => "(o^_^o)",
            MoodState::Content => "(o-_-o)",
            MoodState::Neutral => "(o_o)",
            MoodState::Bored => "(o~o)",
            MoodState::Sad => "(oT_To)",
            MoodState::Miserable => "(o_ _o)",
        },
    }
}

/// Pure view of a pet: the bare glyph, or a speech-bubble block above it.
/// Bubble width is `clamp(len + 4, 10, 40)`; text wider than the interior
/// overflows the border rather than wrapping. Known cosmetic quirk, kept.
pub(crate) fn appearance(pet: &Pet) -> String {
    let art = glyph(pet.kind, pet.state);

    let Some(speech) = &pet.speech else {
        return art.to_string();
    };

    let width = (speech.text.chars().count() + 4).clamp(BUBBLE_MIN_WIDTH, BUBBLE_MAX_WIDTH);
    let top = format!(" {}", "_".repeat(width));
    let text_line = format!("| {:<pad$} |", speech.text, pad = width - 2);
    let bottom = format!(" {}", "-".repeat(width));

    format!("{top}\n{text_line}\n{bottom}\n \\\n  {art}")
}

/* -----------------------------
   Cell buffer + diffed terminal
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let prev = CellBuffer::new(cols, rows);
        let cur = CellBuffer::new(cols, rows);

        Ok(Self {
            out,
            cols,
            rows,
            prev,
            cur,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Overlay drawing
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

pub(crate) fn draw_block(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, line) in s.lines().enumerate() {
        let yy = y.saturating_add(i as u16);
        if yy >= buf.h {
            break;
        }
        draw_text(buf, x, yy, line, fg, bg);
    }
}

fn bar(value01: f32, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

fn mood_color(mood_level: i32, enable_color: bool) -> Color {
    if !enable_color {
        return Color::White;
    }
    if mood_level >= 75 {
        Color::Green
    } else if mood_level >= 45 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub(crate) fn draw_create_scene(buf: &mut CellBuffer, session: &Session) {
    let bg = Color::Black;
    let fg = Color::White;
    let hi = Color::Yellow;

    draw_text(buf, 1, 0, "Termipet - new pet", fg, bg);

    let kind_line = format!("Kind: < {} >", session.selected_kind().label());
    draw_text(buf, 1, 2, &kind_line, hi, bg);

    let mut name_preview = session.name_edit.clone();
    name_preview.push('_');
    let name_line = format!("Name: {}", name_preview);
    draw_text(buf, 1, 3, &name_line, fg, bg);

    draw_text(
        buf,
        1,
        5,
        "Blank name defaults to \"Pet\".",
        Color::DarkGrey,
        bg,
    );
    draw_text(
        buf,
        1,
        buf.h.saturating_sub(1),
        "←/→ kind | type name | enter create | esc quit",
        fg,
        bg,
    );
}

pub(crate) fn draw_main_scene(buf: &mut CellBuffer, session: &Session, enable_color: bool) {
    let bg = Color::Black;
    let fg = Color::White;

    let Some(pet) = &session.pet else {
        return;
    };

    let title = format!(
        "Termipet  |  {} ({})  |  {}",
        pet.name,
        pet.kind.label(),
        pet.state.id()
    );
    draw_text(buf, 1, 0, &title, fg, bg);

    let b = bar(pet.mood_level as f32 / 100.0, 14);
    let mood_line = format!("Mood: {b} {:>3}", pet.mood_level);
    draw_text(
        buf,
        1,
        2,
        &mood_line,
        mood_color(pet.mood_level, enable_color),
        bg,
    );

    draw_text(buf, 1, 4, &pet.status_message(), fg, bg);

    let info = [
        format!("Name:     {}", pet.name),
        format!("Kind:     {}", pet.kind.id()),
        format!("State:    {}", pet.state.id()),
        format!("Mood:     {}", pet.mood_level),
        format!(
            "Created:  {}",
            pet.created_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
        format!(
            "Last fed: {}",
            pet.last_fed_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
    ];
    for (i, line) in info.iter().enumerate() {
        draw_text(buf, 1, 6 + i as u16, line, Color::DarkGrey, bg);
    }

    if let Some(msg) = &session.last_message {
        draw_text(buf, 1, 13, msg, Color::Cyan, bg);
    }

    // pet view on the right half, roughly centered
    let panel = (buf.w / 2).max(30);
    let art = appearance(pet);
    let art_h = art.lines().count() as u16;
    let y0 = (buf.h / 2).saturating_sub(art_h / 2);
    draw_block(buf, panel, y0, &art, fg, bg);

    draw_text(
        buf,
        1,
        buf.h.saturating_sub(1),
        "f feed | r reset | h help | q quit",
        fg,
        bg,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pet;
    use chrono::{TimeZone, Utc};

    fn mochi() -> Pet {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Pet::new(PetKind::Cat, "Mochi", t0)
    }

    #[test]
    fn glyph_table_is_fully_populated() {
        for kind in PetKind::ALL {
            for state in MoodState::ALL {
                assert!(!glyph(kind, state).is_empty());
            }
        }
    }

    #[test]
    fn bare_appearance_is_the_kind_state_glyph() {
        let pet = mochi();
        assert_eq!(appearance(&pet), "=^.^=");
    }

    #[test]
    fn appearance_is_idempotent() {
        let mut pet = mochi();
        pet.speak("Life is good!", pet.created_at);
        assert_eq!(appearance(&pet), appearance(&pet));
    }

    #[test]
    fn speech_bubble_layout_matches_width_formula() {
        let mut pet = mochi();
        pet.speak("Hi!", pet.created_at);

        // 3 chars + 4 clamps up to the minimum width of 10
        let got = appearance(&pet);
        let lines: Vec<&str> = got.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], " __________");
        assert_eq!(lines[1], "| Hi!      |");
        assert_eq!(lines[2], " ----------");
        assert_eq!(lines[3], " \\");
        assert_eq!(lines[4], "  =^.^=");
    }

    #[test]
    fn bubble_width_caps_at_forty_and_overflows() {
        let mut pet = mochi();
        let long = "x".repeat(60);
        pet.speak(&long, pet.created_at);
        let got = appearance(&pet);
        let lines: Vec<&str> = got.lines().collect();
        assert_eq!(lines[0], format!(" {}", "_".repeat(40)));
        // interior is not truncated; the text line overflows the border
        assert_eq!(lines[1], format!("| {} |", long));
        assert_eq!(lines[2], format!(" {}", "-".repeat(40)));
    }
}
