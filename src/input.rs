use crate::model::Scene;
use crate::sim::PetAction;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(scene: &Scene, ev: InputEvent) -> Option<PetAction> {
    if ev.mods.contains(KeyModifiers::CONTROL) && matches!(ev.key, KeyCode::Char('c')) {
        return Some(PetAction::Quit);
    }

    match scene {
        // Name entry owns printable keys, so quit is Esc here.
        Scene::Create => match ev.key {
            KeyCode::Left | KeyCode::Up => Some(PetAction::CycleKind(-1)),
            KeyCode::Right | KeyCode::Down => Some(PetAction::CycleKind(1)),
            KeyCode::Enter => Some(PetAction::CreatePet),
            KeyCode::Backspace => Some(PetAction::NameBackspace),
            KeyCode::Esc => Some(PetAction::Quit),
            KeyCode::Char(ch) => {
                if ch.is_ascii() && !ch.is_ascii_control() {
                    Some(PetAction::NameChar(ch))
                } else {
                    None
                }
            }
            _ => None,
        },
        Scene::Main => match ev.key {
            KeyCode::Char('f') | KeyCode::Char('F') => Some(PetAction::Feed),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(PetAction::Reset),
            KeyCode::Char('h') | KeyCode::Char('H') => Some(PetAction::HelpToggle),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(PetAction::Quit),
            _ => None,
        },
        Scene::Help => match ev.key {
            KeyCode::Esc => Some(PetAction::Back),
            KeyCode::Char('h') | KeyCode::Char('H') => Some(PetAction::HelpToggle),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(PetAction::Quit),
            _ => None,
        },
    }
}
