use crate::model::{
    derive_state, MoodState, Pet, PetRng, Scene, Session, Speech, FEED_BOOST, HUNGER_PENALTY,
    HUNGER_THRESHOLD_MS, NAME_MAX, RANDOM_THOUGHT_CHANCE, SPEECH_DURATION_MS,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};

pub(crate) const FEED_PHRASE: &str = "Yum! That was delicious!";

pub(crate) const THOUGHT_PHRASES: [&str; 7] = [
    "Life is good!",
    "I'm feeling kind of sleepy...",
    "I need a snack!",
    "I'm bored... entertain me!",
    "You're my favorite human.",
    "Let's go on an adventure!",
    "Why is the sky blue?",
];

/// Injected randomness seam: production uses the counter-based SplitMix64
/// from the model, tests substitute a scripted source.
pub(crate) trait RandomSource {
    /// Uniform draw in [0,1).
    fn draw(&mut self) -> f32;

    /// Uniform pick from a non-empty slice.
    fn choose(&mut self, items: &[&'static str]) -> &'static str;
}

impl RandomSource for PetRng {
    fn draw(&mut self) -> f32 {
        // top 24 bits -> [0,1)
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }

    fn choose(&mut self, items: &[&'static str]) -> &'static str {
        let i = (self.next_u64() % items.len() as u64) as usize;
        items[i]
    }
}

impl Pet {
    /// Elapsed-since-fed, with a backwards clock counted as zero elapsed so
    /// non-monotonic time never heals mood.
    fn ms_since_fed(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_fed_at).num_milliseconds().max(0)
    }

    pub(crate) fn is_hungry(&self, now: DateTime<Utc>) -> bool {
        self.ms_since_fed(now) > HUNGER_THRESHOLD_MS
    }

    /// Feeding boosts mood and resets the hunger clock, so the hunger
    /// penalty can never apply on the same call. Always announces the meal,
    /// overriding any in-flight thought.
    pub(crate) fn feed(&mut self, now: DateTime<Utc>) -> String {
        self.mood_level = (self.mood_level + FEED_BOOST).clamp(0, 100);
        self.last_fed_at = now;
        self.state = derive_state(self.mood_level);
        self.speak(FEED_PHRASE, now);
        format!("{} has been fed and is {}!", self.name, self.state.id())
    }

    /// One periodic update step, driven at ~1s cadence by the session loop.
    pub(crate) fn tick(&mut self, now: DateTime<Utc>, rng: &mut dyn RandomSource) -> MoodState {
        self.expire_speech(now);

        if self.is_hungry(now) {
            self.mood_level = (self.mood_level - HUNGER_PENALTY).clamp(0, 100);
        }

        self.state = derive_state(self.mood_level);

        if rng.draw() < RANDOM_THOUGHT_CHANCE && self.speech.is_none() {
            let phrase = rng.choose(&THOUGHT_PHRASES);
            self.speak(phrase, now);
        }

        self.state
    }

    /// Last write wins: replacing `speech` supersedes the previous expiry,
    /// so a stale deadline can never clear newer text.
    pub(crate) fn speak(&mut self, text: &str, now: DateTime<Utc>) {
        self.speech = Some(Speech {
            text: text.to_string(),
            expires_at: now + ChronoDuration::milliseconds(SPEECH_DURATION_MS),
        });
    }

    /// Called every tick and every frame; speech clears within one frame of
    /// its expiry, never before it.
    pub(crate) fn expire_speech(&mut self, now: DateTime<Utc>) {
        if let Some(sp) = &self.speech {
            if now >= sp.expires_at {
                self.speech = None;
            }
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum PetAction {
    CycleKind(i32),
    NameChar(char),
    NameBackspace,
    CreatePet,
    Feed,
    Reset,
    HelpToggle,
    Back,
    Quit,
}

impl Session {
    pub(crate) fn apply(&mut self, action: PetAction, now: DateTime<Utc>) {
        match action {
            PetAction::CycleKind(delta) => {
                let len = crate::model::PetKind::ALL.len() as i32;
                let next = (self.kind_cursor as i32 + delta).rem_euclid(len);
                self.kind_cursor = next as usize;
            }
            PetAction::NameChar(ch) => {
                if self.name_edit.len() < NAME_MAX {
                    self.name_edit.push(ch);
                }
            }
            PetAction::NameBackspace => {
                self.name_edit.pop();
            }
            PetAction::CreatePet => {
                let pet = Pet::new(self.selected_kind(), &self.name_edit, now);
                self.last_message = Some(format!("Say hello to {}!", pet.name));
                self.pet = Some(pet);
                self.scene = Scene::Main;
            }
            PetAction::Feed => {
                if let Some(pet) = &mut self.pet {
                    self.last_message = Some(pet.feed(now));
                }
            }
            PetAction::Reset => {
                // Drops the pet and with it any pending speech expiry.
                self.pet = None;
                self.last_message = None;
                self.name_edit.clear();
                self.scene = Scene::Create;
            }
            PetAction::HelpToggle => {
                self.scene = match self.scene {
                    Scene::Help => Scene::Main,
                    _ => Scene::Help,
                };
            }
            PetAction::Back => {
                if matches!(self.scene, Scene::Help) {
                    self.scene = Scene::Main;
                }
            }
            PetAction::Quit => {}
        }
    }
}
