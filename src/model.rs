use chrono::{DateTime, Utc};

pub(crate) const INITIAL_MOOD: i32 = 80;
pub(crate) const FEED_BOOST: i32 = 20;
pub(crate) const HUNGER_PENALTY: i32 = 2;
pub(crate) const HUNGER_THRESHOLD_MS: i64 = 60_000;
pub(crate) const SPEECH_DURATION_MS: i64 = 4_000;
pub(crate) const RANDOM_THOUGHT_CHANCE: f32 = 0.15;
pub(crate) const NAME_MAX: usize = 18;
pub(crate) const DEFAULT_NAME: &str = "Pet";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PetKind {
    Cat,
    Dog,
    Cow,
    Bunny,
}

impl PetKind {
    pub(crate) const ALL: [PetKind; 4] = [PetKind::Cat, PetKind::Dog, PetKind::Cow, PetKind::Bunny];

    pub(crate) fn id(self) -> &'static str {
        match self {
            PetKind::Cat => "cat",
            PetKind::Dog => "dog",
            PetKind::Cow => "cow",
            PetKind::Bunny => "bunny",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            PetKind::Cat => "Cat",
            PetKind::Dog => "Dog",
            PetKind::Cow => "Cow",
            PetKind::Bunny => "Bunny",
        }
    }

    /// Unknown ids fall back to Cow rather than failing; the simulator
    /// always prefers a pet over an error.
    pub(crate) fn from_id(id: &str) -> PetKind {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .unwrap_or(PetKind::Cow)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MoodState {
    Miserable,
    Sad,
    Bored,
    Neutral,
    Content,
    Happy,
    Ecstatic,
}

impl MoodState {
    pub(crate) const ALL: [MoodState; 7] = [
        MoodState::Miserable,
        MoodState::Sad,
        MoodState::Bored,
        MoodState::Neutral,
        MoodState::Content,
        MoodState::Happy,
        MoodState::Ecstatic,
    ];

    pub(crate) fn id(self) -> &'static str {
        match self {
            MoodState::Ecstatic => "ecstatic",
            MoodState::Happy => "happy",
            MoodState::Content => "content",
            MoodState::Neutral => "neutral",
            MoodState::Bored => "bored",
            MoodState::Sad => "sad",
            MoodState::Miserable => "miserable",
        }
    }
}

/// Mood buckets partition [0,100]: inclusive lower bounds, highest first,
/// so exactly one state matches any clamped mood level.
pub(crate) fn derive_state(mood_level: i32) -> MoodState {
    match mood_level {
        m if m >= 90 => MoodState::Ecstatic,
        m if m >= 75 => MoodState::Happy,
        m if m >= 60 => MoodState::Content,
        m if m >= 45 => MoodState::Neutral,
        m if m >= 30 => MoodState::Bored,
        m if m >= 15 => MoodState::Sad,
        _ => MoodState::Miserable,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Speech {
    pub(crate) text: String,
    pub(crate) expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub(crate) struct Pet {
    pub(crate) kind: PetKind,
    pub(crate) name: String,
    pub(crate) mood_level: i32,
    pub(crate) state: MoodState,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_fed_at: DateTime<Utc>,
    pub(crate) speech: Option<Speech>,
}

impl Pet {
    pub(crate) fn new(kind: PetKind, name: &str, now: DateTime<Utc>) -> Self {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        Self {
            kind,
            name,
            mood_level: INITIAL_MOOD,
            state: derive_state(INITIAL_MOOD),
            created_at: now,
            last_fed_at: now,
            speech: None,
        }
    }

    pub(crate) fn status_message(&self) -> String {
        match self.state {
            MoodState::Ecstatic => format!("{} is absolutely ecstatic!", self.name),
            MoodState::Happy => format!("{} is very happy!", self.name),
            MoodState::Content => format!("{} is content.", self.name),
            MoodState::Neutral => format!("{} is doing okay.", self.name),
            MoodState::Bored => format!("{} seems a bit bored.", self.name),
            MoodState::Sad => format!("{} is feeling sad.", self.name),
            MoodState::Miserable => format!("{} is miserable and very hungry!", self.name),
        }
    }
}

/// Counter-based SplitMix64: deterministic, seedable, cheap.
#[derive(Clone, Debug)]
pub(crate) struct PetRng {
    pub(crate) seed: u64,
    pub(crate) event_counter: u64,
}

impl PetRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            event_counter: 0,
        }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut z = self
            .seed
            .wrapping_add(self.event_counter.wrapping_mul(0x9E3779B97F4A7C15));
        self.event_counter = self.event_counter.wrapping_add(1);

        z = z.wrapping_add(0x9E3779B97F4A7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Scene {
    Create,
    Main,
    Help,
}

/// Explicit session context owned by the app loop. Dropping `pet` is the
/// cancellation point: the tick cadence and any pending speech expiry go
/// with it, so a reset can never mutate a discarded pet.
#[derive(Clone, Debug)]
pub(crate) struct Session {
    pub(crate) scene: Scene,
    pub(crate) pet: Option<Pet>,
    pub(crate) rng: PetRng,
    pub(crate) kind_cursor: usize,
    pub(crate) name_edit: String,
    pub(crate) last_message: Option<String>,
}

impl Session {
    pub(crate) fn new(seed: u64, default_kind: PetKind, default_name: &str) -> Self {
        let kind_cursor = PetKind::ALL
            .iter()
            .position(|k| *k == default_kind)
            .unwrap_or(0);
        Self {
            scene: Scene::Create,
            pet: None,
            rng: PetRng::new(seed),
            kind_cursor,
            name_edit: default_name.chars().take(NAME_MAX).collect(),
            last_message: None,
        }
    }

    pub(crate) fn selected_kind(&self) -> PetKind {
        PetKind::ALL[self.kind_cursor % PetKind::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn derive_state_is_total_over_mood_range() {
        for m in 0..=100 {
            // must not panic, and must land in the enum
            let s = derive_state(m);
            assert!(MoodState::ALL.contains(&s));
        }
    }

    #[test]
    fn derive_state_is_monotonic_in_mood() {
        for m in 1..=100 {
            assert!(
                derive_state(m) >= derive_state(m - 1),
                "state regressed between mood {} and {}",
                m - 1,
                m
            );
        }
    }

    #[test]
    fn derive_state_boundaries() {
        assert_eq!(derive_state(100), MoodState::Ecstatic);
        assert_eq!(derive_state(90), MoodState::Ecstatic);
        assert_eq!(derive_state(89), MoodState::Happy);
        assert_eq!(derive_state(75), MoodState::Happy);
        assert_eq!(derive_state(74), MoodState::Content);
        assert_eq!(derive_state(60), MoodState::Content);
        assert_eq!(derive_state(59), MoodState::Neutral);
        assert_eq!(derive_state(45), MoodState::Neutral);
        assert_eq!(derive_state(44), MoodState::Bored);
        assert_eq!(derive_state(30), MoodState::Bored);
        assert_eq!(derive_state(29), MoodState::Sad);
        assert_eq!(derive_state(15), MoodState::Sad);
        assert_eq!(derive_state(14), MoodState::Miserable);
        assert_eq!(derive_state(0), MoodState::Miserable);
    }

    #[test]
    fn new_pet_starts_happy_at_eighty() {
        let pet = Pet::new(PetKind::Cat, "Mochi", t0());
        assert_eq!(pet.mood_level, 80);
        assert_eq!(pet.state, MoodState::Happy);
        assert_eq!(pet.name, "Mochi");
        assert_eq!(pet.created_at, pet.last_fed_at);
        assert!(pet.speech.is_none());
    }

    #[test]
    fn blank_name_falls_back_to_default() {
        let pet = Pet::new(PetKind::Dog, "   ", t0());
        assert_eq!(pet.name, "Pet");
        let pet = Pet::new(PetKind::Dog, "  Rex  ", t0());
        assert_eq!(pet.name, "Rex");
    }

    #[test]
    fn unknown_kind_id_falls_back_to_cow() {
        assert_eq!(PetKind::from_id("cat"), PetKind::Cat);
        assert_eq!(PetKind::from_id("axolotl"), PetKind::Cow);
        assert_eq!(PetKind::from_id(""), PetKind::Cow);
    }

    #[test]
    fn status_message_embeds_name() {
        let mut pet = Pet::new(PetKind::Bunny, "Clover", t0());
        assert_eq!(pet.status_message(), "Clover is very happy!");
        pet.mood_level = 3;
        pet.state = derive_state(pet.mood_level);
        assert_eq!(pet.status_message(), "Clover is miserable and very hungry!");
    }

    #[test]
    fn session_prefills_name_entry_within_the_cap() {
        let session = Session::new(1, PetKind::Dog, "Rex");
        assert_eq!(session.name_edit, "Rex");

        let long = "a".repeat(NAME_MAX + 5);
        let session = Session::new(1, PetKind::Dog, &long);
        assert_eq!(session.name_edit.len(), NAME_MAX);
    }

    #[test]
    fn rng_is_deterministic_for_a_seed() {
        let mut a = PetRng::new(7);
        let mut b = PetRng::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }
}
