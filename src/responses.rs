//! Randomized replies and reactions
//!
//! Each outcome category owns fixed pools. Message and reaction are drawn
//! independently and uniformly; nothing is remembered between draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Prefixed by the recipient mention in the payment text.
pub const PAYMENT_MESSAGES: &[&str] = &[
    "you are an inspiration.",
    "success!",
    "here you go.",
    "I'm so proud of you.",
    "such an example.",
    "just for you. You're welcome.",
    "don't spend it all in one place.",
    "https://media2.giphy.com/media/5f2XMzubbKHqE/giphy.mp4#height=160&width=160&isvideo=true",
];

pub const PAYMENT_REACTIONS: &[&str] = &[
    ":moneybag:",
    ":money_mouth_face:",
    ":money_with_wings:",
    ":bank:",
    ":yen:",
    ":euro:",
    ":dollar:",
];

pub const DUPLICATE_MESSAGES: &[&str] = &[
    "Nice try.",
    "Why are you trying to pull a fast one?",
    "Not so fast.",
    "Seriously?",
    "I wasn't born yesterday.",
    "Nope.",
    "You.",
    "https://media1.giphy.com/media/spfi6nabVuq5y/giphy.mp4#height=129&width=158&isvideo=true",
    "https://media0.giphy.com/media/wYyTHMm50f4Dm/giphy.mp4#height=277&width=480&isvideo=true",
    "https://media1.giphy.com/media/gnE4FFhtFoLKM/giphy.mp4#height=337&width=337&isvideo=true",
];

pub const DUPLICATE_REACTIONS: &[&str] = &[
    ":no_entry:",
    ":no_entry_sign:",
    ":no_bicycles:",
    ":no_smoking:",
    ":non-potable_water:",
    ":no_mobile_phones:",
    ":no_mouth:",
    ":no_good:",
    ":see_no_evil:",
    ":speak_no_evil:",
    ":hear_no_evil:",
    ":x:",
    ":angry:",
];

pub const FAILURE_MESSAGES: &[&str] = &[
    "Oh dear, I'm having some trouble. Try again if you're feeling brave.",
    "Something went sideways on my end. Give it another go in a moment.",
];

const _: () = assert!(!PAYMENT_MESSAGES.is_empty());
const _: () = assert!(!PAYMENT_REACTIONS.is_empty());
const _: () = assert!(!DUPLICATE_MESSAGES.is_empty());
const _: () = assert!(!DUPLICATE_REACTIONS.is_empty());
const _: () = assert!(!FAILURE_MESSAGES.is_empty());

/// Outcome categories with their own pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Success,
    Duplicate,
    GenericFailure,
}

impl Category {
    fn messages(&self) -> &'static [&'static str] {
        match self {
            Category::Success => PAYMENT_MESSAGES,
            Category::Duplicate => DUPLICATE_MESSAGES,
            Category::GenericFailure => FAILURE_MESSAGES,
        }
    }

    fn reactions(&self) -> Option<&'static [&'static str]> {
        match self {
            Category::Success => Some(PAYMENT_REACTIONS),
            Category::Duplicate => Some(DUPLICATE_REACTIONS),
            Category::GenericFailure => None,
        }
    }
}

/// A selected reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub message: String,
    pub reaction: Option<String>,
}

fn draw<R: Rng + ?Sized>(pool: &'static [&'static str], rng: &mut R) -> &'static str {
    pool[rng.gen_range(0..pool.len())]
}

/// Pick a message and, where the category has one, a reaction.
pub fn pick<R: Rng + ?Sized>(category: Category, rng: &mut R) -> Response {
    let message = draw(category.messages(), rng);
    let message = match category {
        Category::Duplicate => format!("{} You've already gotten this prize.", message),
        _ => message.to_string(),
    };
    let reaction = category
        .reactions()
        .map(|pool| draw(pool, rng).to_string());
    Response { message, reaction }
}

/// Shared selector. Uses the thread RNG unless seeded.
#[derive(Debug, Default)]
pub struct ResponseSelector {
    seeded: Option<Mutex<StdRng>>,
}

impl ResponseSelector {
    pub fn new() -> Self {
        Self { seeded: None }
    }

    /// Reproducible draws, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn select(&self, category: Category) -> Response {
        match &self.seeded {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                pick(category, &mut *rng)
            }
            None => pick(category, &mut rand::thread_rng()),
        }
    }

    /// Uniform choice among `options`, `None` when empty.
    pub fn choose<'a>(&self, options: &[&'a str]) -> Option<&'a str> {
        if options.is_empty() {
            return None;
        }
        let idx = match &self.seeded {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                rng.gen_range(0..options.len())
            }
            None => rand::thread_rng().gen_range(0..options.len()),
        };
        Some(options[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_empty() {
        let selector = ResponseSelector::seeded(7);
        for _ in 0..200 {
            let success = selector.select(Category::Success);
            assert!(!success.message.is_empty());
            assert!(PAYMENT_MESSAGES.contains(&success.message.as_str()));
            let reaction = success.reaction.expect("success has a reaction");
            assert!(PAYMENT_REACTIONS.contains(&reaction.as_str()));

            let dup = selector.select(Category::Duplicate);
            assert!(dup.message.ends_with("You've already gotten this prize."));
            assert!(!dup.reaction.expect("duplicate has a reaction").is_empty());

            let failure = selector.select(Category::GenericFailure);
            assert!(FAILURE_MESSAGES.contains(&failure.message.as_str()));
            assert!(failure.reaction.is_none());
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = ResponseSelector::seeded(42);
        let b = ResponseSelector::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.select(Category::Duplicate), b.select(Category::Duplicate));
        }
    }

    #[test]
    fn test_choose() {
        let selector = ResponseSelector::new();
        assert_eq!(selector.choose(&[]), None);
        assert_eq!(selector.choose(&["only"]), Some("only"));
    }
}
