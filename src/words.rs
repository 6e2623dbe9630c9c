//! The fixed word list used for turn assignment.
//!
//! Words are drawn uniformly at random with replacement; repeats within a
//! game are allowed.

use rand::Rng;

pub const WORD_LIST: &[&str] = &[
    "Star", "Mountain", "House", "Tree", "Car", "Sun", "Moon", "Cloud", "Flower", "Boat",
    "Bridge", "Key", "Book", "Clock", "Fish", "Bird", "Cat", "Dog", "Chair", "Table",
];

/// Pick a secret word for the next turn.
pub fn random_word() -> &'static str {
    let mut rng = rand::rng();
    WORD_LIST[rng.random_range(0..WORD_LIST.len())]
}
