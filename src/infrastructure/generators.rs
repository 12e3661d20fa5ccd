//! Id and display-name generators for new nodes

use std::cell::Cell;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::NodeId;
use crate::infrastructure::traits::{IdGenerator, NameGenerator};

const COLORS: &[&str] = &[
    "amber", "azure", "beige", "black", "blue", "bronze", "brown", "coral", "crimson", "cyan",
    "gold", "gray", "green", "indigo", "ivory", "jade", "lavender", "lime", "magenta", "maroon",
    "navy", "olive", "orange", "peach", "pink", "plum", "purple", "red", "rose", "ruby",
    "salmon", "silver", "tan", "teal", "turquoise", "violet", "white", "yellow",
];

const ANIMALS: &[&str] = &[
    "badger", "bat", "bear", "beaver", "bison", "camel", "cat", "cheetah", "crab", "crane",
    "crow", "deer", "dolphin", "eagle", "falcon", "ferret", "fox", "frog", "gecko", "goat",
    "hawk", "heron", "ibis", "jaguar", "koala", "lemur", "lion", "lynx", "marten", "moose",
    "otter", "owl", "panda", "puma", "rabbit", "raven", "seal", "shark", "sloth", "swan",
    "tiger", "toad", "turtle", "walrus", "whale", "wolf", "yak", "zebra",
];

/// Random v4 uuids.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate_id(&self) -> NodeId {
        NodeId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic ids `<prefix>1`, `<prefix>2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> NodeId {
        let n = self.next.get();
        self.next.set(n + 1);
        NodeId::new(format!("{}{}", self.prefix, n))
    }
}

/// Always returns the same name.
#[derive(Debug, Clone)]
pub struct FixedNameGenerator(pub String);

impl NameGenerator for FixedNameGenerator {
    fn generate_name(&self) -> String {
        self.0.clone()
    }
}

/// Letter case applied to each word of a generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    #[default]
    Capital,
    Lower,
    Upper,
}

impl NameStyle {
    pub fn apply(self, word: &str) -> String {
        match self {
            NameStyle::Lower => word.to_lowercase(),
            NameStyle::Upper => word.to_uppercase(),
            NameStyle::Capital => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Color + animal names such as "Blue Fox", drawn at random.
#[derive(Debug, Clone)]
pub struct WordPairNameGenerator {
    separator: String,
    style: NameStyle,
}

impl Default for WordPairNameGenerator {
    fn default() -> Self {
        Self::new(" ", NameStyle::Capital)
    }
}

impl WordPairNameGenerator {
    pub fn new(separator: impl Into<String>, style: NameStyle) -> Self {
        Self {
            separator: separator.into(),
            style,
        }
    }

    /// Builds the name for a pair of dictionary positions (wrapping).
    pub fn compose(&self, color: usize, animal: usize) -> String {
        let color = COLORS[color % COLORS.len()];
        let animal = ANIMALS[animal % ANIMALS.len()];
        format!(
            "{}{}{}",
            self.style.apply(color),
            self.separator,
            self.style.apply(animal)
        )
    }
}

impl NameGenerator for WordPairNameGenerator {
    fn generate_name(&self) -> String {
        let mut rng = rand::thread_rng();
        let color = rng.gen_range(0..COLORS.len());
        let animal = rng.gen_range(0..ANIMALS.len());
        self.compose(color, animal)
    }
}
