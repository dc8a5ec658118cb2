//! Editorially chosen "challenging" entities, used when the graph has
//! nothing for a domain and to pad short batches.

use discomfort_sdk::Domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CuratedEntry {
    pub name: &'static str,
    pub genre: &'static str,
    /// Distance from mainstream taste, 1-5.
    pub difficulty: u8,
}

const fn entry(name: &'static str, genre: &'static str, difficulty: u8) -> CuratedEntry {
    CuratedEntry {
        name,
        genre,
        difficulty,
    }
}

const MOVIE: [CuratedEntry; 6] = [
    entry("Stalker (1979)", "Soviet Sci-Fi", 5),
    entry("The Tree of Life", "Experimental Drama", 4),
    entry("Persona", "Psychological Art Film", 5),
    entry("Mulholland Drive", "Surreal Mystery", 4),
    entry("Jeanne Dielman", "Minimalist Drama", 5),
    entry("Satantango", "Long-form Art Cinema", 5),
];

const MUSIC: [CuratedEntry; 6] = [
    entry("Mongolian Throat Singing", "Traditional World", 3),
    entry("Free Jazz", "Experimental Jazz", 4),
    entry("Drone Metal", "Extreme Metal", 4),
    entry("Gamelan Orchestra", "Indonesian Traditional", 3),
    entry("Noise Music", "Experimental Electronic", 5),
    entry("Microtonal Compositions", "Contemporary Classical", 5),
];

const BOOK: [CuratedEntry; 6] = [
    entry("Finnegans Wake", "Experimental Literature", 5),
    entry("Being and Time", "Philosophy", 5),
    entry("Gravity's Rainbow", "Postmodern Fiction", 4),
    entry("The Phenomenology of Spirit", "German Idealism", 5),
    entry("Ulysses", "Modernist Literature", 4),
    entry("The Book of Disquiet", "Fragmentary Prose", 4),
];

const FOOD: [CuratedEntry; 6] = [
    entry("Fermented Shark (H\u{e1}karl)", "Icelandic Delicacy", 5),
    entry("Durian Fruit", "Southeast Asian Fruit", 4),
    entry("Century Eggs", "Chinese Preserved Food", 4),
    entry("Casu Marzu Cheese", "Italian Aged Cheese", 5),
    entry("Balut", "Filipino Street Food", 5),
    entry("Surstr\u{f6}mming", "Swedish Fermented Fish", 5),
];

const FASHION: [CuratedEntry; 6] = [
    entry("Avant-garde Fashion", "Experimental Design", 5),
    entry("Minimalist Style", "Reductive Tailoring", 3),
    entry("Vintage Clothing", "Second-hand Heritage", 2),
    entry("Sustainable Fashion", "Slow Fashion", 2),
    entry("Gender-neutral Clothing", "Androgynous Design", 4),
    entry("Harajuku Street Style", "Japanese Street Fashion", 4),
];

/// The full curated list of a domain, most characteristic entries first.
#[must_use]
pub fn curated(domain: Domain) -> &'static [CuratedEntry] {
    match domain {
        Domain::Movie => &MOVIE,
        Domain::Music => &MUSIC,
        Domain::Book => &BOOK,
        Domain::Food => &FOOD,
        Domain::Fashion => &FASHION,
    }
}
