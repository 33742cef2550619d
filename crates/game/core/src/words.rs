//! Curated vocabulary for session codes.
//!
//! Short, unambiguous words that are easy to read aloud across a room.

pub const GAME_WORDS: &[&str] = &[
    "APPLE", "BANJO", "BEACH", "BISON", "BLIMP", "BUNNY", "CABIN", "CAMEL", "CANDY", "CHALK",
    "CHESS", "CIDER", "CLOUD", "COMET", "CORAL", "CRANE", "DAISY", "DINGO", "DRUMS", "EAGLE",
    "EMBER", "FABLE", "FERRY", "FIZZY", "FLUTE", "FROST", "GECKO", "GHOST", "GLOBE", "GRAPE",
    "HAZEL", "HONEY", "IGLOO", "JELLY", "JOKER", "KAZOO", "KOALA", "LASSO", "LEMON", "LLAMA",
    "LUNAR", "MANGO", "MAPLE", "MOOSE", "NACHO", "NINJA", "OCEAN", "OLIVE", "OTTER", "PANDA",
    "PEARL", "PIANO", "PIXEL", "PLUMS", "POLKA", "QUAIL", "QUILT", "RADAR", "RAVEN", "ROBOT",
    "SALSA", "SCOUT", "SHARK", "SLOTH", "SPOON", "STORM", "SUSHI", "TACOS", "TANGO", "TIGER",
    "TOAST", "TULIP", "UMBRA", "VIOLA", "WAFFLE", "WALTZ", "WHALE", "YACHT", "YODEL", "ZEBRA",
];
