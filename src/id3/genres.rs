// ID3v1 genre table
//
// Maps the legacy one-byte genre codes (including the Winamp extensions)
// to names and back.

use crate::error::{Id3Error, Result};

/// Genre code written to ID3v1 trailers when a name has no table entry
pub const UNKNOWN_GENRE: u8 = 255;

/// Genre names indexed by their ID3v1 code
pub const GENRES: [&str; 192] = [
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge", "Hip-Hop", "Jazz",
    "Metal", "New Age", "Oldies", "Other", "Pop", "R&B", "Rap", "Reggae", "Rock", "Techno",
    "Industrial", "Alternative", "Ska", "Death Metal", "Pranks", "Soundtrack", "Euro-Techno",
    "Ambient", "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance", "Classical",
    "Instrumental", "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise", "AlternRock",
    "Bass", "Soul", "Punk", "Space", "Meditative", "Instrumental Pop", "Instrumental Rock",
    "Ethnic", "Gothic", "Darkwave", "Techno-Industrial", "Electronic", "Pop-Folk", "Eurodance",
    "Dream", "Southern Rock", "Comedy", "Cult", "Gangsta", "Top 40", "Christian Rap",
    "Pop/Funk", "Jungle", "Native American", "Cabaret", "New Wave", "Psychadelic", "Rave",
    "Showtunes", "Trailer", "Lo-Fi", "Tribal", "Acid Punk", "Acid Jazz", "Polka", "Retro",
    "Musical", "Rock & Roll", "Hard Rock", "Folk", "Folk-Rock", "National Folk", "Swing",
    "Fast Fusion", "Bebob", "Latin", "Revival", "Celtic", "Bluegrass", "Avantgarde",
    "Gothic Rock", "Progressive Rock", "Psychedelic Rock", "Symphonic Rock", "Slow Rock",
    "Big Band", "Chorus", "Easy Listening", "Acoustic", "Humour", "Speech", "Chanson", "Opera",
    "Chamber Music", "Sonata", "Symphony", "Booty Bass", "Primus", "Porn Groove", "Satire",
    "Slow Jam", "Club", "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul",
    "Freestyle", "Duet", "Punk Rock", "Drum Solo", "A capella", "Euro-House", "Dance Hall",
    "Goa", "Drum & Bass", "Club-House", "Hardcore", "Terror", "Indie", "BritPop", "Negerpunk",
    "Polsk Punk", "Beat", "Christian Gangsta Rap", "Heavy Metal", "Black Metal", "Crossover",
    "Contemporary Christian", "Christian Rock", "Merengue", "Salsa", "Thrash Metal", "Anime",
    "JPop", "Synthpop", "Abstract", "Art Rock", "Baroque", "Bhangra", "Big Beat", "Breakbeat",
    "Chillout", "Downtempo", "Dub", "EBM", "Eclectic", "Electro", "Electroclash", "Emo",
    "Experimental", "Garage", "Global", "IDM", "Illbient", "Industro-Goth", "Jam Band",
    "Krautrock", "Leftfield", "Lounge", "Math Rock", "New Romantic", "Nu-Breakz", "Post-Punk",
    "Post-Rock", "Psytrance", "Shoegaze", "Space Rock", "Trop Rock", "World Music",
    "Neoclassical", "Audiobook", "Audio Theatre", "Neue Deutsche Welle", "Podcast",
    "Indie Rock", "G-Funk", "Dubstep", "Garage Rock", "Psybient",
];

/// Highest valid genre code
pub const MAX_GENRE_INDEX: i32 = GENRES.len() as i32 - 1;

/// Look up the name of a numeric genre code.
pub fn genre_name(index: i32) -> Result<&'static str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| GENRES.get(i).copied())
        .ok_or(Id3Error::InvalidGenreIndex(index))
}

/// Case-insensitive reverse lookup, `UNKNOWN_GENRE` when nothing matches.
pub fn genre_index(name: &str) -> u8 {
    let name = name.trim();
    GENRES
        .iter()
        .position(|g| g.eq_ignore_ascii_case(name))
        .map(|i| i as u8)
        .unwrap_or(UNKNOWN_GENRE)
}

/// Resolve a `TCON` value to a display name.
///
/// Handles the numeric references older taggers write: `17`, `(17)` and
/// `(17)Rock`. Refinements after a reference win over the table name.
/// Anything else is returned unchanged.
pub fn resolve_genre(value: &str) -> String {
    let value = value.trim();

    if let Some(rest) = value.strip_prefix('(') {
        if let Some(close) = rest.find(')') {
            let (code, refinement) = (&rest[..close], &rest[close + 1..]);
            if !refinement.is_empty() {
                return refinement.to_string();
            }
            return match code {
                "RX" => "Remix".to_string(),
                "CR" => "Cover".to_string(),
                _ => code
                    .parse::<i32>()
                    .ok()
                    .and_then(|i| genre_name(i).ok())
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string()),
            };
        }
    }

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(name) = value.parse::<i32>().ok().and_then(|i| genre_name(i).ok()) {
            return name.to_string();
        }
    }

    value.to_string()
}
