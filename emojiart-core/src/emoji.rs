//! Emoji recognition for dropped text and palette editing.
//!
//! Text is split into user-perceived characters using the joining rules that
//! matter for emoji: variation selectors, skin-tone modifiers, keycaps, tag
//! sequences, zero-width joiners and regional-indicator flag pairs. A
//! character counts as an emoji when its first scalar carries the emoji
//! property and it either lies at or above U+238D or is a multi-scalar
//! sequence, so plain digits and `#` only qualify as keycaps.

const ZWJ: char = '\u{200D}';

/// Scalars below this only count as emoji in multi-scalar sequences.
const STANDALONE_EMOJI_FLOOR: u32 = 0x238D;

/// Iterator over the characters of a string, see [`characters`].
#[derive(Debug, Clone)]
pub struct Characters<'a> {
    rest: &'a str,
}

/// Split `text` into user-perceived characters.
#[must_use]
pub fn characters(text: &str) -> Characters<'_> {
    Characters { rest: text }
}

impl<'a> Iterator for Characters<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let mut scalars = self.rest.char_indices().peekable();
        let (_, first) = scalars.next()?;
        let mut end = first.len_utf8();
        let mut regional_pending = is_regional_indicator(first);

        while let Some(&(index, c)) = scalars.peek() {
            if c == ZWJ {
                scalars.next();
                end = index + c.len_utf8();
                if let Some((joined, next)) = scalars.next() {
                    end = joined + next.len_utf8();
                }
            } else if regional_pending && is_regional_indicator(c) {
                scalars.next();
                end = index + c.len_utf8();
                regional_pending = false;
            } else if extends_cluster(c) {
                scalars.next();
                end = index + c.len_utf8();
            } else {
                break;
            }
        }

        let (character, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(character)
    }
}

/// First user-perceived character of `text`.
#[must_use]
pub fn first_character(text: &str) -> Option<&str> {
    characters(text).next()
}

/// Whether `character` (a single user-perceived character) is an emoji.
#[must_use]
pub fn is_emoji(character: &str) -> bool {
    let mut scalars = character.chars();
    let Some(first) = scalars.next() else {
        return false;
    };
    has_emoji_property(first)
        && (u32::from(first) >= STANDALONE_EMOJI_FLOOR || scalars.next().is_some())
}

/// The emoji characters of `text`, in order, duplicates included.
pub fn emoji_characters(text: &str) -> impl Iterator<Item = &str> {
    characters(text).filter(|c| is_emoji(c))
}

fn is_regional_indicator(c: char) -> bool {
    matches!(u32::from(c), 0x1F1E6..=0x1F1FF)
}

fn extends_cluster(c: char) -> bool {
    matches!(
        u32::from(c),
        0x0300..=0x036F        // combining diacritics
            | 0x20D0..=0x20FF  // combining marks for symbols, keycap
            | 0xFE00..=0xFE0F  // variation selectors
            | 0x1F3FB..=0x1F3FF // skin tones
            | 0xE0020..=0xE007F // tags
    )
}

fn has_emoji_property(c: char) -> bool {
    matches!(
        u32::from(c),
        0x23 | 0x2A
            | 0x30..=0x39
            | 0xA9
            | 0xAE
            | 0x203C
            | 0x2049
            | 0x2122
            | 0x2139
            | 0x2194..=0x2199
            | 0x21A9..=0x21AA
            | 0x231A..=0x231B
            | 0x2328
            | 0x23CF
            | 0x23E9..=0x23F3
            | 0x23F8..=0x23FA
            | 0x24C2
            | 0x25AA..=0x25AB
            | 0x25B6
            | 0x25C0
            | 0x25FB..=0x25FE
            | 0x2600..=0x27BF
            | 0x2934..=0x2935
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
            | 0x1F000..=0x1FAFF
    )
}
