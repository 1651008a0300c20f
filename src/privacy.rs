//! Masking of personal data in terminal output

use rand::seq::SliceRandom;

/// Characters of a name left readable
const NAME_VISIBLE_CHARS: usize = 2;
/// Leading digits of a phone number left readable
const PHONE_VISIBLE_CHARS: usize = 3;
/// Extra characters kept for an international `+1` style prefix
const COUNTRY_PREFIX_CHARS: usize = 2;

fn mask_after(value: &str, keep: usize) -> String {
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < keep { c } else { '*' })
        .collect()
}

/// `Thomas` becomes `Th****`. Names shorter than two characters are returned as is.
#[must_use]
pub fn mask_name(name: &str) -> String {
    if name.chars().count() < NAME_VISIBLE_CHARS {
        return name.to_string();
    }
    mask_after(name, NAME_VISIBLE_CHARS)
}

/// Keep only the area code: `5131234567` becomes `513*******`,
/// `+15131234567` becomes `+1513*******`.
#[must_use]
pub fn mask_phone_number(number: &str) -> String {
    if number.chars().count() < 2 {
        return number.to_string();
    }
    let keep = if number.starts_with('+') {
        PHONE_VISIBLE_CHARS + COUNTRY_PREFIX_CHARS
    } else {
        PHONE_VISIBLE_CHARS
    };
    mask_after(number, keep)
}

/// Shuffle the characters of `text`
#[must_use]
pub fn scramble_text(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    chars.shuffle(&mut rand::thread_rng());
    chars.into_iter().collect()
}

/// Mask `name` when `should_mask` is set and the name is non-empty
#[must_use]
pub fn maybe_mask_name(name: &str, should_mask: bool) -> String {
    if should_mask && !name.is_empty() {
        mask_name(name)
    } else {
        name.to_string()
    }
}

/// Mask `number` when `should_mask` is set and the number is non-empty
#[must_use]
pub fn maybe_mask_phone_number(number: &str, should_mask: bool) -> String {
    if should_mask && !number.is_empty() {
        mask_phone_number(number)
    } else {
        number.to_string()
    }
}

/// Scramble `text` when `should_scramble` is set
#[must_use]
pub fn maybe_scramble_text(text: &str, should_scramble: bool) -> String {
    if should_scramble {
        scramble_text(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_name() {
        assert_eq!(mask_name("Thomas"), "Th****");
        assert_eq!(mask_name("J"), "J");
        assert_eq!(mask_name("Zoë"), "Zo*");
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("5131234567"), "513*******");
        assert_eq!(mask_phone_number("+15131234567"), "+1513*******");
        assert_eq!(mask_phone_number("12"), "12");
    }
}
