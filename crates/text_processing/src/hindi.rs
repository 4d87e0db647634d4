//! Hindi Language Utilities
//!
//! Devanagari digit normalisation and number words.

/// Map Devanagari digits (०-९) to ASCII so patterns only deal with `\d`.
///
/// # Examples
/// ```
/// use voice_command_text_processing::hindi::normalize_digits;
/// assert_eq!(normalize_digits("८mm का रेट ६५"), "8mm का रेट 65");
/// ```
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '०'..='९' => {
                let offset = c as u32 - '०' as u32;
                char::from_digit(offset, 10).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Convert Hindi number word (Devanagari script) to numeric value
///
/// # Examples
/// ```
/// use voice_command_text_processing::hindi::word_to_number;
/// assert_eq!(word_to_number("पांच"), Some(5.0));
/// assert_eq!(word_to_number("सौ"), Some(100.0));
/// ```
pub fn word_to_number(word: &str) -> Option<f64> {
    match word {
        "एक" => Some(1.0),
        "दो" => Some(2.0),
        "तीन" => Some(3.0),
        "चार" => Some(4.0),
        "पांच" | "पाँच" => Some(5.0),
        "छह" | "छः" | "छे" => Some(6.0),
        "सात" => Some(7.0),
        "आठ" => Some(8.0),
        "नौ" => Some(9.0),
        "दस" => Some(10.0),
        "बारह" => Some(12.0),
        "पंद्रह" => Some(15.0),
        "बीस" => Some(20.0),
        "पच्चीस" => Some(25.0),
        "तीस" => Some(30.0),
        "चालीस" => Some(40.0),
        "पचास" => Some(50.0),
        "साठ" => Some(60.0),
        "सत्तर" => Some(70.0),
        "अस्सी" => Some(80.0),
        "नब्बे" => Some(90.0),
        "सौ" => Some(100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_normalisation() {
        assert_eq!(normalize_digits("१२३४५६७८९०"), "1234567890");
        assert_eq!(normalize_digits("ankur 8mm"), "ankur 8mm");
        assert_eq!(normalize_digits(""), "");
    }

    #[test]
    fn test_basic_numbers() {
        assert_eq!(word_to_number("एक"), Some(1.0));
        assert_eq!(word_to_number("पाँच"), Some(5.0));
        assert_eq!(word_to_number("दस"), Some(10.0));
    }

    #[test]
    fn test_six_variants() {
        assert_eq!(word_to_number("छह"), Some(6.0));
        assert_eq!(word_to_number("छः"), Some(6.0));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(word_to_number("ten"), None);
        assert_eq!(word_to_number("कर"), None);
    }
}
