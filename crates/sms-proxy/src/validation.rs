use crate::ValidationError;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Accepts an optional leading `+` followed by 7 to 15 ASCII digits.
pub fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    let digits = phone_number.strip_prefix('+').unwrap_or(phone_number);

    let valid = (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhoneNumber(phone_number.to_string()))
    }
}

/// Content must contain non-whitespace text and fit in `max_length` characters.
pub fn validate_content(content: &str, max_length: usize) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }

    let len = content.chars().count();
    if len > max_length {
        return Err(ValidationError::ContentTooLong {
            len,
            max: max_length,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phone_numbers() {
        for number in ["+48123456789", "48123456789", "1234567", "+123456789012345"] {
            assert!(validate_phone_number(number).is_ok(), "{number}");
        }
    }

    #[test]
    fn test_invalid_phone_numbers() {
        for number in ["", "+", "123456", "+1234567890123456", "+48 123 456", "++4812345678", "48-123-456"] {
            assert_eq!(
                validate_phone_number(number),
                Err(ValidationError::InvalidPhoneNumber(number.to_string()))
            );
        }
    }

    #[test]
    fn test_content_limits() {
        assert!(validate_content("hello", 160).is_ok());
        assert_eq!(validate_content("   ", 160), Err(ValidationError::EmptyContent));
        assert_eq!(validate_content("", 160), Err(ValidationError::EmptyContent));
        assert_eq!(
            validate_content("abcdef", 5),
            Err(ValidationError::ContentTooLong { len: 6, max: 5 })
        );
    }

    #[test]
    fn test_content_length_counts_characters() {
        // Five characters, more than five bytes
        assert!(validate_content("zażół", 5).is_ok());
    }
}
