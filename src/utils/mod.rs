use chrono::NaiveDateTime;

/// Formats a request timestamp as "dd-mm-yyyy HH:MM".
pub fn format_date(date: NaiveDateTime) -> String {
    date.format("%d-%m-%Y %H:%M").to_string()
}

/// Escapes the characters Telegram's MarkdownV2 treats as markup.
///
/// Each special character is prefixed with a backslash so it is rendered
/// literally.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "_*[]()~`>#+-=|{}.!\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn escapes_markdown_special_characters() {
        assert_eq!(
            escape_markdown("Dr. Ilić (GP) - 5*2!"),
            "Dr\\. Ilić \\(GP\\) \\- 5\\*2\\!"
        );
        assert_eq!(escape_markdown("ivana@example.com"), "ivana@example\\.com");
        assert_eq!(escape_markdown("Amoxicillin"), "Amoxicillin");
    }

    #[test]
    fn formats_request_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(format_date(date), "07-03-2024 14:05");
    }
}
