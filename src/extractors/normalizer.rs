// src/extractors/normalizer.rs

//! Canonicalizes document text before any pattern rule runs, and turns the
//! loose date fragments found in headers into `YYYY-MM-DD`.

use crate::utils::error::ExtractError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII, Arabic-Indic or Extended Arabic-Indic digit. `\d` would also admit
// every other Unicode digit script, which `to_ascii_digits` cannot map.
macro_rules! digit {
    () => {
        r"[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]"
    };
}

/// A date-looking token in a header line, year first or year last:
/// "2021-05-10", "2021 / 5 / 10", "3/2/2019", "10-05-2021".
/// Whether it is a usable date is decided by [`parse_date_field`].
pub const DATE_TOKEN: &str = concat!(
    r"(?:",
    digit!(), r"{4}\s*[-/]\s*", digit!(), r"{1,2}\s*[-/]\s*", digit!(), r"{1,2}",
    r"|",
    digit!(), r"{1,2}\s*[-/]\s*", digit!(), r"{1,2}\s*[-/]\s*", digit!(), r"{4}",
    r")"
);

static HORIZONTAL_WS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("Failed to compile HORIZONTAL_WS_RE"));

static EXCESS_NEWLINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to compile EXCESS_NEWLINES_RE"));

// D/M/YYYY with optional spaces around the slashes: "31/1/1990", "31 / 1 / 1990"
static DMY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "(", digit!(), r"{1,2})\s*/\s*(", digit!(), r"{1,2})\s*/\s*(", digit!(), "{4})"
    ))
    .expect("Failed to compile DMY_DATE_RE")
});

// Whole-field forms, matched after digits are mapped to ASCII.
static YMD_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9]{4})\s*[-/]\s*([0-9]{1,2})\s*[-/]\s*([0-9]{1,2})\s*$")
        .expect("Failed to compile YMD_FIELD_RE")
});

static DMY_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9]{1,2})\s*-\s*([0-9]{1,2})\s*-\s*([0-9]{4})\s*$")
        .expect("Failed to compile DMY_FIELD_RE")
});

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Normalizes raw document text.
///
/// Drops a leading byte-order mark and carriage returns, squeezes runs of
/// spaces/tabs to one space, caps blank-line runs at a single empty line and
/// trims the ends. Total and idempotent.
pub fn normalize(raw: &str) -> String {
    let text = raw.trim_start_matches(BYTE_ORDER_MARK).replace('\r', "");
    let text = HORIZONTAL_WS_RE.replace_all(&text, " ");
    let text = EXCESS_NEWLINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Finds the first `D/M/YYYY` fragment in `raw` and returns it as `YYYY-MM-DD`.
///
/// The calendar values are not checked; "31/2/1990" becomes "1990-02-31".
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let caps = DMY_DATE_RE.captures(raw)?;

    let day = to_ascii_digits(&caps[1]);
    let month = to_ascii_digits(&caps[2]);
    let year = to_ascii_digits(&caps[3]);

    Some(format!("{}-{:0>2}-{:0>2}", year, month, day))
}

/// Reads a header date field written year first (`YYYY-M-D`, `YYYY/M/D`) or year last
/// (`D-M-YYYY`, `D/M/YYYY`), with or without spaces around the separators.
///
/// Dash and year-first forms must name a real calendar day. Slash `D/M/YYYY` goes
/// through [`normalize_date`] unchecked. Anything unrecognized is absent.
pub fn parse_date_field(raw: &str) -> Option<String> {
    let ascii = to_ascii_digits(raw);

    if let Some(caps) = YMD_FIELD_RE.captures(&ascii) {
        return calendar_date(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = DMY_FIELD_RE.captures(&ascii) {
        return calendar_date(&caps[3], &caps[2], &caps[1]);
    }

    normalize_date(Some(&ascii))
}

fn calendar_date(year: &str, month: &str, day: &str) -> Option<String> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Parses a captured digit run as an unsigned integer.
///
/// Arabic-Indic and Extended Arabic-Indic digits are accepted. Anything else
/// the capture may hold (other Unicode digit classes, overflow) is a fault.
pub fn parse_number(field: &'static str, captured: &str) -> Result<u32, ExtractError> {
    to_ascii_digits(captured.trim())
        .parse::<u32>()
        .map_err(|_| ExtractError::InvalidNumber {
            field,
            value: captured.to_string(),
        })
}

/// Maps Arabic-Indic digits to their ASCII counterparts, leaving everything else as is.
pub fn to_ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_blank_lines() {
        let raw = "\r\n  الفتوى \t\t رقم   5\r\n\r\n\r\n\r\nالوقائع\n\n\n\nنص  ";
        assert_eq!(normalize(raw), "الفتوى رقم 5\n\nالوقائع\n\nنص");
    }

    #[test]
    fn test_normalize_keeps_single_paragraph_break() {
        assert_eq!(normalize("أ\n\nب\nج"), "أ\n\nب\nج");
    }

    #[test]
    fn test_normalize_is_total_and_idempotent() {
        let samples = [
            "",
            "   ",
            "\n\n\n\n",
            "a \t b\r\n\r\n\r\nc",
            " \n \n \n x",
            "مبدأ 1\t\tنص\n\n\n\n\nمبدأ 2",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "Not idempotent for {:?}", sample);
            assert!(!once.contains("\n\n\n"), "Newline run left in {:?}", once);
            assert!(!once.contains("  "), "Space run left in {:?}", once);
            assert!(!once.contains('\t'), "Tab left in {:?}", once);
        }
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_date_spaced_and_compact_agree() {
        assert_eq!(normalize_date(Some("31 / 1 / 1990")), Some("1990-01-31".to_string()));
        assert_eq!(normalize_date(Some("31/1/1990")), Some("1990-01-31".to_string()));
    }

    #[test]
    fn test_normalize_date_takes_first_match() {
        let raw = "بتاريخ 5/3/2020 تاريخ الجلسة 7/4/2021";
        assert_eq!(normalize_date(Some(raw)), Some("2020-03-05".to_string()));
    }

    #[test]
    fn test_normalize_date_absent_cases() {
        assert_eq!(normalize_date(None), None);
        assert_eq!(normalize_date(Some("")), None);
        assert_eq!(normalize_date(Some("لا يوجد تاريخ")), None);
        assert_eq!(normalize_date(Some("1990-01-31")), None);
    }

    #[test]
    fn test_normalize_date_ignores_unmappable_digit_scripts() {
        // Devanagari digits are Unicode digits but have no ASCII mapping here.
        assert_eq!(normalize_date(Some("३१/१/१९९०")), None);
        assert_eq!(parse_date_field("३१/१/१९९०"), None);
        assert_eq!(parse_date_field("१९९०-०१-३१"), None);
        assert_eq!(normalize_date(Some("٣١/١/١٩٩٠")), Some("1990-01-31".to_string()));

        let token = Regex::new(DATE_TOKEN).unwrap();
        assert!(!token.is_match("३१/१/१९९०"));
        assert!(token.is_match("٣١/١/١٩٩٠"));
    }

    #[test]
    fn test_parse_date_field_accepts_iso_and_dmy() {
        assert_eq!(parse_date_field("2022-02-03"), Some("2022-02-03".to_string()));
        assert_eq!(parse_date_field("2022-2-3"), Some("2022-02-03".to_string()));
        assert_eq!(parse_date_field("3/2/2022"), Some("2022-02-03".to_string()));
        assert_eq!(parse_date_field("٣/٢/٢٠٢٢"), Some("2022-02-03".to_string()));
        assert_eq!(parse_date_field("2022-13-40"), None);
        assert_eq!(parse_date_field("غدا"), None);
    }

    #[test]
    fn test_every_date_token_shape_converts() {
        let token = Regex::new(&format!("^{}$", DATE_TOKEN)).unwrap();
        let cases = [
            ("2021-05-10", "2021-05-10"),
            ("2021 - 05 - 10", "2021-05-10"),
            ("2021/5/10", "2021-05-10"),
            ("10-05-2021", "2021-05-10"),
            ("10 / 5 / 2021", "2021-05-10"),
        ];
        for (raw, expected) in cases {
            assert!(token.is_match(raw), "Token should accept {:?}", raw);
            assert_eq!(parse_date_field(raw).as_deref(), Some(expected), "For {:?}", raw);
        }

        // Neither year first nor year last.
        assert!(!token.is_match("10-05-21"));
        assert!(!token.is_match("1-2-3"));
    }

    #[test]
    fn test_normalize_strips_byte_order_mark() {
        assert_eq!(normalize("\u{FEFF}مجلس الدولة - الفتوى"), "مجلس الدولة - الفتوى");
        assert_eq!(normalize("\u{FEFF}  \r\nنص"), "نص");
    }

    #[test]
    fn test_parse_number_handles_arabic_indic_digits() {
        assert_eq!(parse_number("number", "42"), Ok(42));
        assert_eq!(parse_number("number", "٤٢"), Ok(42));
        assert_eq!(parse_number("number", "۱۲"), Ok(12));
    }

    #[test]
    fn test_parse_number_faults_on_unreadable_capture() {
        let err = parse_number("case_number", "99999999999").unwrap_err();
        assert_eq!(
            err,
            ExtractError::InvalidNumber { field: "case_number", value: "99999999999".to_string() }
        );
        // Devanagari digits match \d but are not readable here.
        assert!(parse_number("year", "१२").is_err());
    }
}
