use super::engine::ExtractionRule;
use crate::config::ParsingConfig;
use crate::error::ProtocolResult;
use crate::types::*;
use regex::Regex;

/// Genitive month names as they appear in dates ("«05» березня 2024 року")
const MONTHS: [(&str, &str); 12] = [
    ("січня", "01"),
    ("лютого", "02"),
    ("березня", "03"),
    ("квітня", "04"),
    ("травня", "05"),
    ("червня", "06"),
    ("липня", "07"),
    ("серпня", "08"),
    ("вересня", "09"),
    ("жовтня", "10"),
    ("листопада", "11"),
    ("грудня", "12"),
];

pub fn month_number(name: &str) -> Option<&'static str> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

/// Protocol number and date from the document heading.
pub struct IdentityExtractor {
    number_pattern: Regex,
    date_pattern: Regex,
}

impl IdentityExtractor {
    pub fn new(config: &ParsingConfig) -> ProtocolResult<Self> {
        let labels = &config.labels;

        // ПРОТОКОЛ № __12__ -> "12__", underscores trimmed afterwards
        let number_pattern = Regex::new(&format!(
            r"(?i){}\s*№\s*_*(\S+)",
            regex::escape(&labels.protocol_heading)
        ))?;

        // «_5_» ___березня___ 2024 року; the underscores are optional
        let date_pattern = Regex::new(&format!(
            r"«\s*_?([0-9]{{1,2}})_?\s*»\s*_*([а-яА-ЯіїєґІЇЄҐ]+)_*\s*([0-9]{{4}})\s*{}",
            regex::escape(&labels.year_word)
        ))?;

        Ok(Self {
            number_pattern,
            date_pattern,
        })
    }

    pub fn extract_number(&self, text: &str) -> String {
        self.number_pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_matches('_').to_string())
            .unwrap_or_default()
    }

    /// `DD.MM.YYYY` when the month is known. An unknown month keeps the raw
    /// `day month year` form (unpadded day, lower-cased month) so consumers
    /// can tell the two apart.
    pub fn extract_date(&self, text: &str) -> String {
        let Some(caps) = self.date_pattern.captures(text) else {
            return String::new();
        };

        let day = &caps[1];
        let month = caps[2].trim_matches('_').to_lowercase();
        let year = &caps[3];

        match month_number(&month) {
            Some(number) => {
                let day = day
                    .parse::<u32>()
                    .map(|d| format!("{d:02}"))
                    .unwrap_or_else(|_| day.to_string());
                format!("{day}.{number}.{year}")
            }
            None => format!("{day} {month} {year}"),
        }
    }

    pub fn extract_identity(&self, text: &str) -> DocumentIdentity {
        DocumentIdentity {
            number: self.extract_number(text),
            date: self.extract_date(text),
        }
    }
}

impl ExtractionRule for IdentityExtractor {
    type Output = DocumentIdentity;

    fn extract(&self, _document: &SourceDocument, text: &str) -> DocumentIdentity {
        self.extract_identity(text)
    }

    fn name(&self) -> &str {
        "DocumentIdentity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> IdentityExtractor {
        IdentityExtractor::new(&ParsingConfig::default()).unwrap()
    }

    #[test]
    fn number_with_underscores() {
        assert_eq!(extractor().extract_number("ПРОТОКОЛ № __12__"), "12");
    }

    #[test]
    fn number_is_case_insensitive() {
        assert_eq!(extractor().extract_number("Протокол №7/2024\nзасідання"), "7/2024");
    }

    #[test]
    fn number_missing_sign_is_empty() {
        assert_eq!(extractor().extract_number("ПРОТОКОЛ засідання комітету"), "");
    }

    #[test]
    fn date_normalizes_known_month() {
        assert_eq!(extractor().extract_date("«05» березня 2024 року"), "05.03.2024");
    }

    #[test]
    fn date_pads_single_digit_day_and_accepts_underscores() {
        assert_eq!(
            extractor().extract_date("м. Київ «_5_» ___Березня___ 2024 року"),
            "05.03.2024"
        );
    }

    #[test]
    fn date_unknown_month_falls_back_to_raw_form() {
        assert_eq!(
            extractor().extract_date("«5» невідомогомісяця 2024 року"),
            "5 невідомогомісяця 2024"
        );
    }

    #[test]
    fn date_absent_is_empty() {
        assert_eq!(extractor().extract_date("05.03.2024"), "");
    }

    #[test]
    fn every_month_maps_to_two_digits() {
        for (index, (name, number)) in MONTHS.iter().enumerate() {
            assert_eq!(month_number(name), Some(*number));
            assert_eq!(number.parse::<usize>().unwrap(), index + 1);
        }
        assert_eq!(month_number("березень"), None);
    }
}
