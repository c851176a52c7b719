use crate::record::Record;
use crate::stats::round_to;
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordStats {
    pub keyword: String,
    pub total_records: usize,
    pub records_with_keyword: usize,
    pub total_occurrences: usize,
    /// Rounded to two decimals; 0 when nothing matched.
    pub average_occurrences_per_matching_record: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatches {
    pub match_count: usize,
    pub matched_titles: Vec<String>,
}

/// Case-insensitive substring test.
pub fn keyword_in_text(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

pub fn search_batch<'a>(records: &'a [Record], keyword: &str) -> Vec<&'a Record> {
    records.iter().filter(|r| keyword_in_text(&r.text, keyword)).collect()
}

/// Whole-token occurrences of `keyword`, case-insensitive.
pub fn count_keyword_occurrences(text: &str, keyword: &str) -> usize {
    let keyword = keyword.to_lowercase();
    tokenize(text).filter(|t| *t == keyword).count()
}

pub fn keyword_statistics(records: &[Record], keyword: &str) -> KeywordStats {
    let mut records_with_keyword = 0;
    let mut total_occurrences = 0;
    for record in records {
        let count = count_keyword_occurrences(&record.text, keyword);
        if count > 0 {
            records_with_keyword += 1;
            total_occurrences += count;
        }
    }
    let average = if records_with_keyword > 0 {
        round_to(total_occurrences as f64 / records_with_keyword as f64, 2)
    } else {
        0.0
    };
    KeywordStats {
        keyword: keyword.to_string(),
        total_records: records.len(),
        records_with_keyword,
        total_occurrences,
        average_occurrences_per_matching_record: average,
    }
}

pub fn multi_keyword_search(records: &[Record], keywords: &[String]) -> BTreeMap<String, KeywordMatches> {
    keywords
        .iter()
        .map(|k| {
            let matches = search_batch(records, k);
            let matched_titles = matches.iter().map(|r| r.title.clone().unwrap_or_default()).collect();
            (k.clone(), KeywordMatches { match_count: matches.len(), matched_titles })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new("Privacy", "https://a.example/privacy", "Your privacy matters. Privacy data is protected."),
            Record::new("Terms", "https://a.example/terms", "These terms govern use of the service."),
            Record::new("Cookies", "https://b.example/cookies", "Cookies store data about your PRIVACY choices."),
        ]
    }

    #[test]
    fn substring_search_is_case_insensitive() {
        assert!(keyword_in_text("Data Privacy", "privacy"));
        let rs = records();
        let hits = search_batch(&rs, "PRIVACY");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn counts_whole_tokens() {
        assert_eq!(count_keyword_occurrences("data, Data; metadata", "data"), 2);
    }

    #[test]
    fn statistics() {
        let stats = keyword_statistics(&records(), "privacy");
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.records_with_keyword, 2);
        assert_eq!(stats.total_occurrences, 3);
        assert_eq!(stats.average_occurrences_per_matching_record, 1.5);

        let none = keyword_statistics(&records(), "arbitration");
        assert_eq!(none.average_occurrences_per_matching_record, 0.0);
    }

    #[test]
    fn multi_keyword() {
        let result = multi_keyword_search(&records(), &["terms".to_string(), "data".to_string()]);
        assert_eq!(result["terms"].matched_titles, vec!["Terms"]);
        assert_eq!(result["data"].match_count, 2);
    }
}
