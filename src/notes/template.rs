use chrono::{Datelike, NaiveDate};

use crate::analytics::content_filter::{GHOST_CLOSE, GHOST_OPEN};

pub const DEFAULT_PROMPTS: [&str; 15] = [
    "What are three things you're grateful for today?",
    "What's one small win you can achieve today?",
    "How do you want to feel at the end of today?",
    "What's one thing you learned yesterday that you can apply today?",
    "What would make today great?",
    "What's your main focus for today?",
    "How can you step outside your comfort zone today?",
    "What habit are you building, and how will you practice it today?",
    "Who can you help or connect with today?",
    "What's one thing you've been putting off that you can tackle today?",
    "How will you take care of yourself today?",
    "What creative problem can you solve today?",
    "What would your best self do today?",
    "What's one way you can simplify your day?",
    "How can you bring more joy into your routine today?",
];

/// Extracts prompts from a personalized prompt list. Only numbered lines such as
/// `3. What surprised you?` count, everything else is ignored.
pub fn parse_prompt_list(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let mut chars = line.chars();
            let number = chars.next()?;
            if !('1'..='9').contains(&number) || chars.next()? != '.' {
                return None;
            }
            let prompt = chars.as_str().trim();
            (!prompt.is_empty()).then(|| prompt.to_string())
        })
        .collect()
}

/// Prompts rotate by day of year, so the same day always gets the same prompt.
pub fn select_prompt<S: AsRef<str>>(date: NaiveDate, prompts: &[S]) -> Option<&str> {
    if prompts.is_empty() {
        return None;
    }
    Some(prompts[date.ordinal0() as usize % prompts.len()].as_ref())
}

/// Content of a freshly created note: the date and the day's prompt as ghost lines, followed by
/// an empty line where writing starts.
pub fn daily_template(date: NaiveDate, personalized: &[String]) -> String {
    let prompt = if personalized.is_empty() {
        select_prompt(date, &DEFAULT_PROMPTS)
    } else {
        select_prompt(date, personalized)
    }
    .unwrap_or_default();

    format!(
        "{GHOST_OPEN} {} {GHOST_CLOSE}\n{GHOST_OPEN} {prompt} {GHOST_CLOSE}\n\n",
        date.format("%A, %B %-d, %Y")
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{daily_template, parse_prompt_list, select_prompt, DEFAULT_PROMPTS};
    use crate::analytics::content_filter::filter_content;

    #[test]
    fn test_parse_prompt_list() {
        let text = "Here are your prompts:\n\
                    1. What surprised you?\n\
                    2.   Who did you talk to?  \n\
                    \n\
                    10. ignored\n\
                    3.\n\
                    - also ignored\n";
        assert_eq!(
            parse_prompt_list(text),
            vec!["What surprised you?".to_string(), "Who did you talk to?".to_string()]
        );
    }

    #[test]
    fn test_prompt_rotates_by_day_of_year() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sixteenth = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        assert_eq!(select_prompt(first, &DEFAULT_PROMPTS), Some(DEFAULT_PROMPTS[0]));
        assert_eq!(select_prompt(sixteenth, &DEFAULT_PROMPTS), Some(DEFAULT_PROMPTS[0]));
        assert_eq!(select_prompt::<&str>(first, &[]), None);
    }

    #[test]
    fn test_template_is_all_ghost_text() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let template = daily_template(date, &[]);
        assert!(template.starts_with("<!-- Tuesday, January 2, 2024 -->\n"));

        let filtered = filter_content(&template);
        assert_eq!(filtered.word_count(), 0);
        assert_eq!(
            filtered.ghosts,
            vec!["Tuesday, January 2, 2024".to_string(), DEFAULT_PROMPTS[1].to_string()]
        );
    }

    #[test]
    fn test_template_uses_personalized_prompts() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let personalized = vec!["Only prompt".to_string()];
        assert!(daily_template(date, &personalized).contains("<!-- Only prompt -->"));
    }
}
