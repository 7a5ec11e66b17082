/// Common-password word list, one entry per line with `#` comment lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonPasswords {
    words: Vec<String>,
}

impl CommonPasswords {
    pub fn parse(text: &str) -> Self {
        let words = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First common word contained in the password, ignoring case. Words
    /// shorter than a third of the password are not considered a match.
    pub fn matched(&self, password: &str) -> Option<&str> {
        let password_len = password.chars().count();
        let lowered = password.to_lowercase();
        self.words
            .iter()
            .filter(|word| word.chars().count() * 3 > password_len)
            .find(|word| lowered.contains(&word.to_lowercase()))
            .map(String::as_str)
    }
}

pub fn is_common_password(password: &str, list: &CommonPasswords) -> bool {
    list.matched(password).is_some()
}

#[cfg(test)]
mod common_tests {
    use test_case::test_case;

    use super::{is_common_password, CommonPasswords};

    const LIST: &str = "# top passwords\r\npassword\r\n123456\r\n\r\nqwerty\n#dragon\n";

    #[test]
    fn test_parse_skips_comments() {
        let list = CommonPasswords::parse(LIST);
        assert_eq!(list.len(), 3);
        assert!(!list.is_empty());
    }

    #[test_case("password", Some("password"))]
    #[test_case("MyPassword1", Some("password"))]
    #[test_case("PASSWORD", Some("password"))]
    #[test_case("xxQWERTYxx", Some("qwerty"))]
    #[test_case("dragon", None)]
    #[test_case("password-with-a-long-suffix", None)]
    #[test_case("Tr0ub4dor&3", None)]
    fn test_matched(password: &str, exp: Option<&str>) {
        let list = CommonPasswords::parse(LIST);
        assert_eq!(list.matched(password), exp);
        assert_eq!(is_common_password(password, &list), exp.is_some());
    }
}
