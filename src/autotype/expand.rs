use tracing::debug;

use super::entry::{Entry, Record, RecordType};
use super::parser::text_to_tokens;
use super::AutotypeToken;
use crate::totp::{to_base32, two_factor_code, Base32Format};

/// Produces the live two-factor code for a stored key. Called at typing time,
/// never cached.
pub trait TwoFactorSource {
    fn current_code(&self, key: &[u8]) -> String;
}

/// Computes a TOTP code from the key with the default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotpCodeSource;

impl TwoFactorSource for TotpCodeSource {
    fn current_code(&self, key: &[u8]) -> String {
        let text = to_base32(key, Base32Format { spacing: true, padding: true, uppercase: false });
        two_factor_code(&text)
    }
}

/// Replaces field commands with the entry's text as key tokens.
///
/// `TwoFactorCode`, `Delay`, `Wait` and `Legacy` pass through unchanged;
/// unknown commands are dropped.
pub fn expand_tokens(tokens: &[AutotypeToken], entry: &Entry) -> Vec<AutotypeToken> {
    let mut expanded = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some((name, arg)) = token.command_parts() else {
            expanded.push(token.clone());
            continue;
        };
        let field = |record_type| text_to_tokens(&entry.text(record_type));
        match name {
            "UserName" => expanded.extend(field(RecordType::UserName)),
            "Password" => expanded.extend(field(RecordType::Password)),
            "Title" => expanded.extend(field(RecordType::Title)),
            "Group" => expanded.extend(field(RecordType::Group)),
            "Url" => expanded.extend(field(RecordType::Url)),
            "Email" => expanded.extend(field(RecordType::Email)),
            "CreditCardExpiration" => expanded.extend(field(RecordType::CreditCardExpiration)),
            "CreditCardVerificationValue" => {
                expanded.extend(field(RecordType::CreditCardVerificationValue))
            }
            "CreditCardPin" => expanded.extend(field(RecordType::CreditCardPin)),
            "CreditCardNumber" | "CreditCardNumberTabbed" => {
                let number = entry.text(RecordType::CreditCardNumber);
                let tabbed = name == "CreditCardNumberTabbed";
                expanded.extend(text_to_tokens(&card_digits(&number, tabbed)));
            }
            "Notes" => {
                let notes = entry.text(RecordType::Notes);
                expanded.extend(text_to_tokens(&notes_text(&notes, arg)));
            }
            "TwoFactorCode" | "Delay" | "Wait" | "Legacy" => expanded.push(token.clone()),
            _ => debug!("Dropping unknown auto-type command {name}"),
        }
    }
    expanded
}

/// Resolves `TwoFactorCode` commands into the digits of the current code.
///
/// The key comes from `record` when given (a single two-factor field was
/// picked), otherwise from the entry.
pub fn resolve_two_factor(
    tokens: Vec<AutotypeToken>,
    entry: &Entry,
    record: Option<&Record>,
    source: &dyn TwoFactorSource,
) -> Vec<AutotypeToken> {
    let key = record.map_or_else(|| entry.bytes(RecordType::TwoFactorKey), Record::bytes);
    let mut resolved = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.command_parts() {
            Some(("TwoFactorCode", _)) => resolved.extend(text_to_tokens(&source.current_code(key))),
            _ => resolved.push(token),
        }
    }
    resolved
}

/// Expansion followed by two-factor resolution: the sequence handed to the
/// scheduler.
pub fn typing_tokens(
    tokens: &[AutotypeToken],
    entry: &Entry,
    record: Option<&Record>,
    source: &dyn TwoFactorSource,
) -> Vec<AutotypeToken> {
    resolve_two_factor(expand_tokens(tokens, entry), entry, record, source)
}

// Digits only; tabbed inserts a Tab every 4 digits counted from the right
fn card_digits(number: &str, tabbed: bool) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    if !tabbed {
        return digits.into_iter().collect();
    }
    let lead = match digits.len() % 4 {
        0 => 4,
        n => n,
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 4);
    for (i, ch) in digits.into_iter().enumerate() {
        if i >= lead && (i - lead) % 4 == 0 {
            out.push('\t');
        }
        out.push(ch);
    }
    out
}

// Whole notes with normalized line breaks, or a single 1-based line
fn notes_text(notes: &str, line: Option<&str>) -> String {
    let normalized = notes.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split('\n').collect();
    match line.map(str::parse::<usize>) {
        None => lines.join("\n"),
        Some(Ok(n)) if (1..=lines.len()).contains(&n) => lines[n - 1].to_string(),
        Some(_) => String::new(),
    }
}

#[cfg(test)]
mod expand_tests {
    use test_case::test_case;

    use super::{card_digits, expand_tokens, resolve_two_factor, typing_tokens, TwoFactorSource};
    use crate::autotype::{describe, parse_script, Entry, Record, RecordType};

    struct FixedCode;

    impl TwoFactorSource for FixedCode {
        fn current_code(&self, key: &[u8]) -> String {
            format!("{:06}", key.len())
        }
    }

    fn example_entry(script: Option<&str>, amex: bool) -> Entry {
        let card = if amex { "123 4567 8901 2345" } else { "1234 5678 9012 3456" };
        let entry = Entry::new()
            .with_text(RecordType::Title, "Example")
            .with_text(RecordType::Group, "Examples")
            .with_text(RecordType::UserName, "Default")
            .with_text(RecordType::Password, "Passw0rd")
            .with_text(RecordType::CreditCardNumber, card)
            .with_text(RecordType::CreditCardExpiration, "01/79")
            .with_text(RecordType::CreditCardVerificationValue, "123")
            .with_text(RecordType::CreditCardPin, "1234")
            .with_bytes(RecordType::TwoFactorKey, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10])
            .with_text(RecordType::Email, "test@example.com")
            .with_text(RecordType::Url, "medo64.com")
            .with_text(RecordType::Notes, "1\r\n2\n3\r^\n");
        match script {
            Some(script) => entry.with_text(RecordType::Autotype, script),
            None => entry,
        }
    }

    #[test_case(None, "D e f a u l t {Tab} P a s s w 0 r d {Enter}")]
    #[test_case(Some(r"\u\t\p\t\2\t\n"), "D e f a u l t {Tab} P a s s w 0 r d {Tab} TwoFactorCode {Tab} {Enter}")]
    #[test_case(Some(r"admin\n\p\n"), "a d m i n {Enter} P a s s w 0 r d {Enter}")]
    #[test_case(Some(r"\cn\t\ce\t\cv\t\cp"), "1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 {Tab} 0 1 / 7 9 {Tab} 1 2 3 {Tab} 1 2 3 4")]
    #[test_case(
        Some(r"\ct\t\ce\t\cv\t\cp"),
        "1 2 3 4 {Tab} 5 6 7 8 {Tab} 9 0 1 2 {Tab} 3 4 5 6 {Tab} 0 1 / 7 9 {Tab} 1 2 3 {Tab} 1 2 3 4"
    )]
    #[test_case(Some(r"\z\u\t\p\n"), "Legacy D e f a u l t {Tab} P a s s w 0 r d {Enter}")]
    #[test_case(
        Some(r"\i\g\l\m"),
        "E x a m p l e E x a m p l e s m e d o 6 4 . c o m t e s t @ e x a m p l e . c o m"
    )]
    #[test_case(Some(r"\W1Test"), "Wait:1000 T e s t")]
    #[test_case(Some(r"\d12"), "Delay:12")]
    #[test_case(Some(r"\cx\p"), "c x P a s s w 0 r d")]
    fn test_expand(script: Option<&str>, exp: &str) {
        assert_eq!(describe(&example_entry(script, false).autotype_tokens()), exp);
    }

    #[test_case(r"\oTest", "1 {Enter} 2 {Enter} 3 {Enter} {^} {Enter} T e s t")]
    #[test_case(r"\o1Test", "1 T e s t")]
    #[test_case(r"\o2Test", "2 T e s t")]
    #[test_case(r"\o3Test", "3 T e s t")]
    #[test_case(r"\o4Test", "{^} T e s t")]
    #[test_case(r"\o5Test", "T e s t")]
    #[test_case(r"\o9Test", "T e s t")]
    #[test_case(r"\o98Test", "T e s t")]
    #[test_case(r"\o12", "")]
    #[test_case(r"\o1234", "4")]
    #[test_case(r"\o0", "")]
    fn test_expand_notes(script: &str, exp: &str) {
        assert_eq!(describe(&example_entry(Some(script), false).autotype_tokens()), exp);
    }

    #[test]
    fn test_expand_amex_tabbed() {
        let entry = example_entry(Some(r"\ct\t\ce\t\cv\t\cp"), true);
        assert_eq!(
            describe(&entry.autotype_tokens()),
            "1 2 3 {Tab} 4 5 6 7 {Tab} 8 9 0 1 {Tab} 2 3 4 5 {Tab} 0 1 / 7 9 {Tab} 1 2 3 {Tab} 1 2 3 4"
        );
    }

    #[test_case("1234", false, "1234")]
    #[test_case("12345", true, "1\t2345")]
    #[test_case("1234-5678", true, "1234\t5678")]
    #[test_case("", true, "")]
    fn test_card_digits(number: &str, tabbed: bool, exp: &str) {
        assert_eq!(card_digits(number, tabbed), exp);
    }

    #[test]
    fn test_unknown_command_dropped() {
        let tokens = vec![crate::autotype::AutotypeToken::command("Bogus")];
        assert!(expand_tokens(&tokens, &Entry::new()).is_empty());
    }

    #[test]
    fn test_resolve_two_factor() {
        let entry = example_entry(Some(r"\u\2"), false);
        let tokens = typing_tokens(&parse_script(r"\u\2"), &entry, None, &FixedCode);
        assert_eq!(describe(&tokens), "D e f a u l t 0 0 0 0 1 0");

        let record = Record::new(RecordType::TwoFactorKey, vec![0; 20]);
        let tokens = resolve_two_factor(parse_script(r"\2"), &entry, Some(&record), &FixedCode);
        assert_eq!(describe(&tokens), "0 0 0 0 2 0");
    }

    #[test]
    fn test_totp_code_source() {
        use super::TotpCodeSource;

        let code = TotpCodeSource.current_code(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
