use super::token::AutotypeToken;

/// Characters with a special meaning in keystroke strings; typed as `{c}`.
const RESERVED_KEYS: &[char] = &['+', '^', '%', '~', '(', ')', '{', '}', '[', ']'];

/// Names accepted inside `{...}` as a single special key, optionally followed by
/// a repeat count (`{Tab 3}`).
const SPECIAL_KEYS: &[&str] = &[
    "Backspace", "BS", "BkSp", "Break", "CapsLock", "Delete", "Del", "Down", "End", "Enter",
    "Esc", "Help", "Home", "Insert", "Ins", "Left", "NumLock", "PgDn", "PgUp", "PrtSc",
    "Right", "ScrollLock", "Tab", "Up", "Add", "Subtract", "Multiply", "Divide", "F1", "F2",
    "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14", "F15", "F16",
];

/// Commands accepted inside `{...}`, canonical spelling.
const FIELD_COMMANDS: &[&str] = &[
    "UserName",
    "Password",
    "TwoFactorCode",
    "Title",
    "Group",
    "Url",
    "Email",
    "CreditCardNumber",
    "CreditCardNumberTabbed",
    "CreditCardExpiration",
    "CreditCardVerificationValue",
    "CreditCardPin",
    "Legacy",
];

const MAX_NUMBER_DIGITS: usize = 3;

/// Tokens used when an entry has no script of its own.
pub fn default_tokens() -> Vec<AutotypeToken> {
    vec![
        AutotypeToken::command("UserName"),
        AutotypeToken::key("{Tab}"),
        AutotypeToken::command("Password"),
        AutotypeToken::key("{Enter}"),
    ]
}

#[derive(Debug)]
enum State {
    Default,
    Escape,
    CreditCard,
    MandatoryNumber(char),
    OptionalNumber(char, String),
    Bracket(String),
}

/// Parses an auto-type script into tokens without touching any entry data.
///
/// Field references stay as commands (`UserName`, `Notes:2`, ...). An empty
/// script yields [`default_tokens`]. Malformed escapes and brackets never fail;
/// they degrade to literal keys.
pub fn parse_script(script: &str) -> Vec<AutotypeToken> {
    if script.is_empty() {
        return default_tokens();
    }

    let mut tokens = Vec::new();
    let mut state = State::Default;
    for ch in script.chars() {
        state = match state {
            State::Default => start(ch, &mut tokens),
            State::Escape => escape(ch, &mut tokens),
            State::CreditCard => {
                match ch {
                    'n' | 't' | 'e' | 'v' | 'p' => tokens.push(credit_card_command(ch)),
                    _ => tokens.extend(text_to_tokens(&format!("c{ch}"))),
                }
                State::Default
            }
            State::MandatoryNumber(cmd) if ch.is_ascii_digit() => {
                State::OptionalNumber(cmd, ch.to_string())
            }
            State::MandatoryNumber(cmd) => {
                tokens.extend(text_to_tokens(&format!("{cmd}{ch}")));
                State::Default
            }
            State::OptionalNumber(cmd, mut digits)
                if ch.is_ascii_digit() && digits.len() < MAX_NUMBER_DIGITS =>
            {
                digits.push(ch);
                State::OptionalNumber(cmd, digits)
            }
            State::OptionalNumber(cmd, digits) => {
                tokens.push(number_command(cmd, &digits));
                start(ch, &mut tokens)
            }
            State::Bracket(content) if ch == '}' => {
                tokens.extend(bracket_tokens(&content));
                State::Default
            }
            State::Bracket(mut content) => {
                content.push(ch);
                State::Bracket(content)
            }
        };
    }

    match state {
        State::Default => {}
        State::Escape => tokens.push(AutotypeToken::key("\\")),
        State::CreditCard => tokens.push(AutotypeToken::key("c")),
        State::MandatoryNumber(cmd) => tokens.extend(text_to_tokens(&cmd.to_string())),
        State::OptionalNumber(cmd, digits) => tokens.push(number_command(cmd, &digits)),
        State::Bracket(content) => tokens.extend(text_to_tokens(&format!("{{{content}"))),
    }
    tokens
}

fn start(ch: char, tokens: &mut Vec<AutotypeToken>) -> State {
    match ch {
        '\\' => State::Escape,
        '{' => State::Bracket(String::new()),
        _ => {
            tokens.push(AutotypeToken::key(ch.to_string()));
            State::Default
        }
    }
}

fn escape(ch: char, tokens: &mut Vec<AutotypeToken>) -> State {
    let token = match ch {
        'u' => AutotypeToken::command("UserName"),
        'p' => AutotypeToken::command("Password"),
        '2' => AutotypeToken::command("TwoFactorCode"),
        'g' => AutotypeToken::command("Group"),
        'i' => AutotypeToken::command("Title"),
        'l' => AutotypeToken::command("Url"),
        'm' => AutotypeToken::command("Email"),
        'z' => AutotypeToken::command("Legacy"),
        'b' => AutotypeToken::key("{Backspace}"),
        't' => AutotypeToken::key("{Tab}"),
        's' => AutotypeToken::key("+{Tab}"),
        'n' => AutotypeToken::key("{Enter}"),
        'c' => return State::CreditCard,
        'd' | 'w' | 'W' => return State::MandatoryNumber(ch),
        'o' => return State::OptionalNumber(ch, String::new()),
        _ => AutotypeToken::key(ch.to_string()),
    };
    tokens.push(token);
    State::Default
}

fn credit_card_command(ch: char) -> AutotypeToken {
    AutotypeToken::command(match ch {
        'n' => "CreditCardNumber",
        't' => "CreditCardNumberTabbed",
        'e' => "CreditCardExpiration",
        'v' => "CreditCardVerificationValue",
        _ => "CreditCardPin",
    })
}

fn number_command(cmd: char, digits: &str) -> AutotypeToken {
    let name = match cmd {
        'd' => "Delay",
        'w' | 'W' => "Wait",
        _ => "Notes",
    };
    match (cmd, digits.is_empty()) {
        (_, true) => AutotypeToken::command(name),
        ('W', false) => AutotypeToken::command(format!("{name}:{digits}000")),
        (_, false) => AutotypeToken::command(format!("{name}:{digits}")),
    }
}

// Resolves the content of `{...}`
fn bracket_tokens(content: &str) -> Vec<AutotypeToken> {
    let literal = || text_to_tokens(&format!("{{{content}}}"));

    let mut chars = content.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if RESERVED_KEYS.contains(&ch) {
            return vec![AutotypeToken::key(format!("{{{ch}}}"))];
        }
    }

    if let Some((name, arg)) = content.split_once(':') {
        let is_number = !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit());
        return match canonical(name, &["Delay", "Wait", "Notes"]) {
            Some(name) if is_number => vec![AutotypeToken::command(format!("{name}:{arg}"))],
            _ => literal(),
        };
    }

    if let Some(name) = canonical(content, FIELD_COMMANDS).or_else(|| canonical(content, &["Notes"])) {
        return vec![AutotypeToken::command(name)];
    }

    let (key, count) = match content.split_once(' ') {
        Some((key, count)) if !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()) => {
            (key, Some(count))
        }
        Some(_) => return literal(),
        None => (content, None),
    };
    if canonical(key, SPECIAL_KEYS).is_none() {
        return literal();
    }
    match count {
        Some(count) => vec![AutotypeToken::key(format!("{{{key} {count}}}"))],
        None => vec![AutotypeToken::key(format!("{{{key}}}"))],
    }
}

fn canonical(name: &str, names: &[&'static str]) -> Option<&'static str> {
    names.iter().copied().find(|n| n.eq_ignore_ascii_case(name))
}

/// Converts plain text into one key token per character, escaping the
/// characters that carry keystroke meaning. Line breaks (`\r\n`, `\n`, `\r`)
/// become `{Enter}`, tabs `{Tab}` and backspace `{Backspace}`.
pub fn text_to_tokens(text: &str) -> Vec<AutotypeToken> {
    let mut tokens = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let token = match ch {
            c if RESERVED_KEYS.contains(&c) => AutotypeToken::key(format!("{{{c}}}")),
            '\u{8}' => AutotypeToken::key("{Backspace}"),
            '\r' => {
                chars.next_if_eq(&'\n');
                AutotypeToken::key("{Enter}")
            }
            '\n' => AutotypeToken::key("{Enter}"),
            '\t' => AutotypeToken::key("{Tab}"),
            c => AutotypeToken::key(c.to_string()),
        };
        tokens.push(token);
    }
    tokens
}

/// Space separated rendering of tokens, used for previews.
pub fn describe(tokens: &[AutotypeToken]) -> String {
    tokens.iter().map(AutotypeToken::content).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod parser_tests {
    use test_case::test_case;

    use super::{describe, parse_script, text_to_tokens};
    use crate::autotype::TokenKind;

    #[test_case("", "UserName {Tab} Password {Enter}")]
    #[test_case(r"\u\t\p\t\2\t\n", "UserName {Tab} Password {Tab} TwoFactorCode {Tab} {Enter}")]
    #[test_case(r"admin\n\p\n", "a d m i n {Enter} Password {Enter}")]
    #[test_case(r"\badmin\n\p\n", "{Backspace} a d m i n {Enter} Password {Enter}")]
    #[test_case(r"admin\n\p\nXXX", "a d m i n {Enter} Password {Enter} X X X")]
    #[test_case(
        r"\cn\t\ce\t\cv\t\cp",
        "CreditCardNumber {Tab} CreditCardExpiration {Tab} CreditCardVerificationValue {Tab} CreditCardPin"
    )]
    #[test_case(r"\ct\s", "CreditCardNumberTabbed +{Tab}")]
    #[test_case(r"\z\u\t\p\n", "Legacy UserName {Tab} Password {Enter}")]
    #[test_case(r"\i\g\l\m", "Title Group Url Email")]
    fn test_parse(script: &str, exp: &str) {
        assert_eq!(describe(&parse_script(script)), exp);
    }

    #[test_case(r"\oTest", "Notes T e s t")]
    #[test_case(r"\o1Test", "Notes:1 T e s t")]
    #[test_case(r"\o98Test", "Notes:98 T e s t")]
    #[test_case(r"\o987Test", "Notes:987 T e s t")]
    #[test_case(r"\o12", "Notes:12")]
    #[test_case(r"\o1234", "Notes:123 4")]
    #[test_case(r"\o2\n", "Notes:2 {Enter}")]
    #[test_case(r"\W1Test", "Wait:1000 T e s t")]
    #[test_case(r"\w12Test", "Wait:12 T e s t")]
    #[test_case(r"\d123Test", "Delay:123 T e s t")]
    #[test_case(r"\d12", "Delay:12")]
    #[test_case(r"\w1234", "Wait:123 4")]
    fn test_parse_numbers(script: &str, exp: &str) {
        assert_eq!(describe(&parse_script(script)), exp);
    }

    #[test_case(r"\x", "x")]
    #[test_case(r"\cx\p", "c x Password")]
    #[test_case(r"admin\", r"a d m i n \")]
    #[test_case(r"\dX", "d X")]
    #[test_case(r"\W", "W")]
    #[test_case(r"\c", "c")]
    fn test_parse_typos(script: &str, exp: &str) {
        assert_eq!(describe(&parse_script(script)), exp);
    }

    #[test_case("{Delay:500}x", "Delay:500 x")]
    #[test_case("{wait:20}", "Wait:20")]
    #[test_case("{username}{TAB}{password}", "UserName {TAB} Password")]
    #[test_case("{Notes:2}", "Notes:2")]
    #[test_case("{Tab 3}", "{Tab 3}")]
    #[test_case("{+}", "{+}")]
    #[test_case("{Delay:x}", "{{} D e l a y : x {}}")]
    #[test_case("{Bogus}", "{{} B o g u s {}}")]
    #[test_case("{Tab x}", "{{} T a b   x {}}")]
    #[test_case("ab{Enter", "a b {{} E n t e r")]
    #[test_case("{", "{{}")]
    fn test_parse_brackets(script: &str, exp: &str) {
        assert_eq!(describe(&parse_script(script)), exp);
    }

    #[test]
    fn test_token_kinds() {
        let tokens = parse_script(r"a\p{Wait:5}{Enter}");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, [TokenKind::Key, TokenKind::Command, TokenKind::Command, TokenKind::Key]);
    }

    #[test]
    fn test_text_to_tokens() {
        let tokens = text_to_tokens("a+b\r\nc\rd\n\t(x)\u{8}");
        assert_eq!(
            describe(&tokens),
            "a {+} b {Enter} c {Enter} d {Enter} {Tab} {(} x {)} {Backspace}"
        );
    }
}
