use std::{fmt::Display, vec::IntoIter};

pub const KEYWORDS: [&str; 18] = [
    "if", "else", "while", "for", "return", "int", "float", "char", "void", "struct", "break",
    "continue", "switch", "case", "default", "do", "const", "static",
];

pub const TYPE_KEYWORDS: [&str; 4] = ["int", "float", "char", "void"];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Keyword,
    Operator,
    Punctuation,
    // Never produced, only part of the export vocabulary.
    Comment,
    Whitespace,
    Eof,
    Unknown,
}

impl TokenKind {
    pub fn from_word(word: &str) -> Self {
        if KEYWORDS.contains(&word) {
            Self::Keyword
        } else {
            Self::Identifier
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Punctuation => "PUNCTUATION",
            TokenKind::Comment => "COMMENT",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: Loc,
}

impl Token {
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_type_keyword(&self) -> bool {
        self.kind == TokenKind::Keyword && TYPE_KEYWORDS.contains(&self.text.as_str())
    }
}

#[derive(Debug)]
pub struct Lexer {
    chars: IntoIter<char>,
    loc: Loc,

    ch: char,
    peek_ch: char,
}

impl Lexer {
    pub fn new(input: String) -> Self {
        let mut lexer = Self {
            chars: input.chars().collect::<Vec<_>>().into_iter(),
            ch: '\0',
            peek_ch: '\0',

            loc: Loc { column: 0, line: 1 },
        };

        lexer.peek_ch = lexer.chars.next().unwrap_or('\0');
        lexer.read_char();
        lexer
    }

    /// Consumes the whole input. The result always ends with exactly one
    /// [`TokenKind::Eof`] token positioned where the input ended.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = vec![];
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn peek_char(&self) -> char {
        self.peek_ch
    }

    fn is_digit(&self) -> bool {
        self.ch.is_ascii_digit()
    }

    fn is_identifier_start(&self) -> bool {
        self.ch.is_ascii_alphabetic() || self.ch == '_'
    }

    fn is_valid_identifier_char(&self) -> bool {
        self.is_identifier_start() || self.is_digit()
    }

    fn is_whitespace(&self) -> bool {
        matches!(self.ch, ' ' | '\n' | '\r' | '\t' | '\x0B' | '\x0C')
    }

    fn skip_whitespace(&mut self) {
        while self.is_whitespace() {
            self.read_char();
        }
    }

    /// Skips any run of whitespace and comments. An unterminated block comment
    /// runs to the end of the input.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();

            match (self.ch, self.peek_char()) {
                ('/', '/') => {
                    while self.ch != '\n' && self.ch != '\0' {
                        self.read_char();
                    }
                }
                ('/', '*') => {
                    self.read_char();
                    self.read_char();
                    while !(self.ch == '*' && self.peek_char() == '/') && self.ch != '\0' {
                        self.read_char();
                    }
                    if self.ch != '\0' {
                        self.read_char();
                        self.read_char();
                    }
                }
                _ => return,
            }
        }
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.loc.column = 0;
            self.loc.line += 1;
        }
        self.ch = self.peek_ch;
        self.peek_ch = self.chars.next().unwrap_or('\0');
        self.loc.column += 1;
    }

    fn read_number(&mut self) -> Token {
        let old_loc = self.loc;
        let mut string = String::new();
        let mut seen_dot = false;

        // Only the first dot is taken: "1.2.3" lexes as "1.2", "." and "3".
        while self.is_digit() || (self.ch == '.' && !seen_dot) {
            if self.ch == '.' {
                seen_dot = true;
            }
            string.push(self.ch);
            self.read_char();
        }

        Token {
            kind: TokenKind::Number,
            text: string,
            loc: old_loc,
        }
    }

    fn read_identifier(&mut self) -> Token {
        let old_loc = self.loc;
        let mut string = String::new();

        while self.is_valid_identifier_char() {
            string.push(self.ch);
            self.read_char();
        }
        Token {
            kind: TokenKind::from_word(&string),
            text: string,
            loc: old_loc,
        }
    }

    fn read_string(&mut self) -> Token {
        let old_loc = self.loc;
        let mut string = String::new();

        // Opening quote
        self.read_char();

        while self.ch != '"' && self.ch != '\0' {
            if self.ch == '\\' && self.peek_char() != '\0' {
                string.push(self.ch);
                self.read_char();
            }
            string.push(self.ch);
            self.read_char();
        }

        if self.ch == '"' {
            self.read_char();
        }

        Token {
            kind: TokenKind::String,
            text: string,
            loc: old_loc,
        }
    }

    fn read_operator(&mut self) -> Token {
        let old_loc = self.loc;
        let mut op = String::from(self.ch);

        let compound = matches!(
            (self.ch, self.peek_char()),
            ('+', '+')
                | ('-', '-')
                | ('=', '=')
                | ('!', '=')
                | ('<', '=')
                | ('>', '=')
                | ('&', '&')
                | ('|', '|')
                | ('+', '=')
                | ('-', '=')
                | ('*', '=')
                | ('/', '=')
        );
        if compound {
            self.read_char();
            op.push(self.ch);
        }
        self.read_char();

        Token {
            kind: TokenKind::Operator,
            text: op,
            loc: old_loc,
        }
    }

    fn read_single(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            kind,
            text: String::from(self.ch),
            loc: self.loc,
        };
        self.read_char();
        token
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        match self.ch {
            '\0' => Token {
                kind: TokenKind::Eof,
                text: String::new(),
                loc: self.loc,
            },
            '"' => self.read_string(),
            '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '^' | '~' => {
                self.read_operator()
            }
            '(' | ')' | '{' | '}' | '[' | ']' | ';' | ',' | '.' | ':' | '?' => {
                self.read_single(TokenKind::Punctuation)
            }
            _ => {
                if self.is_digit() {
                    self.read_number()
                } else if self.is_identifier_start() {
                    self.read_identifier()
                } else {
                    self.read_single(TokenKind::Unknown)
                }
            }
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();

        if let TokenKind::Eof = token.kind {
            return None;
        }

        Some(token)
    }
}

pub(crate) fn escape_json(string: &str) -> String {
    let mut escaped = String::with_capacity(string.len());
    for ch in string.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Renders the token table written to `tokens.txt`.
pub fn tokens_to_text(tokens: &[Token]) -> String {
    let mut out = format!(
        "{:<15} {:<15} {:<10} {:<10}\n",
        "TYPE", "VALUE", "LINE", "COLUMN"
    );
    out.push_str(&"-".repeat(48));
    out.push('\n');

    for token in tokens {
        out.push_str(&format!(
            "{:<15} {:<15} {:<10} {:<10}\n",
            token.kind.name(),
            token.text,
            token.loc.line,
            token.loc.column
        ));
    }

    out
}

pub fn tokens_to_json(tokens: &[Token]) -> String {
    let entries = tokens
        .iter()
        .map(|token| {
            format!(
                "    {{\n      \"type\": \"{}\",\n      \"value\": \"{}\",\n      \"line\": {},\n      \"column\": {}\n    }}",
                token.kind.name(),
                escape_json(&token.text),
                token.loc.line,
                token.loc.column
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    if entries.is_empty() {
        "{\n  \"tokens\": []\n}\n".to_owned()
    } else {
        format!("{{\n  \"tokens\": [\n{}\n  ]\n}}\n", entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_texts(input: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(input.to_owned())
            .tokenize()
            .into_iter()
            .map(|tok| (tok.kind, tok.text))
            .collect()
    }

    #[test]
    fn test_next_token() {
        let input = r"
            int main(void) {
                return 2;
            }
            "
        .to_owned();
        let mut lexer = Lexer::new(input);
        let expected: Vec<_> = vec![
            (TokenKind::Keyword, "int"),
            (TokenKind::Identifier, "main"),
            (TokenKind::Punctuation, "("),
            (TokenKind::Keyword, "void"),
            (TokenKind::Punctuation, ")"),
            (TokenKind::Punctuation, "{"),
            (TokenKind::Keyword, "return"),
            (TokenKind::Number, "2"),
            (TokenKind::Punctuation, ";"),
            (TokenKind::Punctuation, "}"),
            (TokenKind::Eof, ""),
        ];

        for (kind, text) in expected {
            let token = lexer.next_token();

            assert_eq!(kind, token.kind);
            assert_eq!(text, token.text);
        }
    }

    #[test]
    fn test_all_compound_operators() {
        let input = "++ -- == != <= >= && || += -= *= /=";
        let texts: Vec<_> = kinds_and_texts(input)
            .into_iter()
            .filter(|(kind, _)| *kind == TokenKind::Operator)
            .map(|(_, text)| text)
            .collect();

        assert_eq!(
            texts,
            vec!["++", "--", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/="]
        );
    }

    #[test]
    fn test_single_char_operators() {
        let texts: Vec<_> = kinds_and_texts("+ - * / % = < > ! & | ^ ~")
            .into_iter()
            .filter(|(kind, _)| *kind == TokenKind::Operator)
            .map(|(_, text)| text)
            .collect();

        assert_eq!(
            texts,
            vec!["+", "-", "*", "/", "%", "=", "<", ">", "!", "&", "|", "^", "~"]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = kinds_and_texts("static struct_ do _x9 float");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "static".to_owned()),
                (TokenKind::Identifier, "struct_".to_owned()),
                (TokenKind::Keyword, "do".to_owned()),
                (TokenKind::Identifier, "_x9".to_owned()),
                (TokenKind::Keyword, "float".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_number_takes_only_first_dot() {
        let tokens = kinds_and_texts("1.2.3");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Number, "1.2".to_owned()),
                (TokenKind::Punctuation, ".".to_owned()),
                (TokenKind::Number, "3".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_string_escape_is_not_a_terminator() {
        let tokens = kinds_and_texts(r#""a\"b" x"#);
        assert_eq!(tokens[0], (TokenKind::String, r#"a\"b"#.to_owned()));
        assert_eq!(tokens[1], (TokenKind::Identifier, "x".to_owned()));
    }

    #[test]
    fn test_unterminated_string_ends_at_eof() {
        let tokens = kinds_and_texts("\"abc");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::String, "abc".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = kinds_and_texts("a // line\n/* block\n */ b /* open");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier, "a".to_owned()),
                (TokenKind::Identifier, "b".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        let tokens = kinds_and_texts("a @ b");
        assert_eq!(tokens[1], (TokenKind::Unknown, "@".to_owned()));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("int x;\n  x = 1;".to_owned()).tokenize();

        assert_eq!(tokens[0].loc, Loc { line: 1, column: 1 });
        assert_eq!(tokens[1].loc, Loc { line: 1, column: 5 });
        assert_eq!(tokens[3].loc, Loc { line: 2, column: 3 });

        let eof = tokens.last().expect("there is always an eof token");
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.loc, Loc { line: 2, column: 9 });
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1
        );
    }

    #[test]
    fn test_iterator_stops_before_eof() {
        let lexer = Lexer::new("a b".to_owned());
        assert_eq!(lexer.count(), 2);
    }

    #[test]
    fn test_token_exports() {
        let tokens = Lexer::new("x = \"hi\";".to_owned()).tokenize();

        let text = tokens_to_text(&tokens);
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("TYPE            VALUE"));
        assert_eq!(lines.next().unwrap(), "-".repeat(48));
        assert!(lines.next().unwrap().starts_with("IDENTIFIER      x"));

        let json = tokens_to_json(&tokens);
        assert!(json.starts_with("{\n  \"tokens\": [\n"));
        assert!(json.contains("\"type\": \"STRING\",\n      \"value\": \"hi\""));
        assert!(json.contains("\"type\": \"EOF\""));
        assert_eq!(json, tokens_to_json(&tokens));
    }
}
