use super::TextError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    Number(u64),
    String(String),
    Hex(Vec<u8>),
    Null,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Colon,
    Assign, // ::=
}

pub struct Lexer<'input> {
    chars: std::str::CharIndices<'input>,
    input: &'input str,
    peeked: Option<(usize, char)>,
}

impl<'input> Lexer<'input> {
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self {
            chars: input.char_indices(),
            input,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.peeked.take().or_else(|| self.chars.next())
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some((_, c)) if c.is_whitespace() => {
                    self.bump();
                }
                Some((start, '-')) => {
                    // Possible `--` comment; only consume if confirmed.
                    let rest = &self.input[start..];
                    if rest.starts_with("--") {
                        self.bump();
                        self.bump();
                        for (_, c) in self.chars.by_ref() {
                            if c == '\n' {
                                break;
                            }
                        }
                        self.peeked = None;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Reads the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, TextError> {
        self.skip_trivia();
        let Some((start, c)) = self.peek() else {
            return Ok(None);
        };

        match c {
            '{' => {
                self.bump();
                Ok(Some(Token::LBrace))
            }
            '}' => {
                self.bump();
                Ok(Some(Token::RBrace))
            }
            '(' => {
                self.bump();
                Ok(Some(Token::LParen))
            }
            ')' => {
                self.bump();
                Ok(Some(Token::RParen))
            }
            ',' => {
                self.bump();
                Ok(Some(Token::Comma))
            }
            ':' => {
                self.bump();
                if let Some((_, ':')) = self.peek() {
                    self.bump();
                    if let Some((_, '=')) = self.peek() {
                        self.bump();
                        return Ok(Some(Token::Assign));
                    }
                    return Err(TextError::UnexpectedToken {
                        expected: "'::='",
                        found: "::".to_string(),
                    });
                }
                Ok(Some(Token::Colon))
            }
            '"' => self.read_string(),
            '\'' => self.read_hex(),
            c if c.is_ascii_digit() => self.read_number(start),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(start),
            other => Err(TextError::UnexpectedToken {
                expected: "a token",
                found: other.to_string(),
            }),
        }
    }

    fn read_string(&mut self) -> Result<Option<Token>, TextError> {
        self.bump(); // opening quote
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(TextError::UnterminatedString),
                Some((_, '"')) => break,
                Some((_, '\\')) => match self.bump() {
                    Some((_, 'n')) => s.push('\n'),
                    Some((_, 't')) => s.push('\t'),
                    Some((_, '"')) => s.push('"'),
                    Some((_, '\\')) => s.push('\\'),
                    Some((_, other)) => s.push(other),
                    None => return Err(TextError::UnterminatedString),
                },
                Some((_, c)) => s.push(c),
            }
        }
        Ok(Some(Token::String(s)))
    }

    fn read_hex(&mut self) -> Result<Option<Token>, TextError> {
        self.bump(); // opening quote
        let mut digits = String::new();
        loop {
            match self.bump() {
                None => return Err(TextError::BadHex),
                Some((_, '\'')) => break,
                Some((_, c)) if c.is_whitespace() => {}
                Some((_, c)) => digits.push(c),
            }
        }
        match self.peek() {
            Some((_, 'H')) | Some((_, 'h')) => {
                self.bump();
            }
            _ => return Err(TextError::BadHex),
        }
        if digits.len() % 2 != 0 {
            return Err(TextError::BadHex);
        }
        let mut bytes = Vec::with_capacity(digits.len() / 2);
        let chars: Vec<char> = digits.chars().collect();
        for pair in chars.chunks(2) {
            let byte_str: String = pair.iter().collect();
            let byte = u8::from_str_radix(&byte_str, 16).map_err(|_| TextError::BadHex)?;
            bytes.push(byte);
        }
        Ok(Some(Token::Hex(bytes)))
    }

    fn read_number(&mut self, start: usize) -> Result<Option<Token>, TextError> {
        let mut end = start;
        let is_hex_prefixed = self.input[start..].starts_with("0x") || self.input[start..].starts_with("0X");
        if is_hex_prefixed {
            self.bump();
            self.bump();
            end += 2;
            while let Some((_, c)) = self.peek() {
                if c.is_ascii_hexdigit() {
                    end += c.len_utf8();
                    self.bump();
                } else {
                    break;
                }
            }
            let value = u64::from_str_radix(&self.input[start + 2..end], 16)
                .map_err(|_| TextError::UnexpectedToken { expected: "hex number", found: self.input[start..end].to_string() })?;
            return Ok(Some(Token::Number(value)));
        }

        while let Some((_, c)) = self.peek() {
            if c.is_ascii_digit() {
                end += c.len_utf8();
                self.bump();
            } else {
                break;
            }
        }
        let value: u64 = self.input[start..end]
            .parse()
            .map_err(|_| TextError::UnexpectedToken { expected: "number", found: self.input[start..end].to_string() })?;
        Ok(Some(Token::Number(value)))
    }

    fn read_identifier(&mut self, start: usize) -> Result<Option<Token>, TextError> {
        let mut end = start;
        while let Some((_, c)) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                end += c.len_utf8();
                self.bump();
            } else {
                break;
            }
        }
        let text = &self.input[start..end];
        if text == "NULL" {
            Ok(Some(Token::Null))
        } else {
            Ok(Some(Token::Identifier(text.to_string())))
        }
    }
}
