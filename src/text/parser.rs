use std::collections::VecDeque;

use super::lexer::{Lexer, Token};
use super::value::Value;
use super::TextError;
use crate::consts::{named_algorithm_id, named_key_ref, tag_for_choice_name};
use crate::model::{Profile, ProfileElement};

/// Recursive-descent parser from value notation text to a [`Profile`].
///
/// Grammar (informally):
/// ```text
/// Document ::= Statement*
/// Statement ::= identifier "ProfileElement" "::=" choice-name ':' Value
/// Value    ::= NULL | number | hex | string | identifier | Block
/// Block    ::= '{' (Entry (',' Entry)* ','?)?  '}'      -- field form
///            | '{' (Value (',' Value)* ','?)? '}'       -- list form
/// Entry    ::= identifier ':' Value
/// ```
/// A document is a sequence of `valueN ProfileElement ::= <choice-name> :
/// <body>` statements, one per top-level Profile Element, exactly the
/// surface form the format's own value notation uses. The leading
/// `valueN` label is a positional counter with no semantic meaning beyond
/// disambiguating repeated statements; its text is discarded once past.
/// A block is parsed as fields when its first token is `identifier ':'`,
/// otherwise as a list.
pub struct Parser<'input> {
    lexer: Lexer<'input>,
    queue: VecDeque<Token>,
}

impl<'input> Parser<'input> {
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self {
            lexer: Lexer::new(input),
            queue: VecDeque::new(),
        }
    }

    /// Parses the entire input as a Profile Element sequence.
    pub fn parse(input: &'input str) -> Result<Profile, TextError> {
        let mut parser = Self::new(input);
        let profile = parser.parse_profile()?;
        Ok(profile)
    }

    fn fill(&mut self, n: usize) -> Result<(), TextError> {
        while self.queue.len() < n {
            match self.lexer.next_token()? {
                Some(tok) => self.queue.push_back(tok),
                None => break,
            }
        }
        Ok(())
    }

    fn peek_at(&mut self, n: usize) -> Result<Option<&Token>, TextError> {
        self.fill(n + 1)?;
        Ok(self.queue.get(n))
    }

    fn bump(&mut self) -> Result<Option<Token>, TextError> {
        self.fill(1)?;
        Ok(self.queue.pop_front())
    }

    fn expect(&mut self, expected: &'static str, pred: impl Fn(&Token) -> bool) -> Result<Token, TextError> {
        let tok = self.bump()?.ok_or(TextError::UnexpectedToken { expected, found: "end of input".to_string() })?;
        if pred(&tok) {
            Ok(tok)
        } else {
            Err(TextError::UnexpectedToken { expected, found: format!("{tok:?}") })
        }
    }

    fn parse_profile(&mut self) -> Result<Profile, TextError> {
        let mut profile = Profile::new();
        while self.peek_at(0)?.is_some() {
            self.parse_statement(&mut profile)?;
            // A trailing ',' between statements is tolerated but not required.
            if matches!(self.peek_at(0)?, Some(Token::Comma)) {
                self.bump()?;
            }
        }
        Ok(profile)
    }

    /// Parses one `valueN ProfileElement ::= choice-name : body` statement.
    fn parse_statement(&mut self, profile: &mut Profile) -> Result<(), TextError> {
        self.expect_identifier("a 'valueN' label")?;
        let keyword = self.expect_identifier("'ProfileElement'")?;
        if keyword != "ProfileElement" {
            return Err(TextError::UnexpectedToken { expected: "'ProfileElement'", found: keyword });
        }
        self.expect("'::='", |t| matches!(t, Token::Assign))?;
        let name = self.expect_identifier("a profile element choice name")?;
        self.expect("':'", |t| matches!(t, Token::Colon))?;
        let tag = tag_for_choice_name(&name).ok_or_else(|| TextError::UnknownChoice(name.clone()))?;
        let value = self.parse_value()?;
        let element_value = super::value::value_to_element_value(tag, &value)?;
        profile.push(ProfileElement::new(tag, element_value));
        Ok(())
    }

    fn expect_identifier(&mut self, expected: &'static str) -> Result<String, TextError> {
        match self.bump()? {
            Some(Token::Identifier(name)) => Ok(name),
            other => Err(TextError::UnexpectedToken { expected, found: format!("{other:?}") }),
        }
    }

    fn parse_value(&mut self) -> Result<Value, TextError> {
        match self.bump()? {
            Some(Token::Null) => Ok(Value::Null),
            Some(Token::Number(n)) => Ok(Value::Number(n)),
            Some(Token::Hex(bytes)) => Ok(Value::Hex(bytes)),
            Some(Token::String(s)) => Ok(Value::Str(s)),
            Some(Token::Identifier(name)) => {
                if let Some(v) = named_algorithm_id(&name) {
                    Ok(Value::Number(u64::from(v)))
                } else if let Some(v) = named_key_ref(&name) {
                    Ok(Value::Number(u64::from(v)))
                } else {
                    Ok(Value::Str(name))
                }
            }
            Some(Token::LBrace) => self.parse_block(),
            other => Err(TextError::UnexpectedToken {
                expected: "a value",
                found: format!("{other:?}"),
            }),
        }
    }

    /// Called with the opening `{` already consumed.
    fn parse_block(&mut self) -> Result<Value, TextError> {
        if matches!(self.peek_at(0)?, Some(Token::RBrace)) {
            self.bump()?;
            return Ok(Value::Fields(Vec::new()));
        }

        let is_fields =
            matches!(self.peek_at(0)?, Some(Token::Identifier(_))) && matches!(self.peek_at(1)?, Some(Token::Colon));

        if is_fields {
            let mut fields = Vec::new();
            loop {
                let name = match self.bump()? {
                    Some(Token::Identifier(name)) => name,
                    other => {
                        return Err(TextError::UnexpectedToken {
                            expected: "a field name",
                            found: format!("{other:?}"),
                        })
                    }
                };
                self.expect("':'", |t| matches!(t, Token::Colon))?;
                let value = self.parse_value()?;
                fields.push((name, value));

                match self.peek_at(0)? {
                    Some(Token::Comma) => {
                        self.bump()?;
                    }
                    Some(Token::RBrace) => {
                        self.bump()?;
                        break;
                    }
                    other => {
                        return Err(TextError::UnexpectedToken {
                            expected: "',' or '}'",
                            found: format!("{other:?}"),
                        })
                    }
                }
            }
            Ok(Value::Fields(fields))
        } else {
            let mut items = Vec::new();
            loop {
                items.push(self.parse_value()?);
                match self.peek_at(0)? {
                    Some(Token::Comma) => {
                        self.bump()?;
                    }
                    Some(Token::RBrace) => {
                        self.bump()?;
                        break;
                    }
                    other => {
                        return Err(TextError::UnexpectedToken {
                            expected: "',' or '}'",
                            found: format!("{other:?}"),
                        })
                    }
                }
            }
            Ok(Value::List(items))
        }
    }
}
