//! Parser for the netlist language.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{GatewaveError, Result};
use crate::logic::LogicValue;

/// Parser for netlist text.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();

        while self.current.kind != TokenKind::Eof {
            // Skip empty lines
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
                continue;
            }

            match self.current.kind {
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    ast.components.push(component);
                }
                _ => {
                    return Err(GatewaveError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(GatewaveError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(GatewaveError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    /// A bare word: identifiers and numbers both qualify.
    fn expect_word(&mut self, what: &str) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            _ => Err(GatewaveError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.kind),
            )),
        }
    }

    fn parse_pin_ref(&mut self) -> Result<PinRef> {
        let component = self.expect(TokenKind::Identifier)?.text;
        let pin = self.expect_word("pin name")?;
        Ok(PinRef { component, pin })
    }

    /// `key=value` pairs until end of line. Keys are lowercased.
    fn parse_params(&mut self, line: usize) -> Result<HashMap<String, String>> {
        let mut params = HashMap::new();
        while !self.at_line_end() {
            let key = self.expect(TokenKind::Identifier)?.text.to_lowercase();
            self.expect(TokenKind::Equals)?;
            let value = self.expect_word("parameter value")?;
            if params.insert(key.clone(), value).is_some() {
                return Err(GatewaveError::parse(line, format!("duplicate parameter '{}'", key)));
            }
        }
        Ok(params)
    }

    fn parse_directive(&mut self, ast: &mut NetlistAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".wire" => {
                let from = self.parse_pin_ref()?;
                let to = self.parse_pin_ref()?;
                let mut params = self.parse_params(line)?;
                let delay = params
                    .remove("delay")
                    .map(|text| {
                        text.parse::<u64>()
                            .map_err(|_| GatewaveError::parse(line, format!("invalid wire delay: {}", text)))
                    })
                    .transpose()?;
                let color = params.remove("color");
                if let Some(key) = params.keys().next() {
                    return Err(GatewaveError::parse(line, format!("unknown wire parameter '{}'", key)));
                }
                ast.wires.push(WireDef {
                    from,
                    to,
                    delay,
                    color,
                    line,
                });
            }
            ".force" => {
                let target = self.parse_pin_ref()?;
                let text = self.expect_word("logic value")?;
                let value = LogicValue::parse(&text)
                    .ok_or_else(|| GatewaveError::parse(line, format!("invalid logic value: {}", text)))?;
                ast.forces.push(ForceDef { target, value, line });
            }
            ".color" => {
                let target = self.parse_pin_ref()?;
                let color = self.expect_word("color")?;
                ast.colors.push(ColorDef { target, color, line });
            }
            _ => {
                return Err(GatewaveError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let keyword = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let component_type =
            ComponentType::from_keyword(&keyword).ok_or_else(|| GatewaveError::UnknownComponentType {
                component_type: keyword.clone(),
                line,
            })?;

        if self.current.kind != TokenKind::Identifier {
            return Err(GatewaveError::invalid_component(
                keyword,
                line,
                "expected a component name",
            ));
        }
        let name = self.expect(TokenKind::Identifier)?.text;
        let params = self.parse_params(line)?;

        Ok(ComponentDef {
            component_type,
            name,
            params,
            line,
        })
    }
}
