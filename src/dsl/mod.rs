//! Netlist language for circuit descriptions.
//!
//! A line-oriented, human-editable text format. Each line declares one
//! component or applies one directive to pins of components declared anywhere
//! in the file.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist    = { line }
//! line       = comment | directive | component | empty
//! comment    = ('#' | ';') { any_char }
//! component  = keyword name { param }
//! directive  = ".wire" pin pin { param }
//!            | ".force" pin value
//!            | ".color" pin word
//! pin        = component_name pin_name
//! param      = key '=' word
//! value      = '0' | '1' | 'X' | 'Z'
//! word       = bare_word | '"' { char | '\"' | '\\' | '\n' } '"'
//! ```
//!
//! Names and colors that are not a single bare word (`my switch`, `#ff0000`)
//! are written in double quotes.
//!
//! # Component Types
//!
//! | Keyword | Description | Parameters |
//! |---------|-------------|------------|
//! | AND OR XOR NAND NOR XNOR | Gates | `inputs` |
//! | NOT BUF | Unary gates | |
//! | TRI | Tri-state buffer | |
//! | BUS | Driver resolution | `inputs` |
//! | MUX DEMUX | Selectors | `select` |
//! | DFF TFF JKFF SRFF | Flip-flops | `trigger`, `state` |
//! | REG | Register | `bits`, `trigger`, `state` |
//! | SHIFT | Shift register | `bits`, `trigger`, `decode`, `state` |
//! | CLOCK | Clock generator | `period`, `duty`, `phase` |
//! | SWITCH CONST | Sources | `value` |
//! | PROBE | Indicator | |
//!
//! Every component also accepts `x` and `y` layout coordinates.
//!
//! # Example
//!
//! ```text
//! # Toggle on every clock edge
//! CLOCK clk period=500
//! TFF t
//! CONST one
//! PROBE led
//!
//! .wire one out t t
//! .wire clk out t clk
//! .wire t q led in delay=10
//! ```

mod ast;
mod lexer;
mod parser;
mod writer;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use writer::write;

use crate::error::Result;

/// Parse netlist text into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::GatewaveError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
