//! SGF reader: follows the main line of the first game tree.

use thiserror::Error;

use crate::coord::{BoardPoint, MAX_BOARD_SIZE};
use crate::game_record::{Color, GameMetadata, GameRecord, Move, Vertex};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SgfError {
    #[error("SGF syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: &'static str },

    #[error("invalid SGF point {0:?}")]
    BadPoint(String),

    #[error("unsupported board size {0:?}")]
    UnsupportedSize(String),
}

type Property = (String, Vec<String>);

#[derive(Debug, Default)]
struct Node {
    props: Vec<Property>,
}

impl Node {
    fn get(&self, ident: &str) -> Option<&[String]> {
        self.props
            .iter()
            .find(|(id, _)| id == ident)
            .map(|(_, values)| values.as_slice())
    }

    fn first(&self, ident: &str) -> Option<&str> {
        self.get(ident).and_then(|v| v.first()).map(String::as_str)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn error(&self, message: &'static str) -> SgfError {
        SgfError::Syntax {
            offset: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, c: char, message: &'static str) -> Result<(), SgfError> {
        self.skip_ws();
        if self.peek() != Some(c) {
            return Err(self.error(message));
        }
        self.pos += 1;
        Ok(())
    }

    /// Parse one `( ... )` tree. Nodes are appended to `out` only while `keep`
    /// is set; later sibling variations are parsed and discarded.
    fn tree(&mut self, out: &mut Vec<Node>, keep: bool) -> Result<(), SgfError> {
        self.expect('(', "expected '('")?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(';') => {
                    let node = self.node()?;
                    if keep {
                        out.push(node);
                    }
                }
                Some('(') | Some(')') => break,
                Some(_) => return Err(self.error("expected ';', '(' or ')'")),
                None => return Err(self.error("unexpected end of input")),
            }
        }

        let mut first_child = true;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('(') => {
                    self.tree(out, keep && first_child)?;
                    first_child = false;
                }
                Some(')') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => return Err(self.error("expected '(' or ')'")),
                None => return Err(self.error("unterminated game tree")),
            }
        }
    }

    fn node(&mut self) -> Result<Node, SgfError> {
        self.pos += 1; // ';'
        let mut node = Node::default();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                        self.pos += 1;
                    }
                    let ident: String = self.chars[start..self.pos].iter().collect();
                    let mut values = Vec::new();
                    loop {
                        self.skip_ws();
                        if self.peek() != Some('[') {
                            break;
                        }
                        values.push(self.value()?);
                    }
                    if values.is_empty() {
                        return Err(self.error("property without value"));
                    }
                    node.props.push((ident, values));
                }
                _ => return Ok(node),
            }
        }
    }

    fn value(&mut self) -> Result<String, SgfError> {
        self.pos += 1; // '['
        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated property value"));
            };
            self.pos += 1;
            match c {
                ']' => return Ok(value),
                '\\' => {
                    let Some(escaped) = self.peek() else {
                        return Err(self.error("unterminated property value"));
                    };
                    self.pos += 1;
                    // escaped newline is a soft line break
                    if escaped != '\n' {
                        value.push(escaped);
                    }
                }
                _ => value.push(c),
            }
        }
    }
}

fn parse_size(node: &Node) -> Result<u8, SgfError> {
    let Some(raw) = node.first("SZ") else {
        return Ok(MAX_BOARD_SIZE);
    };
    // "19" or "19:19"; only square boards are supported
    let mut parts = raw.split(':').map(str::trim);
    let cols = parts.next().unwrap_or_default();
    let rows = parts.next().unwrap_or(cols);
    let size: u8 = cols
        .parse()
        .map_err(|_| SgfError::UnsupportedSize(raw.to_string()))?;
    if rows != cols || !(1..=MAX_BOARD_SIZE).contains(&size) {
        return Err(SgfError::UnsupportedSize(raw.to_string()));
    }
    Ok(size)
}

fn point_index(c: u8, size: u8, raw: &str) -> Result<u8, SgfError> {
    if !c.is_ascii_lowercase() || c - b'a' >= size {
        return Err(SgfError::BadPoint(raw.to_string()));
    }
    Ok(c - b'a')
}

/// SGF `xy` -> engine point. SGF rows count from the top.
fn sgf_point(raw: &str, size: u8) -> Result<BoardPoint, SgfError> {
    let bytes = raw.as_bytes();
    if bytes.len() != 2 {
        return Err(SgfError::BadPoint(raw.to_string()));
    }
    let x = point_index(bytes[0], size, raw)?;
    let y = point_index(bytes[1], size, raw)?;
    BoardPoint::new(x + 1, size - y).map_err(|_| SgfError::BadPoint(raw.to_string()))
}

fn sgf_vertex(raw: &str, size: u8) -> Result<Vertex, SgfError> {
    let raw = raw.trim();
    if raw.is_empty() || (raw == "tt" && size <= MAX_BOARD_SIZE) {
        return Ok(Vertex::Pass);
    }
    sgf_point(raw, size).map(Vertex::Point)
}

/// Expand a setup value, which may be a compressed rectangle `aa:cc`.
fn setup_points(raw: &str, size: u8) -> Result<Vec<BoardPoint>, SgfError> {
    let Some((from, to)) = raw.split_once(':') else {
        return Ok(vec![sgf_point(raw.trim(), size)?]);
    };
    let a = sgf_point(from.trim(), size)?;
    let b = sgf_point(to.trim(), size)?;
    let mut points = Vec::new();
    for column in a.column().min(b.column())..=a.column().max(b.column()) {
        for row in a.row().min(b.row())..=a.row().max(b.row()) {
            points.push(BoardPoint::new(column, row).map_err(|_| SgfError::BadPoint(raw.to_string()))?);
        }
    }
    Ok(points)
}

/// Parse an SGF string into a GameRecord.
pub fn parse_sgf(text: &str) -> Result<GameRecord, SgfError> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
    };
    let mut nodes = Vec::new();
    parser.tree(&mut nodes, true)?;

    let Some(root) = nodes.first() else {
        return Err(parser.error("empty game tree"));
    };
    let board_size = parse_size(root)?;

    let text_prop = |ident: &str| {
        root.first(ident)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let metadata = GameMetadata {
        black: text_prop("PB").unwrap_or_else(|| "Unknown".to_string()),
        white: text_prop("PW").unwrap_or_else(|| "Unknown".to_string()),
        result: text_prop("RE"),
        board_size,
        komi: text_prop("KM").and_then(|k| k.parse().ok()),
        date: text_prop("DT"),
        event: text_prop("EV"),
    };

    let mut setup = Vec::new();
    for (ident, color) in [("AB", Color::Black), ("AW", Color::White)] {
        for raw in root.get(ident).unwrap_or_default() {
            for point in setup_points(raw, board_size)? {
                setup.push(Move::play(color, point));
            }
        }
    }

    let mut moves = Vec::new();
    for node in &nodes {
        for (ident, color) in [("B", Color::Black), ("W", Color::White)] {
            if let Some(raw) = node.first(ident) {
                moves.push(Move {
                    player: color,
                    vertex: sgf_vertex(raw, board_size)?,
                });
            }
        }
    }

    Ok(GameRecord {
        metadata,
        setup,
        moves,
    })
}
