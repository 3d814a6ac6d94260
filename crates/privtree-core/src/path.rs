//! Resource paths and the dotted-identifier segmenter.
//!
//! A resource path such as `"my.db".autogen.cpu` is a list of segments
//! addressing a node of the privilege tree. The empty path is the global
//! scope.
//!
//! Segment grammar:
//!
//! ```text
//! path    := ws* ( segment ( "." ws* segment | "." )* )? ws*
//! segment := bare | quoted
//! bare    := [A-Za-z_][A-Za-z0-9_]*        (not a reserved keyword)
//! quoted  := '"' ( [^"\\\n] | '\"' | '\\' | '\n' )* '"'
//! ```
//!
//! A blank segment (`a..c` or a quoted `""`) is only accepted as the middle of
//! a three-segment path, where it stands for the default retention policy.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, PathError};

/// Segment substituted for a blank middle segment (`db..measurement`).
pub const DEFAULT_MIDDLE_SEGMENT: &str = "autogen";

/// Reserved words of the surrounding query language. They must be quoted to
/// be used as a segment.
const KEYWORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BEGIN", "BY", "CARDINALITY", "CREATE",
    "CONTINUOUS", "DATABASE", "DATABASES", "DEFAULT", "DELETE", "DESC", "DESTINATIONS",
    "DIAGNOSTICS", "DISTINCT", "DROP", "DURATION", "END", "EVERY", "EXACT", "EXPLAIN", "FALSE",
    "FIELD", "FOR", "FROM", "GRANT", "GRANTS", "GROUP", "GROUPS", "IN", "INF", "INSERT", "INTO",
    "KEY", "KEYS", "KILL", "LIMIT", "MEASUREMENT", "MEASUREMENTS", "NAME", "OFFSET", "ON", "OR",
    "ORDER", "PASSWORD", "POLICIES", "POLICY", "PRIVILEGES", "QUERIES", "QUERY", "READ",
    "REPLICATION", "RESAMPLE", "RETENTION", "REVOKE", "SELECT", "SERIES", "SET", "SHARD",
    "SHARDS", "SLIMIT", "SOFFSET", "STATS", "SUBSCRIPTION", "SUBSCRIPTIONS", "TAG", "TO", "TRUE",
    "USER", "USERS", "VALUES", "WHERE", "WITH", "WRITE",
];

fn is_keyword(ident: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(ident))
}

fn is_ident_first_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// An ordered list of segments addressing a node of the privilege tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Build a path from pre-segmented names. Segments are taken verbatim.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The global scope.
    pub const fn global() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Segment a dotted path, expanding a blank middle segment to
    /// [`DEFAULT_MIDDLE_SEGMENT`].
    ///
    /// ```
    /// use privtree_core::ResourcePath;
    ///
    /// let path = ResourcePath::parse(r#""a.b".rp.cpu"#).unwrap();
    /// assert_eq!(path.segments(), ["a.b", "rp", "cpu"]);
    ///
    /// let path = ResourcePath::parse("mydb..cpu").unwrap();
    /// assert_eq!(path.segments(), ["mydb", "autogen", "cpu"]);
    /// ```
    pub fn parse(text: &str) -> Result<Self, PathError> {
        Self::parse_with(text, Some(DEFAULT_MIDDLE_SEGMENT))
    }

    /// Segment a dotted path. With `default_middle` set to `None` blank
    /// segments are always rejected.
    pub fn parse_with(text: &str, default_middle: Option<&str>) -> Result<Self, PathError> {
        if text.trim().is_empty() {
            return Ok(Self::global());
        }

        let mut segments = Segmenter::new(text).segments()?;

        let count = segments.len();
        for (index, segment) in segments.iter_mut().enumerate() {
            if !segment.is_empty() {
                continue;
            }
            match default_middle {
                Some(default) if index == 1 && count == 3 => *segment = default.to_string(),
                _ => return Err(PathError::BlankSegment { index, count }),
            }
        }

        Ok(Self { segments })
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the global scope.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.segments.iter()
    }

    /// A new path with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The enclosing path, or `None` for the global scope.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i != 0 {
                f.write_str(".")?;
            }
            f.write_str(&quote_ident(segment))?;
        }
        Ok(())
    }
}

impl FromStr for ResourcePath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s)?)
    }
}

impl From<Vec<String>> for ResourcePath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl<S: Into<String>> FromIterator<S> for ResourcePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a ResourcePath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Whether `ident` has to be quoted to survive segmentation.
pub fn ident_needs_quotes(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        None => true,
        Some(first) if !is_ident_first_char(first) => true,
        Some(_) => !chars.all(is_ident_char) || is_keyword(ident),
    }
}

/// Render one segment, quoting and escaping it when needed.
pub fn quote_ident(ident: &str) -> String {
    if !ident_needs_quotes(ident) {
        return ident.to_string();
    }
    let mut out = String::with_capacity(ident.len() + 2);
    out.push('"');
    for c in ident.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Keyword(String),
    Dot,
    Ws,
    Eof,
    Other(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(lit) => f.write_str(lit),
            Token::Keyword(kw) => f.write_str(kw),
            Token::Dot => f.write_str("."),
            Token::Ws => f.write_str("WS"),
            Token::Eof => f.write_str("EOF"),
            Token::Other(c) => write!(f, "{c}"),
        }
    }
}

/// 1-based position of a token.
#[derive(Debug, Clone, Copy)]
struct Pos {
    line: usize,
    char: usize,
}

/// Minimal scanner for identifiers, quoted identifiers and dots.
struct Segmenter {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    col: usize,
}

impl Segmenter {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            idx: 0,
            line: 1,
            col: 1,
        }
    }

    fn segments(mut self) -> Result<Vec<String>, PathError> {
        let mut segments = vec![self.expect_ident()?];

        loop {
            let (tok, pos) = self.scan()?;
            match tok {
                Token::Dot => {}
                Token::Eof => break,
                Token::Ws => match self.scan_skip_ws()? {
                    (Token::Eof, _) => break,
                    (tok, pos) => return Err(unexpected(&tok, "EOF", pos)),
                },
                tok => return Err(unexpected(&tok, "., EOF", pos)),
            }

            if self.peek() == Some('.') {
                segments.push(String::new());
                continue;
            }
            segments.push(self.expect_ident()?);
        }

        Ok(segments)
    }

    fn expect_ident(&mut self) -> Result<String, PathError> {
        match self.scan_skip_ws()? {
            (Token::Ident(lit), _) => Ok(lit),
            (tok, pos) => Err(unexpected(&tok, "identifier", pos)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            char: self.col,
        }
    }

    fn scan_skip_ws(&mut self) -> Result<(Token, Pos), PathError> {
        loop {
            match self.scan()? {
                (Token::Ws, _) => continue,
                other => return Ok(other),
            }
        }
    }

    fn scan(&mut self) -> Result<(Token, Pos), PathError> {
        let pos = self.pos();
        let Some(c) = self.bump() else {
            return Ok((Token::Eof, pos));
        };

        let tok = match c {
            c if c.is_whitespace() => {
                while self.peek().is_some_and(char::is_whitespace) {
                    self.bump();
                }
                Token::Ws
            }
            '.' => Token::Dot,
            '"' => Token::Ident(self.scan_quoted(pos)?),
            c if is_ident_first_char(c) => {
                let mut lit = String::from(c);
                while let Some(c) = self.peek().filter(|c| is_ident_char(*c)) {
                    lit.push(c);
                    self.bump();
                }
                if is_keyword(&lit) {
                    Token::Keyword(lit.to_ascii_uppercase())
                } else {
                    Token::Ident(lit)
                }
            }
            c => Token::Other(c),
        };
        Ok((tok, pos))
    }

    /// Scan the rest of a quoted identifier; the opening quote is consumed.
    fn scan_quoted(&mut self, start: Pos) -> Result<String, PathError> {
        let mut lit = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(PathError::UnterminatedQuote {
                        line: start.line,
                        char: start.char,
                    })
                }
                Some('"') => return Ok(lit),
                Some('\\') => {
                    let at = self.pos();
                    match self.bump() {
                        Some('n') => lit.push('\n'),
                        Some('\\') => lit.push('\\'),
                        Some('"') => lit.push('"'),
                        Some(escape) => {
                            return Err(PathError::BadEscape {
                                escape,
                                line: at.line,
                                char: at.char,
                            })
                        }
                        None => {
                            return Err(PathError::UnterminatedQuote {
                                line: start.line,
                                char: start.char,
                            })
                        }
                    }
                }
                Some(c) => lit.push(c),
            }
        }
    }
}

fn unexpected(found: &Token, expected: &str, pos: Pos) -> PathError {
    PathError::Unexpected {
        found: found.to_string(),
        expected: expected.to_string(),
        line: pos.line,
        char: pos.char,
    }
}
