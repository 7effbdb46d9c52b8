//! Reader for the `.pgdf` graph-exchange format.
//!
//! `.pgdf` is line-oriented UTF-8, pipe-separated:
//!
//! | Line | Meaning |
//! |------|---------|
//! | `# …` | comment, ignored |
//! | blank | ignored |
//! | `@id\|@label\|name\|country` | node-file header; trailing columns are property names |
//! | `@id\|@label\|@dir\|@out\|@in\|since` | edge-file header |
//! | `user_101\|User\|Ana\|Mexico` | one record, fields in header order |
//!
//! Edge `@dir` is `T` (directed) or `F` (undirected); `@out`/`@in` are
//! source/target node ids with no referential-integrity requirement.
//! Empty fields become empty-string property values, and fields missing
//! at end-of-line are treated as empty. Malformed lines surface as
//! [`StoreError::BadRecord`] with the 1-based line number; the reader
//! keeps going, leaving skip-or-abort to the ingest policy.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use propgraph_core::{Edge, Node, PropertyMap};

use crate::error::{StoreError, StoreResult};

/// One parsed `.pgdf` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A node record from a node file.
    Node(Node),
    /// An edge record from an edge file.
    Edge(Edge),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Nodes,
    Edges,
}

impl FileKind {
    /// Reserved (non-property) columns at the start of each record.
    fn reserved_columns(self) -> usize {
        match self {
            FileKind::Nodes => 2,
            FileKind::Edges => 5,
        }
    }
}

#[derive(Debug)]
struct Header {
    kind: FileKind,
    prop_columns: Vec<String>,
}

/// Streaming `.pgdf` reader.
///
/// Implements `Iterator<Item = StoreResult<Record>>`; the file is never
/// materialized.
pub struct PgdfReader<R> {
    lines: io::Lines<R>,
    line_no: u64,
    header: Option<Header>,
}

impl PgdfReader<BufReader<File>> {
    /// Open a `.pgdf` file. I/O failures surface as
    /// [`StoreError::FileIo`].
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> PgdfReader<R> {
    /// Wrap any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            header: None,
        }
    }
}

impl<R: BufRead> Iterator for PgdfReader<R> {
    type Item = StoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            match &self.header {
                Some(header) => return Some(parse_record(header, self.line_no, line)),
                None => match parse_header(self.line_no, line) {
                    Ok(header) => self.header = Some(header),
                    Err(e) => return Some(Err(e)),
                },
            }
        }
    }
}

fn bad(line_no: u64, reason: impl std::fmt::Display) -> StoreError {
    StoreError::BadRecord(format!("line {line_no}: {reason}"))
}

fn parse_header(line_no: u64, line: &str) -> StoreResult<Header> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 2 || fields[0] != "@id" || fields[1] != "@label" {
        return Err(bad(line_no, "header must start with '@id|@label|'"));
    }

    let kind = if fields.len() >= 5 && fields[2..5] == ["@dir", "@out", "@in"] {
        FileKind::Edges
    } else {
        FileKind::Nodes
    };

    let mut prop_columns: Vec<String> = fields[kind.reserved_columns()..]
        .iter()
        .map(|s| s.to_string())
        .collect();
    // A trailing pipe produces one empty tail column; drop it.
    while prop_columns.last().map_or(false, |c| c.is_empty()) {
        prop_columns.pop();
    }
    if prop_columns.iter().any(|c| c.is_empty()) {
        return Err(bad(line_no, "empty property column name in header"));
    }

    Ok(Header { kind, prop_columns })
}

fn parse_record(header: &Header, line_no: u64, line: &str) -> StoreResult<Record> {
    let fields: Vec<&str> = line.split('|').collect();
    let reserved = header.kind.reserved_columns();
    let max_fields = reserved + header.prop_columns.len();
    if fields.len() > max_fields {
        return Err(bad(
            line_no,
            format_args!(
                "{} fields but the header defines {max_fields}",
                fields.len()
            ),
        ));
    }

    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    if field(0).is_empty() {
        return Err(bad(line_no, "empty @id"));
    }

    let mut props = PropertyMap::new();
    for (i, column) in header.prop_columns.iter().enumerate() {
        props.insert(column.clone(), field(reserved + i).to_string());
    }

    match header.kind {
        FileKind::Nodes => Ok(Record::Node(Node {
            id: field(0).to_string(),
            label: field(1).to_string(),
            props,
        })),
        FileKind::Edges => {
            let directed = match field(2) {
                "T" => true,
                "F" => false,
                other => {
                    return Err(bad(
                        line_no,
                        format_args!("invalid @dir '{other}' (expected T or F)"),
                    ))
                }
            };
            Ok(Record::Edge(Edge {
                id: field(0).to_string(),
                label: field(1).to_string(),
                src: field(3).to_string(),
                dst: field(4).to_string(),
                directed,
                props,
            }))
        }
    }
}
