use crate::dbc::core;
use crate::dbc::types::database::DatabaseDBC;
use crate::dbc::types::errors::DbcParseError;

use std::fs::File;
use std::io::{BufReader, Read};

/// Parses a DBC file and returns a populated [`DatabaseDBC`] instance.
///
/// This function reads a DBC file from disk, detects its text encoding
/// (UTF-8, GBK, ASCII, Latin-1, in that order, with a lossy UTF-8 fallback),
/// parses the content line by line, and fills the [`DatabaseDBC`] structure
/// with all parsed information:
/// - **Version** (from the `VERSION` line)
/// - **Nodes** (from the `BU_` line)
/// - **Messages** (from `BO_` lines, with extended-frame ID disambiguation)
/// - **Signals** (from `SG_` lines)
/// - **Comments** for nodes, messages, and signals (from `CM_` lines)
/// - **Cycle times** (from `BA_ "GenMsgCycleTime"` lines)
/// - **Value tables** (from `VAL_TABLE_` and `VAL_` lines)
///
/// The parsing logic is tolerant: unknown keywords and malformed individual
/// lines are skipped, and multi-line comments are joined before parsing.
/// Tool-internal placeholder messages (`INDEPENDENT_SIG_MSG`, raw id ≥
/// `0xC0000000`) and extended ids above `0x1FFFFFFF` are discarded together
/// with their signals.
///
/// # Parameters
/// - `path`: Path to the `.dbc` file to parse.
///
/// # Returns
/// - `Ok(DatabaseDBC)` if the file was successfully read and parsed.
/// - `Err(DbcParseError)` detailing why the file could not be opened or read.
///
/// # Errors
/// Returns an `Err(DbcParseError)` if:
/// - The path does not end in `.dbc`.
/// - The file cannot be opened.
/// - There are I/O errors while reading.
///
/// # Notes
/// - Parsing stops only at the end of the file; malformed lines are skipped.
/// - Already-decoded text can be parsed directly with [`parse_from_str`].
pub fn parse_from_file(path: &str) -> Result<DatabaseDBC, DbcParseError> {
    // check if the provided file has the .dbc format
    if !path.to_ascii_lowercase().ends_with(".dbc") {
        return Err(DbcParseError::InvalidExtension {
            path: path.to_string(),
        });
    }

    let file: File = File::open(path).map_err(|source| DbcParseError::OpenFile {
        path: path.to_string(),
        source,
    })?;
    let mut reader: BufReader<File> = BufReader::new(file);

    let mut bytes: Vec<u8> = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| DbcParseError::Read {
            path: path.to_string(),
            source,
        })?;

    let text: String = core::encoding::decode_text(&bytes);
    Ok(parse_from_str(&text))
}

/// Parses already-decoded DBC text into a [`DatabaseDBC`].
///
/// Best-effort: lines the grammar does not match are silently skipped, so
/// the call itself never fails.
pub fn parse_from_str(text: &str) -> DatabaseDBC {
    let mut db: DatabaseDBC = DatabaseDBC::default();
    let lines: Vec<&str> = text.lines().collect();
    let mut i: usize = 0;

    while i < lines.len() {
        let line: &str = lines[i].trim_start();
        i += 1;

        // skip comments and empty lines
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let mut parts = line.split_ascii_whitespace();
        let first: &str = parts.next().unwrap_or("");
        let second: &str = parts.next().unwrap_or("");

        match first {
            "VERSION" => {
                core::version::decode(&mut db, line);
            }
            // Some DBCs use "BU_:" while others use "BU_". Accept both.
            "BU_:" | "BU_" => {
                core::bu_::decode(&mut db, line);
            }
            "BO_" => {
                core::bo_::decode(&mut db, line);
            }
            "SG_" => {
                core::sg_::decode(&mut db, line);
            }
            "VAL_TABLE_" => {
                core::val_table_::decode(&mut db, line);
            }
            "VAL_" => {
                core::val_::decode(&mut db, line);
            }
            "BA_" => {
                core::ba_::decode(&mut db, line);
            }
            // The bare `CM_` keyword also appears in the NS_ section; only
            // scoped comment forms are parsed.
            "CM_" if matches!(second, "BU_" | "BO_" | "SG_") => {
                // Comment bodies may span lines; gather until the quoted
                // segment closes.
                let mut stmt: String = line.to_string();
                while !core::strings::has_complete_quoted_segment(&stmt) && i < lines.len() {
                    stmt.push('\n');
                    stmt.push_str(lines[i].trim_start());
                    i += 1;
                }
                match second {
                    "BU_" => core::cm_::decode_node(&mut db, &stmt),
                    "BO_" => core::cm_::decode_message(&mut db, &stmt),
                    _ => core::cm_::decode_signal(&mut db, &stmt),
                }
            }
            _ => {}
        }
    }

    db
}
