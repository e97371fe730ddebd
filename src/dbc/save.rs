use std::fmt::{self, Write as FmtWrite};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dbc::types::{database::DatabaseDBC, errors::DbcSaveError, signal::{Endianness, Signess}};

const NS_KEYWORDS: &[&str] = &[
    "NS_DESC_",
    "CM_",
    "BA_DEF_",
    "BA_",
    "VAL_",
    "CAT_DEF_",
    "CAT_",
    "FILTER",
    "BA_DEF_DEF_",
    "EV_DATA_",
    "ENVVAR_DATA_",
    "SGTYPE_",
    "SGTYPE_VAL_",
    "BA_DEF_SGTYPE_",
    "BA_SGTYPE_",
    "SIG_TYPE_REF_",
    "VAL_TABLE_",
    "SIG_GROUP_",
    "SIG_VALTYPE_",
    "SIGTYPE_VALTYPE_",
    "BO_TX_BU_",
    "BA_DEF_REL_",
    "BA_REL_",
    "BA_DEF_DEF_REL_",
    "BU_SG_REL_",
    "BU_EV_REL_",
    "BU_BO_REL_",
    "SG_MUL_VAL_",
];

/// Serializes a [`DatabaseDBC`] into DBC text and writes it to `path`.
///
/// Ensures the destination has a `.dbc` extension, creates intermediate
/// directories when needed, and reports structured [`DbcSaveError`] variants
/// for path, I/O, or formatting failures.
pub fn save_to_file(path: &str, database: &DatabaseDBC) -> Result<(), DbcSaveError> {
    if !path.to_ascii_lowercase().ends_with(".dbc") {
        return Err(DbcSaveError::InvalidExtension {
            path: path.to_string(),
        });
    }

    let serialized: String = to_dbc_string(database)?;

    let path_ref: &Path = Path::new(path);
    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| DbcSaveError::CreateDirectory {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let file: File = File::create(path_ref).map_err(|source| DbcSaveError::CreateFile {
        path: path.to_string(),
        source,
    })?;
    let mut writer: BufWriter<File> = BufWriter::new(file);
    writer
        .write_all(serialized.as_bytes())
        .map_err(|source| DbcSaveError::Write {
            path: path.to_string(),
            source,
        })?;
    writer.flush().map_err(|source| DbcSaveError::Write {
        path: path.to_string(),
        source,
    })?;
    Ok(())
}

/// Serializes a [`DatabaseDBC`] into DBC text.
///
/// Layout: version header, the fixed `NS_` keyword list, empty `BS_:`, the
/// node list, one `BO_` block per message with its `SG_` lines, then the
/// comment, cycle-time attribute, and value-table sections. Extended messages
/// carry the canonical raw encoding (`actual + 0x80000000`) on their `BO_`,
/// `CM_`, `BA_` and `VAL_` lines.
pub fn to_dbc_string(db: &DatabaseDBC) -> Result<String, DbcSaveError> {
    let mut out: String = String::new();

    let version: String = escape_dbc_string(&db.version);
    write_fmt(&mut out, format_args!("VERSION \"{}\"\n\n", version))?;

    out.push_str("NS_ :\n");
    for keyword in NS_KEYWORDS {
        out.push('\t');
        out.push_str(keyword);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("BS_:\n\n");

    out.push_str("BU_:");
    for node in db.iter_nodes() {
        out.push(' ');
        out.push_str(&node.name);
    }
    out.push('\n');
    out.push('\n');

    write_value_tables(db, &mut out)?;
    write_messages(db, &mut out)?;
    write_comments(db, &mut out)?;
    write_cycle_times(db, &mut out)?;
    write_signal_value_tables(db, &mut out)?;

    Ok(out)
}

fn write_messages(db: &DatabaseDBC, out: &mut String) -> Result<(), DbcSaveError> {
    for message in db.iter_messages() {
        let transmitter: &str = message
            .sender_nodes
            .iter()
            .find_map(|nk| db.get_node_by_key(*nk).map(|node| node.name.as_str()))
            .unwrap_or("Vector__XXX");

        write_fmt(
            out,
            format_args!(
                "BO_ {} {}: {} {}\n",
                message.raw_id(),
                message.name,
                message.byte_length,
                transmitter
            ),
        )?;

        for signal in message.signals(db) {
            let endian: char = if matches!(signal.endian, Endianness::Intel) {
                '1'
            } else {
                '0'
            };
            let sign_char: char = match signal.sign {
                Signess::Signed => '-',
                Signess::Unsigned => '+',
            };
            let receivers: Vec<String> = signal
                .receiver_nodes
                .iter()
                .filter_map(|nk| db.get_node_by_key(*nk).map(|node| node.name.clone()))
                .collect();
            let receivers_field: String = if receivers.is_empty() {
                "Vector__XXX".to_string()
            } else {
                receivers.join(",")
            };

            write_fmt(
                out,
                format_args!(
                    " SG_ {} : {}|{}@{}{} ({},{}) [{}|{}] \"{}\"  {}\n",
                    signal.name,
                    signal.bit_start,
                    signal.bit_length,
                    endian,
                    sign_char,
                    format_f64(signal.factor),
                    format_f64(signal.offset),
                    format_f64(signal.min),
                    format_f64(signal.max),
                    escape_dbc_string(&signal.unit_of_measurement),
                    receivers_field
                ),
            )?;
        }

        out.push('\n');
    }

    Ok(())
}

fn write_comments(db: &DatabaseDBC, out: &mut String) -> Result<(), DbcSaveError> {
    for node in db.iter_nodes() {
        if node.comment.is_empty() {
            continue;
        }
        write_fmt(
            out,
            format_args!(
                "CM_ BU_ {} \"{}\";\n",
                node.name,
                escape_dbc_string(&node.comment)
            ),
        )?;
    }

    for message in db.iter_messages() {
        if message.comment.is_empty() {
            continue;
        }
        write_fmt(
            out,
            format_args!(
                "CM_ BO_ {} \"{}\";\n",
                message.raw_id(),
                escape_dbc_string(&message.comment)
            ),
        )?;
    }

    for message in db.iter_messages() {
        for signal in message.signals(db) {
            if signal.comment.is_empty() {
                continue;
            }
            write_fmt(
                out,
                format_args!(
                    "CM_ SG_ {} {} \"{}\";\n",
                    message.raw_id(),
                    signal.name,
                    escape_dbc_string(&signal.comment)
                ),
            )?;
        }
    }

    Ok(())
}

fn write_cycle_times(db: &DatabaseDBC, out: &mut String) -> Result<(), DbcSaveError> {
    for message in db.iter_messages() {
        if message.cycle_time == 0 {
            continue;
        }
        write_fmt(
            out,
            format_args!(
                "BA_ \"GenMsgCycleTime\" BO_ {} {};\n",
                message.raw_id(),
                message.cycle_time
            ),
        )?;
    }

    Ok(())
}

fn write_value_tables(db: &DatabaseDBC, out: &mut String) -> Result<(), DbcSaveError> {
    for (name, table) in &db.value_tables {
        write_fmt(out, format_args!("VAL_TABLE_ {}", name))?;
        for (value, description) in table {
            write_fmt(
                out,
                format_args!(" {} \"{}\"", value, escape_dbc_string(description)),
            )?;
        }
        out.push_str(" ;\n");
    }
    if !db.value_tables.is_empty() {
        out.push('\n');
    }

    Ok(())
}

fn write_signal_value_tables(db: &DatabaseDBC, out: &mut String) -> Result<(), DbcSaveError> {
    for message in db.iter_messages() {
        for signal in message.signals(db) {
            if signal.value_table.is_empty() {
                continue;
            }
            write_fmt(
                out,
                format_args!("VAL_ {} {}", message.raw_id(), signal.name),
            )?;
            for (value, description) in &signal.value_table {
                write_fmt(
                    out,
                    format_args!(" {} \"{}\"", value, escape_dbc_string(description)),
                )?;
            }
            out.push_str(" ;\n");
        }
    }

    Ok(())
}

fn format_f64(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let mut s: String = format!("{:.12}", value);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.push('0');
        }
        s
    }
}

fn escape_dbc_string(input: &str) -> String {
    let mut escaped: String = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn write_fmt(out: &mut String, args: fmt::Arguments<'_>) -> Result<(), DbcSaveError> {
    out.write_fmt(args).map_err(|_| DbcSaveError::Format)
}
