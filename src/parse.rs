//! Recover structured data from the Tympan's free-form text replies
//!
//! Every function here is a pure, single pass over its input.

use log::{debug, trace};

use crate::commands::{CalibrationRow, CalibrationTable};
use crate::{Error, Result};

/// Text that precedes the comma-separated values of one calibration measurement
///
/// e.g. `Measurement: (step, Tone Hz, Left dBFS, Right dBFS): 3, 1000.00, -20.1, -20.3`
pub const CALIBRATION_MARKER: &str = "dBFS):";

/// Text that precedes the file names in the reply to a listing request
pub const LISTING_MARKER: &str = "Listing Files on SD:";

/// Collect one row per line carrying [CALIBRATION_MARKER], in the order they appear
///
/// Column 0 is the test id, column 1 the frequency in Hz and every further column the level of
/// one channel. A line whose payload does not decode fails the whole call rather than being
/// skipped, and so does a reply without any such line.
pub fn parse_calibration(reply: &str) -> Result<CalibrationTable> {
    let mut rows: Vec<CalibrationRow> = Vec::new();

    for line in reply.lines() {
        let Some(idx) = line.find(CALIBRATION_MARKER) else {
            continue;
        };
        let payload = &line[idx + CALIBRATION_MARKER.len()..];
        trace!("parse_calibration: payload {:?}", payload);

        let values = parse_floats(payload).map_err(|reason| Error::decode(line, reason))?;
        let row = match values.as_slice() {
            [id, freq_hz, levels @ ..] => CalibrationRow {
                test_id: to_test_id(*id).map_err(|reason| Error::decode(line, reason))?,
                freq_hz: *freq_hz,
                levels_dbfs: levels.to_vec(),
            },
            _ => {
                return Err(Error::decode(
                    line,
                    format!("expected a test id and a frequency, got {} values", values.len()),
                ))
            }
        };

        if let Some(first) = rows.first() {
            if first.levels_dbfs.len() != row.levels_dbfs.len() {
                return Err(Error::decode(
                    line,
                    format!(
                        "{} channels where earlier rows have {}",
                        row.levels_dbfs.len(),
                        first.levels_dbfs.len()
                    ),
                ));
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(Error::EmptyResult("calibration measurements"));
    }
    debug!("parse_calibration: decoded {} rows", rows.len());
    Ok(CalibrationTable::new(rows))
}

fn parse_floats(payload: &str) -> std::result::Result<Vec<f64>, String> {
    payload
        .split(',')
        .map(|s| {
            let s = s.trim();
            s.parse::<f64>()
                .map_err(|e| format!("`{}` is not a number ({})", s, e))
        })
        .collect()
}

fn to_test_id(value: f64) -> std::result::Result<u32, String> {
    if value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(format!("test id {} is not a non-negative integer", value))
    }
}

/// Split a listing into file names, dropping empty entries
pub fn parse_filenames(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_owned())
        .collect()
}

/// Find the listing line in `reply` and split out the file names after [LISTING_MARKER]
pub fn parse_listing(reply: &str, delimiter: char) -> Result<Vec<String>> {
    let listing = reply
        .lines()
        .find_map(|l| {
            l.find(LISTING_MARKER)
                .map(|idx| &l[idx + LISTING_MARKER.len()..])
        })
        .ok_or(Error::EmptyResult("file listing"))?;

    let names = parse_filenames(listing, delimiter);
    if names.is_empty() {
        return Err(Error::EmptyResult("file names"));
    }
    debug!("parse_listing: found {:?}", names);
    Ok(names)
}

/// Keep the names whose extension is one of `types`, in their original order
///
/// `types` are given without the dot; the comparison ignores ASCII case.
pub fn keep_filenames_of_type<S: AsRef<str>>(names: &[String], types: &[S]) -> Vec<String> {
    names
        .iter()
        .filter(|name| {
            name.rsplit_once('.').is_some_and(|(_, ext)| {
                types.iter().any(|t| t.as_ref().eq_ignore_ascii_case(ext))
            })
        })
        .cloned()
        .collect()
}

/// Read the size the device announces before sending a file
///
/// The size is the number after the last `:` or `=` of the line.
pub fn parse_file_size(line: &str) -> Result<u64> {
    let text = line.trim();
    let value = text
        .rsplit_once([':', '='])
        .map_or(text, |(_, v)| v)
        .trim();
    value
        .parse()
        .map_err(|e| Error::decode(line, format!("`{}` is not a file size ({})", value, e)))
}
