//! Read path length histograms.
//!
//! A file has one `length occurrences` pair per line, whitespace separated.
//! A length given twice keeps the last count.

use anyhow::anyhow;

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// path length -> number of occurrences, ordered by length
pub type LengthOccurrences = BTreeMap<u32, u64>;

/// parse lines of `length occurrences` pairs. Blank lines are skipped.
pub fn parse_length_occurrences<R: Read>(reader: R) -> anyhow::Result<LengthOccurrences> {
    let mut occurrences = LengthOccurrences::new();
    let bufreader = BufReader::new(reader);
    for (num, line) in bufreader.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let length = match fields.next() {
            Some(field) => field,
            None => continue,
        };
        let count = fields
            .next()
            .ok_or_else(|| anyhow!("line {} : expecting 2 fields, got {:?}", num + 1, line))?;
        let length = length
            .parse::<u32>()
            .map_err(|_| anyhow!("line {} : cannot decode length {:?}", num + 1, length))?;
        let count = count
            .parse::<u64>()
            .map_err(|_| anyhow!("line {} : cannot decode occurrences {:?}", num + 1, count))?;
        if occurrences.insert(length, count).is_some() {
            log::debug!("line {} : length {} given twice, keeping last count {}", num + 1, length, count);
        }
    }
    Ok(occurrences)
} // end of parse_length_occurrences

/// read a length histogram file
pub fn read_length_file(filepath: &Path) -> anyhow::Result<LengthOccurrences> {
    log::info!("reading length file : {:?}", filepath);
    let fileres = OpenOptions::new().read(true).open(filepath);
    if fileres.is_err() {
        log::error!("read_length_file could not open file {:?}", filepath.as_os_str());
        return Err(anyhow!("read_length_file could not open file {}", filepath.display()));
    }
    let occurrences = parse_length_occurrences(fileres?)
        .map_err(|e| anyhow!("file {} : {}", filepath.display(), e))?;
    log::debug!("file {:?} : {} lengths", filepath, occurrences.len());
    Ok(occurrences)
} // end of read_length_file

//==================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn last_duplicate_wins_and_sorted() {
        log_init_test();
        let text = "384 2\n128 0\n256 5\n\n256 7\n";
        let occurrences = parse_length_occurrences(text.as_bytes()).unwrap();
        let pairs: Vec<(u32, u64)> = occurrences.into_iter().collect();
        assert_eq!(pairs, vec![(128, 0), (256, 7), (384, 2)]);
    }

    #[test]
    fn malformed_lines() {
        log_init_test();
        assert!(parse_length_occurrences("128\n".as_bytes()).is_err());
        assert!(parse_length_occurrences("x 3\n".as_bytes()).is_err());
        assert!(parse_length_occurrences("3 -1\n".as_bytes()).is_err());
    }

    #[test]
    fn read_file() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Caterpillar128nodes.txt");
        std::fs::write(&path, "128 0\n256 5\n384 0\n").unwrap();
        let occurrences = read_length_file(&path).unwrap();
        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences.get(&256), Some(&5));
        assert!(read_length_file(&dir.path().join("missing.txt")).is_err());
    }
} // end of mod tests
