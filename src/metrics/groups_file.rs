//! Ground-truth group file parser.

use std::fs;
use std::path::Path;

use crate::agent::Group;
use crate::merge::merge_groups;
use crate::{Error, Result};

/// Parser for `groups.txt` ground-truth files.
///
/// Each non-blank line lists the integer ids of one group, separated by
/// whitespace:
/// ```text
/// 1 2
/// 3 4 5
/// ```
/// In the multi-scene layout a line holding only `-` closes the current
/// scene:
/// ```text
/// 1 2
/// -
/// 7 8 9
/// -
/// ```
pub struct GroupsFile;

impl GroupsFile {
    /// Parse a single-scene listing, merging groups that share an agent.
    pub fn parse_single(text: &str) -> Result<Vec<Group<i64>>> {
        let mut groups = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            groups.push(parse_group(number + 1, line)?);
        }
        Ok(merge_groups(groups))
    }

    /// Parse a multi-scene listing. Groups are returned as listed, without
    /// merging.
    ///
    /// A final scene with no closing `-` line is kept.
    pub fn parse_multi(text: &str) -> Result<Vec<Vec<Group<i64>>>> {
        let mut scenes = Vec::new();
        let mut current = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if line.trim_end() == "-" {
                scenes.push(std::mem::take(&mut current));
                continue;
            }
            current.push(parse_group(number + 1, line)?);
        }
        if !current.is_empty() {
            scenes.push(current);
        }
        Ok(scenes)
    }

    pub fn read_single<P: AsRef<Path>>(path: P) -> Result<Vec<Group<i64>>> {
        Self::parse_single(&read(path.as_ref())?)
    }

    pub fn read_multi<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<Group<i64>>>> {
        Self::parse_multi(&read(path.as_ref())?)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("failed to open groups file '{}': {}", path.display(), e),
        ))
    })
}

fn parse_group(line_number: usize, line: &str) -> Result<Group<i64>> {
    line.split_whitespace()
        .map(|token| {
            token.parse::<i64>().map_err(|_| Error::MalformedInput {
                line: line_number,
                content: line.to_string(),
            })
        })
        .collect()
}
