//! # StackRS INI File Editing (`common::ini`)
//!
//! File: cli/src/common/ini.rs
//!
//! ## Overview
//!
//! Line-based editing of service configuration files (`nova.conf`,
//! `api-paste.ini`, ...). Edits touch only the matched line so comments,
//! ordering and spacing in the rest of the file survive.
//!
//! A section runs from its `[name]` header to the next header. An option line
//! starts at column 0 with the option name, optional blanks and `=`.
//!
//! - `ini_get`: value of the first matching option in the section
//! - `ini_set`: replace the value, append the option to the section, or append
//!   a new section holding it
//! - `ini_comment` / `ini_uncomment`: toggle a leading `#`
//!
use crate::core::error::{Result, StackError};
use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// Byte offset just past `option[ \t]*=[ \t]*`, if `line` sets `option`.
fn value_offset(line: &str, option: &str) -> Option<usize> {
    let rest = line.strip_prefix(option)?;
    let after_name = rest.trim_start_matches([' ', '\t']);
    let after_eq = after_name.strip_prefix('=')?;
    let value = after_eq.trim_start_matches([' ', '\t']);
    Some(line.len() - value.len())
}

fn is_header(line: &str) -> bool {
    let line = line.trim_end();
    line.starts_with('[') && line.ends_with(']')
}

/// Line range of the section body (header excluded).
fn section_body(lines: &[String], section: &str) -> Option<Range<usize>> {
    let header = format!("[{}]", section);
    let start = lines.iter().position(|l| l.trim_end() == header)? + 1;
    let end = lines[start..]
        .iter()
        .position(|l| is_header(l))
        .map_or(lines.len(), |offset| start + offset);
    Some(start..end)
}

fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

fn check_names(section: &str, option: &str) -> Result<()> {
    if section.trim().is_empty() || option.trim().is_empty() {
        return Err(StackError::Ini("section and option names must not be empty".to_string()).into());
    }
    Ok(())
}

/// Value of `option` in `section`, if set.
pub fn get_in(content: &str, section: &str, option: &str) -> Option<String> {
    let lines = split_lines(content);
    let body = section_body(&lines, section)?;
    lines[body].iter().find_map(|line| {
        value_offset(line, option).map(|offset| line[offset..].trim_end().to_string())
    })
}

/// Returns `content` with `option = value` set in `section`.
pub fn set_in(content: &str, section: &str, option: &str, value: &str) -> String {
    let mut lines = split_lines(content);
    match section_body(&lines, section) {
        None => {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("[{}]", section));
            lines.push(format!("{} = {}", option, value));
        }
        Some(body) => {
            let existing = body
                .clone()
                .find_map(|i| value_offset(&lines[i], option).map(|offset| (i, offset)));
            match existing {
                Some((i, offset)) => {
                    let prefix = lines[i][..offset].to_string();
                    lines[i] = format!("{}{}", prefix, value);
                }
                None => {
                    let mut insert_at = body.end;
                    while insert_at > body.start && lines[insert_at - 1].trim().is_empty() {
                        insert_at -= 1;
                    }
                    lines.insert(insert_at, format!("{} = {}", option, value));
                }
            }
        }
    }
    join_lines(&lines)
}

/// Returns `content` with every `option` line in `section` commented out.
pub fn comment_in(content: &str, section: &str, option: &str) -> String {
    let mut lines = split_lines(content);
    if let Some(body) = section_body(&lines, section) {
        for line in &mut lines[body] {
            if value_offset(line, option).is_some() {
                line.insert(0, '#');
            }
        }
    }
    join_lines(&lines)
}

/// Returns `content` with commented-out `option` lines in `section` restored.
pub fn uncomment_in(content: &str, section: &str, option: &str) -> String {
    let mut lines = split_lines(content);
    if let Some(body) = section_body(&lines, section) {
        for line in &mut lines[body] {
            let trimmed = line.trim_start_matches([' ', '\t']);
            if !trimmed.starts_with('#') {
                continue;
            }
            let stripped = trimmed.trim_start_matches(['#', ' ', '\t']);
            if value_offset(stripped, option).is_some() {
                *line = stripped.to_string();
            }
        }
    }
    join_lines(&lines)
}

fn read_or_empty(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn rewrite(path: &Path, edit: impl FnOnce(&str) -> String) -> Result<()> {
    let content = read_or_empty(path)?;
    let updated = edit(&content);
    if updated != content {
        fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Updated {}", path.display());
    }
    Ok(())
}

/// Reads an option from an INI file. A missing file has no options.
pub fn ini_get(path: &Path, section: &str, option: &str) -> Result<Option<String>> {
    check_names(section, option)?;
    Ok(get_in(&read_or_empty(path)?, section, option))
}

/// Sets an option in an INI file, creating the file or section as needed.
pub fn ini_set(path: &Path, section: &str, option: &str, value: &str) -> Result<()> {
    check_names(section, option)?;
    rewrite(path, |content| set_in(content, section, option, value))
}

pub fn ini_comment(path: &Path, section: &str, option: &str) -> Result<()> {
    check_names(section, option)?;
    rewrite(path, |content| comment_in(content, section, option))
}

pub fn ini_uncomment(path: &Path, section: &str, option: &str) -> Result<()> {
    check_names(section, option)?;
    rewrite(path, |content| uncomment_in(content, section, option))
}
