//! Interactive dataset picker.
//!
//! Used when no `--data` path was given and the default dataset is missing:
//! lists `*.csv` files under the working directory and lets the user choose
//! one by number or type a path.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

const SEARCH_DEPTH: usize = 4;

/// Prompt on stdin/stdout for a loan CSV.
pub fn prompt_for_dataset() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::input(
            "No .csv files found. Pass a dataset with `loandash --data <file.csv>` or create one with `loandash sample`.",
        ));
    }

    println!("No dataset configured. Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, display_path(path));
    }

    loop {
        print!("Select a dataset (1-{}), type a path, or q to quit: ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::input(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::input("No dataset selected."));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::input("Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            match files.get(choice.wrapping_sub(1)) {
                Some(path) => return validate_csv_path(path),
                None => {
                    println!("Invalid choice: {choice}.");
                    continue;
                }
            }
        }

        match validate_csv_path(Path::new(input)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// The path must be an existing file with a `.csv` extension.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::input(format!("Dataset not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::input(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::input(format!("Expected a .csv file, got: {}", path.display())));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root`, sorted by displayed path.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, &mut out);
    out.sort_by_key(|p| display_path(p));
    out
}

fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !skip_dir(&path) {
                walk(&path, depth + 1, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
