use std::path::{Path, PathBuf};
use std::process::Command;

const MAX_LINES: usize = 750;

const CHECKED_EXTENSIONS: &[&str] = &["rs", "yaml", "toml"];

const EXCLUDED_DIRS: &[&str] = &["target", ".git", "examples"];

const EXCLUDED_FILES: &[&str] = &["Cargo.lock"];

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/main");

    let sha = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=ONE01_GIT_SHA={}", sha);

    let root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let files = collect_files_to_check(&root);
    for file in &files {
        println!("cargo:rerun-if-changed={}", file.display());
    }
    let sources: Vec<Source> = files
        .iter()
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some("rs")
                && p.file_name().and_then(|n| n.to_str()) != Some("build.rs")
        })
        .filter_map(|p| Source::read(p, &root))
        .collect();

    enforce_line_limits(&files, &root);
    enforce_no_dead_code_allows(&sources);
    enforce_no_test_skips(&sources);
    enforce_no_nested_runtimes(&sources);
    enforce_serial_for_env_mutations(&sources);
}

struct Source {
    rel_path: PathBuf,
    content: String,
}

impl Source {
    fn read(path: &Path, root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Some(Self {
            rel_path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
            content,
        })
    }
}

/// A `#[test]` function and the numbered lines of its body.
struct TestFn<'a> {
    line: usize,
    name: String,
    serial: bool,
    body: Vec<(usize, &'a str)>,
}

fn test_functions(content: &str) -> Vec<TestFn<'_>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut tests = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed != "#[test]" && !trimmed.starts_with("#[tokio::test") {
            i += 1;
            continue;
        }
        let attr_line = i + 1;
        let mut serial = i > 0 && is_serial_attr(lines[i - 1].trim());
        let mut j = i + 1;
        while j < lines.len() && !lines[j].contains("fn ") {
            serial |= is_serial_attr(lines[j].trim());
            j += 1;
        }
        if j >= lines.len() {
            break;
        }
        let name = lines[j]
            .split("fn ")
            .nth(1)
            .and_then(|rest| rest.split('(').next())
            .unwrap_or("")
            .trim()
            .to_string();

        let mut depth: i32 = 0;
        let mut opened = false;
        let mut body = Vec::new();
        let mut k = j;
        while k < lines.len() {
            for c in lines[k].chars() {
                match c {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            body.push((k + 1, lines[k]));
            if opened && depth <= 0 {
                break;
            }
            k += 1;
        }
        tests.push(TestFn {
            line: attr_line,
            name,
            serial,
            body,
        });
        i = k + 1;
    }
    tests
}

fn is_serial_attr(line: &str) -> bool {
    line == "#[serial]" || line == "#[serial_test::serial]"
}

fn report(title: &str, violations: &[(PathBuf, usize, String)], advice: &[&str]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n========================================");
    eprintln!("{}", title);
    eprintln!("========================================");
    for (path, line, message) in violations {
        eprintln!("  {}:{}", path.display(), line);
        eprintln!("    {}", message);
    }
    eprintln!("========================================");
    for line in advice {
        eprintln!("{}", line);
    }
    eprintln!();
    panic!("Build failed: {} ({} occurrence(s))", title, violations.len());
}

fn enforce_line_limits(files: &[PathBuf], root: &Path) {
    let mut violations = Vec::new();
    for file in files {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                let count = content.lines().filter(|l| !l.trim().is_empty()).count();
                if count > MAX_LINES {
                    let rel_path = file.strip_prefix(root).unwrap_or(file).to_path_buf();
                    violations.push((rel_path, count, format!("exceeds by {}", count - MAX_LINES)));
                }
            }
            Err(e) => println!("cargo:warning=Could not read file {}: {}", file.display(), e),
        }
    }
    report(
        &format!("FILE LINE LIMIT EXCEEDED (max {} lines)", MAX_LINES),
        &violations,
        &["Please split these files into smaller modules."],
    );
}

fn enforce_no_dead_code_allows(sources: &[Source]) {
    let mut violations = Vec::new();
    for source in sources {
        for (n, line) in source.content.lines().enumerate() {
            let trimmed = line.trim();
            if (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                && trimmed.contains("dead_code")
            {
                violations.push((source.rel_path.clone(), n + 1, trimmed.to_string()));
            }
        }
    }
    report(
        "#[allow(dead_code)] IS NOT ALLOWED",
        &violations,
        &[
            "Delete unused code, or gate test-only code behind #[cfg(test)].",
        ],
    );
}

/// Bans tests that return early instead of failing.
fn enforce_no_test_skips(sources: &[Source]) {
    let skip_patterns = ["Skipping test", "skipping test", "Test skipped", "test skipped"];
    let mut violations = Vec::new();
    for source in sources {
        for test in test_functions(&source.content) {
            let mut depth: i32 = 0;
            let mut skips = false;
            for (_, line) in &test.body {
                // A bare return nested in a block is a conditional early exit.
                if skip_patterns.iter().any(|p| line.contains(p))
                    || (line.trim() == "return;" && depth > 1)
                {
                    skips = true;
                    break;
                }
                depth += line.matches('{').count() as i32 - line.matches('}').count() as i32;
            }
            if skips {
                violations.push((
                    source.rel_path.clone(),
                    test.line,
                    format!("test `{}` silently skips", test.name),
                ));
            }
        }
    }
    report(
        "SILENT TEST SKIPS ARE NOT ALLOWED",
        &violations,
        &["Tests must FAIL if they cannot run. Assert preconditions instead."],
    );
}

/// Bans spawning threads that create their own tokio runtime.
fn enforce_no_nested_runtimes(sources: &[Source]) {
    let mut violations = Vec::new();
    for source in sources {
        let lines: Vec<&str> = source.content.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") || !trimmed.contains("thread::spawn") {
                continue;
            }
            let end = (i + 20).min(lines.len());
            let window = lines.get(i..end).unwrap_or_default().join("\n");
            if window.contains("Runtime::new()") || window.contains("runtime::Builder") {
                violations.push((source.rel_path.clone(), i + 1, trimmed.to_string()));
            }
        }
    }
    report(
        "NESTED TOKIO RUNTIMES ARE NOT ALLOWED",
        &violations,
        &["Make the function async and call it from the main runtime."],
    );
}

/// Requires #[serial] for tests that mutate environment variables.
fn enforce_serial_for_env_mutations(sources: &[Source]) {
    let mut violations = Vec::new();
    for source in sources {
        for test in test_functions(&source.content) {
            let mutates = test.body.iter().any(|(_, line)| {
                let trimmed = line.trim();
                !trimmed.starts_with("//")
                    && (trimmed.contains("env::set_var") || trimmed.contains("env::remove_var"))
            });
            if mutates && !test.serial {
                violations.push((
                    source.rel_path.clone(),
                    test.line,
                    format!("test `{}` mutates env without #[serial]", test.name),
                ));
            }
        }
    }
    report(
        "ENV MUTATIONS REQUIRE #[serial]",
        &violations,
        &["Add `#[serial]` from serial_test to every env-mutating test."],
    );
}

fn collect_files_to_check(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk_directory(root, root, &mut files);
    files
}

fn walk_directory(dir: &Path, root: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let excluded = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| EXCLUDED_DIRS.contains(&n));
            if !excluded {
                walk_directory(&path, root, files);
            }
        } else if should_check_file(&path, root) {
            files.push(path);
        }
    }
}

fn should_check_file(path: &Path, root: &Path) -> bool {
    let checked = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CHECKED_EXTENSIONS.contains(&ext));
    if !checked {
        return false;
    }
    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    !EXCLUDED_FILES.contains(&rel.as_ref())
}
