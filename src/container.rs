//! Static checks over the Dockerfile that packages the bot: the command the
//! container runs must only reference files that were copied into the final
//! stage, and Rust dependencies must be installed from the lock file.

use crate::utils::error::{MokhberError, Result};
use std::fmt;
use std::path::Path;

/// Directories the base image provides; paths under them are not expected to be staged.
const SYSTEM_PREFIXES: [&str; 8] = [
    "/bin/", "/sbin/", "/usr/bin/", "/usr/sbin/", "/lib/", "/etc/", "/dev/", "/proc/",
];

/// Interpreters whose `-c` argument is a script to split into words.
const SHELLS: [&str; 6] = ["sh", "bash", "/bin/sh", "/bin/bash", "/usr/bin/sh", "/usr/bin/bash"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    NoBaseImage,
    NoCommand,
    MissingFile { path: String },
    MissingSource { path: String },
    UnlockedInstall { line: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NoBaseImage => write!(f, "no FROM instruction: the image has no base"),
            Finding::NoCommand => write!(f, "neither ENTRYPOINT nor CMD is set"),
            Finding::MissingFile { path } => {
                write!(f, "command references '{}' but it is never copied into the image", path)
            }
            Finding::MissingSource { path } => {
                write!(f, "COPY/ADD source '{}' is not in the build context", path)
            }
            Finding::UnlockedInstall { line } => {
                write!(f, "dependency install without --locked: {}", line)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Stage {
    name: Option<String>,
    workdir: String,
    /// Absolute destinations of COPY/ADD; each may be a file or a directory.
    staged: Vec<String>,
    entrypoint: Vec<String>,
    cmd: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ImagePlan {
    stages: Vec<Stage>,
    run_lines: Vec<String>,
    /// Sources copied from the build context, i.e. COPY/ADD without `--from`.
    context_sources: Vec<String>,
}

/// Joins `path` onto `base` unless it is absolute; `.` and `..` are folded.
fn absolutize(base: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Exec form (`["a", "b"]`) when it parses as a JSON string array, shell form otherwise.
fn parse_command(args: &str) -> Vec<String> {
    let trimmed = args.trim();
    if trimmed.starts_with('[') {
        if let Ok(argv) = serde_json::from_str::<Vec<String>>(trimmed) {
            return argv;
        }
    }
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec!["/bin/sh".to_string(), "-c".to_string(), trimmed.to_string()]
}

fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.starts_with('#') {
            continue;
        }
        match line.strip_suffix('\\') {
            Some(head) => {
                current.push_str(head.trim_end());
                current.push(' ');
            }
            None => {
                current.push_str(line);
                if !current.trim().is_empty() {
                    lines.push(current.trim().to_string());
                }
                current.clear();
            }
        }
    }
    if !current.trim().is_empty() {
        lines.push(current.trim().to_string());
    }
    lines
}

impl ImagePlan {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path).map_err(|e| {
            MokhberError::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.as_ref().display(), e),
            ))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut plan = ImagePlan::default();

        for line in logical_lines(text) {
            let (instruction, args) = match line.split_once(char::is_whitespace) {
                Some((i, a)) => (i.to_ascii_uppercase(), a.trim().to_string()),
                None => (line.to_ascii_uppercase(), String::new()),
            };

            match instruction.as_str() {
                "FROM" => {
                    let words: Vec<&str> = args
                        .split_whitespace()
                        .filter(|w| !w.starts_with("--"))
                        .collect();
                    if words.is_empty() {
                        return Err(MokhberError::ImageManifestError {
                            message: format!("FROM without an image: '{}'", line),
                        });
                    }
                    let name = match words.as_slice() {
                        [_, as_kw, name, ..] if as_kw.eq_ignore_ascii_case("as") => {
                            Some(name.to_string())
                        }
                        _ => None,
                    };
                    // `FROM <stage>` starts from everything that stage already holds.
                    let parent = plan
                        .stages
                        .iter()
                        .rev()
                        .find(|s| {
                            s.name
                                .as_deref()
                                .is_some_and(|n| n.eq_ignore_ascii_case(words[0]))
                        })
                        .cloned();
                    let mut stage = parent.unwrap_or_else(|| Stage {
                        workdir: "/".to_string(),
                        ..Stage::default()
                    });
                    stage.name = name;
                    plan.stages.push(stage);
                }
                "WORKDIR" => {
                    let stage = plan.current_stage(&line)?;
                    stage.workdir = absolutize(&stage.workdir, &args);
                }
                "COPY" | "ADD" => {
                    let stage = plan.current_stage(&line)?;
                    let sources = stage_copy(stage, &args, &line)?;
                    plan.context_sources.extend(sources);
                }
                "RUN" => {
                    plan.current_stage(&line)?;
                    plan.run_lines.push(args);
                }
                "CMD" => {
                    plan.current_stage(&line)?.cmd = parse_command(&args);
                }
                "ENTRYPOINT" => {
                    plan.current_stage(&line)?.entrypoint = parse_command(&args);
                }
                _ => {}
            }
        }

        Ok(plan)
    }

    /// Instructions before the first FROM only make sense for ARG; others are ignored there.
    fn current_stage(&mut self, line: &str) -> Result<&mut Stage> {
        self.stages
            .last_mut()
            .ok_or_else(|| MokhberError::ImageManifestError {
                message: format!("instruction before FROM: '{}'", line),
            })
    }

    /// The argv the container starts with: entrypoint followed by cmd.
    pub fn command(&self) -> Vec<String> {
        match self.stages.last() {
            Some(stage) => stage
                .entrypoint
                .iter()
                .chain(stage.cmd.iter())
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    fn is_staged(stage: &Stage, absolute: &str) -> bool {
        stage.staged.iter().any(|dest| {
            absolute == dest
                || dest == "/"
                || absolute
                    .strip_prefix(dest.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn verify(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        let Some(last) = self.stages.last() else {
            findings.push(Finding::NoBaseImage);
            return findings;
        };

        for line in &self.run_lines {
            for step in line.split("&&").flat_map(|part| part.split(';')) {
                let step = step.trim();
                let installs = step.contains("cargo build") || step.contains("cargo install");
                if installs && !step.contains("--locked") {
                    findings.push(Finding::UnlockedInstall {
                        line: step.to_string(),
                    });
                }
            }
        }

        let command = self.command();
        if command.is_empty() {
            findings.push(Finding::NoCommand);
            return findings;
        }

        let words = command_words(&command);
        for (i, word) in words.iter().enumerate() {
            // `python -m pkg.module` names a module, not a file.
            if i > 0 && words[i - 1] == "-m" {
                continue;
            }
            let Some(path) = file_reference(word) else {
                continue;
            };
            let absolute = absolutize(&last.workdir, &path);
            if SYSTEM_PREFIXES.iter().any(|p| absolute.starts_with(p)) {
                continue;
            }
            if !Self::is_staged(last, &absolute) {
                findings.push(Finding::MissingFile { path });
            }
        }

        findings
    }

    /// Checks that every COPY/ADD source taken from the build context exists
    /// under `context`. Wildcards and remote sources are not checked.
    pub fn verify_context(&self, context: &Path) -> Vec<Finding> {
        self.context_sources
            .iter()
            .filter(|source| !source.contains("://") && !source.contains(['*', '?', '[']))
            .filter(|source| !context.join(source.trim_start_matches('/')).exists())
            .map(|source| Finding::MissingSource {
                path: source.clone(),
            })
            .collect()
    }
}

/// Records the destinations of a COPY/ADD in `stage` and returns the sources
/// that come from the build context.
fn stage_copy(stage: &mut Stage, args: &str, line: &str) -> Result<Vec<String>> {
    let trimmed = args.trim();
    let mut words: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<String>>(trimmed)
            .unwrap_or_else(|_| trimmed.split_whitespace().map(str::to_string).collect())
    } else {
        trimmed
            .split_whitespace()
            .filter(|w| !w.starts_with("--"))
            .map(str::to_string)
            .collect()
    };
    if trimmed.starts_with("--") {
        // Flags precede the JSON form too, e.g. `COPY --chown=app ["a", "/b"]`.
        let rest: Vec<&str> = trimmed.split_whitespace().skip_while(|w| w.starts_with("--")).collect();
        let rest = rest.join(" ");
        if rest.starts_with('[') {
            if let Ok(json) = serde_json::from_str::<Vec<String>>(&rest) {
                words = json;
            }
        }
    }

    if words.len() < 2 {
        return Err(MokhberError::ImageManifestError {
            message: format!("COPY/ADD needs a source and a destination: '{}'", line),
        });
    }
    let Some(dest) = words.pop() else {
        return Ok(Vec::new());
    };

    let dest_is_dir = dest.ends_with('/') || dest == "." || words.len() > 1;
    let dest_abs = absolutize(&stage.workdir, &dest);
    for source in &words {
        let copies_contents = source == "." || source.ends_with('/');
        if dest_is_dir && !copies_contents {
            let base = source.trim_end_matches('/').rsplit('/').next().unwrap_or(source);
            stage.staged.push(absolutize(&dest_abs, base));
        } else {
            stage.staged.push(dest_abs.clone());
        }
    }

    let from_stage = trimmed
        .split_whitespace()
        .take_while(|w| w.starts_with("--"))
        .any(|w| w.starts_with("--from="));
    Ok(if from_stage { Vec::new() } else { words })
}

/// Words to check; a shell-form command is split into its words.
fn command_words(argv: &[String]) -> Vec<String> {
    match argv {
        [sh, flag, script, ..] if SHELLS.contains(&sh.as_str()) && flag == "-c" => {
            script.split_whitespace().map(str::to_string).collect()
        }
        _ => argv.to_vec(),
    }
}

/// The path a command word refers to, if it looks like a file.
fn file_reference(word: &str) -> Option<String> {
    let candidate = if word.starts_with('-') {
        word.split_once('=').map(|(_, value)| value)?
    } else {
        word
    };
    let candidate = candidate.trim_matches(|c| c == '"' || c == '\'');
    if candidate.is_empty() || candidate.contains("://") || candidate.contains('$') {
        return None;
    }

    let is_path = candidate.contains('/');
    let has_extension = candidate
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphabetic())
        });

    if is_path || has_extension {
        Some(candidate.to_string())
    } else {
        None
    }
}
