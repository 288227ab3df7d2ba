//! Markdown stubs for commands declared in source files.
//!
//! Each file in the input directory with the right extension is searched for
//! the registration pattern; the first match yields a command name and a help
//! string, written to `{output}/{name}.md` as `_{help}_`.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDoc {
    pub name: String,
    pub help: String,
}

impl CommandDoc {
    pub fn to_markdown(&self) -> String {
        format!("_{}_\n", self.help)
    }
}

pub struct DocGenerator {
    pattern: Regex,
    extension: String,
}

impl DocGenerator {
    /// `pattern` must capture the name and help text, either as named groups
    /// `name`/`help` or as the first two groups.
    pub fn new(pattern: &str, extension: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid extraction pattern: {}", pattern))?;

        let named = pattern.capture_names().flatten().any(|n| n == "name");
        if !named && pattern.captures_len() < 3 {
            return Err(anyhow!(
                "Extraction pattern needs two capture groups (name, help)"
            ));
        }

        Ok(Self {
            pattern,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }

    /// First registration found in `source`, if any.
    pub fn extract(&self, source: &str) -> Option<CommandDoc> {
        let caps = self.pattern.captures(source)?;
        let name = caps.name("name").or_else(|| caps.get(1))?.as_str();
        let help = caps.name("help").or_else(|| caps.get(2))?.as_str();

        if name.is_empty() {
            return None;
        }
        Some(CommandDoc {
            name: name.to_string(),
            help: help.to_string(),
        })
    }

    /// Scan `input_dir` (top level only) and write one Markdown file per command.
    pub fn generate(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<(CommandDoc, PathBuf)>> {
        if !input_dir.is_dir() {
            return Err(anyhow!(
                "Input directory {} does not exist",
                input_dir.display()
            ));
        }

        let mut generated = Vec::new();
        let walker = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !self.has_extension(path) {
                continue;
            }

            let contents = match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };

            let Some(doc) = self.extract(&contents) else {
                tracing::debug!("No command registration in {}", path.display());
                continue;
            };

            fs::create_dir_all(output_dir)
                .with_context(|| format!("Could not create {}", output_dir.display()))?;
            let doc_path = output_dir.join(format!("{}.md", doc.name));
            fs::write(&doc_path, doc.to_markdown())
                .with_context(|| format!("Could not write {}", doc_path.display()))?;

            tracing::info!("Documented {} from {}", doc.name, path.display());
            generated.push((doc, doc_path));
        }

        Ok(generated)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }
}
