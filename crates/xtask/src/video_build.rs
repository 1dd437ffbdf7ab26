//! `build-video-system`: production build of the hero video scripts.
//!
//! Text-level passes over a fixed list of sources: debug code removal,
//! comment stripping and whitespace minification. Missing sources are
//! reported and skipped. The build directory is recreated on every run and
//! receives a `BUILD_SUMMARY.json` and a production config script.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::Serialize;

/// Sources in load order. The last one is the test harness.
pub const SOURCES: &[&str] = &[
    "js/professional-video-controller.js",
    "js/video-integration-manager.js",
    "js/video-system-bootstrap.js",
    "js/video-system-tests.js",
];

const BUNDLE_NAME: &str = "video-system.bundle.js";
const PROD_CONFIG_NAME: &str = "video-system-config.prod.js";
const SUMMARY_NAME: &str = "BUILD_SUMMARY.json";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    pub minify: bool,
    pub remove_comments: bool,
    pub remove_debug_code: bool,
    pub bundle_files: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            minify: true,
            remove_comments: true,
            remove_debug_code: true,
            bundle_files: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltFile {
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub build_time: String,
    pub version: &'static str,
    pub config: BuildOptions,
    pub files: Vec<BuiltFile>,
    pub total_size: u64,
    /// Sources from [`SOURCES`] that were not found
    pub missing: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductionConfig {
    auto_init: bool,
    debug: bool,
    fallback_mode: bool,
    max_retries: u32,
    enable_metrics: bool,
}

struct Passes {
    console_log: Regex,
    debug_block: Regex,
    debug_if: Regex,
    block_comment: Regex,
    line_comment: Regex,
    whitespace: Regex,
    punctuation: Regex,
}

impl Passes {
    fn new() -> Result<Self> {
        Ok(Self {
            console_log: Regex::new(r"\s*console\.log\([^)]*\);?\s*")?,
            debug_block: Regex::new(r"(?s)/\*\s*DEBUG\s*\*/.*?/\*\s*END DEBUG\s*\*/")?,
            debug_if: Regex::new(
                r"if\s*\(\s*(?:this\.debugMode|BOOTSTRAP_CONFIG\.debug)\s*\)\s*\{[^}]*\}",
            )?,
            block_comment: Regex::new(r"(?s)/\*.*?\*/")?,
            // `//` preceded by `:` is a URL scheme, not a comment.
            line_comment: Regex::new(r"(?m)(^|[^:/])//[^\r\n]*")?,
            whitespace: Regex::new(r"\s+")?,
            punctuation: Regex::new(r"\s*([{}();,])\s*")?,
        })
    }

    fn remove_debug_code(&self, content: &str) -> String {
        let content = self.console_log.replace_all(content, "");
        let content = self.debug_block.replace_all(&content, "");
        self.debug_if.replace_all(&content, "").into_owned()
    }

    fn remove_comments(&self, content: &str) -> String {
        let content = self.block_comment.replace_all(content, "");
        self.line_comment.replace_all(&content, "$1").into_owned()
    }

    fn minify(&self, content: &str) -> String {
        let content = self.whitespace.replace_all(content, " ");
        self.punctuation
            .replace_all(&content, "$1")
            .trim()
            .to_string()
    }
}

pub struct VideoSystemBuilder {
    source_dir: PathBuf,
    build_dir: PathBuf,
    options: BuildOptions,
}

impl VideoSystemBuilder {
    pub fn new(source_dir: PathBuf, build_dir: PathBuf, options: BuildOptions) -> Self {
        Self {
            source_dir,
            build_dir,
            options,
        }
    }

    pub fn build(&self) -> Result<BuildSummary> {
        println!("Starting video system build: {:?}", self.options);
        let passes = Passes::new().context("compiling build passes")?;

        if self.build_dir.exists() {
            fs::remove_dir_all(&self.build_dir)
                .with_context(|| format!("removing {}", self.build_dir.display()))?;
        }
        fs::create_dir_all(&self.build_dir)
            .with_context(|| format!("creating {}", self.build_dir.display()))?;

        let mut missing = Vec::new();
        let mut bundle = Vec::new();
        for relative in SOURCES {
            match self.process_file(&passes, relative)? {
                Some(content) => {
                    if !relative.ends_with("-tests.js") {
                        bundle.push(content);
                    }
                }
                None => missing.push(relative.to_string()),
            }
        }

        if self.options.bundle_files && !bundle.is_empty() {
            let separator = if self.options.minify { ";" } else { "\n\n" };
            write(&self.build_dir.join(BUNDLE_NAME), &bundle.join(separator))?;
            println!("Bundle written: {BUNDLE_NAME}");
        }

        self.write_production_config()?;
        self.write_summary(missing)
    }

    /// Returns `None` when the source does not exist.
    fn process_file(&self, passes: &Passes, relative: &str) -> Result<Option<String>> {
        let source = self.source_dir.join(relative);
        if !source.exists() {
            eprintln!("warning: file not found: {}", source.display());
            return Ok(None);
        }

        let original = fs::read_to_string(&source)
            .with_context(|| format!("reading {}", source.display()))?;
        let mut content = original.clone();
        if self.options.remove_debug_code {
            content = passes.remove_debug_code(&content);
        }
        if self.options.remove_comments {
            content = passes.remove_comments(&content);
        }
        if self.options.minify {
            content = passes.minify(&content);
        }

        write(&self.build_dir.join(relative), &content)?;

        let reduction = if original.is_empty() {
            0.0
        } else {
            (original.len() as f64 - content.len() as f64) / original.len() as f64 * 100.0
        };
        println!(
            "{relative}: {} -> {} bytes (-{reduction:.1}%)",
            original.len(),
            content.len()
        );
        Ok(Some(content))
    }

    fn write_production_config(&self) -> Result<()> {
        let config = ProductionConfig {
            auto_init: true,
            debug: false,
            fallback_mode: false,
            max_retries: 2,
            enable_metrics: false,
        };
        let body = format!(
            "// Auto-generated production configuration\nwindow.VIDEO_SYSTEM_CONFIG = {};",
            serde_json::to_string_pretty(&config)?
        );
        write(&self.build_dir.join(PROD_CONFIG_NAME), &body)
    }

    fn write_summary(&self, missing: Vec<String>) -> Result<BuildSummary> {
        let mut files = Vec::new();
        list_files(&self.build_dir, &self.build_dir, &mut files)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let summary = BuildSummary {
            build_time: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            config: self.options.clone(),
            total_size: files.iter().map(|f| f.size).sum(),
            files,
            missing,
        };
        write(
            &self.build_dir.join(SUMMARY_NAME),
            &serde_json::to_string_pretty(&summary)?,
        )?;
        println!("Build summary written: {} bytes total", summary.total_size);
        Ok(summary)
    }
}

fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

fn list_files(root: &Path, dir: &Path, out: &mut Vec<BuiltFile>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let meta = entry.metadata()?;
        if meta.is_dir() {
            list_files(root, &path, out)?;
        } else {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            out.push(BuiltFile {
                path: relative.to_string_lossy().replace('\\', "/"),
                size: meta.len(),
            });
        }
    }
    Ok(())
}
