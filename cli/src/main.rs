use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use clap::{ArgAction, Parser};
use console::style;
use fitz_core::{
    Config, Decoration, DifficultWordMap, MemoryDocument, MemoryEditor, Outcome, Panel,
    PanelHost, PanelMessage, PanelOptions, Position, Selection, Session, StatField, Stats,
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const DEFAULT_INCLUDE: &[&str] = &["**/*.md", "**/*.markdown", "**/*.txt", "**/*.rst"];

/// Fitzgerald CLI entry point.
#[derive(Debug, Parser)]
#[command(name = "fitz", about = "Report readability stats and difficult words in prose.")]
struct Args {
    /// Path to config file (YAML). Defaults to fitz.yml if present.
    #[arg(long, default_value = fitz_core::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Emit JSON output for automation.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Only print the summary line.
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Syllable threshold for highlighted words (overrides config).
    #[arg(long, value_name = "N")]
    threshold: Option<usize>,

    /// Analyze only this range (1-based LINE:COL-LINE:COL). Repeatable; ranges are joined.
    #[arg(long = "select", value_name = "RANGE")]
    selections: Vec<String>,

    /// Exit non-zero when any file's consensus grade is above this level.
    #[arg(long, value_name = "GRADE")]
    max_grade: Option<f64>,

    /// Glob patterns of files to analyze inside directories.
    #[arg(long, value_delimiter = ',', value_name = "GLOB[,GLOB]")]
    include: Vec<String>,

    /// Glob patterns to skip.
    #[arg(long, value_delimiter = ',', value_name = "GLOB[,GLOB]")]
    ignore: Vec<String>,

    /// Set config overrides (repeatable as key=value). Example: --set thresholds.candidate=3
    #[arg(long = "set", value_name = "KEY=VALUE", num_args = 0..)]
    sets: Vec<String>,

    /// Files or directories to analyze.
    #[arg(value_name = "PATH", default_value = ".", num_args = 0..)]
    paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FileResult {
    path: String,
    from_selection: bool,
    stats: Stats,
    difficult: DifficultWordMap,
    decorations: Vec<Decoration>,
}

#[derive(Debug, Serialize)]
struct OutputReport {
    files: Vec<FileResult>,
    total_words: usize,
    total_difficult: usize,
}

/// Panel stand-in that keeps the last stats pushed to it.
#[derive(Default)]
struct LastMessage {
    message: Option<PanelMessage>,
}

impl Panel for LastMessage {
    fn post_message(&mut self, message: &PanelMessage) {
        self.message = Some(message.clone());
    }

    fn reveal(&mut self) {}
}

struct ReportHost {
    root: PathBuf,
}

impl PanelHost for ReportHost {
    type Panel = LastMessage;

    fn base_location(&self) -> Option<String> {
        Some(self.root.to_string_lossy().into_owned())
    }

    fn create_panel(&mut self, _options: &PanelOptions) -> LastMessage {
        LastMessage::default()
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FITZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let (mut cfg, config_root) = load_config(&args.config)?;
    apply_overrides(&mut cfg, &args.sets)?;
    if let Some(threshold) = args.threshold {
        cfg.thresholds.display = threshold;
    }
    let selections = args
        .selections
        .iter()
        .map(|raw| parse_selection(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let include_patterns: Vec<String> = if args.include.is_empty() {
        DEFAULT_INCLUDE.iter().map(|p| p.to_string()).collect()
    } else {
        args.include.clone()
    };
    let include = build_glob_set(&include_patterns)?;
    let ignore = build_glob_set(&args.ignore)?;

    let mut files = collect_files(&args.paths, include.as_ref(), ignore.as_ref())?;
    files.sort();

    let mut session = Session::new(
        cfg,
        ReportHost {
            root: config_root.clone(),
        },
    );

    let mut results = Vec::new();
    let mut over_grade = false;
    for path in files {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let rel_path = pathdiff::diff_paths(&path, &config_root).unwrap_or_else(|| path.clone());
        let rel_path_clean = rel_path.to_string_lossy().replace('\\', "/");

        let mut editor = MemoryEditor::with_document(MemoryDocument::new(
            rel_path_clean.clone(),
            content,
        ));
        if !selections.is_empty() {
            editor.select(selections.clone());
        }
        let result = match session.refresh(&mut editor) {
            Outcome::Refreshed(result) => result,
            other => bail!("analysis of {} produced {other:?}", path.display()),
        };
        let fields = match session.display().panel().and_then(|p| p.message.as_ref()) {
            Some(PanelMessage::Refresh { stats }) => session.display().schema().render(stats),
            _ => Vec::new(),
        };

        if let Some(max) = args.max_grade {
            if result.stats.grade > max {
                over_grade = true;
            }
        }

        let file = FileResult {
            path: rel_path_clean,
            from_selection: result.from_selection,
            stats: result.stats,
            difficult: result.difficult,
            decorations: editor.decorations().to_vec(),
        };
        if !args.quiet && !args.json {
            print_human_report(&file, &fields);
        }
        results.push(file);
    }

    let output = OutputReport {
        total_words: results.iter().map(|f| f.stats.words).sum(),
        total_difficult: results.iter().map(|f| f.difficult.len()).sum(),
        files: results,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "\n{} files, {} words, {} difficult words",
            output.files.len(),
            output.total_words,
            output.total_difficult
        );
    }

    if over_grade {
        std::process::exit(1);
    }
    Ok(())
}

fn print_human_report(file: &FileResult, fields: &[(StatField, String)]) {
    let stats = &file.stats;
    let grade = stats
        .friendly_grade
        .clone()
        .unwrap_or_else(|| format!("grade {}", stats.grade));
    println!(
        "{} ({} words, {} sentences, {})",
        style(&file.path).bold(),
        stats.words,
        stats.sentences,
        style(grade).cyan()
    );
    for (field, value) in fields {
        if matches!(
            field,
            StatField::Words
                | StatField::Sentences
                | StatField::FriendlyGrade
                | StatField::DifficultWords
        ) {
            continue;
        }
        println!("  {:<22} {}", style(field.key()).dim(), value);
    }
    if file.difficult.is_empty() {
        println!("  {}", style("no difficult words").green());
        return;
    }
    // Decorations follow the map's span order, grouped by word.
    let mut offset = 0;
    for (word, spans) in file.difficult.iter() {
        match file.decorations.get(offset) {
            Some(first) => println!(
                "  {} x{} (first at {}:{})",
                style(word).yellow(),
                spans.len(),
                first.range.start.line + 1,
                first.range.start.character + 1
            ),
            None => println!("  {} x{}", style(word).yellow(), spans.len()),
        }
        offset += spans.len();
    }
}

/// Parse `LINE:COL-LINE:COL` (1-based, inclusive start, exclusive end).
fn parse_selection(raw: &str) -> anyhow::Result<Selection> {
    let (start, end) = raw
        .split_once('-')
        .ok_or_else(|| anyhow!("selection `{raw}` must look like LINE:COL-LINE:COL"))?;
    Ok(Selection::new(parse_position(start)?, parse_position(end)?))
}

fn parse_position(raw: &str) -> anyhow::Result<Position> {
    let (line, col) = raw
        .trim()
        .split_once(':')
        .ok_or_else(|| anyhow!("position `{raw}` must look like LINE:COL"))?;
    let line: usize = line.parse().with_context(|| format!("bad line in `{raw}`"))?;
    let col: usize = col.parse().with_context(|| format!("bad column in `{raw}`"))?;
    if line == 0 || col == 0 {
        bail!("positions are 1-based, got `{raw}`");
    }
    Ok(Position::new(line - 1, col - 1))
}

fn apply_overrides(cfg: &mut Config, sets: &[String]) -> anyhow::Result<()> {
    for kv in sets {
        let mut parts = kv.splitn(2, '=');
        let key = parts.next().unwrap_or("").trim();
        let val = parts.next().unwrap_or("").trim();
        if key.is_empty() {
            continue;
        }
        match key {
            "thresholds.display" => {
                cfg.thresholds.display = val
                    .parse::<usize>()
                    .with_context(|| format!("invalid value for {key}: {val}"))?;
            }
            "thresholds.candidate" => {
                cfg.thresholds.candidate = val
                    .parse::<usize>()
                    .with_context(|| format!("invalid value for {key}: {val}"))?;
            }
            "selection_separator" => {
                cfg.selection_separator = val.to_string();
            }
            "easy_words.extra" => {
                cfg.easy_words
                    .extra
                    .extend(val.split(',').map(|w| w.trim().to_string()));
            }
            "panel.decoration_message" => {
                cfg.panel.decoration_message = val.to_string();
            }
            _ => bail!("unknown config override `{key}`"),
        }
    }
    Ok(())
}

fn build_glob_set<S: AsRef<str>>(patterns: &[S]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    Ok(Some(builder.build()?))
}

fn collect_files(
    paths: &[PathBuf],
    include: Option<&GlobSet>,
    ignore: Option<&GlobSet>,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(path).into_iter();
            while let Some(entry_res) = walker.next() {
                let entry = entry_res?;
                let entry_path = entry.path();
                if let Some(set) = ignore {
                    if set.is_match(entry_path) {
                        if entry.file_type().is_dir() {
                            walker.skip_current_dir();
                        }
                        continue;
                    }
                }
                if entry.file_type().is_file() && is_included(entry_path, include) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if path.is_file() {
            // Explicit files are analyzed whatever their extension.
            if ignore.is_some_and(|set| set.is_match(path)) {
                continue;
            }
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_included(path: &Path, include: Option<&GlobSet>) -> bool {
    include.map_or(true, |set| set.is_match(path))
}

fn load_config(path: &Path) -> anyhow::Result<(Config, PathBuf)> {
    if path.exists() {
        let cfg = Config::from_yaml_file(path)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => env::current_dir()?,
        };
        Ok((cfg, dir))
    } else {
        Ok((Config::default(), env::current_dir()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_based_ranges() {
        let sel = parse_selection("2:5-3:1").unwrap();
        assert_eq!(sel.anchor, Position::new(1, 4));
        assert_eq!(sel.active, Position::new(2, 0));
    }

    #[test]
    fn rejects_zero_and_malformed_positions() {
        assert!(parse_selection("0:1-1:1").is_err());
        assert!(parse_selection("1:1").is_err());
        assert!(parse_selection("a:1-1:2").is_err());
    }

    #[test]
    fn overrides_update_thresholds() {
        let mut cfg = Config::default();
        apply_overrides(
            &mut cfg,
            &["thresholds.display=4".into(), "easy_words.extra=foo, bar".into()],
        )
        .unwrap();
        assert_eq!(cfg.thresholds.display, 4);
        assert_eq!(cfg.easy_words.extra, vec!["foo".to_string(), "bar".to_string()]);
        assert!(apply_overrides(&mut cfg, &["nope=1".into()]).is_err());
    }

    #[test]
    fn default_globs_pick_prose_files() {
        let set = build_glob_set(&["**/*.md", "**/*.txt"]).unwrap();
        assert!(is_included(Path::new("docs/readme.md"), set.as_ref()));
        assert!(!is_included(Path::new("src/main.rs"), set.as_ref()));
        assert!(is_included(Path::new("src/main.rs"), None));
    }
}
