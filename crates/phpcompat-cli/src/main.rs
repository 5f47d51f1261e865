use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use phpcompat_core::{
    AllowlistRules, Config, Diagnostic, DiagnosticCode, Location, Report, Severity,
};
use phpcompat_engine::{AnyRule, Checker};

/// Default config file looked up in the working directory
const CONFIG_FILE: &str = "phpcompat.toml";

/// phpcompat - PHP version compatibility checks
#[derive(Parser)]
#[command(name = "phpcompat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: phpcompat.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check PHP files against a target version range
    Check {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Target PHP version or range, e.g. 5.6, 5.6-7.4, -7.0, 7.0-
        #[arg(short, long)]
        test_version: Option<String>,

        /// Output file for report.json
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// File extensions to scan
        #[arg(short, long, value_delimiter = ',', default_value = "php,inc")]
        extensions: Vec<String>,
    },

    /// List every available rule
    Rules,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Check {
            paths,
            test_version,
            output,
            markdown,
            extensions,
        } => {
            let options = CheckOptions {
                paths,
                test_version,
                output,
                markdown,
                extensions,
                verbose: cli.verbose,
            };
            let report = check_command(&config, &options)?;

            // Exit with error code if there are errors
            if report.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Rules => {
            rules_command(&config);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Explicit `--config`, else `phpcompat.toml` in the working directory, else defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()));
    }

    let default_path = Path::new(CONFIG_FILE);
    if default_path.exists() {
        return Config::from_file(default_path).with_context(|| format!("Failed to load config {CONFIG_FILE}"));
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

struct CheckOptions {
    paths: Vec<PathBuf>,
    test_version: Option<String>,
    output: Option<PathBuf>,
    markdown: Option<PathBuf>,
    extensions: Vec<String>,
    verbose: bool,
}

/// Check command - scan every matching file and build the report
fn check_command(config: &Config, options: &CheckOptions) -> Result<Report> {
    let verbose = options.verbose;

    // The flag wins over the config file
    let test_version = options.test_version.as_deref().unwrap_or(config.test_version());
    let checker = Checker::from_config(config)?;
    let gate = checker.gate(test_version)?;

    if verbose {
        eprintln!("{} {}", "Target range:".cyan(), gate.range());
        eprintln!("{} {} rules", "Loaded".cyan(), checker.registry().len());
    }
    if gate.is_inert() {
        eprintln!(
            "{}",
            "No test version configured; version-dependent checks are disabled".yellow()
        );
    }

    let files = discover_files(&options.paths, &options.extensions, &config.allowlist, &config.project_root);
    tracing::debug!(files = files.len(), "Discovered files");

    let mut report = Report::new();
    if !test_version.is_empty() {
        report = report.with_test_version(test_version);
    }

    for path in &files {
        let shown = display_path(path);
        if verbose {
            eprintln!("  {} {}...", "Checking".cyan(), shown);
        }

        // Legacy sources are often Latin-1; invalid bytes only ever land in
        // strings, comments or identifiers
        let diagnostics = match std::fs::read(path) {
            Ok(bytes) => match checker.check_source(&String::from_utf8_lossy(&bytes), &shown, &gate) {
                Ok(diagnostics) => diagnostics,
                Err(e) => {
                    tracing::warn!(file = %shown, error = %e, "Skipping file");
                    vec![file_error(&shown, "TokenizeError", e.to_string())]
                }
            },
            Err(e) => vec![file_error(&shown, "ReadError", format!("Failed to read {shown}: {e}"))],
        };

        let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
        let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warn).count();

        if verbose && error_count > 0 {
            eprintln!("    {} errors found", error_count.to_string().red());
        } else if verbose && warning_count > 0 {
            eprintln!("    {} warnings", warning_count.to_string().yellow());
        } else if verbose {
            eprintln!("    {}", "✓ OK".green());
        }

        for diagnostic in diagnostics {
            report.add_diagnostic(diagnostic);
        }
        report.record_file();
    }

    if let Some(output) = &options.output {
        report.save_to_file(output)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), output.display());
        }
    }

    if let Some(md_path) = &options.markdown {
        std::fs::write(md_path, generate_markdown_report(&report))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report);

    Ok(report)
}

/// A file-level failure reported like any other finding
fn file_error(file: &str, code: &str, message: String) -> Diagnostic {
    Diagnostic::new(DiagnosticCode::new("Internal", code), Severity::Error, message)
        .with_location(Location::new(file))
}

/// Rules command - list the catalogue
fn rules_command(config: &Config) {
    println!("{}", "Available rules:".bold());
    println!();

    for meta in AnyRule::catalogue() {
        let name = if config.rules.is_enabled(meta.name) {
            meta.name.green()
        } else {
            format!("{} (disabled)", meta.name).dimmed()
        };
        println!("  {} [{}]", name, meta.family.as_str());
        println!("    {}", meta.description);
    }
}

/// Every file under `paths` with one of `extensions`, sorted, minus
/// allowlisted paths. Files named explicitly are always kept.
///
/// Allowlist patterns are tried against the path relative to the scanned
/// root, relative to `project_root`, and as given.
fn discover_files(
    paths: &[PathBuf],
    extensions: &[String],
    allowlist: &AllowlistRules,
    project_root: &Path,
) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in paths {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }

        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let matches_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)));
            if !matches_extension {
                continue;
            }

            let candidates = [path.strip_prefix(root).ok(), path.strip_prefix(project_root).ok(), Some(path)];
            if candidates.into_iter().flatten().any(|p| allowlist.is_path_skipped(&display_path(p))) {
                tracing::debug!(path = %path.display(), "Skipping allowlisted path");
                continue;
            }

            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Forward-slash path without a leading `./`
fn display_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    text.strip_prefix("./").map(str::to_string).unwrap_or(text)
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warn => "WARNING".yellow().bold(),
        Severity::Info => "INFO".cyan(),
    }
}

/// One block per file with findings, then the totals
fn print_report_summary(report: &Report) {
    let rule = "-".repeat(72);

    for (file, diagnostics) in report.by_file() {
        let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
        println!();
        println!("{} {}", "FILE:".bold(), file);
        println!("{rule}");
        println!(
            "FOUND {} ERROR(S) AND {} WARNING(S)",
            errors,
            diagnostics.len() - errors
        );
        println!("{rule}");

        for diag in diagnostics {
            let line = diag.location.as_ref().and_then(|l| l.line).unwrap_or(0);
            println!(" {:>5} | {:<7} | {}", line, severity_label(diag.severity), diag.message);
            println!(" {:>5} | {:<7} | ({})", "", "", diag.code.to_string().dimmed());
        }
        println!("{rule}");
    }

    let summary = &report.summary;
    println!();
    if let Some(test_version) = &report.test_version {
        println!("Checked against PHP {}", test_version.bold());
    }
    println!(
        "{} file(s) checked, {} with findings",
        summary.files_checked, summary.files_with_findings
    );

    let errors = match summary.errors {
        0 => "0 errors".green(),
        n => format!("{n} errors").red().bold(),
    };
    let warnings = match summary.warnings {
        0 => "0 warnings".green(),
        n => format!("{n} warnings").yellow(),
    };
    println!("{errors}, {warnings}, {} info", summary.info);

    if report.diagnostics.is_empty() {
        println!("{}", "No compatibility issues found".green().bold());
    }
}

fn generate_markdown_report(report: &Report) -> String {
    use std::fmt::Write;

    let summary = &report.summary;
    let mut md = String::from("# PHP Compatibility Report\n\n");

    let target = report.test_version.as_deref().unwrap_or("not set");
    let _ = writeln!(md, "Target: `{target}` | Generated: {}\n", report.generated_at);
    let _ = writeln!(md, "| Files | With findings | Errors | Warnings | Info |");
    let _ = writeln!(md, "|---|---|---|---|---|");
    let _ = writeln!(
        md,
        "| {} | {} | {} | {} | {} |\n",
        summary.files_checked, summary.files_with_findings, summary.errors, summary.warnings, summary.info
    );

    if report.diagnostics.is_empty() {
        md.push_str("No compatibility issues found.\n");
        return md;
    }

    for (file, diagnostics) in report.by_file() {
        let _ = writeln!(md, "## `{file}`\n");
        let _ = writeln!(md, "| Line | Severity | Code | Message |");
        let _ = writeln!(md, "|---|---|---|---|");
        for diag in diagnostics {
            let position = diag
                .location
                .as_ref()
                .and_then(|l| l.line.zip(l.column))
                .map_or_else(|| "-".to_string(), |(line, column)| format!("{line}:{column}"));
            let _ = writeln!(
                md,
                "| {position} | {} | `{}` | {} |",
                diag.severity,
                diag.code,
                diag.message.replace('|', "\\|")
            );
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("vendor/lib")).unwrap();
        fs::write(dir.path().join("src/app.php"), "<?php $x = $a ?? $b;\n").unwrap();
        fs::write(dir.path().join("src/legacy.inc"), "<?php $r = ereg('a', $s);\n").unwrap();
        fs::write(dir.path().join("src/notes.txt"), "not php").unwrap();
        fs::write(dir.path().join("vendor/lib/dep.php"), "<?php echo 1;\n").unwrap();
        dir
    }

    fn options(root: &Path, test_version: Option<&str>) -> CheckOptions {
        CheckOptions {
            paths: vec![root.to_path_buf()],
            test_version: test_version.map(str::to_string),
            output: None,
            markdown: None,
            extensions: vec!["php".to_string(), "inc".to_string()],
            verbose: false,
        }
    }

    #[test]
    fn discovers_by_extension_and_skips_allowlisted() {
        let dir = project();
        let allowlist = AllowlistRules {
            skip_paths: vec!["vendor/**".to_string()],
        };

        let files = discover_files(
            &[dir.path().to_path_buf()],
            &["php".to_string(), "inc".to_string()],
            &allowlist,
            dir.path(),
        );
        let names: Vec<String> = files
            .iter()
            .map(|f| display_path(f.strip_prefix(dir.path()).unwrap()))
            .collect();

        assert_eq!(names, vec!["src/app.php", "src/legacy.inc"]);
    }

    #[test]
    fn loads_config_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phpcompat.toml");
        fs::write(
            &path,
            r#"
test_version = "5.6-7.4"

[rules]
disabled = ["NewShortArray"]
"#,
        )
        .unwrap();

        let config = load_config(Some(&path), false).unwrap();
        assert_eq!(config.test_version(), "5.6-7.4");
        assert!(!config.rules.is_enabled("NewShortArray"));
        assert_eq!(config.project_root, dir.path());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "test_version = [").unwrap();

        assert!(load_config(Some(&path), false).is_err());
    }

    #[test]
    fn check_reports_findings_per_file() {
        let dir = project();
        let mut config = Config::default();
        config.allowlist.skip_paths = vec!["vendor/**".to_string()];

        let report = check_command(&config, &options(dir.path(), Some("5.3-7.0"))).unwrap();

        assert_eq!(report.summary.files_checked, 2);
        assert_eq!(report.test_version.as_deref(), Some("5.3-7.0"));
        let codes: Vec<String> = report.diagnostics.iter().map(|d| d.code.to_string()).collect();
        assert_eq!(
            codes,
            vec!["NewOperators.t_coalesceFound", "RemovedFunctions.eregDeprecatedRemoved"]
        );
        assert!(report.has_errors());
    }

    #[test]
    fn latin1_sources_are_still_checked() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("legacy.php"), b"<?php $r = ereg('caf\xE9', $s);\n").unwrap();

        let report = check_command(&Config::default(), &options(dir.path(), Some("5.3-7.0"))).unwrap();
        let codes: Vec<String> = report.diagnostics.iter().map(|d| d.code.to_string()).collect();
        assert_eq!(codes, vec!["RemovedFunctions.eregDeprecatedRemoved"]);
    }

    #[test]
    fn untokenizable_file_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.php"), "<?php $s = 'never closed;\n").unwrap();
        fs::write(dir.path().join("fine.php"), "<?php $x = $a ?? $b;\n").unwrap();

        let report = check_command(&Config::default(), &options(dir.path(), Some("5.6"))).unwrap();

        assert_eq!(report.summary.files_checked, 2);
        let codes: Vec<String> = report.diagnostics.iter().map(|d| d.code.to_string()).collect();
        assert_eq!(codes, vec!["Internal.TokenizeError", "NewOperators.t_coalesceFound"]);
        let broken = &report.diagnostics[0];
        assert!(broken.message.contains("Unterminated string"));
        assert!(broken.location.as_ref().is_some_and(|l| l.file.ends_with("broken.php") && l.line.is_none()));
    }

    #[test]
    fn allowlist_is_relative_to_project_root() {
        let dir = project();
        let config = Config {
            allowlist: AllowlistRules {
                skip_paths: vec!["src/legacy.inc".to_string()],
            },
            project_root: dir.path().to_path_buf(),
            ..Config::default()
        };

        // Scanning `src/` alone, so the pattern only matches from the project root
        let report = check_command(&config, &options(&dir.path().join("src"), Some("5.3-7.0"))).unwrap();
        let codes: Vec<String> = report.diagnostics.iter().map(|d| d.code.to_string()).collect();
        assert_eq!(report.summary.files_checked, 1);
        assert_eq!(codes, vec!["NewOperators.t_coalesceFound"]);
    }

    #[test]
    fn flag_overrides_config_version() {
        let dir = project();
        let config = Config {
            test_version: Some("5.3".to_string()),
            ..Config::default()
        };

        let report = check_command(&config, &options(&dir.path().join("src"), Some("7.0-"))).unwrap();
        let codes: Vec<String> = report.diagnostics.iter().map(|d| d.code.to_string()).collect();
        assert_eq!(codes, vec!["RemovedFunctions.eregDeprecatedRemoved"]);
    }

    #[test]
    fn no_version_means_no_findings() {
        let dir = project();
        let report = check_command(&Config::default(), &options(dir.path(), None)).unwrap();

        assert_eq!(report.summary.files_checked, 3);
        assert!(report.diagnostics.is_empty());
        assert!(report.test_version.is_none());
    }

    #[test]
    fn invalid_test_version_fails_before_scanning() {
        let dir = project();
        let err = check_command(&Config::default(), &options(dir.path(), Some("7.4-5.6"))).unwrap_err();
        assert!(err.to_string().contains("greater than maximum"));
    }

    #[test]
    fn writes_json_and_markdown_reports() {
        let dir = project();
        let mut opts = options(&dir.path().join("src"), Some("5.6"));
        opts.output = Some(dir.path().join("report.json"));
        opts.markdown = Some(dir.path().join("report.md"));

        check_command(&Config::default(), &opts).unwrap();

        let json = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let report: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(report.summary.files_checked, 2);

        let markdown = fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert!(markdown.starts_with("# PHP Compatibility Report"));
        assert!(markdown.contains("NewOperators.t_coalesceFound"));
    }
}
