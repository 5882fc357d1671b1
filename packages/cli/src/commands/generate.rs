use crate::config::Config;
use anyhow::{anyhow, Result};
use chaingen_bundle::TypeRegistry;
use chaingen_common::{FileSystem, RealFileSystem};
use chaingen_compiler_swift::{compile_registry, CompileOptions};
use chaingen_parser::error::pretty;
use chaingen_parser::{GeneratorConfig, Parser};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

#[derive(Debug, Default, Args)]
pub struct GenerateArgs {
    /// Project directory holding chaingen.config.json
    #[arg(default_value = ".")]
    pub path: String,

    /// Output directory (overrides config)
    #[arg(short, long = "out")]
    pub out_dir: Option<String>,

    /// Framework to generate, repeatable (overrides config)
    #[arg(short, long = "framework")]
    pub frameworks: Vec<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Log skipped members and other details
    #[arg(short, long)]
    pub verbose: bool,
}

/// A header that could not be read or parsed
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of generating one framework
#[derive(Debug, Default)]
pub struct FrameworkReport {
    pub name: String,
    pub units: usize,
    /// `(declaration name, Swift source)` in name order
    pub files: Vec<(String, String)>,
    pub failures: Vec<UnitFailure>,
    pub warnings: Vec<String>,
}

pub fn generate(args: GenerateArgs, cwd: &str) -> Result<()> {
    let start = Instant::now();
    let root = PathBuf::from(cwd).join(&args.path);

    let reports = run(&RealFileSystem, &root, &args)?;

    if !args.stdout {
        let failed: usize = reports.iter().map(|r| r.failures.len()).sum();
        let written: usize = reports.iter().map(|r| r.files.len()).sum();

        println!();
        if failed == 0 {
            println!("{} Generated {} files successfully", "✅".green(), written);
        } else {
            println!(
                "{} Generated {} files, {} errors",
                "⚠️".yellow(),
                written,
                failed
            );
        }
        println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    }

    Ok(())
}

/// Generate every selected framework of the project at `root`
pub fn run(fs: &dyn FileSystem, root: &Path, args: &GenerateArgs) -> Result<Vec<FrameworkReport>> {
    let config = Config::load(fs, root)?;
    let src_dir = config.get_src_dir(root);

    if !fs.exists(&src_dir) {
        return Err(anyhow!("Source directory does not exist: {}", src_dir.display()));
    }

    let out_dir = match &args.out_dir {
        Some(out) => root.join(out),
        None => config.get_out_dir(root),
    };

    let frameworks = select_frameworks(fs, args, &config, &src_dir)?;
    if frameworks.is_empty() {
        println!("{}", "⚠️  No frameworks found".yellow());
        return Ok(vec![]);
    }

    if !args.stdout {
        println!("{}", "🔨 Generating Swift wrappers...".bright_blue().bold());
    }

    let mut reports = Vec::new();
    for framework in &frameworks {
        let report = match generate_framework(fs, framework, &src_dir.join(framework), &config.generator) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("  {} {} - {}", "✗".red(), framework, e.to_string().red());
                continue;
            }
        };

        if args.stdout {
            for (_, text) in &report.files {
                println!("{}", text);
            }
        } else {
            write_framework(fs, &report, &out_dir)?;
            print_report(&report, &src_dir);
        }
        reports.push(report);
    }

    Ok(reports)
}

fn select_frameworks(
    fs: &dyn FileSystem,
    args: &GenerateArgs,
    config: &Config,
    src_dir: &Path,
) -> Result<Vec<String>> {
    if !args.frameworks.is_empty() {
        return Ok(args.frameworks.clone());
    }
    if !config.frameworks.is_empty() {
        return Ok(config.frameworks.clone());
    }

    Ok(fs
        .list_dirs(src_dir)?
        .iter()
        .filter_map(|dir| dir.file_name().and_then(|n| n.to_str()))
        .map(str::to_string)
        .collect())
}

/// Parse all headers of one framework and compile the merged registry
#[instrument(skip(fs, dir, config), fields(framework = name))]
pub fn generate_framework(
    fs: &dyn FileSystem,
    name: &str,
    dir: &Path,
    config: &GeneratorConfig,
) -> Result<FrameworkReport> {
    let parser = Parser::new(config);
    let mut registry = TypeRegistry::new();
    let mut report = FrameworkReport {
        name: name.to_string(),
        ..Default::default()
    };

    for path in fs.list_files(dir, "h")? {
        report.units += 1;
        let relative = path.strip_prefix(dir).unwrap_or(&path).display().to_string();

        let source = match fs.read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                report.failures.push(UnitFailure {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        match parser.parse(&source) {
            Ok(unit) => {
                report.warnings.extend(
                    unit.diagnostics
                        .iter()
                        .filter(|d| d.is_warning())
                        .map(|d| format!("{}: {}", relative, d)),
                );
                registry.extend(unit.declarations);
            }
            Err(e) => {
                report.failures.push(UnitFailure {
                    message: pretty::format_error(&e, &relative, &source),
                    path,
                });
            }
        }
    }

    registry.mark_containers();
    report.files = compile_registry(&registry, name, &CompileOptions::new(config));

    info!(
        units = report.units,
        declarations = registry.len(),
        failures = report.failures.len(),
        "Generated framework"
    );
    Ok(report)
}

/// Replace `<out>/<Framework>` with the report's files
pub fn write_framework(fs: &dyn FileSystem, report: &FrameworkReport, out_dir: &Path) -> Result<()> {
    let dir = out_dir.join(&report.name);
    fs.recreate_dir(&dir)?;

    for (name, text) in &report.files {
        fs.write_atomic(&dir.join(format!("{}.swift", name)), text)?;
    }
    Ok(())
}

fn print_report(report: &FrameworkReport, src_dir: &Path) {
    println!(
        "  {} {}: {} headers → {} files",
        "✓".green(),
        report.name.bright_white(),
        report.units,
        report.files.len()
    );

    for warning in &report.warnings {
        println!("    {} {}", "!".yellow(), warning.yellow());
    }

    for failure in &report.failures {
        let relative = failure.path.strip_prefix(src_dir).unwrap_or(&failure.path);
        eprintln!("  {} {} - {}", "✗".red(), relative.display(), failure.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaingen_common::MockFileSystem;

    const VIEW: &str = r#"
@interface UIView : UIResponder
@property(nonatomic) CGFloat alpha;
@end
"#;

    const LABEL: &str = r#"
@interface UILabel : UIView
@property(nonatomic) NSInteger numberOfLines;
@end

@interface UIView (UILabelAdditions)
@property(nonatomic) BOOL clipsToBounds;
@end
"#;

    fn project() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("app/Frameworks/UIKit/UIView.h", VIEW);
        fs.add_file("app/Frameworks/UIKit/UILabel.h", LABEL);
        fs.add_file("app/Generated/UIKit/Stale.swift", "");
        fs
    }

    #[test]
    fn test_generate_framework_merges_units() {
        let fs = project();
        let config = GeneratorConfig::default();
        let report =
            generate_framework(&fs, "UIKit", Path::new("app/Frameworks/UIKit"), &config).unwrap();

        assert_eq!(report.units, 2);
        assert!(report.failures.is_empty());

        let names: Vec<&str> = report.files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["UILabel", "UIView"]);

        let view = &report.files[1].1;
        assert!(view.contains("func alpha("));
        assert!(view.contains("func clipsToBounds("));
    }

    #[test]
    fn test_failed_unit_does_not_stop_the_run() {
        let fs = project();
        fs.add_file(
            "app/Frameworks/UIKit/UIBroken.h",
            "@interface UIBroken : NSObject\n@property CGFloat width;\n",
        );

        let config = GeneratorConfig::default();
        let report =
            generate_framework(&fs, "UIKit", Path::new("app/Frameworks/UIKit"), &config).unwrap();

        assert_eq!(report.units, 3);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("UIBroken.h"));
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn test_run_writes_output_directory() {
        let fs = project();
        let reports = run(&fs, Path::new("app"), &GenerateArgs::default()).unwrap();

        assert_eq!(reports.len(), 1);
        assert!(fs.file("app/Generated/UIKit/Stale.swift").is_none());
        assert!(fs
            .file("app/Generated/UIKit/UIView.swift")
            .unwrap()
            .contains("extension PandaChain where Object: UIView {"));
        assert!(fs.file("app/Generated/UIKit/UILabel.swift").is_some());
    }

    #[test]
    fn test_run_framework_selection_and_out_dir() {
        let fs = project();
        fs.add_file("app/Frameworks/QuartzCore/CALayer.h", "@interface CALayer : NSObject\n@property float opacity;\n@end\n");

        let args = GenerateArgs {
            frameworks: vec!["QuartzCore".to_string()],
            out_dir: Some("Out".to_string()),
            ..Default::default()
        };
        let reports = run(&fs, Path::new("app"), &args).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "QuartzCore");
        assert!(fs.file("app/Out/QuartzCore/CALayer.swift").is_some());
        assert!(fs.file("app/Out/UIKit/UIView.swift").is_none());
    }

    #[test]
    fn test_run_missing_source_dir() {
        let fs = MockFileSystem::new();
        fs.add_file("app/README.md", "");

        let err = run(&fs, Path::new("app"), &GenerateArgs::default()).unwrap_err();
        assert!(err.to_string().contains("Source directory does not exist"));
    }

    #[test]
    fn test_run_uses_project_config() {
        let fs = project();
        fs.add_file(
            "app/chaingen.config.json",
            r#"{ "outDir": "Swift", "generator": { "chainType": "Chain" } }"#,
        );

        run(&fs, Path::new("app"), &GenerateArgs::default()).unwrap();

        let view = fs.file("app/Swift/UIKit/UIView.swift").unwrap();
        assert!(view.contains("extension Chain where Object: UIView {"));
    }
}
