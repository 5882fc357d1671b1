use crate::config::DEFAULT_CONFIG_NAME;
use anyhow::Result;
use chaingen_common::{FileSystem, RealFileSystem};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Framework whose headers will be generated
    #[arg(short, long, default_value = "UIKit")]
    pub framework: String,

    /// Source directory
    #[arg(short, long, default_value = "Frameworks")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let root = PathBuf::from(cwd);
    let config_path = root.join(DEFAULT_CONFIG_NAME);

    if RealFileSystem.exists(&config_path) && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing chaingen project...".bright_blue().bold());

    let created = write_project(&RealFileSystem, &root, &args)?;
    for path in created {
        println!("  {} Created {}", "✓".green(), path);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Copy the {} headers into {}/{}/", args.framework, args.src_dir, args.framework);
    println!("  2. Run: chaingen generate");
    println!("  3. Check output in Generated/{}/", args.framework);

    Ok(())
}

/// Write the config file and the framework header directory
fn write_project(fs: &dyn FileSystem, root: &Path, args: &InitArgs) -> Result<Vec<String>> {
    let mut created = Vec::new();

    let framework_dir = root.join(&args.src_dir).join(&args.framework);
    if !fs.exists(&framework_dir) {
        fs.recreate_dir(&framework_dir)?;
        created.push(format!("{}/{}/", args.src_dir, args.framework));
    }

    let config = json!({
        "srcDir": args.src_dir,
        "outDir": "Generated",
        "frameworks": [args.framework],
        "generator": {
            "minimumVersion": { "major": 9, "minor": 0 }
        }
    });
    let config_json = serde_json::to_string_pretty(&config)?;
    fs.write_atomic(&root.join(DEFAULT_CONFIG_NAME), &format!("{}\n", config_json))?;
    created.push(DEFAULT_CONFIG_NAME.to_string());

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chaingen_common::MockFileSystem;
    use chaingen_parser::Version;

    #[test]
    fn test_init_writes_loadable_config() {
        let fs = MockFileSystem::new();
        let args = InitArgs {
            framework: "QuartzCore".to_string(),
            src_dir: "Headers".to_string(),
            force: false,
        };

        let created = write_project(&fs, Path::new("app"), &args).unwrap();
        assert_eq!(created, vec!["Headers/QuartzCore/", "chaingen.config.json"]);
        assert!(fs.exists(Path::new("app/Headers/QuartzCore")));

        let config = Config::load(&fs, Path::new("app")).unwrap();
        assert_eq!(config.src_dir, "Headers");
        assert_eq!(config.frameworks, vec!["QuartzCore"]);
        assert_eq!(config.generator.minimum_version, Version::new(9, 0));
    }
}
