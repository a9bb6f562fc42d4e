//! Command implementations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use forge_codegen::{CompiledMigration, GeneratedProject, Generator};
use forge_ir::{FieldDescriptor, Modifier, ModifierValue};
use serde::Serialize;
use std::path::Path;

use crate::{Cli, InspectArgs, MakeArgs, PivotArgs};

/// `schemaforge make`
pub fn make(cli: &Cli, args: &MakeArgs) -> Result<()> {
    let mut config = cli.load_config(&args.path)?;
    if args.model {
        config = config.with_model();
    }
    if args.force {
        config = config.allow_overwrite();
    }

    let generator = Generator::new(config);
    let project = generator
        .migration(&args.name, args.schema.as_deref(), now())
        .with_context(|| format!("failed to generate migration '{}'", args.name))?;

    emit(&generator, &project, &args.path, args.dry_run)
}

/// `schemaforge pivot`
pub fn pivot(cli: &Cli, args: &PivotArgs) -> Result<()> {
    let generator = Generator::new(cli.load_config(&args.path)?);
    let project = generator
        .pivot(&args.first, &args.second, now())
        .with_context(|| {
            format!("failed to generate pivot table for '{}' and '{}'", args.first, args.second)
        })?;

    emit(&generator, &project, &args.path, args.dry_run)
}

/// `schemaforge inspect`
pub fn inspect(cli: &Cli, args: &InspectArgs) -> Result<()> {
    let generator = Generator::new(cli.load_config(Path::new("."))?);
    let compiled = generator
        .compile(&args.name, args.schema.as_deref())
        .with_context(|| format!("failed to compile migration '{}'", args.name))?;

    if args.json {
        println!("{}", inspection_json(&compiled)?);
    } else {
        print!("{}", inspection_text(&compiled));
    }
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn emit(generator: &Generator, project: &GeneratedProject, base: &Path, dry_run: bool) -> Result<()> {
    for warning in &project.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    if dry_run {
        for file in &project.files {
            println!("{} {}", "//".dimmed(), file.path.display().to_string().cyan());
            println!("{}", file.content);
        }
        return Ok(());
    }

    let written = generator.write(project, base)?;
    for path in &written {
        println!("  {} {}", "✓ Created:".green(), path.display());
    }
    if written.len() < project.file_count() {
        println!("  {}", "Existing model left unchanged.".dimmed());
    }
    Ok(())
}

// ============================================================================
// Inspection output
// ============================================================================

#[derive(Serialize)]
struct Inspection<'a> {
    #[serde(flatten)]
    migration: &'a CompiledMigration,
    warnings: Vec<String>,
}

fn inspection_json(compiled: &CompiledMigration) -> Result<String> {
    let inspection = Inspection {
        migration: compiled,
        warnings: compiled.warnings(),
    };
    Ok(serde_json::to_string_pretty(&inspection)?)
}

fn inspection_text(compiled: &CompiledMigration) -> String {
    let intent = &compiled.intent;
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", "Migration:".bold(), intent.name));
    out.push_str(&format!("  Action:  {}\n", intent.action.as_str().cyan()));
    out.push_str(&format!("  Table:   {}\n", intent.table.cyan()));
    if let Some(related) = &intent.related_table {
        out.push_str(&format!("  Related: {}\n", related.cyan()));
    }

    out.push_str(&format!("{}\n", "Fields:".bold()));
    if compiled.fields.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
    }
    for (i, field) in compiled.fields.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, describe_field(field)));
    }

    for warning in compiled.warnings() {
        out.push_str(&format!("{} {}\n", "warning:".yellow().bold(), warning));
    }

    out.push_str(&format!("{}\n{}\n", "Up:".bold(), compiled.rendered.up_text()));
    out.push_str(&format!("{}\n{}\n", "Down:".bold(), compiled.rendered.down_text()));
    out
}

/// `email string(100) unique nullable default("x")`
fn describe_field(field: &FieldDescriptor) -> String {
    let mut out = format!("{} {}", field.name, field.field_type);
    if !field.arguments.is_empty() {
        out.push_str(&format!("({})", field.arguments.join(", ")));
    }
    for (modifier, value) in &field.options {
        match value {
            ModifierValue::Flag => out.push_str(&format!(" {}", modifier.keyword())),
            ModifierValue::Literal(v) => out.push_str(&format!(" {}({})", modifier.keyword(), v)),
        }
    }
    if let Some(reference) = field.foreign_key() {
        out.push_str(&format!(" -> {}.{}", reference.table, reference.column));
        if field.has(Modifier::Cascade) {
            out.push_str(" on delete cascade");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn compiled(name: &str, schema: &str) -> CompiledMigration {
        Generator::default().compile(name, Some(schema)).unwrap()
    }

    #[test]
    fn test_describe_field() {
        let compiled = compiled(
            "create_users_table",
            r#"email:string:100:nullable,unique,default("a"), team_id:foreign:cascade"#,
        );
        assert_eq!(
            describe_field(&compiled.fields[0]),
            r#"email string(100) unique nullable default("a")"#
        );
        assert_eq!(
            describe_field(&compiled.fields[1]),
            "team_id unsignedBigInteger cascade -> teams.id on delete cascade"
        );
    }

    #[test]
    fn test_inspection_text() {
        let text = inspection_text(&compiled("add_user_id_to_posts_table", "user_id:foreign"));
        assert!(text.contains("add_user_id_to_posts_table"));
        assert!(text.contains("users"));
        assert!(text.contains("$table->dropForeign(['user_id']);"));
    }

    #[test]
    fn test_inspection_json() {
        let json = inspection_json(&compiled("create_posts_table", "title:string")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["intent"]["table"], "posts");
        assert_eq!(value["fields"][0]["type"], "string");
        assert_eq!(value["warnings"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_make_writes_migration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "schemaforge",
            "make",
            "create_posts_table",
            "-s",
            "title:string",
            "--model",
            "--path",
            path,
        ])
        .unwrap();

        crate::run(&cli).unwrap();

        let migrations: Vec<_> = std::fs::read_dir(dir.path().join("database/migrations"))
            .unwrap()
            .collect();
        assert_eq!(migrations.len(), 1);
        assert!(dir.path().join("app/Models/Post.php").is_file());

        let err = crate::run(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("Migration already exists"));
    }

    #[test]
    fn test_make_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "schemaforge",
            "make",
            "add_views_to_posts_table",
            "-s",
            "views:integer",
            "--dry-run",
            "--path",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();

        crate::run(&cli).unwrap();
        assert!(!dir.path().join("database").exists());
    }

    #[test]
    fn test_make_reports_malformed_schema() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "schemaforge",
            "make",
            "create_posts_table",
            "-s",
            "title:string, :string",
            "--path",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();

        let err = crate::run(&cli).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("failed to generate migration 'create_posts_table'"));
        assert!(message.contains("Malformed field #2"), "{message}");
        assert!(!dir.path().join("database").exists());
    }
}
