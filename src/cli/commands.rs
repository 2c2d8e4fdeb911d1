// CLI command implementations
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use id3forge::field_mapping::StandardField;
use id3forge::id3::genres::GENRES;
use id3forge::{Metadata, PaddingPolicy, Picture, PictureType, Tag, TextEncoding};

use crate::cli::config::{parse_fields, BatchOperation, Commands, Config, SaveOptions};
use crate::cli::output::{OutputFormatter, ProgressBar};

/// Dispatch the parsed command line
pub fn run(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    match &config.command {
        Commands::Read { files, fields, output } => {
            command_read(files, fields.as_deref(), output.as_deref(), formatter)
        }
        Commands::Write { file, metadata, from_file, save } => {
            command_write(file, metadata.as_deref(), from_file.as_deref(), save, formatter)
        }
        Commands::Copy { source, targets, save } => command_copy(source, targets, save, formatter),
        Commands::Batch { directory, pattern, operation, metadata, save } => {
            command_batch(directory, pattern, *operation, metadata.as_deref(), save, formatter)
        }
        Commands::Detect { files } => command_detect(files, formatter),
        Commands::ExportCover { file, output, picture_type } => {
            command_export_cover(file, output, *picture_type, formatter)
        }
        Commands::SetCover { file, image, mime_type, description, picture_type, save } => command_set_cover(
            file,
            image,
            mime_type.as_deref(),
            description.as_deref(),
            *picture_type,
            save,
            formatter,
        ),
        Commands::RemoveCover { files, picture_type } => command_remove_cover(files, *picture_type, formatter),
        Commands::Clear { files } => command_clear(files, formatter),
        Commands::Info { files, detailed } => command_info(files, *detailed, formatter),
        Commands::Genres => command_genres(formatter),
    }
}

fn open_tag(path: &Path) -> Result<Tag> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    Tag::open(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn apply_save_options(tag: &mut Tag, options: &SaveOptions) -> Result<()> {
    if let Some(padding) = options.padding {
        tag.set_padding_policy(PaddingPolicy::fixed(padding));
    }
    if let Some(name) = &options.encoding {
        let encoding = TextEncoding::from_name(name).ok_or_else(|| anyhow!("Unknown encoding: {}", name))?;
        tag.set_default_encoding(encoding);
    }
    tag.set_write_id3v1(options.id3v1);
    Ok(())
}

fn save_tag(tag: &mut Tag, path: &Path) -> Result<()> {
    let outcome = tag
        .save()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!(
        "{}: {:?}, region {} bytes, ID3v1 {}",
        path.display(),
        outcome.strategy,
        outcome.region_size,
        if outcome.id3v1_written { "written" } else { "unchanged" }
    );
    Ok(())
}

fn metadata_value(metadata: &Metadata, fields: Option<&[String]>) -> Result<serde_json::Value> {
    let value = serde_json::to_value(metadata)?;
    let Some(fields) = fields else {
        return Ok(value);
    };

    let mut selected = serde_json::Map::new();
    for name in fields {
        let key = match name.parse::<StandardField>() {
            Ok(field) => field.as_str().to_string(),
            Err(_) if name == "cover" || name == "file_type" || name == "version" => name.clone(),
            Err(e) => bail!(e),
        };
        let field_value = value.get(&key).cloned().unwrap_or(serde_json::Value::Null);
        selected.insert(key, field_value);
    }
    Ok(serde_json::Value::Object(selected))
}

/// Read metadata from files
fn command_read(
    files: &[PathBuf],
    fields: Option<&str>,
    output: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let fields = fields.map(parse_fields);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };

    for file_path in files {
        match open_tag(file_path) {
            Ok(tag) => {
                let metadata = Metadata::from_tag(&tag);
                let value = metadata_value(&metadata, fields.as_deref())?;
                formatter.output_value(&value, &mut writer)?;
            }
            Err(e) => formatter.print_error(&format!("{:#}", e)),
        }
    }

    writer.flush()?;
    Ok(())
}

fn load_metadata(metadata: Option<&str>, from_file: Option<&Path>) -> Result<Metadata> {
    let json = match (from_file, metadata) {
        (Some(path), _) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        (None, Some(json)) => json.to_string(),
        (None, None) => bail!("No metadata given"),
    };
    Metadata::from_json(&json).context("Invalid metadata JSON")
}

/// Write metadata to file
fn command_write(
    file: &Path,
    metadata: Option<&str>,
    from_file: Option<&Path>,
    save: &SaveOptions,
    formatter: &OutputFormatter,
) -> Result<()> {
    let metadata = load_metadata(metadata, from_file)?;

    let mut tag = open_tag(file)?;
    apply_save_options(&mut tag, save)?;
    let applied = metadata.apply(&mut tag);
    save_tag(&mut tag, file)?;

    formatter.print_success(&format!("Updated {} fields in {}", applied, file.display()));
    Ok(())
}

/// Copy metadata between files
fn command_copy(
    source: &Path,
    targets: &[PathBuf],
    save: &SaveOptions,
    formatter: &OutputFormatter,
) -> Result<()> {
    let metadata = Metadata::from_tag(&open_tag(source)?);

    for target in targets {
        let result = open_tag(target).and_then(|mut tag| {
            apply_save_options(&mut tag, save)?;
            metadata.apply(&mut tag);
            save_tag(&mut tag, target)
        });
        match result {
            Ok(()) => formatter.print_success(&format!("Copied metadata to {}", target.display())),
            Err(e) => formatter.print_error(&format!("{:#}", e)),
        }
    }

    Ok(())
}

/// Expand `pattern` under `directory`; bare names match recursively
fn find_files(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
        directory.join(pattern)
    } else {
        directory.join("**").join(pattern)
    };
    let glob_pattern = glob_pattern
        .to_str()
        .ok_or_else(|| anyhow!("Non UTF-8 path: {}", glob_pattern.display()))?
        .to_string();

    let mut files = Vec::new();
    for entry in glob::glob(&glob_pattern).context("Invalid glob pattern")? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("Error reading path: {}", e),
        }
    }
    Ok(files)
}

/// Batch process directory
fn command_batch(
    directory: &Path,
    pattern: &str,
    operation: BatchOperation,
    metadata: Option<&str>,
    save: &SaveOptions,
    formatter: &OutputFormatter,
) -> Result<()> {
    let metadata = match operation {
        BatchOperation::Write => Some(load_metadata(metadata, None)?),
        BatchOperation::Read => None,
    };

    let files = find_files(directory, pattern)?;
    let total = files.len();
    if total == 0 {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }

    formatter.print_info(&format!("Processing {} files ({})...", total, operation));
    let mut progress = ProgressBar::new(total, !formatter.is_quiet());
    let mut success_count = 0;
    let mut errors = Vec::new();

    for file_path in &files {
        let result = open_tag(file_path).and_then(|mut tag| match &metadata {
            Some(metadata) => {
                apply_save_options(&mut tag, save)?;
                metadata.apply(&mut tag);
                save_tag(&mut tag, file_path)
            }
            None => Ok(()),
        });
        progress.increment(&file_path.display().to_string());

        match result {
            Ok(()) => success_count += 1,
            Err(e) => errors.push(format!("{:#}", e)),
        }
    }

    for error in &errors {
        formatter.print_error(error);
    }
    formatter.print_info(&format!(
        "Completed: {} successful, {} errors",
        success_count,
        errors.len()
    ));

    Ok(())
}

/// Detect container and tag version
fn command_detect(files: &[PathBuf], formatter: &OutputFormatter) -> Result<()> {
    for file_path in files {
        match open_tag(file_path) {
            Ok(tag) => {
                let version = if tag.existing_region_size() > 0 {
                    format!("ID3v2.{}.{}", tag.version().0, tag.version().1)
                } else {
                    "no ID3v2".to_string()
                };
                let v1 = if tag.id3v1().is_some() { ", ID3v1" } else { "" };
                println!(
                    "{}: {} ({}{})",
                    file_path.display(),
                    tag.container().as_str(),
                    version,
                    v1
                );
            }
            Err(e) => formatter.print_error(&format!("{:#}", e)),
        }
    }

    Ok(())
}

fn picture_file_name(picture: &Picture, index: usize) -> String {
    let kind = match picture.picture_type {
        PictureType::CoverFront => "cover".to_string(),
        PictureType::CoverBack => "back".to_string(),
        other => format!("picture_{}", other.as_u8()),
    };
    if index == 0 {
        format!("{}.{}", kind, picture.extension())
    } else {
        format!("{}_{}.{}", kind, index, picture.extension())
    }
}

/// Export pictures
fn command_export_cover(
    file: &Path,
    output_dir: &Path,
    picture_type: Option<u8>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let tag = open_tag(file)?;
    let pictures: Vec<Picture> = tag
        .pictures()
        .into_iter()
        .filter(|p| picture_type.map_or(true, |t| p.picture_type.as_u8() == t))
        .collect();

    if pictures.is_empty() {
        bail!("No pictures in {}", file.display());
    }

    fs::create_dir_all(output_dir).with_context(|| format!("Failed to create {}", output_dir.display()))?;
    for (index, picture) in pictures.iter().enumerate() {
        let target = output_dir.join(picture_file_name(picture, index));
        fs::write(&target, &picture.data).with_context(|| format!("Failed to write {}", target.display()))?;
        formatter.print_success(&format!("Exported {} ({} bytes)", target.display(), picture.data.len()));
    }

    Ok(())
}

/// Guess the MIME type from the image signature
fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else {
        "image/jpeg"
    }
}

/// Set a picture
fn command_set_cover(
    file: &Path,
    image: &Path,
    mime_type: Option<&str>,
    description: Option<&str>,
    picture_type: u8,
    save: &SaveOptions,
    formatter: &OutputFormatter,
) -> Result<()> {
    let data = fs::read(image).with_context(|| format!("Failed to read {}", image.display()))?;
    let mime_type = mime_type.unwrap_or_else(|| detect_mime_type(&data)).to_string();

    let mut tag = open_tag(file)?;
    apply_save_options(&mut tag, save)?;
    let size = data.len();
    tag.put_picture(Picture {
        encoding: tag.default_encoding(),
        mime_type,
        picture_type: PictureType::from_u8(picture_type),
        description: description.unwrap_or_default().to_string(),
        data,
    });
    save_tag(&mut tag, file)?;

    formatter.print_success(&format!("Set picture on {} ({} bytes)", file.display(), size));
    Ok(())
}

/// Remove a picture
fn command_remove_cover(files: &[PathBuf], picture_type: u8, formatter: &OutputFormatter) -> Result<()> {
    let picture_type = PictureType::from_u8(picture_type);
    for file in files {
        let result = open_tag(file).and_then(|mut tag| {
            if tag.remove_picture(picture_type) {
                save_tag(&mut tag, file).map(|_| true)
            } else {
                Ok(false)
            }
        });
        match result {
            Ok(true) => formatter.print_success(&format!("Removed picture from {}", file.display())),
            Ok(false) => formatter.print_info(&format!("{}: no matching picture", file.display())),
            Err(e) => formatter.print_error(&format!("{:#}", e)),
        }
    }

    Ok(())
}

/// Remove every ID3v2 frame
fn command_clear(files: &[PathBuf], formatter: &OutputFormatter) -> Result<()> {
    for file in files {
        let result = open_tag(file).and_then(|mut tag| {
            tag.clear_tags();
            save_tag(&mut tag, file)
        });
        match result {
            Ok(()) => formatter.print_success(&format!("Cleared {}", file.display())),
            Err(e) => formatter.print_error(&format!("{:#}", e)),
        }
    }

    Ok(())
}

/// Show detailed file information
fn command_info(files: &[PathBuf], detailed: bool, formatter: &OutputFormatter) -> Result<()> {
    for file_path in files {
        let tag = match open_tag(file_path) {
            Ok(tag) => tag,
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                continue;
            }
        };
        let file_metadata = fs::metadata(file_path)?;

        println!("\n📁 {}", file_path.display());
        println!("{}", "─".repeat(60));
        println!("Size: {} bytes", file_metadata.len());
        if let Ok(modified) = file_metadata.modified() {
            let date: chrono::DateTime<chrono::Utc> = modified.into();
            println!("Modified: {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        println!("Container: {}", tag.container().as_str());
        if tag.existing_region_size() > 0 {
            println!(
                "ID3v2: version 2.{}.{}, {} bytes, {} frames",
                tag.version().0,
                tag.version().1,
                tag.existing_region_size(),
                tag.frame_count()
            );
        } else {
            println!("ID3v2: none");
        }
        if let Some(v1) = tag.id3v1() {
            println!(
                "ID3v1: \"{}\" by \"{}\", genre {}",
                v1.title,
                v1.artist,
                v1.genre_name().unwrap_or("unknown")
            );
        }

        if detailed {
            println!("\nFrames:");
            for frame in tag.frames() {
                let summary = if frame.id().is_text() {
                    frame.decode_text()
                } else {
                    format!("{} bytes", frame.payload().len())
                };
                println!("  {} {}", frame.id(), summary);
            }
        }
    }

    Ok(())
}

/// List the ID3v1 genre table
fn command_genres(formatter: &OutputFormatter) -> Result<()> {
    let value = serde_json::Value::Object(
        GENRES
            .iter()
            .enumerate()
            .map(|(i, name)| (i.to_string(), serde_json::Value::from(*name)))
            .collect(),
    );
    formatter.output_value(&value, &mut io::stdout())
}
