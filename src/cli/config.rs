// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// id3forge - ID3 tag editor for MP3 and AIFF files
#[derive(Parser, Debug)]
#[command(name = "id3forge")]
#[command(about = "Read and write ID3 tags in MP3 and AIFF files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// Options shared by commands that save tags
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SaveOptions {
    /// Zero padding appended to newly written ID3v2 regions
    #[arg(long, value_name = "BYTES")]
    pub padding: Option<u32>,

    /// Append an ID3v1 trailer to MP3 files that have none, even without legacy fields
    #[arg(long)]
    pub id3v1: bool,

    /// Text encoding for new frames (latin1, utf16, utf16be, utf8)
    #[arg(long, value_name = "ENCODING")]
    pub encoding: Option<String>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read metadata from audio file(s)
    Read {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Metadata fields to display (comma-separated)
        #[arg(long)]
        fields: Option<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write metadata to an audio file
    Write {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Metadata JSON string
        #[arg(short, long, required_unless_present = "from_file")]
        metadata: Option<String>,

        /// Read metadata from JSON file
        #[arg(long, conflicts_with = "metadata")]
        from_file: Option<PathBuf>,

        #[command(flatten)]
        save: SaveOptions,
    },

    /// Copy metadata between files
    Copy {
        /// Source audio file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Target audio file(s)
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<PathBuf>,

        #[command(flatten)]
        save: SaveOptions,
    },

    /// Batch process multiple files
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: PathBuf,

        /// File pattern (e.g., "*.mp3", "*.aiff")
        #[arg(short, long)]
        pattern: String,

        /// Operation: read or write
        #[arg(value_enum)]
        operation: BatchOperation,

        /// Metadata JSON to write (required for write operation)
        #[arg(short, long, required_if_eq("operation", "write"))]
        metadata: Option<String>,

        #[command(flatten)]
        save: SaveOptions,
    },

    /// Detect container and tag version
    Detect {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Export pictures
    ExportCover {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output directory for cover images
        #[arg(short, long)]
        output: PathBuf,

        /// Only export this picture type (3 = front cover)
        #[arg(short = 't', long)]
        picture_type: Option<u8>,
    },

    /// Set a picture
    SetCover {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Image file path
        #[arg(short, long)]
        image: PathBuf,

        /// MIME type (guessed from the image if not specified)
        #[arg(long)]
        mime_type: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Picture type (3 = front cover)
        #[arg(short = 't', long, default_value_t = 3)]
        picture_type: u8,

        #[command(flatten)]
        save: SaveOptions,
    },

    /// Remove a picture
    RemoveCover {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Picture type (3 = front cover)
        #[arg(short = 't', long, default_value_t = 3)]
        picture_type: u8,
    },

    /// Remove every ID3v2 frame
    Clear {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Show file information
    Info {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// List every frame
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the ID3v1 genre table
    Genres,
}

/// Batch operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchOperation {
    Read,
    Write,
}

impl std::fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchOperation::Read => write!(f, "read"),
            BatchOperation::Write => write!(f, "write"),
        }
    }
}

/// Parse a comma-separated field list
pub fn parse_fields(fields: &str) -> Vec<String> {
    fields
        .split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}
