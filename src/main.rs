//! folio - rich-text ebook exporter

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use folio::export::{DefaultLoader, export_to_dir};
use folio::validate::{self, BOOK_TITLE_MAX, CONTENT_MAX};
use folio::{
    Align, ContentBlock, CoverSnapshot, DocxConfig, DocxExporter, ExportOptions, Format, PageGeometry,
    PdfConfig, PdfExporter, estimate_editor_pages, paginate_book, parse_html_content, sanitize_html,
    validate_chapter,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Rich-text ebook exporter", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio export book.html --title \"My Book\"       Write My Book.docx and My Book.pdf
    folio export book.html -t Notes -f pdf -o out   Write out/Notes.pdf
    folio paginate book.json                        Print chapter pages as JSON
    folio estimate draft.html                       Print the editor page count")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export an HTML document to DOCX and/or PDF
    Export(ExportArgs),
    /// Paginate the chapters of a book manifest
    Paginate {
        /// JSON manifest: {"chapters": [{"title": "..", "content": ".."}]}
        #[arg(value_name = "BOOK.json")]
        manifest: PathBuf,
    },
    /// Estimate how many pages the editor shows for a document
    Estimate {
        #[arg(value_name = "INPUT.html")]
        input: PathBuf,
    },
    /// Dump the parsed content blocks as JSON
    Blocks {
        #[arg(value_name = "INPUT.html")]
        input: PathBuf,
    },
}

#[derive(clap::Args)]
struct ExportArgs {
    #[arg(value_name = "INPUT.html")]
    input: PathBuf,

    /// Book title
    #[arg(short, long)]
    title: String,

    /// Author name
    #[arg(short, long)]
    author: Option<String>,

    /// Cover image (PNG or JPEG) placed on the first page
    #[arg(long, value_name = "IMG")]
    cover: Option<PathBuf>,

    /// The book already has a cover page carrying the title; skip the title page
    #[arg(long)]
    has_cover_page: bool,

    #[arg(short, long, value_enum, default_value_t = FormatArg::Both)]
    format: FormatArg,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Directory relative image paths are resolved against (defaults to the input's directory)
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Word placed before the author's name on the title page
    #[arg(long, default_value = "by")]
    author_label: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Docx,
    Pdf,
    Both,
}

impl FormatArg {
    fn formats(self) -> &'static [Format] {
        match self {
            FormatArg::Docx => &[Format::Docx],
            FormatArg::Pdf => &[Format::Pdf],
            FormatArg::Both => &[Format::Docx, Format::Pdf],
        }
    }
}

#[derive(Deserialize)]
struct Manifest {
    chapters: Vec<ChapterEntry>,
}

#[derive(Deserialize)]
struct ChapterEntry {
    title: String,
    content: String,
}

#[derive(Serialize)]
struct PageOut<'a> {
    key: &'a str,
    html: &'a str,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    paginated: bool,
    pages: Vec<PageOut<'a>>,
}

#[derive(Serialize)]
struct EstimateOut<'a> {
    content_height: f32,
    page_count: usize,
    break_offsets: &'a [f32],
}

#[derive(Serialize)]
struct RunOut<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    italic: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    underline: bool,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockOut<'a> {
    Heading {
        level: u8,
        align: &'static str,
        runs: Vec<RunOut<'a>>,
    },
    Paragraph {
        align: &'static str,
        runs: Vec<RunOut<'a>>,
    },
    ListItem {
        ordered: bool,
        level: u32,
        align: &'static str,
        runs: Vec<RunOut<'a>>,
    },
    Image {
        source: &'a str,
        width: u32,
        height: u32,
        align: &'static str,
    },
}

fn align_name(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
        Align::Justify => "justify",
    }
}

impl<'a> From<&'a ContentBlock> for BlockOut<'a> {
    fn from(block: &'a ContentBlock) -> Self {
        let runs = || {
            block
                .runs()
                .iter()
                .map(|r| RunOut {
                    text: &r.text,
                    bold: r.bold,
                    italic: r.italic,
                    underline: r.underline,
                })
                .collect()
        };
        match block {
            ContentBlock::Heading { level, align, .. } => BlockOut::Heading {
                level: level.number(),
                align: align_name(*align),
                runs: runs(),
            },
            ContentBlock::Paragraph { align, .. } => BlockOut::Paragraph {
                align: align_name(*align),
                runs: runs(),
            },
            ContentBlock::ListItem {
                ordered,
                level,
                align,
                ..
            } => BlockOut::ListItem {
                ordered: *ordered,
                level: *level,
                align: align_name(*align),
                runs: runs(),
            },
            ContentBlock::Image {
                source,
                width,
                height,
                align,
            } => BlockOut::Image {
                source,
                width: *width,
                height: *height,
                align: align_name(*align),
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Export(args) => export(&args),
        Command::Paginate { manifest } => paginate(&manifest),
        Command::Estimate { input } => estimate(&input),
        Command::Blocks { input } => blocks(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn read_input(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| {
        error!("reading {}: {e:?}", path.display());
        format!("cannot read {}: {e}", path.display())
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn invalid(e: validate::ValidationError) -> String {
    folio::Error::from(e).to_string()
}

fn export(args: &ExportArgs) -> Result<(), String> {
    let title = validate::validate_title(&args.title, BOOK_TITLE_MAX).map_err(invalid)?;
    let author = args
        .author
        .as_deref()
        .map(validate::validate_author)
        .transpose()
        .map_err(invalid)?;
    let raw = read_input(&args.input)?;
    let content = validate::validate_content(&raw, CONTENT_MAX).map_err(invalid)?;

    let mut options = ExportOptions::new(title, sanitize_html(&content)).with_cover_page(args.has_cover_page);
    if let Some(author) = author {
        options = options.with_author(author);
    }
    if let Some(cover) = &args.cover {
        match fs::read(cover) {
            Ok(bytes) => options = options.with_cover(CoverSnapshot::from_bytes(bytes)),
            Err(e) => warn!("cannot read cover {}, adding a title page instead: {e}", cover.display()),
        }
    }

    let base_dir = match &args.base_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let loader = DefaultLoader::new().with_base_dir(base_dir);

    let blocks = parse_html_content(&options.content);
    info!("{} blocks parsed from {}", blocks.len(), args.input.display());

    fs::create_dir_all(&args.out).map_err(|e| format!("cannot create {}: {e}", args.out.display()))?;

    for &format in args.format.formats() {
        let written = match format {
            Format::Docx => {
                let exporter = DocxExporter::new()
                    .with_config(DocxConfig {
                        author_label: args.author_label.clone(),
                        ..Default::default()
                    })
                    .with_loader(loader.clone());
                export_to_dir(&exporter, format, &args.out, &options, &blocks)
            }
            Format::Pdf => {
                let exporter = PdfExporter::new()
                    .with_config(PdfConfig {
                        author_label: args.author_label.clone(),
                        ..Default::default()
                    })
                    .with_loader(loader.clone());
                export_to_dir(&exporter, format, &args.out, &options, &blocks)
            }
        };
        let path = written.map_err(|e| {
            error!("{format} export failed: {e:?}");
            format!("{format} export failed: {e}")
        })?;
        println!("{}", path.display());
    }
    Ok(())
}

fn paginate(manifest: &Path) -> Result<(), String> {
    let raw = read_input(manifest)?;
    let manifest: Manifest =
        serde_json::from_str(&raw).map_err(|e| format!("invalid manifest {}: {e}", manifest.display()))?;

    let mut problems = Vec::new();
    for (i, chapter) in manifest.chapters.iter().enumerate() {
        if let Err(errors) = validate_chapter(i, &chapter.title, &chapter.content) {
            problems.extend(errors);
        }
    }
    if !problems.is_empty() {
        return Err(problems.join("; "));
    }

    let contents: Vec<&str> = manifest.chapters.iter().map(|c| c.content.as_str()).collect();
    let layout = paginate_book(&contents, PageGeometry::default());
    info!("{} pages", layout.pages().len());

    to_json(&LayoutOut {
        paginated: layout.is_paginated(),
        pages: layout
            .pages()
            .iter()
            .map(|p| PageOut {
                key: &p.key,
                html: &p.html,
            })
            .collect(),
    })
}

fn estimate(input: &Path) -> Result<(), String> {
    let html = sanitize_html(&read_input(input)?);
    let estimate = estimate_editor_pages(&html, PageGeometry::default()).map_err(|e| e.to_string())?;
    to_json(&EstimateOut {
        content_height: estimate.content_height,
        page_count: estimate.page_count,
        break_offsets: &estimate.break_offsets,
    })
}

fn blocks(input: &Path) -> Result<(), String> {
    let html = read_input(input)?;
    let blocks = parse_html_content(&html);
    let out: Vec<BlockOut<'_>> = blocks.iter().map(BlockOut::from).collect();
    to_json(&out)
}
