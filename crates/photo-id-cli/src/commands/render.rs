//! Render command - produce a print-ready photo and sheet for one image.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use photo_id_adapters::{load_image, save_pixels};
use photo_id_core::detection::DetectorKind;
use photo_id_core::layout::{
    pack_mixed_sheet, render_mixed_sheet, render_passport_photo, render_sheet, SheetItem,
};
use photo_id_core::{
    CropAdjustment, GenerationCounter, ImageInfo, Outcome, PhotoStandard, Pipeline,
    PipelineReport, PixelBuffer, RunRequest,
};
use tracing::info;

use super::check::{parse_standard, pipeline_config, resolve_standard, FaceSource};
use super::{iso_timestamp, ExitCode};
use crate::config::AppConfig;

/// Arguments for the render command.
#[derive(Args, Clone)]
pub struct RenderArgs {
    /// Source image
    pub image: PathBuf,

    /// Photo standard identifier (default: us-passport)
    #[arg(short, long, value_parser = parse_standard)]
    pub standard: Option<String>,

    /// Directory that receives photo.png and sheet.png
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// Zoom factor applied to the automatic crop
    #[arg(long, default_value_t = 1.0)]
    pub zoom: f64,

    /// Horizontal crop shift (-1.0 to 1.0)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_x: f64,

    /// Vertical crop shift (-1.0 to 1.0)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_y: f64,

    /// Brightness change (-100 to 100)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub brightness: i32,

    /// Overlay the preview watermark on the sheet
    #[arg(long)]
    pub watermark: bool,

    /// Additional standards to place on a mixed sheet (mixed.png)
    #[arg(long = "also", value_name = "STANDARD", value_parser = parse_standard)]
    pub also: Vec<String>,

    /// Copies of each standard on the mixed sheet
    #[arg(long, default_value_t = 2)]
    pub copies: u32,

    /// Detector payload for the image (otherwise its `<stem>.faces.json` sidecar is used)
    #[arg(long, value_name = "FILE")]
    pub faces: Option<PathBuf>,

    /// Detector backend that produced the payload
    #[arg(long, default_value_t = DetectorKind::Landmark)]
    pub detector: DetectorKind,

    /// The image already had its background replaced
    #[arg(long)]
    pub bg_removed: bool,
}

impl RenderArgs {
    fn adjustment(&self) -> CropAdjustment {
        CropAdjustment {
            zoom: self.zoom,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            brightness: self.brightness,
        }
        .clamped()
    }
}

/// Run the render command.
///
/// Prints the pipeline report for the primary standard, then writes the
/// rendered files unless moderation blocked the image.
pub fn run(args: &RenderArgs, config: &AppConfig) -> Result<ExitCode> {
    let standard = resolve_standard(
        args.standard
            .as_deref()
            .or(config.general.standard.as_deref()),
    )?;
    let image = load_image(&args.image)?;

    let pipeline = Pipeline::new(pipeline_config(Some(config)));
    let (faces, pipeline) = FaceSource::attach(args.faces.as_deref(), args.detector, pipeline)?;
    let hint = faces.hint_for(&image);
    let counter = GenerationCounter::new();
    let adjustment = args.adjustment();

    let evaluate = |standard: &PhotoStandard| {
        pipeline.run(
            &image,
            &RunRequest {
                standard,
                adjustment,
                bg_removed: args.bg_removed,
                detection: hint.as_ref(),
                generation: counter.next(),
                timestamp: iso_timestamp(),
            },
        )
    };

    let report = evaluate(standard);
    println!("{}", serde_json::to_string(&report)?);

    if report.outcome == Outcome::Blocked {
        eprintln!("{}: {}", report.path, report.moderation.summary);
        return Ok(ExitCode::Blocked);
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory: {}", args.out.display()))?;

    let photo = render_photo(&image, &report, standard, adjustment.brightness)?;
    write(&photo, &args.out.join("photo.png"))?;
    let sheet = render_sheet(&photo, standard, args.watermark)?;
    write(&sheet, &args.out.join("sheet.png"))?;

    if !args.also.is_empty() {
        let mut standards = vec![standard];
        for id in &args.also {
            standards.push(resolve_standard(Some(id))?);
        }
        let mut photos = vec![photo];
        for &extra in &standards[1..] {
            let extra_report = evaluate(extra);
            photos.push(render_photo(
                &image,
                &extra_report,
                extra,
                adjustment.brightness,
            )?);
        }
        let items: Vec<SheetItem<'_>> = standards
            .iter()
            .map(|&standard| SheetItem {
                standard,
                copies: args.copies,
            })
            .collect();
        let layout = pack_mixed_sheet(&items, standard.sheet.size, standard.dpi)?;
        let mixed = render_mixed_sheet(&photos, &layout, args.watermark)?;
        write(&mixed, &args.out.join("mixed.png"))?;
    }

    Ok(if report.outcome == Outcome::Ready {
        ExitCode::Success
    } else {
        ExitCode::IssuesFound
    })
}

fn render_photo(
    image: &ImageInfo,
    report: &PipelineReport,
    standard: &PhotoStandard,
    brightness: i32,
) -> Result<PixelBuffer> {
    let crop = report
        .crop
        .as_ref()
        .with_context(|| format!("No crop computed for {}", report.path))?;
    Ok(render_passport_photo(
        &image.pixels,
        crop,
        standard,
        brightness,
    )?)
}

fn write(pixels: &PixelBuffer, path: &Path) -> Result<()> {
    save_pixels(pixels, path)?;
    info!("Wrote {}", path.display());
    Ok(())
}
